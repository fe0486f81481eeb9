mod session;
mod streak;
mod wait_wall;

pub use session::{MeditationSession, SessionState};
pub use streak::{StreakChange, StreakState};
pub use wait_wall::WaitWall;
