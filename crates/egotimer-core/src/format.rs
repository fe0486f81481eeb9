//! Number formatting for ego balances.

const SUFFIXES: [(u64, char); 4] = [
    (1_000_000_000_000, 'T'),
    (1_000_000_000, 'B'),
    (1_000_000, 'M'),
    (1_000, 'K'),
];

/// Compact form: `999`, `1.5K`, `150K`, `2.6B`, `18446744T`.
///
/// One decimal while below 100 of a unit, none above. Digits are truncated,
/// never rounded up, so a balance is never displayed as more than it is.
pub fn format_ego(n: u64) -> String {
    for (unit, suffix) in SUFFIXES {
        if n >= unit {
            let whole = n / unit;
            if whole >= 100 {
                return format!("{whole}{suffix}");
            }
            let tenths = (n as u128 * 10 / unit as u128) as u64;
            return format!("{}.{}{suffix}", tenths / 10, tenths % 10);
        }
    }
    n.to_string()
}

/// Thousands separators: `1234567` → `1,234,567`.
pub fn format_grouped(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_numbers_are_plain() {
        assert_eq!(format_ego(0), "0");
        assert_eq!(format_ego(999), "999");
    }

    #[test]
    fn suffixes() {
        assert_eq!(format_ego(1_000), "1.0K");
        assert_eq!(format_ego(1_500), "1.5K");
        assert_eq!(format_ego(99_999), "99.9K");
        assert_eq!(format_ego(150_000), "150K");
        assert_eq!(format_ego(2_684_588_330), "2.6B");
        assert_eq!(format_ego(42_000_000_000_000), "42.0T");
        assert_eq!(format_ego(u64::MAX), "18446744T");
    }

    #[test]
    fn grouping() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1_000), "1,000");
        assert_eq!(format_grouped(1_234_567), "1,234,567");
        assert_eq!(format_grouped(u64::MAX), "18,446,744,073,709,551,615");
    }
}
