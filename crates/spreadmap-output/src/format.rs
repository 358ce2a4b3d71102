//! Number formatting for tables.
//!
//! Amounts and quantities print with no decimals, prices with two. Both use
//! `,` as the thousands separator.

const SEPARATOR: char = ',';

/// P/L or quantity: `-1234567.6` → `-1,234,568`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    group_thousands(&format!("{value:.0}"))
}

/// Price: `2310.456` → `2,310.46`.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    group_thousands(&format!("{value:.2}"))
}

/// Cell value or `-` when not applicable.
pub fn format_cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), format_amount)
}

fn group_thousands(formatted: &str) -> String {
    let (negative, digits) = match formatted.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, formatted),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let is_zero = int_part.bytes().all(|b| b == b'0')
        && frac_part.is_none_or(|f| f.bytes().all(|b| b == b'0'));

    let mut out = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    if negative && !is_zero {
        out.push('-');
    }
    let len = int_part.len();
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(SEPARATOR);
        }
        out.push(ch);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "0")]
    #[case(999.0, "999")]
    #[case(1000.0, "1,000")]
    #[case(-1500.0, "-1,500")]
    #[case(1_234_567.6, "1,234,568")]
    #[case(-0.4, "0")]
    #[case(100_000.0, "100,000")]
    fn test_format_amount(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_amount(value), expected);
    }

    #[rstest]
    #[case(2310.456, "2,310.46")]
    #[case(-20.0, "-20.00")]
    #[case(0.001, "0.00")]
    fn test_format_price(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_price(value), expected);
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(None), "-");
        assert_eq!(format_cell(Some(3000.0)), "3,000");
    }

    #[test]
    fn test_non_finite_passthrough() {
        assert_eq!(format_amount(f64::NAN), "NaN");
        assert_eq!(format_amount(f64::INFINITY), "inf");
    }
}
