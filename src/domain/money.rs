use std::fmt;

/// Amounts are integer Kenyan shillings. Mobile-money rails transact in whole
/// shillings, so the shilling itself is the minor unit and there is no
/// fractional drift to worry about.
pub type Shillings = i64;

/// Smallest amount accepted for any operation (deposit, send, reallocate).
pub const MIN_OPERATION: Shillings = 10;

/// Largest single deposit the simulated gateway accepts. Sends are bounded
/// by the available balance only.
pub const MAX_TRANSACTION: Shillings = 150_000;

/// Format an amount as a human-readable KES string with thousands separators.
/// Example: 4525 -> "KES 4,525", -150 -> "-KES 150"
pub fn format_kes(amount: Shillings) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let digits = amount.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}KES {}", sign, grouped)
}

/// Parse a user-entered amount into whole shillings.
/// Accepts plain digits with optional thousands separators: "4525", "4,525".
pub fn parse_amount(input: &str) -> Result<Shillings, ParseAmountError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseAmountError::InvalidFormat);
    }

    cleaned.parse().map_err(|_| ParseAmountError::InvalidFormat)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
        }
    }
}

impl std::error::Error for ParseAmountError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_kes() {
        assert_eq!(format_kes(0), "KES 0");
        assert_eq!(format_kes(100), "KES 100");
        assert_eq!(format_kes(4525), "KES 4,525");
        assert_eq!(format_kes(150_000), "KES 150,000");
        assert_eq!(format_kes(1_234_567), "KES 1,234,567");
        assert_eq!(format_kes(-150), "-KES 150");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("500"), Ok(500));
        assert_eq!(parse_amount("4,525"), Ok(4525));
        assert_eq!(parse_amount(" 150,000 "), Ok(150_000));
        assert_eq!(parse_amount("10"), Ok(10));
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("-50").is_err());
        assert!(parse_amount("12.34").is_err());
    }
}
