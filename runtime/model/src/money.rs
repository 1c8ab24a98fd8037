use std::fmt;

/// Number of minor units per major currency unit (cents per dollar).
pub const MINOR_UNITS_PER_MAJOR: u64 = 100;

/// Errors from parsing a decimal amount into minor units.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid amount: {0:?}")]
    Invalid(String),

    #[error("amount has more than 2 fractional digits: {0:?}")]
    TooPrecise(String),

    #[error("amount out of range: {0:?}")]
    Overflow(String),
}

/// Format minor units as a decimal string: `12345 -> "123.45"`.
pub fn format_minor_units(amount: u64) -> String {
    format!(
        "{}.{:02}",
        amount / MINOR_UNITS_PER_MAJOR,
        amount % MINOR_UNITS_PER_MAJOR
    )
}

/// Format minor units with a currency code: `12345, "USD" -> "123.45 USD"`.
pub fn format_with_currency(amount: u64, currency: &str) -> String {
    format!("{} {currency}", format_minor_units(amount))
}

/// Parse a decimal string into minor units: `"123.45" -> 12345`.
///
/// Accepts whole amounts (`"123"`) and one or two fractional digits
/// (`"123.4"` is 12340). Rejects negatives and more than two fractional
/// digits rather than rounding silently.
pub fn parse_minor_units(input: &str) -> Result<u64, MoneyError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.starts_with('+') {
        return Err(MoneyError::Invalid(input.to_string()));
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(MoneyError::Invalid(input.to_string()));
    }
    if frac.len() > 2 {
        return Err(MoneyError::TooPrecise(input.to_string()));
    }

    let whole_units: u64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| MoneyError::Invalid(input.to_string()))?
    };

    let frac_units: u64 = if frac.is_empty() {
        0
    } else {
        let parsed: u64 = frac
            .parse()
            .map_err(|_| MoneyError::Invalid(input.to_string()))?;
        if frac.len() == 1 {
            parsed * 10
        } else {
            parsed
        }
    };

    whole_units
        .checked_mul(MINOR_UNITS_PER_MAJOR)
        .and_then(|units| units.checked_add(frac_units))
        .ok_or_else(|| MoneyError::Overflow(input.to_string()))
}

/// Display wrapper for minor-unit amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayAmount(pub u64);

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_minor_units(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_whole_and_fraction() {
        assert_eq!(format_minor_units(0), "0.00");
        assert_eq!(format_minor_units(5), "0.05");
        assert_eq!(format_minor_units(100), "1.00");
        assert_eq!(format_minor_units(12345), "123.45");
        assert_eq!(format_minor_units(100_000), "1000.00");
    }

    #[test]
    fn format_with_currency_code() {
        assert_eq!(format_with_currency(12345, "USD"), "123.45 USD");
    }

    #[test]
    fn parse_whole() {
        assert_eq!(parse_minor_units("123"), Ok(12300));
        assert_eq!(parse_minor_units("0"), Ok(0));
    }

    #[test]
    fn parse_fractions() {
        assert_eq!(parse_minor_units("123.45"), Ok(12345));
        assert_eq!(parse_minor_units("123.4"), Ok(12340));
        assert_eq!(parse_minor_units(".99"), Ok(99));
        assert_eq!(parse_minor_units("1000.00"), Ok(100_000));
    }

    #[test]
    fn parse_rejects_negative() {
        assert!(matches!(
            parse_minor_units("-5"),
            Err(MoneyError::Invalid(_))
        ));
    }

    #[test]
    fn parse_rejects_three_decimals() {
        assert!(matches!(
            parse_minor_units("1.234"),
            Err(MoneyError::TooPrecise(_))
        ));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_minor_units("").is_err());
        assert!(parse_minor_units("abc").is_err());
        assert!(parse_minor_units("1.2.3").is_err());
        assert!(parse_minor_units(".").is_err());
    }

    #[test]
    fn parse_format_roundtrip() {
        for amount in [0u64, 1, 99, 100, 12345, 100_000, 999_999_999] {
            let text = format_minor_units(amount);
            assert_eq!(parse_minor_units(&text), Ok(amount));
        }
    }
}
