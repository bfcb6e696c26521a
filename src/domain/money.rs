use std::fmt;

/// Money is represented as integer cents to avoid floating-point drift when summing.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// Largest amount, in cents, that survives the trip through a JSON number
/// exactly (2^53 - 1). Larger amounts are rejected on input and on load.
pub const MAX_CENTS: Cents = 9_007_199_254_740_991;

/// Format cents as a two-decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Convert an amount in currency units (as found in persisted JSON) to cents,
/// rounding to the nearest cent.
pub fn units_to_cents(units: f64) -> Cents {
    (units * 100.0).round() as Cents
}

/// Parse a user-entered decimal string into cents.
/// A third decimal digit rounds half up: "10.005" -> 1001.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ParseCentsError::InvalidFormat)?
    };

    let mut fraction_digits = fraction.bytes().map(|b| i64::from(b - b'0'));
    let tenths = fraction_digits.next().unwrap_or(0);
    let hundredths = fraction_digits.next().unwrap_or(0);
    let round_up = fraction_digits.next().is_some_and(|d| d >= 5);

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
        .ok_or(ParseCentsError::InvalidFormat)?;

    Ok(if negative { -cents } else { cents })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    Empty,
    InvalidFormat,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::Empty => write!(f, "amount is empty"),
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

/// Serde adapter storing cents as a plain JSON number of currency units.
/// Whole amounts are written as integers (`5000`), the rest as decimals (`12.5`).
pub mod amount_units {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{units_to_cents, Cents, MAX_CENTS};

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        if cents % 100 == 0 {
            serializer.serialize_i64(cents / 100)
        } else {
            serializer.serialize_f64(*cents as f64 / 100.0)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        let units = f64::deserialize(deserializer)?;
        if !units.is_finite() {
            return Err(D::Error::custom("amount must be a finite number"));
        }
        if (units * 100.0).abs() > MAX_CENTS as f64 {
            return Err(D::Error::custom(format!("amount {units} is out of range")));
        }
        Ok(units_to_cents(units))
    }
}
