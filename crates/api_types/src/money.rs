use std::{fmt, str::FromStr};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};

/// Decimal amount on the wire, held as integer cents.
///
/// Always serialized as a string with two fraction digits (`"1500.00"`).
/// Deserializes from a decimal string or a JSON number, rejecting more than
/// two fraction digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmountParseError(&'static str);

impl fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for AmountParseError {}

impl Amount {
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Accepts `.` or `,` as decimal separator and an optional sign.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = AmountParseError("invalid amount");
        let overflow = AmountParseError("amount too large");

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if rest.is_empty() {
            return Err(AmountParseError("empty amount"));
        }

        let rest = rest.replace(',', ".");
        let (units, fraction) = match rest.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (rest.as_str(), ""),
        };
        let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if units.is_empty() || !digits(units) || !digits(fraction) {
            return Err(invalid);
        }

        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid.clone())? * 10,
            2 => fraction.parse().map_err(|_| invalid.clone())?,
            _ => return Err(AmountParseError("too many decimals")),
        };
        let units: i64 = units.parse().map_err(|_| overflow.clone())?;
        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or(overflow)?;

        Ok(Self(if negative { -total } else { total }))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount with at most two fraction digits")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        v.checked_mul(100)
            .map(Amount)
            .ok_or_else(|| E::custom("amount too large"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        i64::try_from(v)
            .map_err(|_| E::custom("amount too large"))
            .and_then(|v| self.visit_i64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        if !v.is_finite() {
            return Err(E::custom("invalid amount"));
        }
        // Shortest round-trip representation, so 10.1 stays "10.1".
        self.visit_str(&v.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_has_two_fraction_digits() {
        assert_eq!(Amount::from_cents(0).to_string(), "0.00");
        assert_eq!(Amount::from_cents(5).to_string(), "0.05");
        assert_eq!(Amount::from_cents(150_000).to_string(), "1500.00");
        assert_eq!(Amount::from_cents(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Amount>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Amount>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<Amount>().unwrap().cents(), 1050);
        assert_eq!("-0.01".parse::<Amount>().unwrap().cents(), -1);
        assert_eq!(" +2.30 ".parse::<Amount>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("12.345".parse::<Amount>().is_err());
        assert!("".parse::<Amount>().is_err());
        assert!("-".parse::<Amount>().is_err());
        assert!("1.2.3".parse::<Amount>().is_err());
        assert!("abc".parse::<Amount>().is_err());
        assert!(".5".parse::<Amount>().is_err());
        assert!("99999999999999999999".parse::<Amount>().is_err());
    }

    #[test]
    fn deserializes_strings_and_numbers() {
        let from_str: Amount = serde_json::from_str(r#""1500.00""#).unwrap();
        let from_int: Amount = serde_json::from_str("1500").unwrap();
        let from_float: Amount = serde_json::from_str("1500.5").unwrap();
        assert_eq!(from_str.cents(), 150_000);
        assert_eq!(from_int.cents(), 150_000);
        assert_eq!(from_float.cents(), 150_050);
        assert!(serde_json::from_str::<Amount>("10.125").is_err());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Amount::from_cents(30_000)).unwrap();
        assert_eq!(json, r#""300.00""#);
    }
}
