//! Serde adapter for FX limits.
//!
//! Persisted forests carry `fxLimit` as a JSON number, but form input and
//! older payloads send numeric strings (or an empty string for a blank field).
//! A `null` or unreadable stored limit decodes as zero. Whole amounts
//! serialize as integers so `1000000` stays `1000000`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serializer};
use tracing::warn;

pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.fract().is_zero() {
        if let Some(whole) = value.to_i64() {
            return serializer.serialize_i64(whole);
        }
    }
    match value.to_f64() {
        Some(float) => serializer.serialize_f64(float),
        None => serializer.serialize_str(&value.to_string()),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AmountInput {
        Integer(i64),
        Float(f64),
        Text(String),
        Other(IgnoredAny),
    }

    let amount = match AmountInput::deserialize(deserializer)? {
        AmountInput::Integer(value) => Some(Decimal::from(value)),
        AmountInput::Float(value) => Decimal::from_f64(value),
        AmountInput::Text(raw) => parse_amount(&raw).ok(),
        AmountInput::Other(_) => None,
    };
    Ok(amount.unwrap_or_else(|| {
        warn!("unreadable fxLimit, using zero");
        Decimal::ZERO
    }))
}

/// Parse a user-entered amount. Blank input is zero.
pub fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }
    trimmed
        .replace(',', "")
        .parse::<Decimal>()
        .map_err(|e| format!("invalid amount '{trimmed}': {e}"))
}
