//! Serde helpers for the director's loosely typed JSON.

use serde::{Deserialize, Deserializer, Serializer};

/// Serialization and deserialization for `SystemTime` as seconds since UNIX epoch.
pub mod system_time {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    /// Serialize a `SystemTime` as a u64 representing seconds since UNIX epoch.
    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time
            .duration_since(UNIX_EPOCH)
            .map_err(|_| serde::ser::Error::custom("SystemTime before UNIX epoch"))?;
        serializer.serialize_u64(duration.as_secs())
    }

    /// Deserialize a u64 representing seconds since UNIX epoch into a `SystemTime`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}

/// Deserializes `null` as the type's default value.
///
/// Pair with `#[serde(default)]` so that absent fields default as well.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A number on the wire that may arrive as a JSON number, a numeric string, or `null`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Float(f64),
    Text(String),
}

fn parse_loose<T, E>(value: Option<LooseNumber>, from_f64: fn(f64) -> Option<T>) -> Result<Option<T>, E>
where
    T: std::str::FromStr,
    E: serde::de::Error,
{
    match value {
        None => Ok(None),
        Some(LooseNumber::Float(number)) => from_f64(number)
            .map(Some)
            .ok_or_else(|| E::custom(format!("number {number} is out of range"))),
        Some(LooseNumber::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<T>()
                .map(Some)
                .map_err(|_| E::custom(format!("'{text}' is not a number")))
        }
    }
}

/// Floating-point fields encoded as strings, e.g. `"46.8"`.
///
/// `null`, absent and empty strings deserialize to `None`. Values serialize
/// back as strings, the way the director emits them.
pub mod string_f64 {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<LooseNumber>::deserialize(deserializer)?;
        parse_loose(value, Some)
    }

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(number) => serializer.serialize_str(&number.to_string()),
            None => serializer.serialize_none(),
        }
    }
}

/// Unsigned integer fields encoded as strings, e.g. `"2864212"`.
pub mod string_u64 {
    use super::*;

    fn whole(number: f64) -> Option<u64> {
        (number >= 0.0 && number.fract() == 0.0 && number <= u64::MAX as f64)
            .then_some(number as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<LooseNumber>::deserialize(deserializer)?;
        parse_loose(value, whole)
    }

    pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(number) => serializer.serialize_str(&number.to_string()),
            None => serializer.serialize_none(),
        }
    }
}
