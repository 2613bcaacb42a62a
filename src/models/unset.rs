//! Serde adapter for optional fields that the data files spell as `"N/A"`.
//!
//! `None` is written as the sentinel. On read, the sentinel, an empty string,
//! `null` and a missing field all become `None`.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
use serde_json::Value;

pub const UNSET: &str = "N/A";

pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_str(UNSET),
    }
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() || s == UNSET => Ok(None),
        other => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Display helper for optional fields.
pub fn show<T: std::fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => UNSET.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Sample {
        #[serde(default, with = "super")]
        name: Option<String>,
        #[serde(default, with = "super")]
        number: Option<i64>,
    }

    #[test]
    fn test_sentinel_round_trip() {
        let json = serde_json::to_value(Sample { name: None, number: Some(5) }).unwrap();
        assert_eq!(json, serde_json::json!({"name": "N/A", "number": 5}));
    }

    #[test]
    fn test_reads_sentinel_null_and_missing_as_unset() {
        let parsed: Sample = serde_json::from_str(r#"{"name": "N/A", "number": null}"#).unwrap();
        assert_eq!(parsed, Sample { name: None, number: None });

        let parsed: Sample = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, Sample { name: None, number: None });
    }
}
