//! Serde adapter for history timestamps.
//!
//! Writes RFC 3339. Reads RFC 3339 and the zone-suffixed local form of older
//! history files, e.g. `2025-03-12 10:04:05 +08+0800`.

use jiff::{Timestamp, civil::DateTime, fmt::strtime, tz::TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const LOCAL_LEN: usize = "YYYY-MM-DD HH:MM:SS".len();
const OFFSET_LEN: usize = "+hhmm".len();

pub fn parse(raw: &str) -> Result<Timestamp, jiff::Error> {
    let raw = raw.trim();
    raw.parse::<Timestamp>()
        .or_else(|e| parse_local(raw).ok_or(e))
}

/// The trailing `+hhmm` fixes the instant, the abbreviation before it is
/// ignored. A bare local time is taken as UTC.
fn parse_local(raw: &str) -> Option<Timestamp> {
    let datetime = DateTime::strptime(LOCAL_FORMAT, raw.get(..LOCAL_LEN)?).ok()?;
    let zone = raw.get(LOCAL_LEN..)?.trim();

    let tz = if zone.is_empty() {
        TimeZone::UTC
    } else {
        let offset = zone.get(zone.len().checked_sub(OFFSET_LEN)?..)?;
        TimeZone::fixed(strtime::parse("%z", offset).ok()?.offset()?)
    };
    datetime.to_zoned(tz).ok().map(|zoned| zoned.timestamp())
}

pub fn serialize<S: Serializer>(timestamp: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
    timestamp.serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(D::Error::custom)
}

/// For `session_end`: `"N/A"`, an empty string and `null` read as `None`,
/// and `None` is written as `"N/A"`.
pub mod optional {
    use jiff::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use crate::models::unset::{self, UNSET};

    pub fn serialize<S: Serializer>(
        value: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        unset::serialize(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() || raw.trim() == UNSET => Ok(None),
            Some(raw) => super::parse(&raw).map(Some).map_err(D::Error::custom),
        }
    }
}
