//! History entry model as persisted in per-city history files

use super::PollutantReading;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One timestamped reading for a city
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryEntry {
    /// When the reading was taken (ISO-8601)
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<FixedOffset>,
    /// City the reading belongs to
    pub city: String,
    /// The reading itself
    pub data: PollutantReading,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(
        city: impl Into<String>,
        data: PollutantReading,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            timestamp,
            city: city.into(),
            data,
        }
    }
}

/// ISO-8601 timestamps: written as RFC 3339, read with or without an offset.
///
/// Timestamps without an offset are taken as local time.
mod timestamp {
    use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        value: &DateTime<FixedOffset>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }

    fn parse(raw: &str) -> Option<DateTime<FixedOffset>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed);
        }
        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        resolve_local(&Local, &naive)
    }

    /// Attach the zone's offset to a wall-clock time
    ///
    /// Ambiguous times take the earlier instant. Times skipped by a forward
    /// transition take the offset in effect after it.
    pub(super) fn resolve_local<Tz: TimeZone>(
        tz: &Tz,
        naive: &NaiveDateTime,
    ) -> Option<DateTime<FixedOffset>> {
        if let Some(local) = tz.from_local_datetime(naive).earliest() {
            return Some(local.fixed_offset());
        }
        let offset = tz.offset_from_utc_datetime(naive).fix();
        offset.from_local_datetime(naive).single()
    }
}
