//! Air pollution API response validation
//!
//! Expected shape:
//! `{ "list": [ { "main": {"aqi": 2}, "components": {"pm2_5": 3.1, ...} } ] }`.
//! Only the first element of `list` is used. Missing or non-numeric fields
//! inside `main` and `components` become `None` rather than failing.

use crate::error::FetchError;
use crate::models::PollutantReading;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `main` section of a list entry
#[derive(Debug, Default, Deserialize)]
struct MainSection {
    #[serde(default, deserialize_with = "lenient_number")]
    aqi: Option<f64>,
}

/// `components` section of a list entry, concentrations in μg/m³
#[derive(Debug, Default, Deserialize)]
struct ComponentsSection {
    #[serde(default, deserialize_with = "lenient_number")]
    pm2_5: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pm10: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    o3: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    no2: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    so2: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    co: Option<f64>,
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64())
}

/// Validate a raw response body and normalize it into a reading
pub fn parse_air_pollution(body: &str) -> Result<PollutantReading, FetchError> {
    let data: Value = serde_json::from_str(body).map_err(|_| FetchError::InvalidJson)?;

    let entry = data
        .get("list")
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .ok_or_else(|| FetchError::MissingList {
            raw: data.to_string(),
        })?;

    let (Some(main), Some(components)) = (
        entry.get("main").filter(|v| v.is_object()),
        entry.get("components").filter(|v| v.is_object()),
    ) else {
        return Err(FetchError::MissingFields {
            raw: entry.to_string(),
        });
    };

    let missing_fields = || FetchError::MissingFields {
        raw: entry.to_string(),
    };
    let main = MainSection::deserialize(main).map_err(|_| missing_fields())?;
    let components = ComponentsSection::deserialize(components).map_err(|_| missing_fields())?;

    Ok(PollutantReading {
        aqi: main.aqi.and_then(aqi_index),
        pm2_5: components.pm2_5,
        pm10: components.pm10,
        o3: components.o3,
        no2: components.no2,
        so2: components.so2,
        co: components.co,
    })
}

/// The index is an integer; anything else is treated as absent
fn aqi_index(value: f64) -> Option<u8> {
    if value.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}
