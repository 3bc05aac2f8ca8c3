//! Health advisories derived from air-quality readings
//!
//! Maps the 1-5 AQI onto a severity category with a display colour and
//! assembles a recommendation text from band-level sentences plus extra
//! sentences triggered by PM2.5 and ozone concentrations.

use crate::models::PollutantReading;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity category of an AQI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    /// AQI 1 or lower
    Excellent,
    /// AQI 2
    Good,
    /// AQI 3
    Moderate,
    /// AQI 4
    Harmful,
    /// AQI 5 or higher
    Dangerous,
}

impl AqiCategory {
    /// Category for an AQI value; bands are checked in ascending order
    #[must_use]
    pub fn from_aqi(aqi: i64) -> Self {
        if aqi <= 1 {
            AqiCategory::Excellent
        } else if aqi <= 2 {
            AqiCategory::Good
        } else if aqi <= 3 {
            AqiCategory::Moderate
        } else if aqi <= 4 {
            AqiCategory::Harmful
        } else {
            AqiCategory::Dangerous
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Excellent => "Excellent",
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Harmful => "Harmful",
            AqiCategory::Dangerous => "Dangerous",
        }
    }

    /// Display colour as a hex code
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            AqiCategory::Excellent => "#4caf50",
            AqiCategory::Good => "#8bc34a",
            AqiCategory::Moderate => "#ffc107",
            AqiCategory::Harmful => "#ff9800",
            AqiCategory::Dangerous => "#f44336",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label and colour for an AQI value
#[must_use]
pub fn category_of(aqi: i64) -> (&'static str, &'static str) {
    let category = AqiCategory::from_aqi(aqi);
    (category.label(), category.color())
}

/// Concentrations consulted by the recommendation rules; absent values count as 0
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pollutants {
    pub pm2_5: f64,
    pub pm10: f64,
    pub o3: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
}

impl From<&PollutantReading> for Pollutants {
    fn from(reading: &PollutantReading) -> Self {
        Self {
            pm2_5: reading.pm2_5.unwrap_or(0.0),
            pm10: reading.pm10.unwrap_or(0.0),
            o3: reading.o3.unwrap_or(0.0),
            no2: reading.no2.unwrap_or(0.0),
            so2: reading.so2.unwrap_or(0.0),
            co: reading.co.unwrap_or(0.0),
        }
    }
}

pub const EXCELLENT_TEXT: &str = "Air quality is excellent. Ideal conditions for outdoor activities.";
pub const GOOD_TEXT: &str = "Air quality is good. Outdoor activities are safe for most people.";
pub const MODERATE_TEXT: &str = "Air quality is moderate.";
pub const MODERATE_SENSITIVE_TEXT: &str = "People with heart or lung disease, older adults and children should reduce prolonged outdoor exertion.";
pub const MODERATE_GENERIC_TEXT: &str =
    "Unusually sensitive people should consider limiting prolonged outdoor exertion.";
pub const HARMFUL_TEXT: &str = "Air quality is harmful to health.";
pub const LIMIT_OUTDOORS_TEXT: &str = "Limit time outdoors.";
pub const MASK_TEXT: &str = "Wear a protective mask (N95 or FFP2) when going outside.";
pub const OZONE_ASTHMA_TEXT: &str =
    "High ozone levels can trigger asthma attacks; keep rescue medication at hand.";
pub const INDOOR_AIR_TEXT: &str =
    "Keep windows closed and use an air purifier indoors if one is available.";
pub const DANGEROUS_TEXTS: [&str; 4] = [
    "Air quality is dangerous.",
    "Avoid all outdoor activity.",
    "Keep windows and doors closed.",
    "Seek medical help if you experience shortness of breath or chest pain.",
];
pub const EXTREME_PM25_TEXT: &str =
    "PM2.5 concentration is extremely high; stay indoors with filtered air.";
pub const OZONE_RISK_GROUPS_TEXT: &str = "Ozone concentration poses an elevated risk to children, older adults and people with respiratory disease.";

/// Recommendation text for an AQI value and concentrations
#[must_use]
pub fn recommendation_for(aqi: i64, pollutants: &Pollutants) -> String {
    let mut sentences: Vec<&str> = Vec::new();

    match AqiCategory::from_aqi(aqi) {
        AqiCategory::Excellent => sentences.push(EXCELLENT_TEXT),
        AqiCategory::Good => sentences.push(GOOD_TEXT),
        AqiCategory::Moderate => {
            sentences.push(MODERATE_TEXT);
            if pollutants.pm2_5 > 20.0 {
                sentences.push(MODERATE_SENSITIVE_TEXT);
            } else {
                sentences.push(MODERATE_GENERIC_TEXT);
            }
        }
        AqiCategory::Harmful => {
            sentences.push(HARMFUL_TEXT);
            sentences.push(LIMIT_OUTDOORS_TEXT);
            if pollutants.pm2_5 > 35.0 {
                sentences.push(MASK_TEXT);
            }
            if pollutants.o3 > 100.0 {
                sentences.push(OZONE_ASTHMA_TEXT);
            }
            sentences.push(INDOOR_AIR_TEXT);
        }
        AqiCategory::Dangerous => {
            sentences.extend(DANGEROUS_TEXTS);
            if pollutants.pm2_5 > 50.0 {
                sentences.push(EXTREME_PM25_TEXT);
            }
            if pollutants.o3 > 150.0 {
                sentences.push(OZONE_RISK_GROUPS_TEXT);
            }
        }
    }

    sentences.join(" ")
}

/// Category, colour and recommendation for one reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub category: AqiCategory,
    pub color_code: &'static str,
    pub recommendation: String,
}

impl Advisory {
    #[must_use]
    pub fn new(aqi: i64, pollutants: &Pollutants) -> Self {
        let category = AqiCategory::from_aqi(aqi);
        Self {
            category,
            color_code: category.color(),
            recommendation: recommendation_for(aqi, pollutants),
        }
    }

    /// Advisory for a reading, `None` when the reading carries no AQI
    #[must_use]
    pub fn for_reading(reading: &PollutantReading) -> Option<Self> {
        reading
            .aqi
            .map(|aqi| Self::new(i64::from(aqi), &Pollutants::from(reading)))
    }
}

/// Direction of recent AQI values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Improving,
    Worsening,
    Stable,
    /// Fewer than two known values
    Unknown,
}

/// Recent AQI values, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiTrend {
    pub values: Vec<Option<u8>>,
}

impl AqiTrend {
    #[must_use]
    pub fn new(values: Vec<Option<u8>>) -> Self {
        Self { values }
    }

    /// Compares the oldest and newest known values; a lower AQI is better
    #[must_use]
    pub fn direction(&self) -> TrendDirection {
        let mut known = self.values.iter().flatten();
        let Some(first) = known.next() else {
            return TrendDirection::Unknown;
        };
        let Some(last) = known.last() else {
            return TrendDirection::Unknown;
        };

        match last.cmp(first) {
            std::cmp::Ordering::Less => TrendDirection::Improving,
            std::cmp::Ordering::Greater => TrendDirection::Worsening,
            std::cmp::Ordering::Equal => TrendDirection::Stable,
        }
    }

    /// Compact rendering such as `2 3 - 4`
    #[must_use]
    pub fn format(&self) -> String {
        self.values
            .iter()
            .map(|v| v.map_or_else(|| "-".to_string(), |v| v.to_string()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
