//! Pollutant reading model

use serde::{Deserialize, Serialize};

/// One normalized air-quality measurement.
///
/// Field names match the upstream API so persisted history stays readable by
/// other tools. Any value the API omitted is `None`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct PollutantReading {
    /// Air quality index, 1 (best) to 5 (worst)
    pub aqi: Option<u8>,
    /// Fine particulate matter, μg/m³
    pub pm2_5: Option<f64>,
    /// Coarse particulate matter, μg/m³
    pub pm10: Option<f64>,
    /// Ozone, μg/m³
    pub o3: Option<f64>,
    /// Nitrogen dioxide, μg/m³
    pub no2: Option<f64>,
    /// Sulphur dioxide, μg/m³
    pub so2: Option<f64>,
    /// Carbon monoxide, μg/m³
    pub co: Option<f64>,
}

impl PollutantReading {
    /// Format a concentration for display, `n/a` when absent
    #[must_use]
    pub fn format_value(value: Option<f64>) -> String {
        value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
    }

    /// Named concentrations in display order
    #[must_use]
    pub fn components(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("PM2.5", self.pm2_5),
            ("PM10", self.pm10),
            ("O3", self.o3),
            ("NO2", self.no2),
            ("SO2", self.so2),
            ("CO", self.co),
        ]
    }
}
