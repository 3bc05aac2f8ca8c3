//! City model for monitored locations

use serde::{Deserialize, Serialize};

/// A monitored city
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct City {
    /// City name, also used as the history and rate-limit key
    pub name: String,
    /// Latitude in decimal degrees
    #[serde(alias = "lat")]
    pub latitude: f64,
    /// Longitude in decimal degrees
    #[serde(alias = "lon")]
    pub longitude: f64,
}

impl City {
    /// Create a new city
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Format city as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Whether both coordinates are inside their valid ranges
    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}
