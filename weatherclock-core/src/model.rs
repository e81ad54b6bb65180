use serde::{Deserialize, Serialize};

/// Where a resolved location identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Custom,
    IpLookup,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    /// Provider-specific opaque identifier.
    pub id: String,
    /// Text shown in the location field while and after resolving.
    pub label: String,
    pub source: LocationSource,
}

/// One geocode hit, as returned by the provider's city lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoLocation {
    pub id: String,
    pub name: Option<String>,
}

/// Raw current-conditions fields. Temperature stays an opaque string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReading {
    pub temperature_c: String,
    pub condition_code: String,
}

/// Last successfully fetched snapshot, persisted for offline display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub location_label: String,
    pub temperature_text: String,
    pub icon_glyph: String,
}

impl DisplayState {
    pub fn from_reading(label: &str, reading: &WeatherReading) -> Self {
        Self {
            location_label: label.to_string(),
            temperature_text: format!("{}°C", reading.temperature_c),
            icon_glyph: crate::icon::map_icon(&reading.condition_code).to_string(),
        }
    }
}

/// Read-only inputs for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub api_key: String,
    pub api_host: String,
    pub custom_city: String,
}
