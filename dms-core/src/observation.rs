use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single extensometer reading.
///
/// Within one API response, records are ordered ascending by `ob_time`.
/// Consumers must not rely on any ordering across responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensometerRecord {
    pub sensor_code: String,
    pub ob_time: NaiveDateTime,
    /// Correlated upstream water level, when the station recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservoir_level: Option<f64>,
    /// Displacement in millimeters.
    pub value: f64,
}

/// A single hydrostatic-level reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrostaticRecord {
    pub sensor_code: String,
    pub ob_time: NaiveDateTime,
    /// Relative elevation in millimeters.
    pub value: f64,
}

/// A single inverted plumb line reading, with independent left/right and
/// up/downstream components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvertedPlumbRecord {
    pub sensor_code: String,
    pub ob_time: NaiveDateTime,
    /// Correlated upstream water level, when the station recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservoir_level: Option<f64>,
    /// Left/right offset in millimeters.
    pub lr_value: f64,
    /// Up/downstream offset in millimeters.
    pub ud_value: f64,
}
