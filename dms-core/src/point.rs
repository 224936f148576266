use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status value the API uses for an online point. Every other value is
/// treated as offline.
pub const STATUS_ONLINE: i32 = 1;

/// The kinds of monitoring sensors installed on the dam.
///
/// This is a closed set: dispatch over kinds is always an exhaustive
/// `match`, so adding a kind breaks every call site until it is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// Extensometer, measures horizontal displacement along a line.
    #[serde(rename = "EX")]
    Extensometer,
    /// Hydrostatic-level sensor, measures relative elevation via
    /// connected fluid columns.
    #[serde(rename = "TC")]
    HydrostaticLevel,
    /// Inverted plumb line, measures lateral/vertical offset from a
    /// fixed anchor.
    #[serde(rename = "IP")]
    InvertedPlumbLine,
}

impl SensorKind {
    /// All kinds, in catalog display order.
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Extensometer,
        SensorKind::HydrostaticLevel,
        SensorKind::InvertedPlumbLine,
    ];

    /// Wire code used by the API for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            SensorKind::Extensometer => "EX",
            SensorKind::HydrostaticLevel => "TC",
            SensorKind::InvertedPlumbLine => "IP",
        }
    }

    /// Parse a wire code ("EX", "TC", "IP"). Case sensitive, like the API.
    pub fn parse(code: &str) -> Option<SensorKind> {
        match code {
            "EX" => Some(SensorKind::Extensometer),
            "TC" => Some(SensorKind::HydrostaticLevel),
            "IP" => Some(SensorKind::InvertedPlumbLine),
            _ => None,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A monitoring point installed on the dam.
///
/// Immutable once loaded; the catalog replaces the whole list on each
/// fresh fetch rather than patching individual points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorPoint {
    /// Unique point code (e.g. "EX-01").
    pub code: String,
    pub sensor_type: SensorKind,
    /// Installation elevation in meters.
    pub height: f64,
    pub install_date: NaiveDate,
    /// Dam section the point is anchored to.
    pub section: String,
    /// Raw status value from the API; see [`STATUS_ONLINE`].
    pub status: i32,
    pub updated_at: NaiveDateTime,
}

impl SensorPoint {
    /// Whether the point is currently reporting.
    pub fn is_online(&self) -> bool {
        self.status == STATUS_ONLINE
    }
}
