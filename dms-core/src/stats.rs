use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Server-derived aggregate over one point's full observation history.
///
/// Computed by the API, cached read-only on the client; there is no
/// client-side recomputation of these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorStats {
    pub sensor_code: String,
    pub first_observation: NaiveDateTime,
    pub last_observation: NaiveDateTime,
    pub total_records: u64,
    pub max_value: f64,
    pub min_value: f64,
    pub max_observation_time: NaiveDateTime,
    pub min_observation_time: NaiveDateTime,
}
