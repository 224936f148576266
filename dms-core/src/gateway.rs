//! Remote data gateway contract.
//!
//! The observation layer only ever reads through this trait, so state
//! and tests stay independent of the HTTP transport. The reqwest-backed
//! implementation lives in [`crate::client`] behind the `api` feature.

use crate::error::Result;
use crate::observation::{ExtensometerRecord, HydrostaticRecord, InvertedPlumbRecord};
use crate::point::SensorPoint;
use crate::stats::SensorStats;
use crate::window::{ObservationQuery, ObservationWindow};

/// Read operations against the monitoring API.
///
/// Implementations must return record arrays ascending by `ob_time` and
/// must surface transport failures unchanged; retrying is not this
/// seam's job.
#[allow(async_fn_in_trait)]
pub trait ObservationGateway {
    /// Fetch the monitoring point catalog, optionally windowed.
    async fn get_points(&self, window: Option<&ObservationWindow>) -> Result<Vec<SensorPoint>>;

    /// Fetch server-side aggregates for one point.
    async fn get_stats(&self, code: &str) -> Result<SensorStats>;

    /// Fetch extensometer readings for one point.
    async fn get_extensometer(&self, query: &ObservationQuery)
        -> Result<Vec<ExtensometerRecord>>;

    /// Fetch hydrostatic-level readings for one point.
    async fn get_hydrostatic_level(
        &self,
        query: &ObservationQuery,
    ) -> Result<Vec<HydrostaticRecord>>;

    /// Fetch inverted plumb line readings for one point.
    async fn get_inverted_plumb_line(
        &self,
        query: &ObservationQuery,
    ) -> Result<Vec<InvertedPlumbRecord>>;
}
