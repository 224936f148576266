//! Monitoring point catalog with derived counts.

use std::cell::RefCell;

use dms_core::point::{SensorKind, SensorPoint};

/// The full list of monitoring points.
///
/// Replaced wholesale by each catalog fetch; there is no incremental
/// catalog update. Derived views are recomputed from the current list
/// on every read, so they can never go stale independently of it.
#[derive(Debug, Default)]
pub struct SensorCatalog {
    points: RefCell<Vec<SensorPoint>>,
}

impl SensorCatalog {
    /// Swap in a freshly fetched list. Atomic from an observer's view:
    /// readers see either the old list or the new one, never a mix.
    pub(crate) fn replace_all(&self, points: Vec<SensorPoint>) {
        *self.points.borrow_mut() = points;
    }

    /// Snapshot of the current list.
    pub fn all(&self) -> Vec<SensorPoint> {
        self.points.borrow().clone()
    }

    pub fn total(&self) -> usize {
        self.points.borrow().len()
    }

    /// Points with status 1.
    pub fn online_count(&self) -> usize {
        self.points.borrow().iter().filter(|p| p.is_online()).count()
    }

    /// Points with any status other than 1.
    pub fn offline_count(&self) -> usize {
        self.points.borrow().iter().filter(|p| !p.is_online()).count()
    }

    /// Points of one kind, in catalog order.
    pub fn points_of_kind(&self, kind: SensorKind) -> Vec<SensorPoint> {
        self.points
            .borrow()
            .iter()
            .filter(|p| p.sensor_type == kind)
            .cloned()
            .collect()
    }

    /// Look up one point by its unique code.
    pub fn find(&self, code: &str) -> Option<SensorPoint> {
        self.points.borrow().iter().find(|p| p.code == code).cloned()
    }
}
