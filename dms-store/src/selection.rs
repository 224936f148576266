//! Current selection and kind filter.

use std::cell::{Cell, RefCell};

use dms_core::point::{SensorKind, SensorPoint};

/// Sensor-kind filter for the point list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Kind(SensorKind),
}

impl KindFilter {
    /// Whether a point passes this filter.
    pub fn matches(&self, point: &SensorPoint) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Kind(kind) => point.sensor_type == *kind,
        }
    }
}

/// Currently selected point and active kind filter.
///
/// Mutations are pure assignments: selecting a point never triggers a
/// fetch and never touches the cache. Callers decide what, if anything,
/// to request next.
#[derive(Debug, Default)]
pub struct SelectionState {
    selected: RefCell<Option<SensorPoint>>,
    filter: Cell<KindFilter>,
}

impl SelectionState {
    pub fn select_sensor(&self, point: Option<SensorPoint>) {
        *self.selected.borrow_mut() = point;
    }

    pub fn selected_sensor(&self) -> Option<SensorPoint> {
        self.selected.borrow().clone()
    }

    pub fn set_sensor_type(&self, filter: KindFilter) {
        self.filter.set(filter);
    }

    pub fn sensor_type(&self) -> KindFilter {
        self.filter.get()
    }
}
