//! Per-kind observation caches.
//!
//! Each sensor kind owns two independent series: a chart window (small,
//! query-driven) and a table window (larger, paging-driven). The two
//! share no data; mutating one never affects the other. Records are
//! stored exactly as the gateway returned them; the cache never
//! re-sorts and never deduplicates across fetches.

use std::cell::RefCell;

use dms_core::observation::{ExtensometerRecord, HydrostaticRecord, InvertedPlumbRecord};
use dms_core::point::SensorKind;

/// Kind-tagged record batch, as returned by one gateway read.
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    Extensometer(Vec<ExtensometerRecord>),
    HydrostaticLevel(Vec<HydrostaticRecord>),
    InvertedPlumbLine(Vec<InvertedPlumbRecord>),
}

impl Records {
    pub fn kind(&self) -> SensorKind {
        match self {
            Records::Extensometer(_) => SensorKind::Extensometer,
            Records::HydrostaticLevel(_) => SensorKind::HydrostaticLevel,
            Records::InvertedPlumbLine(_) => SensorKind::InvertedPlumbLine,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Records::Extensometer(records) => records.len(),
            Records::HydrostaticLevel(records) => records.len(),
            Records::InvertedPlumbLine(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One series per sensor kind.
///
/// A struct with one field per kind keeps kind coverage a compile-time
/// property: adding a kind fails to compile until every match below
/// handles it.
#[derive(Debug, Default)]
struct SeriesSet {
    extensometer: Vec<ExtensometerRecord>,
    hydrostatic_level: Vec<HydrostaticRecord>,
    inverted_plumb_line: Vec<InvertedPlumbRecord>,
}

impl SeriesSet {
    fn replace(&mut self, records: Records) {
        match records {
            Records::Extensometer(records) => self.extensometer = records,
            Records::HydrostaticLevel(records) => self.hydrostatic_level = records,
            Records::InvertedPlumbLine(records) => self.inverted_plumb_line = records,
        }
    }

    fn append(&mut self, records: Records) {
        match records {
            Records::Extensometer(records) => self.extensometer.extend(records),
            Records::HydrostaticLevel(records) => self.hydrostatic_level.extend(records),
            Records::InvertedPlumbLine(records) => self.inverted_plumb_line.extend(records),
        }
    }

    fn len_of(&self, kind: SensorKind) -> usize {
        match kind {
            SensorKind::Extensometer => self.extensometer.len(),
            SensorKind::HydrostaticLevel => self.hydrostatic_level.len(),
            SensorKind::InvertedPlumbLine => self.inverted_plumb_line.len(),
        }
    }
}

/// Chart and table windows for every sensor kind.
///
/// Buckets are created empty, populated and replaced by the fetch
/// coordinator, and cleared only by being replaced. Each mutation swaps
/// or extends one whole series under a short-lived borrow, so readers
/// never observe a half-written bucket.
#[derive(Debug, Default)]
pub struct ObservationCache {
    chart: RefCell<SeriesSet>,
    table: RefCell<SeriesSet>,
}

impl ObservationCache {
    /// `chart[k] := records`. Single-shot or re-filtered queries.
    pub fn replace(&self, records: Records) {
        self.chart.borrow_mut().replace(records);
    }

    /// `chart[k] := chart[k] ++ records`. Incremental "load more".
    ///
    /// Never deduplicates: appending an overlapping time window leaves
    /// duplicate entries in the bucket. Callers that need distinct
    /// records must filter on their side.
    pub fn append(&self, records: Records) {
        self.chart.borrow_mut().append(records);
    }

    /// Same stored-state semantics as [`replace`](Self::replace);
    /// distinguished only by caller intent (a page index changed, not a
    /// filter).
    pub fn page_replace(&self, records: Records) {
        self.replace(records);
    }

    /// `table[k] := records`, independent of the chart window.
    pub fn load_table(&self, records: Records) {
        self.table.borrow_mut().replace(records);
    }

    /// Number of chart records cached for `kind`.
    pub fn chart_len(&self, kind: SensorKind) -> usize {
        self.chart.borrow().len_of(kind)
    }

    /// Number of table records cached for `kind`.
    pub fn table_len(&self, kind: SensorKind) -> usize {
        self.table.borrow().len_of(kind)
    }

    pub fn chart_extensometer(&self) -> Vec<ExtensometerRecord> {
        self.chart.borrow().extensometer.clone()
    }

    pub fn chart_hydrostatic_level(&self) -> Vec<HydrostaticRecord> {
        self.chart.borrow().hydrostatic_level.clone()
    }

    pub fn chart_inverted_plumb_line(&self) -> Vec<InvertedPlumbRecord> {
        self.chart.borrow().inverted_plumb_line.clone()
    }

    pub fn table_extensometer(&self) -> Vec<ExtensometerRecord> {
        self.table.borrow().extensometer.clone()
    }

    pub fn table_hydrostatic_level(&self) -> Vec<HydrostaticRecord> {
        self.table.borrow().hydrostatic_level.clone()
    }

    pub fn table_inverted_plumb_line(&self) -> Vec<InvertedPlumbRecord> {
        self.table.borrow().inverted_plumb_line.clone()
    }
}
