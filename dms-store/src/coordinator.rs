//! Fetch coordination: the four fetch modes, per-kind loading flags,
//! and the dispatch from sensor kind to gateway operation and cache
//! bucket.

use std::cell::Cell;
use std::rc::Rc;

use log::info;

use dms_core::error::{DmsError, Result};
use dms_core::gateway::ObservationGateway;
use dms_core::point::SensorKind;
use dms_core::window::{ObservationQuery, ObservationWindow};

use crate::cache::Records;
use crate::SensorStore;

/// How a fetched batch is applied to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// `chart[k] := records`, for single-shot or re-filtered queries.
    Replace,
    /// `chart[k] := chart[k] ++ records`, for incremental "load more".
    Append,
    /// Replace driven by a page change; stored state identical to
    /// [`Replace`](Self::Replace).
    PageReplace,
    /// `table[k] := records`, for the paged tabular view.
    LoadTable,
}

/// One loading flag per sensor kind.
#[derive(Debug, Default)]
pub(crate) struct LoadingFlags {
    extensometer: Rc<Cell<bool>>,
    hydrostatic_level: Rc<Cell<bool>>,
    inverted_plumb_line: Rc<Cell<bool>>,
}

impl LoadingFlags {
    fn flag(&self, kind: SensorKind) -> Rc<Cell<bool>> {
        match kind {
            SensorKind::Extensometer => Rc::clone(&self.extensometer),
            SensorKind::HydrostaticLevel => Rc::clone(&self.hydrostatic_level),
            SensorKind::InvertedPlumbLine => Rc::clone(&self.inverted_plumb_line),
        }
    }

    pub(crate) fn is_loading(&self, kind: SensorKind) -> bool {
        self.flag(kind).get()
    }
}

/// Sets the flag on construction and clears it on drop, so the flag is
/// reset on every exit path out of a fetch, resolved or rejected.
struct LoadingGuard(Rc<Cell<bool>>);

impl LoadingGuard {
    fn engage(flag: Rc<Cell<bool>>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<G: ObservationGateway> SensorStore<G> {
    /// Load the full point catalog, replacing the previous list.
    ///
    /// Idempotent; on failure the previous list is untouched and the
    /// error propagates to the caller.
    pub async fn load_points(&self) -> Result<()> {
        let _guard = LoadingGuard::engage(Rc::clone(&self.points_loading));
        let points = self.gateway.get_points(None).await?;
        info!("catalog: loaded {} points", points.len());
        self.catalog().replace_all(points);
        Ok(())
    }

    /// Fetch server-side aggregates for one point.
    pub async fn fetch_stats(&self, code: &str) -> Result<()> {
        if code.trim().is_empty() {
            return Err(DmsError::EmptyPointCode);
        }
        let _guard = LoadingGuard::engage(Rc::clone(&self.stats_loading));
        let stats = self.gateway.get_stats(code).await?;
        self.stats.replace(Some(stats));
        Ok(())
    }

    /// Fetch one observation series and apply it to the cache.
    ///
    /// The request is validated before anything goes over the wire: a
    /// malformed window or empty point code issues no request and
    /// leaves the loading flag untouched. Otherwise the per-kind
    /// loading flag is set for the duration of the call and cleared on
    /// every exit path; errors propagate to the caller, and the
    /// coordinator itself never retries.
    ///
    /// There is no request fencing or cancellation: when two fetches
    /// for the same kind and bucket overlap, both complete and
    /// whichever settles last owns the bucket, regardless of issue
    /// order.
    pub async fn fetch(
        &self,
        mode: FetchMode,
        kind: SensorKind,
        point_code: &str,
        window: ObservationWindow,
    ) -> Result<()> {
        let query = ObservationQuery::new(point_code, window);
        query.validate()?;

        let _guard = LoadingGuard::engage(self.data_loading.flag(kind));
        let records = match kind {
            SensorKind::Extensometer => {
                Records::Extensometer(self.gateway.get_extensometer(&query).await?)
            }
            SensorKind::HydrostaticLevel => {
                Records::HydrostaticLevel(self.gateway.get_hydrostatic_level(&query).await?)
            }
            SensorKind::InvertedPlumbLine => {
                Records::InvertedPlumbLine(self.gateway.get_inverted_plumb_line(&query).await?)
            }
        };
        info!(
            "fetch: {} {} records for {}",
            records.len(),
            records.kind(),
            point_code
        );

        match mode {
            FetchMode::Replace => self.cache().replace(records),
            FetchMode::Append => self.cache().append(records),
            FetchMode::PageReplace => self.cache().page_replace(records),
            FetchMode::LoadTable => self.cache().load_table(records),
        }
        Ok(())
    }

    /// [`fetch`](Self::fetch) with [`FetchMode::Replace`].
    pub async fn fetch_data(
        &self,
        kind: SensorKind,
        point_code: &str,
        window: ObservationWindow,
    ) -> Result<()> {
        self.fetch(FetchMode::Replace, kind, point_code, window).await
    }

    /// [`fetch`](Self::fetch) with [`FetchMode::Append`].
    pub async fn fetch_more_data(
        &self,
        kind: SensorKind,
        point_code: &str,
        window: ObservationWindow,
    ) -> Result<()> {
        self.fetch(FetchMode::Append, kind, point_code, window).await
    }

    /// [`fetch`](Self::fetch) with [`FetchMode::PageReplace`].
    pub async fn fetch_page(
        &self,
        kind: SensorKind,
        point_code: &str,
        window: ObservationWindow,
    ) -> Result<()> {
        self.fetch(FetchMode::PageReplace, kind, point_code, window)
            .await
    }

    /// [`fetch`](Self::fetch) with [`FetchMode::LoadTable`].
    pub async fn fetch_table(
        &self,
        kind: SensorKind,
        point_code: &str,
        window: ObservationWindow,
    ) -> Result<()> {
        self.fetch(FetchMode::LoadTable, kind, point_code, window)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use chrono::NaiveDate;
    use tokio::sync::oneshot;

    use dms_core::observation::{ExtensometerRecord, HydrostaticRecord, InvertedPlumbRecord};
    use dms_core::point::SensorPoint;
    use dms_core::stats::SensorStats;

    fn point(code: &str, kind: SensorKind, status: i32) -> SensorPoint {
        SensorPoint {
            code: code.to_string(),
            sensor_type: kind,
            height: 150.0,
            install_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            section: "S1".to_string(),
            status,
            updated_at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    fn ex(month: u32, day: u32, value: f64) -> ExtensometerRecord {
        ExtensometerRecord {
            sensor_code: "EX-01".to_string(),
            ob_time: NaiveDate::from_ymd_opt(2024, month, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            reservoir_level: None,
            value,
        }
    }

    fn tc(month: u32, day: u32, value: f64) -> HydrostaticRecord {
        HydrostaticRecord {
            sensor_code: "TC-02".to_string(),
            ob_time: NaiveDate::from_ymd_opt(2024, month, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            value,
        }
    }

    fn january() -> ObservationWindow {
        ObservationWindow::range(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    fn february() -> ObservationWindow {
        ObservationWindow::range(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        )
    }

    /// Gateway answering every read from pre-scripted response queues.
    #[derive(Default)]
    struct ScriptedGateway {
        points: RefCell<VecDeque<Result<Vec<SensorPoint>>>>,
        stats: RefCell<VecDeque<Result<SensorStats>>>,
        extensometer: RefCell<VecDeque<Result<Vec<ExtensometerRecord>>>>,
        hydrostatic: RefCell<VecDeque<Result<Vec<HydrostaticRecord>>>>,
        calls: Cell<usize>,
    }

    impl ObservationGateway for ScriptedGateway {
        async fn get_points(
            &self,
            _window: Option<&ObservationWindow>,
        ) -> Result<Vec<SensorPoint>> {
            self.calls.set(self.calls.get() + 1);
            self.points
                .borrow_mut()
                .pop_front()
                .expect("no scripted points response")
        }

        async fn get_stats(&self, _code: &str) -> Result<SensorStats> {
            self.calls.set(self.calls.get() + 1);
            self.stats
                .borrow_mut()
                .pop_front()
                .expect("no scripted stats response")
        }

        async fn get_extensometer(
            &self,
            _query: &ObservationQuery,
        ) -> Result<Vec<ExtensometerRecord>> {
            self.calls.set(self.calls.get() + 1);
            self.extensometer
                .borrow_mut()
                .pop_front()
                .expect("no scripted extensometer response")
        }

        async fn get_hydrostatic_level(
            &self,
            _query: &ObservationQuery,
        ) -> Result<Vec<HydrostaticRecord>> {
            self.calls.set(self.calls.get() + 1);
            self.hydrostatic
                .borrow_mut()
                .pop_front()
                .expect("no scripted hydrostatic response")
        }

        async fn get_inverted_plumb_line(
            &self,
            _query: &ObservationQuery,
        ) -> Result<Vec<InvertedPlumbRecord>> {
            self.calls.set(self.calls.get() + 1);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn load_points_replaces_catalog_and_failure_keeps_previous() {
        let gateway = ScriptedGateway::default();
        gateway.points.borrow_mut().push_back(Ok(vec![
            point("EX-01", SensorKind::Extensometer, 1),
            point("TC-01", SensorKind::HydrostaticLevel, 0),
        ]));
        gateway
            .points
            .borrow_mut()
            .push_back(Err(DmsError::Status { status: 500 }));

        let store = SensorStore::new(gateway);
        store.load_points().await.unwrap();
        assert_eq!(store.catalog().total(), 2);
        assert!(!store.points_loading());

        let result = store.load_points().await;
        assert!(result.is_err());
        // Previous list untouched by the failed fetch.
        assert_eq!(store.catalog().total(), 2);
        assert!(!store.points_loading());
    }

    #[tokio::test]
    async fn overlapping_append_keeps_duplicates() {
        let gateway = ScriptedGateway::default();
        gateway.extensometer.borrow_mut().push_back(Ok(vec![
            ex(1, 5, 1.0),
            ex(1, 10, 1.1),
            ex(1, 15, 1.2),
            ex(1, 20, 1.3),
            ex(1, 25, 1.4),
        ]));
        // Overlapping window: the first two records duplicate the
        // previous response.
        gateway.extensometer.borrow_mut().push_back(Ok(vec![
            ex(1, 20, 1.3),
            ex(1, 25, 1.4),
            ex(2, 1, 1.5),
            ex(2, 5, 1.6),
            ex(2, 10, 1.7),
        ]));

        let store = SensorStore::new(gateway);
        store
            .fetch_data(SensorKind::Extensometer, "EX-01", january())
            .await
            .unwrap();
        assert_eq!(store.cache().chart_len(SensorKind::Extensometer), 5);

        store
            .fetch_more_data(
                SensorKind::Extensometer,
                "EX-01",
                ObservationWindow::range(
                    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                    NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
                ),
            )
            .await
            .unwrap();
        // 10, not 8: duplicates are preserved, never merged.
        assert_eq!(store.cache().chart_len(SensorKind::Extensometer), 10);
    }

    #[tokio::test]
    async fn loading_flag_clears_after_success_and_failure() {
        let gateway = ScriptedGateway::default();
        gateway
            .hydrostatic
            .borrow_mut()
            .push_back(Ok(vec![tc(1, 5, 3.0)]));
        gateway
            .hydrostatic
            .borrow_mut()
            .push_back(Err(DmsError::Status { status: 502 }));

        let store = SensorStore::new(gateway);
        assert!(!store.is_loading(SensorKind::HydrostaticLevel));

        store
            .fetch_data(SensorKind::HydrostaticLevel, "TC-02", january())
            .await
            .unwrap();
        assert!(!store.is_loading(SensorKind::HydrostaticLevel));

        let result = store
            .fetch_data(SensorKind::HydrostaticLevel, "TC-02", february())
            .await;
        assert!(matches!(result, Err(DmsError::Status { status: 502 })));
        // Cleared on the error path too, and the bucket kept the
        // last successful batch.
        assert!(!store.is_loading(SensorKind::HydrostaticLevel));
        assert_eq!(store.cache().chart_len(SensorKind::HydrostaticLevel), 1);
    }

    #[tokio::test]
    async fn validation_fails_fast_without_issuing_a_request() {
        let store = SensorStore::new(ScriptedGateway::default());

        let result = store
            .fetch_data(SensorKind::Extensometer, "", january())
            .await;
        assert!(matches!(result, Err(DmsError::EmptyPointCode)));

        let result = store
            .fetch_data(
                SensorKind::Extensometer,
                "EX-01",
                ObservationWindow::page(0, 10),
            )
            .await;
        assert!(matches!(result, Err(DmsError::ZeroLimit)));

        let result = store
            .fetch_data(
                SensorKind::Extensometer,
                "EX-01",
                ObservationWindow::range(
                    NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                ),
            )
            .await;
        assert!(matches!(result, Err(DmsError::InvalidWindow(_))));

        assert_eq!(store.gateway.calls.get(), 0);
        assert!(!store.is_loading(SensorKind::Extensometer));
    }

    #[tokio::test]
    async fn load_table_does_not_touch_other_kinds_or_chart() {
        let gateway = ScriptedGateway::default();
        gateway
            .extensometer
            .borrow_mut()
            .push_back(Ok(vec![ex(1, 5, 1.0)]));
        gateway
            .hydrostatic
            .borrow_mut()
            .push_back(Ok(vec![tc(1, 5, 3.0), tc(1, 6, 3.1)]));

        let store = SensorStore::new(gateway);
        store
            .fetch_data(SensorKind::Extensometer, "EX-01", january())
            .await
            .unwrap();
        store
            .fetch_table(
                SensorKind::HydrostaticLevel,
                "TC-02",
                ObservationWindow::page(50, 0),
            )
            .await
            .unwrap();

        assert_eq!(store.cache().chart_len(SensorKind::Extensometer), 1);
        assert_eq!(store.cache().table_len(SensorKind::Extensometer), 0);
        assert_eq!(store.cache().chart_len(SensorKind::HydrostaticLevel), 0);
        assert_eq!(store.cache().table_len(SensorKind::HydrostaticLevel), 2);
    }

    #[tokio::test]
    async fn fetch_stats_caches_aggregates_and_rejects_empty_code() {
        let gateway = ScriptedGateway::default();
        gateway.stats.borrow_mut().push_back(Ok(SensorStats {
            sensor_code: "EX-01".to_string(),
            first_observation: NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            last_observation: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            total_records: 1520,
            max_value: 2.4,
            min_value: -0.3,
            max_observation_time: NaiveDate::from_ymd_opt(2023, 7, 14)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            min_observation_time: NaiveDate::from_ymd_opt(2021, 2, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }));

        let store = SensorStore::new(gateway);
        let result = store.fetch_stats("  ").await;
        assert!(matches!(result, Err(DmsError::EmptyPointCode)));
        assert_eq!(store.gateway.calls.get(), 0);

        store.fetch_stats("EX-01").await.unwrap();
        assert_eq!(store.stats().unwrap().total_records, 1520);
        assert!(!store.stats_loading());
    }

    /// Gateway whose responses resolve only when the test says so,
    /// for pinning down in-flight ordering.
    struct PendingGateway {
        hydrostatic: RefCell<VecDeque<oneshot::Receiver<Vec<HydrostaticRecord>>>>,
    }

    impl ObservationGateway for PendingGateway {
        async fn get_points(
            &self,
            _window: Option<&ObservationWindow>,
        ) -> Result<Vec<SensorPoint>> {
            unimplemented!("not used in this test")
        }

        async fn get_stats(&self, _code: &str) -> Result<SensorStats> {
            unimplemented!("not used in this test")
        }

        async fn get_extensometer(
            &self,
            _query: &ObservationQuery,
        ) -> Result<Vec<ExtensometerRecord>> {
            unimplemented!("not used in this test")
        }

        async fn get_hydrostatic_level(
            &self,
            _query: &ObservationQuery,
        ) -> Result<Vec<HydrostaticRecord>> {
            let rx = self
                .hydrostatic
                .borrow_mut()
                .pop_front()
                .expect("unexpected fetch");
            Ok(rx.await.expect("response channel dropped"))
        }

        async fn get_inverted_plumb_line(
            &self,
            _query: &ObservationQuery,
        ) -> Result<Vec<InvertedPlumbRecord>> {
            unimplemented!("not used in this test")
        }
    }

    /// Fetch A issued first, fetch B issued second, A settles last:
    /// the bucket ends up holding A's result. There is no fencing;
    /// last settled wins, irrespective of issue order.
    #[tokio::test]
    async fn later_settling_fetch_wins() {
        let (tx_a, rx_a) = oneshot::channel();
        let (tx_b, rx_b) = oneshot::channel();
        let gateway = PendingGateway {
            hydrostatic: RefCell::new(VecDeque::from([rx_a, rx_b])),
        };
        let store = SensorStore::new(gateway);

        let january_records = vec![tc(1, 5, 3.1), tc(1, 6, 3.2)];
        let february_records = vec![tc(2, 5, 4.1)];

        let fetch_a = store.fetch_data(SensorKind::HydrostaticLevel, "TC-02", january());
        let fetch_b = store.fetch_data(SensorKind::HydrostaticLevel, "TC-02", february());
        let drive = async {
            tokio::task::yield_now().await;
            assert!(store.is_loading(SensorKind::HydrostaticLevel));
            tx_b.send(february_records.clone()).unwrap();
            tokio::task::yield_now().await;
            tx_a.send(january_records.clone()).unwrap();
        };

        let (result_a, result_b, _) = tokio::join!(fetch_a, fetch_b, drive);
        result_a.unwrap();
        result_b.unwrap();

        assert_eq!(store.cache().chart_hydrostatic_level(), january_records);
        assert!(!store.is_loading(SensorKind::HydrostaticLevel));
    }
}
