//! Query implementations: catalog, per-point aggregates, and windowed
//! observation series.

use std::rc::Rc;

use anyhow::Context;
use chrono::NaiveDateTime;
use log::info;

use dms_core::auth::TokenStore;
use dms_core::client::HttpGateway;
use dms_core::point::SensorKind;
use dms_core::window::ObservationWindow;
use dms_session::MemoryTokenStore;
use dms_store::SensorStore;

/// Timestamp format for printed and exported observations.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn store_for(base_url: &str, token: Option<String>) -> SensorStore<HttpGateway> {
    let tokens = Rc::new(MemoryTokenStore::default());
    if let Some(token) = token {
        tokens.set_token(&token);
    }
    SensorStore::new(HttpGateway::new(base_url, tokens as Rc<dyn TokenStore>))
}

/// Fetch the catalog and print the derived summary plus every point,
/// grouped by kind.
pub async fn run_points(base_url: &str, token: Option<String>) -> anyhow::Result<()> {
    let store = store_for(base_url, token);
    store.load_points().await?;

    let catalog = store.catalog();
    println!(
        "{} points ({} online, {} offline)",
        catalog.total(),
        catalog.online_count(),
        catalog.offline_count()
    );
    for kind in SensorKind::ALL {
        let points = catalog.points_of_kind(kind);
        if points.is_empty() {
            continue;
        }
        println!("\n{} ({}):", kind, points.len());
        for point in points {
            println!(
                "  {:<10} section {:<4} height {:>8.2}m  {}",
                point.code,
                point.section,
                point.height,
                if point.is_online() { "online" } else { "offline" }
            );
        }
    }
    Ok(())
}

/// Fetch and print server-side aggregates for one point.
pub async fn run_stats(base_url: &str, token: Option<String>, code: &str) -> anyhow::Result<()> {
    let store = store_for(base_url, token);
    store.fetch_stats(code).await?;
    let stats = store.stats().context("no stats cached after fetch")?;

    println!("{}", stats.sensor_code);
    println!("  records : {}", stats.total_records);
    println!(
        "  span    : {} .. {}",
        stats.first_observation.format(TIME_FORMAT),
        stats.last_observation.format(TIME_FORMAT)
    );
    println!(
        "  max     : {} at {}",
        stats.max_value,
        stats.max_observation_time.format(TIME_FORMAT)
    );
    println!(
        "  min     : {} at {}",
        stats.min_value,
        stats.min_observation_time.format(TIME_FORMAT)
    );
    Ok(())
}

/// Fetch one observation series into the chart window and print it or
/// export it as CSV.
pub async fn run_query(
    base_url: &str,
    token: Option<String>,
    kind: &str,
    code: &str,
    window: ObservationWindow,
    output: Option<&str>,
) -> anyhow::Result<()> {
    let kind = SensorKind::parse(kind)
        .with_context(|| format!("unknown sensor kind '{kind}', expected EX, TC, or IP"))?;

    let store = store_for(base_url, token);
    store.fetch_data(kind, code, window).await?;
    info!(
        "query: {} records cached for {}",
        store.cache().chart_len(kind),
        code
    );

    match output {
        Some(path) => {
            let written = export_csv(path, &store, kind)?;
            println!("Wrote {written} records to {path}");
        }
        None => print_series(&store, kind),
    }
    Ok(())
}

fn format_time(time: NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn format_level(level: Option<f64>) -> String {
    level.map(|v| v.to_string()).unwrap_or_default()
}

fn print_series(store: &SensorStore<HttpGateway>, kind: SensorKind) {
    match kind {
        SensorKind::Extensometer => {
            for r in store.cache().chart_extensometer() {
                println!(
                    "{}  {}  level={:<8} value={}",
                    r.sensor_code,
                    format_time(r.ob_time),
                    format_level(r.reservoir_level),
                    r.value
                );
            }
        }
        SensorKind::HydrostaticLevel => {
            for r in store.cache().chart_hydrostatic_level() {
                println!("{}  {}  value={}", r.sensor_code, format_time(r.ob_time), r.value);
            }
        }
        SensorKind::InvertedPlumbLine => {
            for r in store.cache().chart_inverted_plumb_line() {
                println!(
                    "{}  {}  level={:<8} lr={} ud={}",
                    r.sensor_code,
                    format_time(r.ob_time),
                    format_level(r.reservoir_level),
                    r.lr_value,
                    r.ud_value
                );
            }
        }
    }
}

/// Write the cached chart series for `kind` to a CSV file, returning
/// the number of records written.
fn export_csv(
    path: &str,
    store: &SensorStore<HttpGateway>,
    kind: SensorKind,
) -> anyhow::Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    let written = match kind {
        SensorKind::Extensometer => {
            writer.write_record(["sensor_code", "ob_time", "reservoir_level", "value"])?;
            let records = store.cache().chart_extensometer();
            for r in &records {
                let time = format_time(r.ob_time);
                let level = format_level(r.reservoir_level);
                let value = r.value.to_string();
                writer.write_record([
                    r.sensor_code.as_str(),
                    time.as_str(),
                    level.as_str(),
                    value.as_str(),
                ])?;
            }
            records.len()
        }
        SensorKind::HydrostaticLevel => {
            writer.write_record(["sensor_code", "ob_time", "value"])?;
            let records = store.cache().chart_hydrostatic_level();
            for r in &records {
                let time = format_time(r.ob_time);
                let value = r.value.to_string();
                writer.write_record([r.sensor_code.as_str(), time.as_str(), value.as_str()])?;
            }
            records.len()
        }
        SensorKind::InvertedPlumbLine => {
            writer.write_record([
                "sensor_code",
                "ob_time",
                "reservoir_level",
                "lr_value",
                "ud_value",
            ])?;
            let records = store.cache().chart_inverted_plumb_line();
            for r in &records {
                let time = format_time(r.ob_time);
                let level = format_level(r.reservoir_level);
                let lr = r.lr_value.to_string();
                let ud = r.ud_value.to_string();
                writer.write_record([
                    r.sensor_code.as_str(),
                    time.as_str(),
                    level.as_str(),
                    lr.as_str(),
                    ud.as_str(),
                ])?;
            }
            records.len()
        }
    };
    writer.flush()?;
    Ok(written)
}
