//! Command implementations for the DMS CLI.
//!
//! Provides subcommands for querying the dam monitoring API: the point
//! catalog, per-point aggregates, and windowed observation series with
//! optional CSV export.

use chrono::NaiveDate;
use clap::Subcommand;

use dms_core::window::ObservationWindow;

pub mod login;
pub mod query;

#[derive(Subcommand)]
pub enum Command {
    /// List monitoring points with an online/offline summary
    Points,

    /// Show server-side aggregates for one monitoring point
    Stats {
        /// Point code (e.g. EX-01)
        #[arg(short, long)]
        code: String,
    },

    /// Fetch an observation series for one monitoring point
    Query {
        /// Sensor kind: EX, TC, or IP
        #[arg(short, long)]
        kind: String,

        /// Point code (e.g. EX-01)
        #[arg(short, long)]
        code: String,

        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Maximum number of records to request
        #[arg(long)]
        limit: Option<u32>,

        /// Number of records to skip (paging)
        #[arg(long)]
        offset: Option<u32>,

        /// Output path for observations CSV (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Log in and print a session token
    Login {
        /// Treat the id as a phone number instead of a username
        #[arg(long)]
        phone: bool,

        /// Username or phone number
        #[arg(short, long)]
        id: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
}

pub async fn run(command: Command, base_url: &str, token: Option<String>) -> anyhow::Result<()> {
    match command {
        Command::Points => query::run_points(base_url, token).await,
        Command::Stats { code } => query::run_stats(base_url, token, &code).await,
        Command::Query {
            kind,
            code,
            start,
            end,
            limit,
            offset,
            output,
        } => {
            let window = ObservationWindow {
                start,
                end,
                limit,
                offset,
            };
            query::run_query(base_url, token, &kind, &code, window, output.as_deref()).await
        }
        Command::Login { phone, id, password } => {
            login::run_login(base_url, &id, &password, phone).await
        }
    }
}
