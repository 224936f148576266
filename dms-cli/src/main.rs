//! DMS CLI - Command line tool for querying dam monitoring sensor data.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "dms-cli",
    version,
    about = "Dam monitoring sensor data toolkit"
)]
struct Cli {
    /// Base URL of the monitoring API
    #[arg(long, default_value = "http://localhost:3000/api")]
    base_url: String,

    /// Bearer token for authenticated endpoints (see the login command)
    #[arg(long)]
    token: Option<String>,

    #[command(subcommand)]
    command: dms_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    dms_cmd::run(cli.command, &cli.base_url, cli.token).await
}
