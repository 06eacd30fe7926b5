use clap::Parser;
use color_eyre::eyre::Result;
use gsmlink_reportd::args::Args;

const SYSLOG_IDENTIFIER: &str = "gsmlink-reportd";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let telemetry = gsmlink_telemetry::TelemetryConfig::new()
        .with_journald(SYSLOG_IDENTIFIER)
        .init();

    let args = Args::parse();
    let result = gsmlink_reportd::run(&args).await;

    telemetry.flush().await;

    result
}
