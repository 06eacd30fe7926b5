pub mod args;
pub mod command;
pub mod link_status;
pub mod modem;
pub mod outputs;
pub mod scheduler;
pub mod settings;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use color_eyre::eyre::{Result, WrapErr};
use futures::StreamExt;
use tokio::signal::unix::{self, SignalKind};
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{info, warn};

use crate::args::Args;
use crate::modem::{ModemLink, SerialModemLink};
use crate::outputs::{open_output, SharedOutputLink};
use crate::scheduler::Reporter;
use crate::settings::ReportSettings;

/// Cadence at which the host loop wakes to run due work. The report cycle
/// itself gates on [`scheduler::REPORT_INTERVAL_MS`].
const POLL_PERIOD: Duration = Duration::from_millis(100);

pub async fn run(args: &Args) -> Result<()> {
    info!("starting gsmlink-reportd: {args:?}");

    let mut outputs = Vec::new();
    for spec in &args.out {
        let output = open_output(spec)
            .wrap_err_with(|| format!("failed to open output link `{spec}`"))?;
        outputs.push(output);
    }

    let settings = ReportSettings {
        verbose: args.verbose,
        gsm_dev: args.gsm_dev.clone(),
    };

    program()
        .link(SerialModemLink::new())
        .settings(settings)
        .outputs(outputs)
        .run()
        .await
}

#[bon::builder(finish_fn = run)]
async fn program(
    link: impl ModemLink,
    settings: ReportSettings,
    outputs: Vec<SharedOutputLink>,
) -> Result<()> {
    let weak_outputs = outputs.iter().map(Arc::downgrade).collect();
    let mut reporter = Reporter::new(link, settings, weak_outputs);

    let mut poll = tokio::time::interval(POLL_PERIOD);
    let mut sigterm = unix::signal(SignalKind::terminate())?;
    let mut sigint = unix::signal(SignalKind::interrupt())?;

    // Line-oriented command console on stdin. Reaching EOF stops the console
    // but not the daemon, which may be running with stdin closed.
    let mut console = FramedRead::new(tokio::io::stdin(), LinesCodec::new());
    let mut console_open = true;

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                warn!("received SIGTERM");
                break;
            }
            _ = sigint.recv() => {
                warn!("received SIGINT");
                break;
            }
            line = console.next(), if console_open => match line {
                Some(Ok(line)) => {
                    let reply =
                        command::handle(&mut reporter, unix_time_ms(), &line);
                    if !reply.is_empty() {
                        println!("{reply}");
                    }
                }
                Some(Err(err)) => warn!("failed to read console input: {err}"),
                None => console_open = false,
            },
            _ = poll.tick() => reporter.tick(unix_time_ms()),
        }
    }

    info!("shutting down");
    reporter.close();

    Ok(())
}

/// Milliseconds since the unix epoch, the timebase of broadcast records.
fn unix_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
