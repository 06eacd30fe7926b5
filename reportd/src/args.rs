use clap::Parser;

/// Polls a Huawei LTE stick for signal quality over its AT serial channel and
/// broadcasts a binary link-status record to telemetry sinks at 1 Hz.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Serial device of the modem AT channel, e.g. /dev/ttyUSB0.
    /// When unset the daemon stays idle until one is set on the console.
    #[arg(long, env = "GSM_DEV")]
    pub gsm_dev: Option<String>,
    /// Log every broadcast record.
    #[arg(long)]
    pub verbose: bool,
    /// Telemetry sink in the form `udp:HOST:PORT`. May be given multiple
    /// times; every sink receives every record.
    #[arg(long = "out", value_name = "SPEC")]
    pub out: Vec<String>,
}
