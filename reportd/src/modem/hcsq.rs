//! Huawei `^HCSQ` signal-quality query.
//!
//! The modem answers `AT^HCSQ?` with a line like `^HCSQ:"LTE",46,30,26,20`,
//! carrying up to four metrics whose meaning depends on the access
//! technology. Anything else on the channel (command echo, `OK`, unsolicited
//! notifications) is skipped.

use std::thread;
use std::time::Duration;

use tracing::debug;

use super::{ModemError, ModemLink, Result};
use gsmlink_messages::METRIC_UNKNOWN;

/// Query command sent to the modem.
pub const QUERY_CMD: &[u8] = b"AT^HCSQ?\r\n";
/// Prefix of the response line carrying the metrics.
pub const RESPONSE_PREFIX: &str = "^HCSQ:";
/// Pause between issuing the query and draining the response.
pub const SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Network tag and raw metrics from one `^HCSQ` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub network_tag: String,
    /// Always 4 slots; unreported ones hold [`METRIC_UNKNOWN`].
    pub metrics: [u8; 4],
}

/// Run one query cycle: send the command, wait the settle delay, then scan
/// the buffered lines for the `^HCSQ` response.
pub fn query(link: &mut impl ModemLink) -> Result<QueryResult> {
    link.write_all(QUERY_CMD)?;
    link.flush()?;
    thread::sleep(SETTLE_DELAY);

    while link.data_ready()? > 0 {
        let line = link.read_line()?;
        if let Some(result) = parse_response_line(&line) {
            debug!(?result, "parsed HCSQ response");
            return Ok(result);
        }
        debug!(line = line.trim_end(), "skipping non-HCSQ line");
    }
    Err(ModemError::NoResponse)
}

/// Parse one raw response line, terminator included. Returns `None` when the
/// line is not a well-formed `^HCSQ` response.
fn parse_response_line(line: &str) -> Option<QueryResult> {
    let rest = line.strip_prefix(RESPONSE_PREFIX)?;
    // The payload is followed by two terminator characters that are not part
    // of the last metric.
    let payload = rest.get(..rest.len().checked_sub(2)?)?;

    let (tag, metrics_csv) = match payload.split_once(',') {
        Some((tag, csv)) => (tag, csv),
        None => (payload, ""),
    };

    let mut metrics = [METRIC_UNKNOWN; 4];
    if !metrics_csv.trim().is_empty() {
        for (slot, value) in metrics.iter_mut().zip(metrics_csv.split(',')) {
            *slot = value.trim().parse().ok()?;
        }
    }
    Some(QueryResult {
        network_tag: tag.trim_matches('"').to_owned(),
        metrics,
    })
}
