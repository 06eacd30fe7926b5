use std::sync::{Mutex, Weak};

use derive_more::Display;
use tracing::{debug, info, warn};

use gsmlink_messages::{encode_frame, ModemType};

use crate::link_status::LinkStatusState;
use crate::modem::{hcsq, ModemLink};
use crate::outputs::OutputLink;
use crate::settings::ReportSettings;

/// Fixed cadence of report cycles. Failed cycles retry at the same cadence,
/// there is no backoff.
pub const REPORT_INTERVAL_MS: u64 = 1_000;

/// Progress of the report cycle, for diagnostics.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No device configured.
    #[display("idle")]
    Idle,
    /// Device configured, serial handle not open yet.
    #[display("connecting")]
    Connecting,
    /// Handle open, queries flowing.
    #[display("active")]
    Active,
    /// Last open or query attempt failed.
    #[display("error")]
    Error,
}

/// Drives the periodic query/update/broadcast cycle over a modem link.
///
/// `tick` is meant to be called from a single host loop at a faster cadence
/// than [`REPORT_INTERVAL_MS`]; it gates itself and never takes down the
/// loop on failure.
pub struct Reporter<L> {
    link: L,
    settings: ReportSettings,
    status: LinkStatusState,
    outputs: Vec<Weak<Mutex<dyn OutputLink + Send>>>,
    state: LinkState,
    last_attempt_ms: Option<u64>,
}

impl<L: ModemLink> Reporter<L> {
    pub fn new(
        link: L,
        settings: ReportSettings,
        outputs: Vec<Weak<Mutex<dyn OutputLink + Send>>>,
    ) -> Self {
        Self {
            link,
            settings,
            status: LinkStatusState::new(ModemType::HuaweiE3372),
            outputs,
            state: LinkState::Idle,
            last_attempt_ms: None,
        }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ReportSettings {
        &mut self.settings
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn status(&self) -> &LinkStatusState {
        &self.status
    }

    /// One scheduler pass. Runs a report cycle when one is due, otherwise
    /// returns immediately. Failures are logged and retried at the next
    /// interval, never propagated.
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(last) = self.last_attempt_ms {
            if now_ms.saturating_sub(last) < REPORT_INTERVAL_MS {
                return;
            }
        }
        self.last_attempt_ms = Some(now_ms);

        let Some(device) = self.settings.gsm_dev.clone() else {
            if self.link.device().is_some() {
                self.link.close();
            }
            self.state = LinkState::Idle;
            return;
        };

        if self.link.device() != Some(device.as_str()) {
            self.state = LinkState::Connecting;
            if let Err(err) = self.link.configure(&device) {
                self.state = LinkState::Error;
                warn!("failed to open modem link on {device}: {err}");
                return;
            }
        }

        let result = match hcsq::query(&mut self.link) {
            Ok(result) => result,
            Err(err) => {
                self.state = LinkState::Error;
                warn!("signal query on {device} failed: {err}");
                return;
            }
        };

        self.state = LinkState::Active;
        self.status.apply(&result, now_ms);
        let record = *self.status.record();
        if self.settings.verbose {
            info!(
                link_type = %record.link_type,
                rssi = record.rssi,
                rsrp_rscp = record.rsrp_rscp,
                sinr_ecio = record.sinr_ecio,
                rsrq = record.rsrq,
                "link status"
            );
        } else {
            debug!(link_type = %record.link_type, rssi = record.rssi, "link status");
        }

        self.broadcast(&encode_frame(&record));
    }

    /// Write one frame to every live output. A failing or dropped link never
    /// keeps the others from receiving the frame.
    fn broadcast(&mut self, frame: &[u8]) {
        for output in &self.outputs {
            let Some(output) = output.upgrade() else {
                continue;
            };
            let mut output = match output.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Err(err) = output.write_frame(frame) {
                warn!("failed to write report to {}: {err}", output.label());
            }
        }
    }

    /// One-shot summary for the `status` console command.
    pub fn describe(&self, now_ms: u64) -> String {
        let device = self.settings.gsm_dev.as_deref().unwrap_or("none");
        let rssi = self.status.record().rssi;
        let age = match self.status.last_update_ms() {
            Some(last) => {
                format!("{:.3} s ago", now_ms.saturating_sub(last) as f64 / 1000.0)
            }
            None => "never".to_owned(),
        };
        format!(
            "querying modem on {device} ({state})\nrssi= {rssi} ({age})",
            state = self.state
        )
    }

    /// Release the modem link. Idempotent.
    pub fn close(&mut self) {
        self.link.close();
    }
}
