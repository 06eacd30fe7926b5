use gsmlink_messages::{GsmLinkStatus, LinkType, ModemType};

use crate::modem::hcsq::QueryResult;

/// Last-known link-status record plus when it was last refreshed.
#[derive(Debug, Clone)]
pub struct LinkStatusState {
    record: GsmLinkStatus,
    last_update_ms: Option<u64>,
}

impl LinkStatusState {
    pub fn new(modem_type: ModemType) -> Self {
        Self {
            record: GsmLinkStatus::unknown(modem_type),
            last_update_ms: None,
        }
    }

    /// Overwrite the record with one query's outcome. No smoothing: the
    /// previous record is fully replaced.
    pub fn apply(&mut self, result: &QueryResult, observed_ms: u64) {
        self.record.timestamp_ms = observed_ms as u32;
        self.record.link_type = link_type_for_tag(&result.network_tag);
        self.record.rssi = result.metrics[0];
        self.record.rsrp_rscp = result.metrics[1];
        self.record.sinr_ecio = result.metrics[2];
        self.record.rsrq = result.metrics[3];
        self.last_update_ms = Some(observed_ms);
    }

    pub fn record(&self) -> &GsmLinkStatus {
        &self.record
    }

    /// Unix time of the last successful refresh, if any.
    pub fn last_update_ms(&self) -> Option<u64> {
        self.last_update_ms
    }
}

/// Tags are matched exactly: the modem emits them in upper case, and anything
/// unrecognized must surface as [`LinkType::Unknown`] rather than being
/// guessed at.
fn link_type_for_tag(tag: &str) -> LinkType {
    match tag {
        "NOSERVICE" => LinkType::None,
        "GSM" => LinkType::TwoG,
        "WCDMA" | "TD-SCDMA" => LinkType::ThreeG,
        "LTE" => LinkType::FourG,
        _ => LinkType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsmlink_messages::METRIC_UNKNOWN;

    fn result(tag: &str, metrics: [u8; 4]) -> QueryResult {
        QueryResult {
            network_tag: tag.to_owned(),
            metrics,
        }
    }

    #[test]
    fn test_known_tags_map_exactly() {
        let cases = [
            ("NOSERVICE", LinkType::None),
            ("GSM", LinkType::TwoG),
            ("WCDMA", LinkType::ThreeG),
            ("TD-SCDMA", LinkType::ThreeG),
            ("LTE", LinkType::FourG),
        ];
        for (tag, expected) in cases {
            assert_eq!(link_type_for_tag(tag), expected, "tag {tag}");
        }
    }

    #[test]
    fn test_unrecognized_tags_map_to_unknown() {
        assert_eq!(link_type_for_tag("NR5G"), LinkType::Unknown);
        assert_eq!(link_type_for_tag(""), LinkType::Unknown);
        // Matching is case sensitive.
        assert_eq!(link_type_for_tag("lte"), LinkType::Unknown);
        assert_eq!(link_type_for_tag("NoService"), LinkType::Unknown);
    }

    #[test]
    fn test_apply_copies_metrics_positionally() {
        let mut state = LinkStatusState::new(ModemType::HuaweiE3372);
        state.apply(&result("LTE", [22, 80, 40, 15]), 5_000);

        let record = state.record();
        assert_eq!(record.timestamp_ms, 5_000);
        assert_eq!(record.link_type, LinkType::FourG);
        assert_eq!(record.rssi, 22);
        assert_eq!(record.rsrp_rscp, 80);
        assert_eq!(record.sinr_ecio, 40);
        assert_eq!(record.rsrq, 15);
        assert_eq!(state.last_update_ms(), Some(5_000));
    }

    #[test]
    fn test_apply_overwrites_previous_record() {
        let mut state = LinkStatusState::new(ModemType::HuaweiE3372);
        state.apply(&result("LTE", [22, 80, 40, 15]), 1_000);
        state.apply(&result("NOSERVICE", [METRIC_UNKNOWN; 4]), 2_000);

        let record = state.record();
        assert_eq!(record.link_type, LinkType::None);
        assert_eq!(record.rssi, METRIC_UNKNOWN);
        assert_eq!(record.timestamp_ms, 2_000);
    }

    #[test]
    fn test_fresh_state_reports_sentinels() {
        let state = LinkStatusState::new(ModemType::HuaweiE3372);
        assert_eq!(state.record().rssi, METRIC_UNKNOWN);
        assert_eq!(state.record().link_type, LinkType::Unknown);
        assert_eq!(state.last_update_ms(), None);
    }

    #[test]
    fn test_timestamp_truncates_to_u32() {
        let mut state = LinkStatusState::new(ModemType::HuaweiE3372);
        let now_ms = u32::MAX as u64 + 1_234;
        state.apply(&result("GSM", [5, 6, 7, 8]), now_ms);
        assert_eq!(state.record().timestamp_ms, 1_233);
        assert_eq!(state.last_update_ms(), Some(now_ms));
    }
}
