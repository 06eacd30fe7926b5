//! Cellular link-status record and its wire encoding.
//!
//! A report frame is `magic (2B) + size (2B, LE) + payload`, where the payload
//! is the fixed 10-byte record:
//!
//! ```text
//! offset  size  field
//!      0     4  timestamp_ms (LE)
//!      4     1  modem_type
//!      5     1  link_type
//!      6     1  rssi
//!      7     1  rsrp_rscp
//!      8     1  sinr_ecio
//!      9     1  rsrq
//! ```
//!
//! Signal metrics use [`METRIC_UNKNOWN`] when the modem did not report them.

use bytes::{Buf, BufMut};
use derive_more::Display;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive as _;

/// Frame magic, `"GL"` in ASCII.
pub const FRAME_MAGIC: [u8; 2] = [0x47, 0x4c];
/// Bytes preceding the payload: magic + LE payload size.
pub const FRAME_HEADER_LEN: usize = 4;
/// Encoded size of [`GsmLinkStatus`].
pub const STATUS_PAYLOAD_LEN: usize = 10;

/// Sentinel for a signal metric the modem did not report.
pub const METRIC_UNKNOWN: u8 = 255;

/// Radio access technology classification for downstream consumers.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
pub enum LinkType {
    #[display("NONE")]
    None = 0,
    #[display("UNKNOWN")]
    Unknown = 1,
    #[display("2G")]
    TwoG = 2,
    #[display("3G")]
    ThreeG = 3,
    #[display("4G")]
    FourG = 4,
}

/// Modem model a record was sourced from.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
pub enum ModemType {
    #[display("unknown")]
    Unknown = 0,
    #[display("huawei-e3372")]
    HuaweiE3372 = 1,
}

/// Last-known cellular link status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GsmLinkStatus {
    /// Unix time of the observation in milliseconds, truncated to 32 bits.
    pub timestamp_ms: u32,
    pub modem_type: ModemType,
    pub link_type: LinkType,
    /// Received signal strength indication.
    pub rssi: u8,
    /// RSRP on LTE, RSCP on WCDMA.
    pub rsrp_rscp: u8,
    /// SINR on LTE, Ec/Io on WCDMA.
    pub sinr_ecio: u8,
    /// Reference signal received quality, LTE only.
    pub rsrq: u8,
}

impl GsmLinkStatus {
    /// Record with no observation yet: zero timestamp, no link, all metrics
    /// at [`METRIC_UNKNOWN`].
    pub fn unknown(modem_type: ModemType) -> Self {
        Self {
            timestamp_ms: 0,
            modem_type,
            link_type: LinkType::Unknown,
            rssi: METRIC_UNKNOWN,
            rsrp_rscp: METRIC_UNKNOWN,
            sinr_ecio: METRIC_UNKNOWN,
            rsrq: METRIC_UNKNOWN,
        }
    }

    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.timestamp_ms);
        buf.put_u8(self.modem_type as u8);
        buf.put_u8(self.link_type as u8);
        buf.put_u8(self.rssi);
        buf.put_u8(self.rsrp_rscp);
        buf.put_u8(self.sinr_ecio);
        buf.put_u8(self.rsrq);
    }

    pub fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        if buf.remaining() < STATUS_PAYLOAD_LEN {
            return Err(DecodeError::Truncated(buf.remaining()));
        }
        let timestamp_ms = buf.get_u32_le();
        let modem_type = buf.get_u8();
        let modem_type = ModemType::from_u8(modem_type)
            .ok_or(DecodeError::UnknownModemType(modem_type))?;
        let link_type = buf.get_u8();
        let link_type = LinkType::from_u8(link_type)
            .ok_or(DecodeError::UnknownLinkType(link_type))?;
        Ok(Self {
            timestamp_ms,
            modem_type,
            link_type,
            rssi: buf.get_u8(),
            rsrp_rscp: buf.get_u8(),
            sinr_ecio: buf.get_u8(),
            rsrq: buf.get_u8(),
        })
    }
}

/// Encode `status` as a complete frame ready to hand to a transport.
pub fn encode_frame(status: &GsmLinkStatus) -> Vec<u8> {
    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + STATUS_PAYLOAD_LEN);
    frame.put_slice(&FRAME_MAGIC);
    frame.put_u16_le(STATUS_PAYLOAD_LEN as u16);
    status.encode(&mut frame);
    frame
}

/// Decode a frame produced by [`encode_frame`].
pub fn decode_frame(mut buf: &[u8]) -> Result<GsmLinkStatus, DecodeError> {
    if buf.remaining() < FRAME_HEADER_LEN {
        return Err(DecodeError::Truncated(buf.remaining()));
    }
    let magic = [buf.get_u8(), buf.get_u8()];
    if magic != FRAME_MAGIC {
        return Err(DecodeError::BadMagic(magic));
    }
    let len = buf.get_u16_le() as usize;
    if len != STATUS_PAYLOAD_LEN {
        return Err(DecodeError::BadLength(len));
    }
    GsmLinkStatus::decode(&mut buf)
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("frame truncated, {0} bytes remaining")]
    Truncated(usize),
    #[error("bad frame magic {0:02x?}")]
    BadMagic([u8; 2]),
    #[error("unexpected payload length {0}")]
    BadLength(usize),
    #[error("unknown link type {0}")]
    UnknownLinkType(u8),
    #[error("unknown modem type {0}")]
    UnknownModemType(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GsmLinkStatus {
        GsmLinkStatus {
            timestamp_ms: 0x0102_0304,
            modem_type: ModemType::HuaweiE3372,
            link_type: LinkType::FourG,
            rssi: 22,
            rsrp_rscp: 80,
            sinr_ecio: 40,
            rsrq: 15,
        }
    }

    #[test]
    fn test_frame_layout() {
        let frame = encode_frame(&sample());
        assert_eq!(
            frame,
            vec![
                0x47, 0x4c, // magic
                10, 0, // payload size
                0x04, 0x03, 0x02, 0x01, // timestamp_ms
                1,  // modem_type
                4,  // link_type
                22, 80, 40, 15, // metrics
            ]
        );
    }

    #[test]
    fn test_decode_frame_round_trip() {
        let status = sample();
        let decoded = decode_frame(&encode_frame(&status)).unwrap();
        assert_eq!(decoded, status);
    }

    #[test]
    fn test_decode_frame_rejects_bad_magic() {
        let mut frame = encode_frame(&sample());
        frame[0] = 0xff;
        assert_eq!(decode_frame(&frame), Err(DecodeError::BadMagic([0xff, 0x4c])));
    }

    #[test]
    fn test_decode_frame_rejects_truncation() {
        let frame = encode_frame(&sample());
        assert_eq!(decode_frame(&frame[..3]), Err(DecodeError::Truncated(3)));
        assert_eq!(decode_frame(&frame[..8]), Err(DecodeError::Truncated(4)));
    }

    #[test]
    fn test_decode_frame_rejects_unknown_enums() {
        let mut frame = encode_frame(&sample());
        frame[9] = 9;
        assert_eq!(decode_frame(&frame), Err(DecodeError::UnknownLinkType(9)));
        frame[9] = 4;
        frame[8] = 7;
        assert_eq!(decode_frame(&frame), Err(DecodeError::UnknownModemType(7)));
    }

    #[test]
    fn test_unknown_record_is_all_sentinels() {
        let status = GsmLinkStatus::unknown(ModemType::HuaweiE3372);
        assert_eq!(status.timestamp_ms, 0);
        assert_eq!(status.link_type, LinkType::Unknown);
        assert_eq!(
            [status.rssi, status.rsrp_rscp, status.sinr_ecio, status.rsrq],
            [METRIC_UNKNOWN; 4]
        );
    }
}
