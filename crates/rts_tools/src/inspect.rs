//! Offline inspection of captured packets and replay files.
//!
//! Everything here decodes without a world, so issuers and actor targets
//! show up empty. The point is to see what is on the wire, and where a
//! corrupt packet stops making sense.

use std::collections::BTreeMap;
use std::fmt;

use rts_protocol::codec::OrderCodec;
use rts_protocol::config::CodecConfig;
use rts_protocol::diagnostics::NullSink;
use rts_protocol::error::{DecodeError, ProtocolError};
use rts_protocol::order::Order;
use rts_protocol::replay::OrderReplay;
use thiserror::Error;

/// Errors from the inspection tools.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Hex dump contained something other than hex digit pairs.
    #[error("Invalid hex at character {position}: {found:?}")]
    InvalidHex {
        /// Character offset in the input.
        position: usize,
        /// Offending character.
        found: char,
    },

    /// Hex dump had an odd number of digits.
    #[error("Hex dump has an odd number of digits ({0})")]
    OddHexLength(usize),

    /// Reading or parsing a protocol file failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Parse a hex dump such as `"fe 04 50 6f"` or `"FE04506F"`.
///
/// Whitespace is ignored, as is a leading `0x` on any group.
///
/// # Errors
///
/// Returns an error on non-hex characters or a dangling half byte.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, InspectError> {
    let mut digits = Vec::with_capacity(text.len());
    for group in text.split_whitespace() {
        let group_start = group.as_ptr() as usize - text.as_ptr() as usize;
        let (skip, body) = match group.strip_prefix("0x").or_else(|| group.strip_prefix("0X")) {
            Some(body) => (2, body),
            None => (0, group),
        };
        for (offset, c) in body.char_indices() {
            let digit = c
                .to_digit(16)
                .and_then(|d| u8::try_from(d).ok())
                .ok_or(InspectError::InvalidHex {
                    position: group_start + skip + offset,
                    found: c,
                })?;
            digits.push(digit);
        }
    }

    if digits.len() % 2 != 0 {
        return Err(InspectError::OddHexLength(digits.len()));
    }

    Ok(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}

/// One frame found in a packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// Byte offset of the frame's tag.
    pub offset: usize,
    /// Length of the frame in bytes, as far as the decoder got.
    pub len: usize,
    /// The decoded order or why it was dropped.
    pub result: Result<Order, DecodeError>,
}

/// Frame-by-frame breakdown of a packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PacketReport {
    /// Frames in packet order.
    pub frames: Vec<FrameReport>,
    /// Bytes after the last frame the decoder could delimit.
    pub unread: usize,
}

impl PacketReport {
    /// Number of frames that decoded to an order.
    #[must_use]
    pub fn decoded(&self) -> usize {
        self.frames.iter().filter(|f| f.result.is_ok()).count()
    }

    /// Number of frames that were dropped.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.frames.len() - self.decoded()
    }
}

impl fmt::Display for PacketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            write!(f, "@{:<6} {:>4}B  ", frame.offset, frame.len)?;
            match &frame.result {
                Ok(order) => writeln!(f, "{order}")?,
                Err(err) => writeln!(f, "DROPPED: {err}")?,
            }
        }
        write!(
            f,
            "{} decoded, {} dropped, {} bytes unread",
            self.decoded(),
            self.dropped(),
            self.unread
        )
    }
}

/// Walk every frame in `bytes` without a world.
///
/// Stops at the first failure that loses frame alignment.
#[must_use]
pub fn inspect_packet(config: &CodecConfig, bytes: &[u8]) -> PacketReport {
    let codec = OrderCodec::with_sink(config.clone(), NullSink);
    let mut report = PacketReport::default();
    let mut buf = bytes;

    while !buf.is_empty() {
        let offset = bytes.len() - buf.len();
        let before = buf.len();
        let result = codec.try_decode(None, &mut buf);
        let aligned = result.as_ref().map_or_else(DecodeError::is_aligned, |_| true);

        report.frames.push(FrameReport {
            offset,
            len: before - buf.len(),
            result,
        });

        if !aligned {
            tracing::debug!(offset, "Lost frame alignment");
            break;
        }
    }

    report.unread = buf.len();
    report
}

/// Per-replay statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    /// Map or scenario identifier.
    pub scenario_id: String,
    /// Last simulated frame.
    pub final_frame: u32,
    /// Final state hash.
    pub final_hash: u64,
    /// Total recorded orders.
    pub orders: usize,
    /// Distinct frames carrying orders.
    pub frames: usize,
    /// Orders that failed to decode.
    pub undecodable: usize,
    /// Decoded orders by name.
    pub by_name: BTreeMap<String, usize>,
    /// Recorded orders by client.
    pub by_client: BTreeMap<u32, usize>,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario:    {}", self.scenario_id)?;
        writeln!(f, "Duration:    {} frames", self.final_frame)?;
        writeln!(f, "Final hash:  {:016x}", self.final_hash)?;
        writeln!(
            f,
            "Orders:      {} over {} frames ({} undecodable)",
            self.orders, self.frames, self.undecodable
        )?;
        for (client, count) in &self.by_client {
            writeln!(f, "  client {client}: {count}")?;
        }
        for (name, count) in &self.by_name {
            writeln!(f, "  {name:?}: {count}")?;
        }
        Ok(())
    }
}

/// Summarize a loaded replay.
#[must_use]
pub fn summarize_replay(config: &CodecConfig, replay: &OrderReplay) -> ReplaySummary {
    let codec = OrderCodec::with_sink(config.clone(), NullSink);
    let mut summary = ReplaySummary {
        scenario_id: replay.scenario_id.clone(),
        final_frame: replay.final_frame,
        final_hash: replay.final_hash,
        orders: replay.order_count(),
        frames: replay.frame_count(),
        ..ReplaySummary::default()
    };

    for recorded in &replay.orders {
        *summary.by_client.entry(recorded.client).or_default() += 1;
        match codec.decode(None, &recorded.data) {
            Some(order) => *summary.by_name.entry(order.name().to_string()).or_default() += 1,
            None => summary.undecodable += 1,
        }
    }

    summary
}

/// Decoded orders of one replay frame, as `(client, order)` pairs.
#[must_use]
pub fn replay_frame(config: &CodecConfig, replay: &OrderReplay, frame: u32) -> Vec<(u32, Order)> {
    let codec = OrderCodec::with_sink(config.clone(), NullSink);
    replay.decode_frame(&codec, None, frame)
}
