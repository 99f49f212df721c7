//! Order replays for recording and re-feeding games.
//!
//! A replay stores every order exactly as it went over the wire, tagged
//! with the frame it was issued for and the client that sent it. Playing
//! it back means decoding each frame's orders against the simulation in
//! recorded order, which recreates the game deterministically.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::actor::World;
use crate::codec::{self, OrderCodec};
use crate::diagnostics::DiagnosticSink;
use crate::error::{ProtocolError, Result};
use crate::order::Order;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// One recorded order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayOrder {
    /// Simulation frame the order executes on.
    pub frame: u32,
    /// Client that sent the order.
    pub client: u32,
    /// Encoded order bytes.
    pub data: Vec<u8>,
}

impl ReplayOrder {
    /// Create a new replay order record.
    #[must_use]
    pub const fn new(frame: u32, client: u32, data: Vec<u8>) -> Self {
        Self {
            frame,
            client,
            data,
        }
    }
}

/// Complete replay data structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReplay {
    /// Replay format version.
    pub version: u32,
    /// Map or scenario identifier.
    pub scenario_id: String,
    /// Orders in frame order.
    pub orders: Vec<ReplayOrder>,
    /// Last simulated frame.
    pub final_frame: u32,
    /// Final state hash for verification.
    pub final_hash: u64,
}

impl OrderReplay {
    /// Create an empty replay.
    #[must_use]
    pub fn new(scenario_id: impl Into<String>) -> Self {
        Self {
            version: REPLAY_VERSION,
            scenario_id: scenario_id.into(),
            orders: Vec::new(),
            final_frame: 0,
            final_hash: 0,
        }
    }

    /// Encode and record an order.
    pub fn record(&mut self, frame: u32, client: u32, order: &Order) {
        self.record_raw(frame, client, codec::encode(order));
    }

    /// Record already-encoded order bytes as received from the network.
    pub fn record_raw(&mut self, frame: u32, client: u32, data: Vec<u8>) {
        self.orders.push(ReplayOrder::new(frame, client, data));
    }

    /// Finalize the replay with end-game state.
    pub fn finalize(&mut self, final_frame: u32, final_hash: u64) {
        self.final_frame = final_frame;
        self.final_hash = final_hash;
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = bincode::serialize(self)
            .map_err(|e| ProtocolError::ReplayFormat(format!("Failed to serialize replay: {e}")))?;
        std::fs::write(path, bytes).map_err(|source| ProtocolError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading, deserialization or the version
    /// check fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ProtocolError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let replay: Self = bincode::deserialize(&bytes).map_err(|e| {
            ProtocolError::ReplayFormat(format!("Failed to deserialize replay: {e}"))
        })?;

        if replay.version != REPLAY_VERSION {
            return Err(ProtocolError::ReplayVersion {
                expected: REPLAY_VERSION,
                actual: replay.version,
            });
        }

        Ok(replay)
    }

    /// Recorded orders for a specific frame, in arrival order.
    #[must_use]
    pub fn orders_at_frame(&self, frame: u32) -> Vec<&ReplayOrder> {
        self.orders
            .iter()
            .filter(|order| order.frame == frame)
            .collect()
    }

    /// Decode the orders of one frame against `world`.
    ///
    /// Orders that fail to decode are skipped (and reported by the codec's
    /// sink), exactly as they would have been when the game was live.
    pub fn decode_frame<S: DiagnosticSink>(
        &self,
        codec: &OrderCodec<S>,
        world: Option<&dyn World>,
        frame: u32,
    ) -> Vec<(u32, Order)> {
        self.orders_at_frame(frame)
            .into_iter()
            .filter_map(|recorded| {
                codec
                    .decode(world, &recorded.data)
                    .map(|order| (recorded.client, order))
            })
            .collect()
    }

    /// Number of distinct frames that carry orders.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        let mut frames: Vec<u32> = self.orders.iter().map(|order| order.frame).collect();
        frames.sort_unstable();
        frames.dedup();
        frames.len()
    }

    /// Get the total number of recorded orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Get the total duration of the replay in frames.
    #[must_use]
    pub const fn duration(&self) -> u32 {
        self.final_frame
    }
}
