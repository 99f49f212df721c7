//! Determinism testing utilities.
//!
//! Lockstep only works if every peer turns the same bytes into the same
//! orders. These helpers decode identical input repeatedly, sequentially
//! and on parallel threads, and compare the results.
//!
//! # Sources of divergence this catches
//!
//! - **Hidden codec state**: a decoder that remembers anything between
//!   calls will eventually disagree with a fresh one.
//! - **Unordered world lookups**: a world backed by a randomly seeded
//!   `HashMap` iteration can resolve ids differently per process.
//! - **Thread-local state**: parallel decodes must match sequential ones.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use rts_protocol::actor::World;
use rts_protocol::codec::OrderCodec;
use rts_protocol::config::CodecConfig;
use rts_protocol::diagnostics::NullSink;
use rts_protocol::order::Order;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hash of the decoded orders from each run.
    pub hashes: Vec<u64>,
    /// Number of runs.
    pub runs: usize,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>) -> Self {
        let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
        Self {
            is_deterministic,
            runs: hashes.len(),
            hashes,
        }
    }

    /// Get all unique hashes (should be 1 for a deterministic decoder).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that decoding was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different orders.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Order decoding is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.runs,
                unique.len(),
                self.hashes
            );
        }
    }
}

fn quiet_codec() -> OrderCodec<NullSink> {
    OrderCodec::with_sink(CodecConfig::default(), NullSink)
}

/// Decode `packet` `runs` times in sequence, each with a fresh codec.
pub fn verify_decode_determinism(
    world: Option<&dyn World>,
    packet: &[u8],
    runs: usize,
) -> DeterminismResult {
    let hashes = (0..runs)
        .map(|_| compute_hash(&quiet_codec().decode_stream(world, packet)))
        .collect();
    DeterminismResult::from_hashes(hashes)
}

/// Decode `packet` on `threads` scoped threads at once, sharing one world.
pub fn run_parallel_decodes<W: World + Sync>(
    world: &W,
    packet: &[u8],
    threads: usize,
) -> DeterminismResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    let world: &dyn World = world;
                    compute_hash(&quiet_codec().decode_stream(Some(world), packet))
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("decode thread panicked"))
            .collect()
    });

    DeterminismResult::from_hashes(hashes)
}

/// Compare two decoded order streams, finding the first divergence.
///
/// # Returns
///
/// `None` if the streams match, `Some(index)` of the first order that
/// differs (or the length of the shorter stream if one is a prefix).
#[must_use]
pub fn find_first_divergence(a: &[Order], b: &[Order]) -> Option<usize> {
    let index = a.iter().zip(b).position(|(x, y)| x != y);
    match index {
        Some(i) => Some(i),
        None if a.len() != b.len() => Some(a.len().min(b.len())),
        None => None,
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
