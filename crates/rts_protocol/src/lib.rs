//! # RTS Protocol
//!
//! Binary order protocol for Post-Scarcity RTS lockstep multiplayer.
//!
//! Every player action (move, attack, produce, chat, pause, ...) becomes
//! an [`Order`], is encoded to a compact self-describing frame, sent to all
//! peers and decoded by each simulation instance so that all of them
//! execute the same orders on the same frame.
//!
//! This crate contains **only** the protocol:
//! - No IO beyond replay and config files
//! - No simulation state (actors are resolved through the [`World`] trait)
//! - No transport (frames are assumed to arrive in order)
//!
//! Decoding never panics and never trusts its input: malformed frames are
//! dropped and reported through a [`DiagnosticSink`].
//!
//! ## Crate Structure
//!
//! - [`coords`] - Cells, sub-cells and world positions
//! - [`actor`] - Actor ids, handles and the world collaborator traits
//! - [`target`] - What an order acts upon
//! - [`fields`] - Optional-field presence mask
//! - [`order`] - The order record and named constructors
//! - [`codec`] - Wire encoding and defensive decoding
//! - [`replay`] - Order replays

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actor;
pub mod codec;
pub mod config;
pub mod coords;
pub mod diagnostics;
pub mod error;
pub mod fields;
pub mod order;
pub mod replay;
pub mod target;

pub use actor::World;
pub use diagnostics::DiagnosticSink;
pub use order::Order;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actor::{
        ActorId, ActorRef, FrozenActorId, FrozenActorLayer, FrozenActorRef, PlayerId, World,
        NO_ACTOR,
    };
    pub use crate::codec::{OrderCodec, TAG_FULL, TAG_IMMEDIATE};
    pub use crate::config::CodecConfig;
    pub use crate::coords::{CPos, SubCell, WPos};
    pub use crate::diagnostics::{DiagnosticSink, NullSink, TracingSink};
    pub use crate::error::{DecodeError, ProtocolError, Result};
    pub use crate::fields::OrderFields;
    pub use crate::order::Order;
    pub use crate::replay::{OrderReplay, ReplayOrder};
    pub use crate::target::{Target, TargetKind, TerrainTarget, WrongVariant};
}
