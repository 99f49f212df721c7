//! # RTS Test Utilities
//!
//! Shared testing utilities for the protocol crates:
//! - In-memory world and recording diagnostic sink
//! - Decode determinism harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
