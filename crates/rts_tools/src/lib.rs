//! # RTS Development Tools
//!
//! Command-line tools for development:
//! - Packet inspector for captured order traffic
//! - Replay summaries

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod inspect;
