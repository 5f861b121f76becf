//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! CRITICAL: All randomness in scenario generation MUST go through this module.

mod xorshift;

pub use xorshift::RngManager;

/// Stream id used by the synthesizer.
pub const SYNTHESIS_STREAM: u64 = 1;

/// Stream id used by the label attacher.
pub const LABEL_STREAM: u64 = 2;
