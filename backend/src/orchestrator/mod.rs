//! Orchestrator - generation pipeline
//!
//! `ScenarioForge` runs lookup, synthesis, labeling and sealing. See
//! `engine.rs` for the full implementation.

pub mod engine;

pub use engine::{ForgeError, GenerateOptions, ScenarioForge};
