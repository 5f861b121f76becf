//! Core utilities shared by the generation pipeline

pub mod clock;
