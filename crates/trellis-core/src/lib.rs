//! Core types and utilities for the Trellis layout engine.
//!
//! This crate provides the foundational types used across the other trellis
//! crates:
//! - Symbol and hint identifiers
//! - Constraint strength tiers
//! - Axis and alignment attribute enums
//! - Error types

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::*;
