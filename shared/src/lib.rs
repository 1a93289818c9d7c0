//! Shared types and utilities for the compute benchmarks
//!
//! This crate contains the measurement model, engine and device enums, the test
//! result taxonomy and small helpers used by the backends, the framework and the
//! benchmark bodies.

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::ParseError;
pub use types::{api::*, device::*, engine::*, measurement::*, result::*};
