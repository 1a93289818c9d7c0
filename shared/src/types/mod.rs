//! Core data types

pub mod api;
pub mod device;
pub mod engine;
pub mod measurement;
pub mod result;
