//! Gatehouse Core — domain models, error types, and the repository
//! trait seams shared across all crates.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{GateError, GateResult};
