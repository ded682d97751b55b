//! Shared types and pure domain logic for the crop advisor
//!
//! Everything here is free of I/O: the measurement codec, the ranked-output
//! rules, and the record types the backend persists.

pub mod models;
pub mod ranking;
pub mod validation;

pub use models::*;
pub use ranking::*;
pub use validation::*;
