//! Domain models for the crop advisor

mod features;
mod prediction;

pub use features::*;
pub use prediction::*;
