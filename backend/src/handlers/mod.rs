//! HTTP request handlers for the crop advisor

pub mod health;
pub mod history;
pub mod prediction;

pub use health::*;
pub use history::*;
pub use prediction::*;
