//! Business logic services for the crop advisor

pub mod history;
pub mod prediction;

pub use history::HistoryService;
pub use prediction::PredictionService;
