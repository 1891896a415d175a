pub mod enhancement_service;
pub mod error_classifier;

pub use enhancement_service::{EnhancementService, RelayOutcome, RelayState};
