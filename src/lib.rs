//! Prompt Relay Server Library
//!
//! Relays prompt-enhancement requests from the browser extension to an upstream
//! chat-completion API. Exported as a library so the server binary and the tests
//! share the same modules.

pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod modes;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::AppSettings;
pub use error::{AppError, ClassifiedError, ErrorCode};
pub use modes::EnhancementMode;
