pub mod settings;

use tracing::info;

use crate::error::AppError;

pub use settings::{AppSettings, UpstreamConfig};

/// Initialize application configuration
pub fn init_config() -> Result<settings::AppSettings, AppError> {
    info!("Initializing application configuration from environment");
    let config = settings::AppSettings::from_env()?;
    Ok(config)
}
