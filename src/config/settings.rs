use std::env;
use std::time::Duration;
use actix_web::http::Uri;
use crate::error::AppError;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL_ID: &str = "deepseek/deepseek-chat-v3-0324";
const DEFAULT_CORS_ORIGINS: &str = "https://grok.com,http://localhost:3000,http://localhost:3001";

#[derive(Clone, Debug)]
pub struct AppSettings {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: String,
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    /// `None` when unset or blank; checked before any network I/O.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model_id: String,
    /// Overrides the per-mode timeout when set.
    pub timeout: Option<Duration>,
    pub referer: String,
    pub title: String,
}

impl UpstreamConfig {
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

impl AppSettings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parses settings from any key lookup, so tests don't have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // App config
        let environment = var_or("ENVIRONMENT", "development");

        // Server config
        let server_host = var_or("SERVER_HOST", "0.0.0.0");
        let server_port = var_or("PORT", "3000")
            .parse::<u16>()
            .map_err(|_| AppError::Configuration("PORT must be a valid port number".to_string()))?;

        let cors_origins = parse_cors_origins(&var_or("CORS_ORIGINS", DEFAULT_CORS_ORIGINS))?;

        // Upstream config
        let api_key = lookup("OPENROUTER_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let base_url = var_or("UPSTREAM_BASE_URL", DEFAULT_UPSTREAM_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        let model_id = var_or("UPSTREAM_MODEL_ID", DEFAULT_MODEL_ID);

        let timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    AppError::Configuration("UPSTREAM_TIMEOUT_SECS must be a valid number".to_string())
                })?;
                if secs == 0 {
                    return Err(AppError::Configuration(
                        "UPSTREAM_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let referer = var_or("UPSTREAM_REFERER", "https://grok-prompt-enhancer.vercel.app");
        let title = var_or("UPSTREAM_TITLE", "Grok Prompt Enhancer");

        Ok(Self {
            app: AppConfig { environment },
            server: ServerConfig {
                host: server_host,
                port: server_port,
                cors_origins,
            },
            upstream: UpstreamConfig {
                api_key,
                base_url,
                model_id,
                timeout,
                referer,
                title,
            },
        })
    }
}

/// Comma-separated origins. Each entry is `*` or a `scheme://host[:port]` origin.
fn parse_cors_origins(raw: &str) -> Result<Vec<String>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            if origin == "*" || is_valid_origin(origin) {
                Ok(origin.to_string())
            } else {
                Err(AppError::Configuration(format!(
                    "CORS_ORIGINS entry '{}' is not a valid origin",
                    origin
                )))
            }
        })
        .collect()
}

fn is_valid_origin(origin: &str) -> bool {
    match origin.parse::<Uri>() {
        Ok(uri) => {
            uri.scheme().is_some()
                && uri.host().is_some()
                && uri.path_and_query().is_none_or(|pq| pq.as_str().is_empty() || pq.as_str() == "/")
        }
        Err(_) => false,
    }
}

/// Settings pointed at a local upstream, for tests across the crate.
#[cfg(test)]
pub(crate) fn test_settings(base_url: &str, api_key: Option<&str>) -> AppSettings {
    let mut settings = AppSettings::from_lookup(|_| None).unwrap();
    settings.upstream.base_url = base_url.trim_end_matches('/').to_string();
    settings.upstream.api_key = api_key.map(str::to_string);
    settings
}
