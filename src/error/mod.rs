use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt;
use thiserror::Error;

/// Outward error taxonomy. Every failure the relay reports to a caller carries one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidPrompt,
    PromptTooLong,
    InvalidMode,
    ConfigurationError,
    AuthenticationError,
    RateLimited,
    InvalidUpstreamRequest,
    UpstreamUnavailable,
    UpstreamError,
    RequestTimeout,
    ServiceUnavailable,
    InternalError,
}

/// Status and short label for every error code, in one place.
const ERROR_TABLE: &[(ErrorCode, StatusCode, &str)] = &[
    (ErrorCode::InvalidPrompt, StatusCode::BAD_REQUEST, "Missing or invalid prompt"),
    (ErrorCode::PromptTooLong, StatusCode::BAD_REQUEST, "Prompt too long"),
    (ErrorCode::InvalidMode, StatusCode::BAD_REQUEST, "Missing or invalid mode"),
    (ErrorCode::ConfigurationError, StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error"),
    (ErrorCode::AuthenticationError, StatusCode::INTERNAL_SERVER_ERROR, "Authentication error"),
    (ErrorCode::RateLimited, StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded"),
    (ErrorCode::InvalidUpstreamRequest, StatusCode::BAD_REQUEST, "Invalid request"),
    (ErrorCode::UpstreamUnavailable, StatusCode::SERVICE_UNAVAILABLE, "Upstream unavailable"),
    (ErrorCode::UpstreamError, StatusCode::INTERNAL_SERVER_ERROR, "Upstream API error"),
    (ErrorCode::RequestTimeout, StatusCode::REQUEST_TIMEOUT, "Request timeout"),
    (ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE, "Service unavailable"),
    (ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
];

const INTERNAL_SERVER_ERROR_LABEL: &str = "Internal server error";

impl ErrorCode {
    pub const ALL: [ErrorCode; 12] = [
        ErrorCode::InvalidPrompt,
        ErrorCode::PromptTooLong,
        ErrorCode::InvalidMode,
        ErrorCode::ConfigurationError,
        ErrorCode::AuthenticationError,
        ErrorCode::RateLimited,
        ErrorCode::InvalidUpstreamRequest,
        ErrorCode::UpstreamUnavailable,
        ErrorCode::UpstreamError,
        ErrorCode::RequestTimeout,
        ErrorCode::ServiceUnavailable,
        ErrorCode::InternalError,
    ];

    fn entry(self) -> (StatusCode, &'static str) {
        ERROR_TABLE
            .iter()
            .find(|(code, _, _)| *code == self)
            .map(|(_, status, label)| (*status, *label))
            .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_LABEL))
    }

    pub fn status(self) -> StatusCode {
        self.entry().0
    }

    pub fn label(self) -> &'static str {
        self.entry().1
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidPrompt => "InvalidPrompt",
            ErrorCode::PromptTooLong => "PromptTooLong",
            ErrorCode::InvalidMode => "InvalidMode",
            ErrorCode::ConfigurationError => "ConfigurationError",
            ErrorCode::AuthenticationError => "AuthenticationError",
            ErrorCode::RateLimited => "RateLimited",
            ErrorCode::InvalidUpstreamRequest => "InvalidUpstreamRequest",
            ErrorCode::UpstreamUnavailable => "UpstreamUnavailable",
            ErrorCode::UpstreamError => "UpstreamError",
            ErrorCode::RequestTimeout => "RequestTimeout",
            ErrorCode::ServiceUnavailable => "ServiceUnavailable",
            ErrorCode::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat JSON body shared by every error response.
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: Option<String>,
    pub details: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            details: details.into(),
        }
    }
}

/// A failure mapped onto the outward taxonomy. Never retried, returned as-is to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {details}")]
pub struct ClassifiedError {
    pub code: ErrorCode,
    pub details: String,
}

impl ClassifiedError {
    pub fn new(code: ErrorCode, details: impl Into<String>) -> Self {
        Self {
            code,
            details: details.into(),
        }
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.status()
    }
}

impl ResponseError for ClassifiedError {
    fn error_response(&self) -> HttpResponse {
        let body = ErrorBody {
            error: self.code.label().to_string(),
            code: Some(self.code.as_str().to_string()),
            details: self.details.clone(),
        };

        HttpResponse::build(self.http_status()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.http_status()
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Failure outside the relay's own taxonomy. Details are already redacted when needed.
    #[error("Unhandled error: {details}")]
    Unhandled { details: String },
}

impl AppError {
    /// Outside development the underlying message is replaced by a generic one.
    pub fn unhandled(message: impl Into<String>, development: bool) -> Self {
        let details = if development {
            message.into()
        } else {
            "Something went wrong".to_string()
        };
        AppError::Unhandled { details }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Configuration(msg) => {
                ClassifiedError::new(ErrorCode::ConfigurationError, msg.clone()).error_response()
            }
            AppError::Unhandled { details } => HttpResponse::build(self.status_code())
                .json(ErrorBody::new(INTERNAL_SERVER_ERROR_LABEL, details.clone())),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) | AppError::Unhandled { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
