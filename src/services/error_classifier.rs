use serde_json::Value;

use crate::clients::UpstreamFailure;
use crate::error::{ClassifiedError, ErrorCode};

/// Upstream HTTP statuses with a dedicated outward code. Anything else is `UpstreamError`.
/// Upstream 401 deliberately becomes a 500: the caller is not a client of the upstream API.
const UPSTREAM_STATUS_TABLE: &[(u16, ErrorCode)] = &[
    (400, ErrorCode::InvalidUpstreamRequest),
    (401, ErrorCode::AuthenticationError),
    (429, ErrorCode::RateLimited),
    (503, ErrorCode::UpstreamUnavailable),
];

pub fn code_for_upstream_status(status: u16) -> ErrorCode {
    UPSTREAM_STATUS_TABLE
        .iter()
        .find(|(s, _)| *s == status)
        .map(|(_, code)| *code)
        .unwrap_or(ErrorCode::UpstreamError)
}

pub fn classify(failure: &UpstreamFailure) -> ClassifiedError {
    match failure {
        UpstreamFailure::MissingCredential => {
            ClassifiedError::new(ErrorCode::ConfigurationError, "Upstream API key not configured")
        }
        UpstreamFailure::Status { status, body } => {
            let code = code_for_upstream_status(*status);
            ClassifiedError::new(code, status_details(code, *status, body))
        }
        UpstreamFailure::Timeout(_) => {
            ClassifiedError::new(ErrorCode::RequestTimeout, "Upstream API request timed out")
        }
        UpstreamFailure::Connect(_) => {
            ClassifiedError::new(ErrorCode::ServiceUnavailable, "Cannot connect to upstream API")
        }
        UpstreamFailure::Other(message) => ClassifiedError::new(ErrorCode::InternalError, message.clone()),
    }
}

fn status_details(code: ErrorCode, status: u16, body: &str) -> String {
    match code {
        // Never echo upstream auth responses.
        ErrorCode::AuthenticationError => "Invalid upstream API key".to_string(),
        ErrorCode::RateLimited => "Too many requests to upstream API".to_string(),
        ErrorCode::InvalidUpstreamRequest => {
            upstream_message(body).unwrap_or_else(|| "Bad request to upstream API".to_string())
        }
        ErrorCode::UpstreamUnavailable => {
            upstream_message(body).unwrap_or_else(|| "Upstream API is temporarily unavailable".to_string())
        }
        _ => upstream_message(body).unwrap_or_else(|| format!("HTTP {} error", status)),
    }
}

/// `error.message` from an upstream JSON error body, if there is one.
fn upstream_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn status(status: u16, body: &str) -> UpstreamFailure {
        UpstreamFailure::Status {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn every_mapping_row() {
        let rows = [
            (UpstreamFailure::MissingCredential, 500, ErrorCode::ConfigurationError),
            (status(401, ""), 500, ErrorCode::AuthenticationError),
            (status(429, ""), 429, ErrorCode::RateLimited),
            (status(400, ""), 400, ErrorCode::InvalidUpstreamRequest),
            (status(503, ""), 503, ErrorCode::UpstreamUnavailable),
            (status(402, ""), 500, ErrorCode::UpstreamError),
            (status(404, ""), 500, ErrorCode::UpstreamError),
            (status(500, ""), 500, ErrorCode::UpstreamError),
            (status(502, ""), 500, ErrorCode::UpstreamError),
            (UpstreamFailure::Timeout(Duration::from_secs(30)), 408, ErrorCode::RequestTimeout),
            (UpstreamFailure::Connect("dns error".to_string()), 503, ErrorCode::ServiceUnavailable),
            (UpstreamFailure::Other("boom".to_string()), 500, ErrorCode::InternalError),
        ];

        for (failure, expected_status, expected_code) in rows {
            let classified = classify(&failure);
            assert_eq!(classified.code, expected_code, "{failure:?}");
            assert_eq!(classified.http_status().as_u16(), expected_status, "{failure:?}");
        }
    }

    #[test]
    fn upstream_auth_never_surfaces_as_401() {
        let classified = classify(&status(401, r#"{"error":{"message":"No auth credentials found for key sk-or-abc"}}"#));
        assert_ne!(classified.http_status().as_u16(), 401);
        assert_eq!(classified.details, "Invalid upstream API key");
        assert!(!classified.details.contains("sk-or"));
    }

    #[test]
    fn upstream_message_is_forwarded_for_bad_requests() {
        let classified = classify(&status(400, r#"{"error":{"message":"context length exceeded","code":400}}"#));
        assert_eq!(classified.details, "context length exceeded");

        let classified = classify(&status(400, "not json"));
        assert_eq!(classified.details, "Bad request to upstream API");
    }

    #[test]
    fn generic_upstream_errors_fall_back_to_status_text() {
        assert_eq!(classify(&status(502, "<html>bad gateway</html>")).details, "HTTP 502 error");
        assert_eq!(
            classify(&status(500, r#"{"error":{"message":"provider crashed"}}"#)).details,
            "provider crashed"
        );
    }

    #[test]
    fn status_table_has_no_duplicates() {
        for (status, _) in UPSTREAM_STATUS_TABLE {
            let rows = UPSTREAM_STATUS_TABLE.iter().filter(|(s, _)| s == status).count();
            assert_eq!(rows, 1);
        }
    }
}
