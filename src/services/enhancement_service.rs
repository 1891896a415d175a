use chrono::{SecondsFormat, Utc};
use log::{debug, info, warn};
use serde_json::Value;
use uuid::Uuid;

use crate::clients::UpstreamClient;
use crate::error::ClassifiedError;
use crate::models::EnhancementResponse;
use crate::services::error_classifier;
use crate::utils::request_validation::validate_enhancement_body;

/// Lifecycle of one enhancement request. Each state is entered at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Validating,
    Dispatching,
    Completed,
    Rejected,
    Failed,
}

impl RelayState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RelayState::Completed | RelayState::Rejected | RelayState::Failed)
    }

    pub fn can_advance_to(self, next: RelayState) -> bool {
        matches!(
            (self, next),
            (RelayState::Idle, RelayState::Validating)
                | (RelayState::Validating, RelayState::Dispatching)
                | (RelayState::Validating, RelayState::Rejected)
                | (RelayState::Dispatching, RelayState::Completed)
                | (RelayState::Dispatching, RelayState::Failed)
        )
    }
}

#[derive(Debug)]
pub struct RelayOutcome {
    pub request_id: String,
    /// Every state visited, starting at `Idle`.
    pub trace: Vec<RelayState>,
    pub result: Result<EnhancementResponse, ClassifiedError>,
}

impl RelayOutcome {
    pub fn final_state(&self) -> RelayState {
        self.trace.last().copied().unwrap_or(RelayState::Idle)
    }
}

struct RelayRun {
    request_id: String,
    trace: Vec<RelayState>,
}

impl RelayRun {
    fn start() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            trace: vec![RelayState::Idle],
        }
    }

    fn current(&self) -> RelayState {
        self.trace.last().copied().unwrap_or(RelayState::Idle)
    }

    fn advance(&mut self, next: RelayState) {
        let current = self.current();
        debug_assert!(current.can_advance_to(next), "illegal transition {current:?} -> {next:?}");
        debug!("[{}] {:?} -> {:?}", self.request_id, current, next);
        self.trace.push(next);
    }

    fn finish(mut self, result: Result<EnhancementResponse, ClassifiedError>) -> RelayOutcome {
        let terminal = if result.is_ok() {
            RelayState::Completed
        } else if self.current() == RelayState::Validating {
            RelayState::Rejected
        } else {
            RelayState::Failed
        };
        self.advance(terminal);

        RelayOutcome {
            request_id: self.request_id,
            trace: self.trace,
            result,
        }
    }
}

/// Validates a request, dispatches it upstream once and composes the response.
pub struct EnhancementService {
    upstream: UpstreamClient,
}

impl EnhancementService {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// `body` is the decoded JSON request body, of any shape.
    pub async fn process(&self, body: Value) -> RelayOutcome {
        let mut run = RelayRun::start();
        run.advance(RelayState::Validating);

        let request = match validate_enhancement_body(body) {
            Ok(request) => request,
            Err(e) => {
                info!("[{}] Rejected enhancement request: {}", run.request_id, e);
                return run.finish(Err(e.into()));
            }
        };

        let template = request.mode.template();
        run.advance(RelayState::Dispatching);
        info!(
            "[{}] Enhancing prompt with {} ({}, {} chars)",
            run.request_id,
            self.upstream.model_id(),
            request.mode,
            request.prompt.chars().count()
        );

        let completion = match self.upstream.complete(template, &request.prompt, &run.request_id).await {
            Ok(completion) => completion,
            Err(failure) => {
                let classified = error_classifier::classify(&failure);
                warn!(
                    "[{}] Upstream call failed ({}): {} -> {} {}",
                    run.request_id,
                    request.mode,
                    failure,
                    classified.http_status().as_u16(),
                    classified.code
                );
                return run.finish(Err(classified));
            }
        };

        info!(
            "[{}] Successfully enhanced prompt. Tokens used: {}",
            run.request_id,
            completion
                .usage
                .as_ref()
                .and_then(|usage| usage.get("total_tokens"))
                .map(|total| total.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );

        let response = EnhancementResponse {
            original_length: request.prompt.chars().count(),
            enhanced_length: completion.text.chars().count(),
            enhanced_prompt: completion.text,
            mode: request.mode,
            model_id: self.upstream.model_id().to_string(),
            usage: completion.usage,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        run.finish(Ok(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{test_settings, DEFAULT_MODEL_ID};
    use crate::error::ErrorCode;
    use crate::modes::EnhancementMode;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn service_for(base_url: &str, api_key: Option<&str>) -> EnhancementService {
        let settings = test_settings(base_url, api_key);
        EnhancementService::new(UpstreamClient::new(&settings.upstream).unwrap())
    }

    #[test]
    fn transitions_follow_the_lifecycle() {
        use RelayState::*;
        assert!(Idle.can_advance_to(Validating));
        assert!(Validating.can_advance_to(Rejected));
        assert!(Dispatching.can_advance_to(Failed));
        assert!(!Idle.can_advance_to(Dispatching));
        assert!(!Validating.can_advance_to(Completed));
        assert!(!Completed.can_advance_to(Validating));
        assert!(!Rejected.can_advance_to(Dispatching));
        for state in [Completed, Rejected, Failed] {
            assert!(state.is_terminal());
        }
        for state in [Idle, Validating, Dispatching] {
            assert!(!state.is_terminal());
        }
    }

    #[tokio::test]
    async fn round_trip_fix_my_code() {
        let enhanced = "Please review and fix the following code, explaining each change: ...";
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "model": DEFAULT_MODEL_ID,
                "messages": [
                    {"role": "system", "content": EnhancementMode::QuickRefine.template().system_instruction},
                    {"role": "user", "content": "fix my code"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"choices": [{"message": {"content": enhanced}}], "usage": {"total_tokens": 42}}).to_string())
            .expect(1)
            .create_async()
            .await;

        let service = service_for(&server.url(), Some("test-key"));
        let outcome = service
            .process(json!({"prompt": "fix my code", "mode": "quick-refine"}))
            .await;

        mock.assert_async().await;
        assert_eq!(
            outcome.trace,
            vec![RelayState::Idle, RelayState::Validating, RelayState::Dispatching, RelayState::Completed]
        );
        let response = outcome.result.unwrap();
        assert_eq!(response.enhanced_prompt, enhanced);
        assert_eq!(response.mode, EnhancementMode::QuickRefine);
        assert_eq!(response.model_id, DEFAULT_MODEL_ID);
        assert_eq!(response.original_length, "fix my code".chars().count());
        assert_eq!(response.original_length, 11);
        assert_eq!(response.enhanced_length, enhanced.chars().count());
        assert_eq!(response.usage, Some(json!({"total_tokens": 42})));
        assert!(chrono::DateTime::parse_from_rfc3339(&response.timestamp).is_ok());
    }

    #[tokio::test]
    async fn validation_failures_never_reach_upstream() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;
        let service = service_for(&server.url(), Some("test-key"));

        let cases = [
            (json!({"prompt": "", "mode": "quick-refine"}), ErrorCode::InvalidPrompt),
            (json!({"prompt": "x".repeat(10_001), "mode": "quick-refine"}), ErrorCode::PromptTooLong),
            (json!({"prompt": "hello", "mode": "turbo"}), ErrorCode::InvalidMode),
            (json!(["fix my code", "quick-refine", null, null]), ErrorCode::InvalidPrompt),
        ];
        for (body, code) in cases {
            let outcome = service.process(body).await;
            assert_eq!(
                outcome.trace,
                vec![RelayState::Idle, RelayState::Validating, RelayState::Rejected]
            );
            assert_eq!(outcome.result.unwrap_err().code, code);
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_credential_fails_after_dispatch_without_network_io() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;
        let service = service_for(&server.url(), None);

        let outcome = service
            .process(json!({"prompt": "hello", "mode": "think-mode"}))
            .await;

        mock.assert_async().await;
        assert_eq!(outcome.final_state(), RelayState::Failed);
        let err = outcome.result.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigurationError);
        assert_eq!(err.http_status().as_u16(), 500);
    }

    #[tokio::test]
    async fn legacy_alias_selects_the_canonical_template() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system", "content": EnhancementMode::ThinkMode.template().system_instruction},
                    {"role": "user", "content": "plan a trip"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"better"}}]}"#)
            .expect(1)
            .create_async()
            .await;
        let service = service_for(&server.url(), Some("test-key"));

        let outcome = service
            .process(json!({"prompt": "plan a trip", "enhancementType": "advanced"}))
            .await;

        mock.assert_async().await;
        let response = outcome.result.unwrap();
        assert_eq!(response.mode, EnhancementMode::ThinkMode);
        assert_eq!(response.usage, None);
    }

    #[tokio::test]
    async fn upstream_rate_limit_is_classified_once_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .expect(1)
            .create_async()
            .await;
        let service = service_for(&server.url(), Some("test-key"));

        let outcome = service
            .process(json!({"prompt": "hello", "mode": "deep-research"}))
            .await;

        mock.assert_async().await;
        assert_eq!(outcome.final_state(), RelayState::Failed);
        let err = outcome.result.unwrap_err();
        assert_eq!((err.http_status().as_u16(), err.code), (429, ErrorCode::RateLimited));
    }
}
