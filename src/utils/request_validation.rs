//! Enhancement Request Validation
//!
//! Turns a raw `/enhance` body into a normalized [`EnhancementRequest`]. Mode
//! normalization is two pure steps: legacy alias lookup, then canonical match.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{ClassifiedError, ErrorCode};
use crate::modes::{resolve_alias, EnhancementMode};

/// Maximum prompt length in characters. Longer prompts are rejected, never truncated.
pub const MAX_PROMPT_CHARS: usize = 10_000;

/// Longest rejected mode value echoed back in error details and logs.
pub const MAX_ECHOED_MODE_CHARS: usize = 64;

/// Body as sent by any extension version. Fields stay untyped so a wrong type
/// is reported as the matching validation error rather than a parse failure.
#[derive(Debug, Default, Clone)]
pub struct RawEnhancementRequest {
    pub prompt: Option<Value>,
    pub mode: Option<Value>,
    /// Legacy name of `mode`.
    pub enhancement_type: Option<Value>,
    /// Legacy caller-chosen upstream model. Ignored; the model is fixed by configuration.
    pub model: Option<Value>,
}

impl RawEnhancementRequest {
    /// Only a JSON object can carry a prompt. `null` fields count as absent.
    pub fn from_body(body: Value) -> ValidationResult<Self> {
        let Value::Object(mut fields) = body else {
            return Err(ValidationError::InvalidPrompt);
        };

        Ok(Self {
            prompt: take_field(&mut fields, "prompt"),
            mode: take_field(&mut fields, "mode"),
            enhancement_type: take_field(&mut fields, "enhancementType"),
            model: take_field(&mut fields, "model"),
        })
    }
}

fn take_field(fields: &mut Map<String, Value>, key: &str) -> Option<Value> {
    fields.remove(key).filter(|value| !value.is_null())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementRequest {
    pub prompt: String,
    pub mode: EnhancementMode,
}

pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Prompt must be a non-empty string")]
    InvalidPrompt,
    #[error("Prompt must be at most {max} characters (got {actual})")]
    PromptTooLong { actual: usize, max: usize },
    #[error("Mode must be one of deep-research, think-mode or quick-refine (got {0})")]
    InvalidMode(String),
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::InvalidPrompt => ErrorCode::InvalidPrompt,
            ValidationError::PromptTooLong { .. } => ErrorCode::PromptTooLong,
            ValidationError::InvalidMode(_) => ErrorCode::InvalidMode,
        }
    }
}

impl From<ValidationError> for ClassifiedError {
    fn from(error: ValidationError) -> Self {
        ClassifiedError::new(error.code(), error.to_string())
    }
}

/// Parses and validates a request body in one step.
pub fn validate_enhancement_body(body: Value) -> ValidationResult<EnhancementRequest> {
    validate_enhancement_request(&RawEnhancementRequest::from_body(body)?)
}

pub fn validate_enhancement_request(raw: &RawEnhancementRequest) -> ValidationResult<EnhancementRequest> {
    let prompt = validate_prompt(raw.prompt.as_ref())?;
    let mode = normalize_mode(select_mode_field(raw))?;
    Ok(EnhancementRequest { prompt, mode })
}

pub fn validate_prompt(value: Option<&Value>) -> ValidationResult<String> {
    let prompt = match value {
        Some(Value::String(prompt)) if !prompt.is_empty() => prompt,
        _ => return Err(ValidationError::InvalidPrompt),
    };

    let actual = prompt.chars().count();
    if actual > MAX_PROMPT_CHARS {
        return Err(ValidationError::PromptTooLong {
            actual,
            max: MAX_PROMPT_CHARS,
        });
    }

    Ok(prompt.clone())
}

/// `mode` wins over the legacy `enhancementType` when both are present.
pub fn select_mode_field(raw: &RawEnhancementRequest) -> Option<&Value> {
    raw.mode.as_ref().or(raw.enhancement_type.as_ref())
}

pub fn normalize_mode(value: Option<&Value>) -> ValidationResult<EnhancementMode> {
    let name = match value {
        Some(Value::String(name)) => name.as_str(),
        Some(other) => return Err(ValidationError::InvalidMode(echo_mode(&other.to_string()))),
        None => return Err(ValidationError::InvalidMode("none".to_string())),
    };

    EnhancementMode::from_canonical(resolve_alias(name))
        .ok_or_else(|| ValidationError::InvalidMode(echo_mode(&format!("\"{}\"", name))))
}

fn echo_mode(value: &str) -> String {
    if value.chars().count() <= MAX_ECHOED_MODE_CHARS {
        return value.to_string();
    }
    let mut echoed: String = value.chars().take(MAX_ECHOED_MODE_CHARS).collect();
    echoed.push('…');
    echoed
}
