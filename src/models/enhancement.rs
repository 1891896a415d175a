use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

use crate::modes::EnhancementMode;

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementResponse {
    pub enhanced_prompt: String,
    pub mode: EnhancementMode,
    pub model_id: String,
    /// Lengths are counted in characters.
    pub original_length: usize,
    pub enhanced_length: usize,
    /// Upstream usage object, passed through as received.
    pub usage: Option<Value>,
    /// RFC 3339, captured when the response is composed.
    pub timestamp: String,
}
