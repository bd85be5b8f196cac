use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ============ Extraction Models ============

/// Free text to mine for identity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractionRequest {
    /// The text to extract user information from.
    pub text: String,
}

/// Identity fields extracted from free text.
///
/// `email` may be absent; that is distinct from an extraction that found
/// nobody at all, which yields no `ExtractedUser`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct ExtractedUser {
    /// The name of the user.
    pub name: String,
    /// The age of the user.
    pub age: i64,
    /// The email of the user.
    #[serde(default)]
    pub email: Option<String>,
}

/// Schema envelope handed to the LLM. `user: null` is the explicit
/// "no confident match" answer.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionEnvelope {
    /// The extracted user, or null when the text holds no confident identity.
    pub user: Option<ExtractedUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExtractUserAsyncResponse {
    /// Unique identifier for the async request.
    pub request_id: String,
}

// ============ Queue Models ============

/// Envelope sent to the async queue.
///
/// Wire format: `{"request_id": "<uuid>", "payload": {"text": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub request_id: String,
    pub payload: ExtractionRequest,
}

impl QueueMessage {
    /// Wraps a payload with a freshly generated request id.
    pub fn new(payload: ExtractionRequest) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            payload,
        }
    }
}

// ============ Supabase Models ============

fn default_select() -> String {
    "*".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupabaseReadRequest {
    /// The name of the Supabase table to read from.
    pub table: String,
    /// The columns to select (e.g. `*` or `id,name`).
    #[serde(default = "default_select")]
    pub select: String,
    /// Maximum number of rows to return.
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupabaseReadResponse {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<serde_json::Value>,
}
