use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Conversation-initiation event sent by the voice agent platform.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WebhookCallPayload {
    pub caller_id: String,
    pub agent_id: String,
    pub called_number: String,
    pub call_sid: String,
    pub conversation_id: String,
}

/// Flat string variables handed to the conversational agent.
pub type DynamicVariables = BTreeMap<String, String>;

/// Response body for the webhook. Failures travel inside
/// `dynamic_variables` as a single `error` entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct WebhookResponse {
    #[schema(value_type = Object)]
    pub dynamic_variables: DynamicVariables,
}

impl WebhookResponse {
    pub fn new(dynamic_variables: DynamicVariables) -> Self {
        Self { dynamic_variables }
    }

    pub fn error(message: &str) -> Self {
        let mut dynamic_variables = DynamicVariables::new();
        dynamic_variables.insert("error".to_string(), message.to_string());
        Self { dynamic_variables }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.dynamic_variables.get("error").map(String::as_str)
    }
}

const NOT_SPECIFIED: &str = "not_specified";

/// Location fields exposed to the agent. Nothing else from the row is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub location_id: Value,
    pub location_name: Value,
    pub check_in_support_type: Value,
    pub website_url: Value,
    pub contact_email: Value,
}

impl LocationSummary {
    /// Missing keys fall back to `null` (ids, names) or `"not_specified"`;
    /// an explicit `null` in the row is kept as is.
    pub fn from_row(row: &Value) -> Self {
        let field = |key: &str| row.get(key).cloned().unwrap_or(Value::Null);
        let field_or_unspecified = |key: &str| {
            row.get(key)
                .cloned()
                .unwrap_or_else(|| Value::String(NOT_SPECIFIED.to_string()))
        };

        Self {
            location_id: field("id"),
            location_name: field("location_name"),
            check_in_support_type: field_or_unspecified("check_in_support_type"),
            website_url: field_or_unspecified("website_url"),
            contact_email: field_or_unspecified("contact_email"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_payload() {
        let payload: WebhookCallPayload = serde_json::from_value(json!({
            "caller_id": "+19093586520",
            "agent_id": "agent_1",
            "called_number": "+498941434322",
            "call_sid": "CA123",
            "conversation_id": "conv_1"
        }))
        .unwrap();
        assert_eq!(payload.called_number, "+498941434322");
    }

    #[test]
    fn test_error_response_shape() {
        let response = WebhookResponse::error("Number blocked");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"dynamic_variables": {"error": "Number blocked"}})
        );
        assert_eq!(response.error_message(), Some("Number blocked"));
    }

    #[test]
    fn test_location_summary_defaults() {
        let summary = LocationSummary::from_row(&json!({
            "id": "loc1",
            "website_url": null,
            "internal_notes": "secret"
        }));
        assert_eq!(summary.location_id, json!("loc1"));
        assert_eq!(summary.location_name, Value::Null);
        assert_eq!(summary.check_in_support_type, json!("not_specified"));
        assert_eq!(summary.website_url, Value::Null);
        assert_eq!(summary.contact_email, json!("not_specified"));
        assert!(!serde_json::to_string(&summary).unwrap().contains("secret"));
    }
}
