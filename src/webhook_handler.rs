use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::handlers::AppState;
use crate::phone::{format_phone_number, last_two_digits, sms_capability_details};
use crate::supabase_client::SupabaseClient;
use crate::webhook_models::{DynamicVariables, LocationSummary, WebhookCallPayload, WebhookResponse};
use axum::{extract::State, http::HeaderMap, Json};
use serde_json::Value;
use std::sync::Arc;

pub const AUTH_HEADER: &str = "auth";

pub const ERROR_NUMBER_BLOCKED: &str = "Number blocked";
pub const ERROR_NO_CONFIGURATION: &str = "Could not find client configuration";
pub const ERROR_FETCH_FAILED: &str = "Failed to fetch configuration";
pub const ERROR_INTERNAL: &str = "Internal processing error";

/// Conversation-initiation webhook.
///
/// Authenticates the `auth` header, then resolves the dynamic variables for
/// the called number. Once authenticated the response is always 200; lookup
/// failures are reported through an `error` variable.
#[utoipa::path(
    post,
    path = "/endpoints/elevenlabs-webhook",
    request_body = WebhookCallPayload,
    params(("auth" = String, Header, description = "Shared webhook secret")),
    responses(
        (status = 200, description = "Dynamic variables or an error variable", body = WebhookResponse),
        (status = 401, description = "Missing or invalid auth header"),
        (status = 500, description = "Webhook secret or Supabase not configured")
    )
)]
pub async fn elevenlabs_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<WebhookCallPayload>,
) -> Result<Json<WebhookResponse>, AppError> {
    tracing::info!(
        "Processing webhook for conversation {}",
        payload.conversation_id
    );

    verify_webhook_auth(state.config.webhook_auth.as_deref(), &headers)?;

    let supabase = state.supabase.as_ref().ok_or_else(|| {
        AppError::Configuration(
            "Supabase URL and key must be configured in environment variables".to_string(),
        )
    })?;

    let response = resolve_dynamic_variables(supabase, &state.config, &payload).await;
    if let Some(error) = response.error_message() {
        tracing::warn!(
            "Webhook for conversation {} answered with error: {}",
            payload.conversation_id,
            error
        );
    }

    Ok(Json(response))
}

/// Checks the shared-secret header.
///
/// Order matters: an unconfigured secret is a server fault (500) even when
/// the header is missing.
pub fn verify_webhook_auth(expected: Option<&str>, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = expected else {
        tracing::error!("ELEVENLABS_WEBHOOK_AUTH not configured in environment");
        return Err(AppError::Configuration(
            "Webhook authentication not configured".to_string(),
        ));
    };

    let provided = headers
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let Some(provided) = provided else {
        tracing::warn!("Missing auth header in webhook request");
        return Err(AppError::Unauthorized(
            "Missing authentication header".to_string(),
        ));
    };

    if !constant_time_compare(provided, expected) {
        let shown: String = provided.chars().take(10).collect();
        tracing::warn!("Invalid auth header received: {}...", shown);
        return Err(AppError::Unauthorized("Unauthorized".to_string()));
    }

    Ok(())
}

/// Constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Blocklist gate, one joined lookup, then mapping.
///
/// Never fails: every problem is turned into an `error` variable.
pub async fn resolve_dynamic_variables(
    supabase: &SupabaseClient,
    config: &Config,
    payload: &WebhookCallPayload,
) -> WebhookResponse {
    if config.is_blocked_caller(&payload.caller_id) {
        tracing::warn!("Blocked caller: {}", payload.caller_id);
        return WebhookResponse::error(ERROR_NUMBER_BLOCKED);
    }

    let rows = match supabase
        .fetch_call_configuration(&payload.called_number)
        .await
        .with_context(|| format!("Fetching configuration for {}", payload.called_number))
    {
        Ok(rows) => rows,
        Err(e) => return lookup_failure(e),
    };

    if rows.is_empty() {
        tracing::warn!("No configuration found for number: {}", payload.called_number);
        return WebhookResponse::error(ERROR_NO_CONFIGURATION);
    }

    match build_dynamic_variables(&rows, &payload.caller_id) {
        Ok(variables) => {
            tracing::info!(
                "Successfully processed webhook for {}",
                variables
                    .get("host_name")
                    .filter(|name| !name.is_empty())
                    .map(String::as_str)
                    .unwrap_or("Unknown")
            );
            WebhookResponse::new(variables)
        }
        Err(e) => lookup_failure(e),
    }
}

fn lookup_failure(error: AppError) -> WebhookResponse {
    match error.root() {
        AppError::Upstream { .. } => {
            tracing::error!("Supabase error: {}", error);
            WebhookResponse::error(ERROR_FETCH_FAILED)
        }
        _ => {
            tracing::error!(
                error_kind = error.kind(),
                "Unexpected error processing webhook: {}",
                error
            );
            WebhookResponse::error(ERROR_INTERNAL)
        }
    }
}

/// String value of `key`; `default` when missing or null.
fn string_field(object: &Value, key: &str, default: &str) -> String {
    match object.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn python_bool(value: bool) -> String {
    let text = if value { "True" } else { "False" };
    text.to_string()
}

/// Maps the joined location rows to the agent's dynamic variables.
///
/// Account and agent settings come from the first row; `mode` reflects how
/// many locations share the called number.
pub fn build_dynamic_variables(
    rows: &[Value],
    caller_id: &str,
) -> Result<DynamicVariables, AppError> {
    let first = rows.first().ok_or_else(|| {
        AppError::Internal("Cannot map an empty configuration result".to_string())
    })?;

    let empty = Value::Object(Default::default());
    let phone_number_config = first.get("phone_number").unwrap_or(&empty);
    let account = phone_number_config.get("aura_account").unwrap_or(&empty);
    let agent_config = phone_number_config.get("agent_config").unwrap_or(&empty);

    let formatted_phone_number = format_phone_number(caller_id);
    let mode = if rows.len() == 1 {
        "single-location"
    } else {
        "multi-location"
    };
    let test_account = account
        .get("test_account")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut variables = DynamicVariables::new();
    variables.insert("host_name".into(), string_field(account, "name", ""));
    variables.insert("test_account".into(), python_bool(test_account));
    variables.insert("mode".into(), mode.to_string());
    variables.insert(
        "hotel_category".into(),
        string_field(account, "hotel_category", ""),
    );
    variables.insert(
        "preferred_currency".into(),
        string_field(account, "preferred_currency", "EUR"),
    );
    variables.insert(
        "welcomeMessage".into(),
        string_field(agent_config, "welcomeMessage", ""),
    );
    variables.insert(
        "agent_name".into(),
        string_field(agent_config, "agentName", ""),
    );
    variables.insert(
        "formOfAddress".into(),
        string_field(agent_config, "formOfAddress", "Formal"),
    );
    variables.insert(
        "last_two_digits".into(),
        last_two_digits(&formatted_phone_number),
    );
    variables.insert("formatted_user_number".into(), formatted_phone_number);
    variables.insert(
        "can_phone_number_receive_sms_details".into(),
        sms_capability_details(caller_id).to_string(),
    );
    variables.insert("location_details".into(), serialize_locations(rows)?);

    Ok(variables)
}

/// Compact JSON list of location summaries.
pub fn serialize_locations(rows: &[Value]) -> Result<String, AppError> {
    let locations: Vec<LocationSummary> = rows.iter().map(LocationSummary::from_row).collect();
    Ok(serde_json::to_string(&locations)?)
}
