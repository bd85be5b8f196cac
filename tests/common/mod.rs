//! Shared helpers for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use gen_ai_on_aws::config::{Config, LlmConfig};
use gen_ai_on_aws::errors::AppError;
use gen_ai_on_aws::extraction::UserExtractor;
use gen_ai_on_aws::handlers::AppState;
use gen_ai_on_aws::llm_client::LlmClient;
use gen_ai_on_aws::queue::{MessageQueue, QueueService};
use gen_ai_on_aws::routes::api_router;
use gen_ai_on_aws::integrations::supabase_client::SupabaseClient;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "test-auth-token";

/// Helper function to create test config
pub fn create_test_config(llm_base_url: String) -> Config {
    Config {
        port: 8080,
        llm: LlmConfig {
            model: "anthropic/claude-sonnet-4-5-20250929".to_string(),
            api_key: "test_key".to_string(),
            base_url: Some(llm_base_url),
            timeout_secs: 5,
        },
        sqs_queue_url: None,
        supabase_url: None,
        supabase_key: None,
        webhook_auth: Some(WEBHOOK_SECRET.to_string()),
        blocked_caller_ids: vec!["+41793000161".to_string(), "+491787169629".to_string()],
        app_version: "test".to_string(),
    }
}

pub fn extractor_for(config: &Config) -> UserExtractor {
    let llm = LlmClient::new(&config.llm).expect("llm client");
    UserExtractor::new(llm, config.app_version.clone())
}

/// Queue double that records every body it receives.
#[derive(Default)]
pub struct RecordingQueue {
    pub bodies: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl MessageQueue for RecordingQueue {
    async fn send(&self, body: String) -> Result<String, AppError> {
        if self.fail {
            return Err(AppError::External("queue unavailable".to_string()));
        }
        let mut bodies = self.bodies.lock().await;
        bodies.push(body);
        Ok(format!("msg-{}", bodies.len()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub queue: Arc<RecordingQueue>,
}

/// Builds the router with optional Supabase and queue wiring.
pub fn build_app(
    config: Config,
    supabase_base_url: Option<String>,
    queue: Option<Arc<RecordingQueue>>,
) -> TestApp {
    assemble(config, supabase_base_url, queue.unwrap_or_default(), true)
}

/// Same as `build_app`, but as if `SQS_QUEUE_URL` were unset. The returned
/// queue is never wired into the state, so it must stay empty.
pub fn build_app_without_queue(config: Config) -> TestApp {
    assemble(config, None, Arc::default(), false)
}

fn assemble(
    config: Config,
    supabase_base_url: Option<String>,
    queue: Arc<RecordingQueue>,
    queue_configured: bool,
) -> TestApp {
    let wired = queue_configured.then(|| queue.clone());
    TestApp {
        router: api_router(build_state(config, supabase_base_url, wired)),
        queue,
    }
}

/// Shared state with optional Supabase and queue wiring.
pub fn build_state(
    config: Config,
    supabase_base_url: Option<String>,
    queue: Option<Arc<RecordingQueue>>,
) -> Arc<AppState> {
    let supabase = supabase_base_url
        .map(|url| SupabaseClient::new(url, "test-key").expect("supabase client"));
    Arc::new(AppState {
        extractor: extractor_for(&config),
        queue: queue.map(|q| QueueService::new(q)),
        supabase,
        config,
    })
}

pub fn anthropic_tool_answer(user: Value) -> Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{
            "type": "tool_use",
            "id": "toolu_test",
            "name": "extract_user",
            "input": {"user": user}
        }],
        "stop_reason": "tool_use"
    })
}

pub async fn post_json(
    router: &Router,
    uri: &str,
    body: Value,
    auth: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("auth", auth);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    send(router, request).await
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).to_string(),
        ))
    };
    (status, value)
}
