use crate::config::Config;
use crate::errors::AppError;
use crate::extraction::UserExtractor;
use crate::models::{
    ExtractUserAsyncResponse, ExtractedUser, ExtractionRequest, SupabaseReadRequest,
    SupabaseReadResponse,
};
use crate::queue::QueueService;
use crate::supabase_client::SupabaseClient;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, loaded once at startup.
    pub config: Config,
    /// Structured extraction client.
    pub extractor: UserExtractor,
    /// Queue dispatcher; `None` when `SQS_QUEUE_URL` is unset.
    pub queue: Option<QueueService>,
    /// Supabase REST client; `None` when URL or key is unset.
    pub supabase: Option<SupabaseClient>,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "gen-ai-on-aws",
            "version": state.config.app_version,
        })),
    )
}

/// GET /endpoints/hello
#[utoipa::path(
    get,
    path = "/endpoints/hello",
    responses((status = 200, description = "Greeting", body = String))
)]
pub async fn hello() -> Json<&'static str> {
    Json("Hello, world!")
}

/// POST /endpoints/extract-user
///
/// Synchronous extraction. Returns `null` when the text holds no confident
/// identity or the provider call fails.
#[utoipa::path(
    post,
    path = "/endpoints/extract-user",
    request_body = ExtractionRequest,
    responses((status = 200, description = "Extracted user, or null", body = ExtractedUser))
)]
pub async fn extract_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExtractionRequest>,
) -> Json<Option<ExtractedUser>> {
    Json(state.extractor.extract_user(&request, None).await)
}

/// POST /endpoints/extract-user-async
///
/// Enqueues the request for the worker and returns the tracking id.
#[utoipa::path(
    post,
    path = "/endpoints/extract-user-async",
    request_body = ExtractionRequest,
    responses(
        (status = 200, description = "Request accepted", body = ExtractUserAsyncResponse),
        (status = 500, description = "Queue not configured or send failed")
    )
)]
pub async fn extract_user_async(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExtractionRequest>,
) -> Result<Json<ExtractUserAsyncResponse>, AppError> {
    let queue = state
        .queue
        .as_ref()
        .ok_or_else(|| AppError::Configuration("SQS queue URL not configured".to_string()))?;

    tracing::info!(
        app_version = %state.config.app_version,
        "Sending async request to extract user from text: {}",
        request.text
    );

    let request_id = queue
        .send_message(&request)
        .await
        .ok_or_else(|| AppError::Internal("Failed to send message to queue".to_string()))?;

    tracing::info!(request_id = %request_id, "Async extraction request queued");

    Ok(Json(ExtractUserAsyncResponse { request_id }))
}

/// POST /endpoints/supabase-read
///
/// Reads rows from a table. A non-2xx answer from Supabase is passed
/// through with the same status.
#[utoipa::path(
    post,
    path = "/endpoints/supabase-read",
    request_body = SupabaseReadRequest,
    responses(
        (status = 200, description = "Rows read", body = SupabaseReadResponse),
        (status = 500, description = "Supabase not configured or unreachable")
    )
)]
pub async fn supabase_read(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SupabaseReadRequest>,
) -> Result<Json<SupabaseReadResponse>, AppError> {
    let supabase = state.supabase.as_ref().ok_or_else(|| {
        AppError::Configuration(
            "Supabase URL and key must be configured in environment variables".to_string(),
        )
    })?;

    tracing::info!("Reading from Supabase table: {}", request.table);

    match supabase
        .read_table(&request.table, &request.select, request.limit)
        .await
    {
        Ok(data) => Ok(Json(SupabaseReadResponse { data })),
        Err(AppError::Upstream { status, message }) => {
            tracing::error!("HTTP error reading from Supabase: {} {}", status, message);
            Err(AppError::Upstream {
                status,
                message: format!("Failed to read from Supabase: {}", message),
            })
        }
        Err(e) => {
            tracing::error!("Error reading from Supabase: {}", e);
            Err(AppError::Internal(format!(
                "Failed to read from Supabase: {}",
                e
            )))
        }
    }
}

impl AppState {
    /// Builds every client the handlers need from a loaded `Config`.
    ///
    /// Optional integrations stay `None` when their settings are missing; the
    /// matching endpoints then answer with a configuration error.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let llm = crate::llm_client::LlmClient::new(&config.llm)?;
        tracing::info!("✓ LLM client initialized: {:?} {}", llm.provider(), llm.model());
        let extractor = UserExtractor::new(llm, config.app_version.clone());

        let queue = match config.sqs_queue_url {
            Some(ref url) => {
                let sqs = crate::queue::SqsQueue::from_env(url.clone()).await;
                tracing::info!("✓ SQS queue client initialized: {}", url);
                Some(QueueService::new(Arc::new(sqs)))
            }
            None => None,
        };

        let supabase = match config.supabase_credentials() {
            Some((url, key)) => {
                let client = SupabaseClient::new(url, key)?;
                tracing::info!("✓ Supabase client initialized: {}", url);
                Some(client)
            }
            None => None,
        };

        Ok(Self {
            config,
            extractor,
            queue,
            supabase,
        })
    }
}
