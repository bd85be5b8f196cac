use crate::handlers::{self, AppState};
use crate::models::{
    ExtractUserAsyncResponse, ExtractedUser, ExtractionRequest, SupabaseReadRequest,
    SupabaseReadResponse,
};
use crate::webhook_handler;
use crate::webhook_models::{WebhookCallPayload, WebhookResponse};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Gen AI on AWS", description = "Generative AI on AWS"),
    paths(
        handlers::hello,
        handlers::extract_user,
        handlers::extract_user_async,
        handlers::supabase_read,
        webhook_handler::elevenlabs_webhook,
    ),
    components(schemas(
        ExtractionRequest,
        ExtractedUser,
        ExtractUserAsyncResponse,
        SupabaseReadRequest,
        SupabaseReadResponse,
        WebhookCallPayload,
        WebhookResponse,
    )),
    tags((name = "Endpoints"))
)]
pub struct ApiDoc;

/// Every route except the webhook. These sit behind the per-IP rate limiter.
pub fn rate_limited_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health))
        .route("/endpoints/hello", get(handlers::hello))
        .route("/endpoints/extract-user", post(handlers::extract_user))
        .route(
            "/endpoints/extract-user-async",
            post(handlers::extract_user_async),
        )
        .route("/endpoints/supabase-read", post(handlers::supabase_read))
        .with_state(state)
}

/// The voice-agent webhook. Kept out of the rate limiter so an authenticated
/// call always gets its variables.
pub fn webhook_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/endpoints/elevenlabs-webhook",
            post(webhook_handler::elevenlabs_webhook),
        )
        .with_state(state)
}

/// Body limit, request tracing and CORS for the assembled router.
pub fn with_common_layers(router: Router) -> Router {
    router
        .layer(
            ServiceBuilder::new()
                // Request size limit: 5MB max payload
                .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Full application router without rate limiting, as driven by tests.
pub fn api_router(state: Arc<AppState>) -> Router {
    with_common_layers(rate_limited_routes(state.clone()).merge(webhook_routes(state)))
}

/// Full application router with the per-IP governor on every route but the
/// webhook. One request is replenished every `replenish_secs`, up to `burst`.
pub fn rate_limited_router(
    state: Arc<AppState>,
    replenish_secs: u64,
    burst: u32,
) -> anyhow::Result<Router> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(replenish_secs)
            .burst_size(burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let limited = rate_limited_routes(state.clone()).layer(GovernorLayer {
        config: governor_conf,
    });

    Ok(with_common_layers(limited.merge(webhook_routes(state))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_endpoints() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/endpoints/extract-user"));
        assert!(paths.iter().any(|p| p.as_str() == "/endpoints/elevenlabs-webhook"));
    }
}
