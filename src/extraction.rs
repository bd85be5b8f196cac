use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::{ExtractedUser, ExtractionEnvelope, ExtractionRequest};
use tracing::Instrument;

pub const EXTRACTION_SYSTEM_PROMPT: &str = "Extract user information from the provided text. \
If no valid user information is found, return None. \
Only extract information if you're confident about the values.";

const EXTRACTION_TOOL_NAME: &str = "extract_user";

/// Result of one extraction call, before it is collapsed for callers.
#[derive(Debug)]
pub enum ExtractionOutcome {
    Extracted(ExtractedUser),
    /// The model answered, but found no confident identity.
    NoMatch,
    /// The provider call failed.
    Failed(AppError),
}

impl ExtractionOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionOutcome::Extracted(_) => "extracted",
            ExtractionOutcome::NoMatch => "no_match",
            ExtractionOutcome::Failed(_) => "failed",
        }
    }

    /// Collapses "no match" and "failed" into `None`.
    pub fn into_user(self) -> Option<ExtractedUser> {
        match self {
            ExtractionOutcome::Extracted(user) => Some(user),
            ExtractionOutcome::NoMatch | ExtractionOutcome::Failed(_) => None,
        }
    }
}

/// Structured extraction of `name`/`age`/`email` from free text.
#[derive(Clone)]
pub struct UserExtractor {
    llm: LlmClient,
    app_version: String,
}

impl UserExtractor {
    pub fn new(llm: LlmClient, app_version: impl Into<String>) -> Self {
        Self {
            llm,
            app_version: app_version.into(),
        }
    }

    /// Runs one extraction and keeps the outcome kind visible.
    ///
    /// Emits one `extract_user` span tagged with the app version and, when
    /// given, the request id.
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
        request_id: Option<&str>,
    ) -> ExtractionOutcome {
        let span = tracing::info_span!(
            "extract_user",
            app_version = %self.app_version,
            request_id = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );
        if let Some(id) = request_id {
            span.record("request_id", id);
        }

        let outcome = async {
            tracing::info!("Extracting user from text: {}", request.text);

            match self
                .llm
                .structured_completion::<ExtractionEnvelope>(
                    EXTRACTION_TOOL_NAME,
                    EXTRACTION_SYSTEM_PROMPT,
                    &request.text,
                )
                .await
            {
                Ok(ExtractionEnvelope { user: Some(user) }) => ExtractionOutcome::Extracted(user),
                Ok(ExtractionEnvelope { user: None }) => ExtractionOutcome::NoMatch,
                Err(e) => {
                    tracing::error!(error_kind = e.kind(), "Error extracting user: {}", e);
                    ExtractionOutcome::Failed(e)
                }
            }
        }
        .instrument(span.clone())
        .await;

        span.record("outcome", outcome.kind());
        outcome
    }

    /// Fail-soft extraction: `None` for both "no match" and provider errors.
    pub async fn extract_user(
        &self,
        request: &ExtractionRequest,
        request_id: Option<&str>,
    ) -> Option<ExtractedUser> {
        let outcome = self.extract(request, request_id).await;
        tracing::debug!(outcome = outcome.kind(), request_id = ?request_id, "Extraction finished");
        outcome.into_user()
    }
}
