use crate::errors::AppError;
use crate::models::{ExtractionRequest, QueueMessage};
use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use std::sync::Arc;

/// A managed queue that accepts text message bodies.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Submits one message body and returns the provider's message id.
    async fn send(&self, body: String) -> Result<String, AppError>;
}

/// Amazon SQS queue addressed by URL.
#[derive(Clone)]
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsQueue {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    /// Builds a client from the default AWS credential/region chain.
    pub async fn from_env(queue_url: impl Into<String>) -> Self {
        let shared = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_sqs::Client::new(&shared), queue_url)
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn send(&self, body: String) -> Result<String, AppError> {
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| {
                AppError::External(format!(
                    "SQS send_message failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(output.message_id().unwrap_or_default().to_string())
    }
}

/// Wraps extraction requests in a `QueueMessage` and enqueues them.
#[derive(Clone)]
pub struct QueueService {
    queue: Arc<dyn MessageQueue>,
}

impl QueueService {
    pub fn new(queue: Arc<dyn MessageQueue>) -> Self {
        Self { queue }
    }

    /// Enqueues the request and returns its fresh request id.
    pub async fn try_send_message(&self, payload: &ExtractionRequest) -> Result<String, AppError> {
        let message = QueueMessage::new(payload.clone());
        let body = serde_json::to_string(&message)?;

        let message_id = self.queue.send(body).await?;
        tracing::info!(
            "Message sent to queue. Message ID: {}, Request ID: {}",
            message_id,
            message.request_id
        );

        Ok(message.request_id)
    }

    /// Fail-soft variant: any submission error becomes `None`.
    pub async fn send_message(&self, payload: &ExtractionRequest) -> Option<String> {
        match self.try_send_message(payload).await {
            Ok(request_id) => Some(request_id),
            Err(e) => {
                tracing::error!(error_kind = e.kind(), "Error sending message to queue: {}", e);
                None
            }
        }
    }
}
