//! Queue consumer: turns delivered `QueueMessage` bodies into extraction
//! results, one message at a time in delivery order.
//!
//! No deduplication happens here. A redelivered message (visibility timeout
//! expired while the LLM was still answering) is extracted again.

use crate::extraction::UserExtractor;
use crate::models::{ExtractedUser, QueueMessage};
use serde::Serialize;
use serde_json::{json, Value};

/// Per-message outcome reported back to the invoker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageResult {
    Processed {
        request_id: String,
        result: Option<ExtractedUser>,
        success: bool,
    },
    Failed {
        error: String,
        success: bool,
    },
}

impl MessageResult {
    pub fn is_success(&self) -> bool {
        matches!(self, MessageResult::Processed { .. })
    }
}

/// The two invocation shapes the worker accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    /// `{"request_id": ..., "payload": {...}}` sent straight to the function.
    Direct(String),
    /// `{"Records": [{"body": "..."}, ...]}` from a queue delivery.
    Batch(Vec<String>),
}

impl WorkerEvent {
    /// Classifies a raw invocation event into message bodies.
    ///
    /// A record without a `body` contributes `"{}"`, which later fails to
    /// deserialize and is reported as a failure record.
    pub fn from_value(event: &Value) -> Self {
        if event.get("request_id").is_some() && event.get("payload").is_some() {
            return WorkerEvent::Direct(event.to_string());
        }

        let bodies = event
            .get("Records")
            .and_then(Value::as_array)
            .map(|records| {
                records
                    .iter()
                    .map(|record| match record.get("body") {
                        Some(Value::String(body)) => body.clone(),
                        Some(other) => other.to_string(),
                        None => "{}".to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        WorkerEvent::Batch(bodies)
    }

    pub fn into_bodies(self) -> Vec<String> {
        match self {
            WorkerEvent::Direct(body) => vec![body],
            WorkerEvent::Batch(bodies) => bodies,
        }
    }
}

/// Response envelope returned to the function runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON string of `{"results": [...]}`.
    pub body: String,
}

#[derive(Clone)]
pub struct Worker {
    extractor: UserExtractor,
}

impl Worker {
    pub fn new(extractor: UserExtractor) -> Self {
        Self { extractor }
    }

    /// Deserializes one body and runs extraction for it.
    pub async fn process_message(&self, message_body: &str) -> MessageResult {
        let message: QueueMessage = match serde_json::from_str(message_body) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Error processing message: {}", e);
                return MessageResult::Failed {
                    error: e.to_string(),
                    success: false,
                };
            }
        };

        tracing::info!("Processing message with request ID: {}", message.request_id);

        let result = self
            .extractor
            .extract_user(&message.payload, Some(&message.request_id))
            .await;

        MessageResult::Processed {
            request_id: message.request_id,
            result,
            success: true,
        }
    }

    /// Processes every body in the event sequentially.
    pub async fn process_event(&self, event: WorkerEvent) -> Vec<MessageResult> {
        if let WorkerEvent::Direct(_) = event {
            tracing::info!("Processing direct invocation");
        }

        let mut results = Vec::new();
        for body in event.into_bodies() {
            results.push(self.process_message(&body).await);
        }
        results
    }

    /// Entry point for a raw invocation event.
    pub async fn handle(&self, event: Value) -> WorkerResponse {
        tracing::info!("Received event: {}", event);

        let results = self.process_event(WorkerEvent::from_value(&event)).await;
        let succeeded = results.iter().filter(|r| r.is_success()).count();

        tracing::info!(
            "Processed {} messages ({} succeeded)",
            results.len(),
            succeeded
        );

        WorkerResponse {
            status_code: 200,
            body: json!({ "results": results }).to_string(),
        }
    }
}
