/// Worker tests with a mocked LLM provider
/// Drives full invocation events through `Worker::handle`
mod common;

use common::{anthropic_tool_answer, create_test_config, extractor_for};
use gen_ai_on_aws::models::{ExtractionRequest, QueueMessage};
use gen_ai_on_aws::worker::Worker;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn worker_with_answer(server: &MockServer, user: Value) -> Worker {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_tool_answer(user)))
        .mount(server)
        .await;
    Worker::new(extractor_for(&create_test_config(server.uri())))
}

fn message_body(request_id: &str, text: &str) -> String {
    serde_json::to_string(&QueueMessage {
        request_id: request_id.to_string(),
        payload: ExtractionRequest {
            text: text.to_string(),
        },
    })
    .unwrap()
}

fn results_of(body: &str) -> Vec<Value> {
    let parsed: Value = serde_json::from_str(body).unwrap();
    parsed["results"].as_array().unwrap().clone()
}

#[tokio::test]
async fn test_batch_reports_each_record_in_order() {
    let server = MockServer::start().await;
    let worker = worker_with_answer(
        &server,
        json!({"name": "John Doe", "age": 30, "email": "john@example.com"}),
    )
    .await;

    let event = json!({"Records": [
        {"body": message_body("req-1", "John Doe, 30, john@example.com")},
        {"body": "not json at all"},
        {"body": message_body("req-3", "John Doe again")}
    ]});

    let response = worker.handle(event).await;
    assert_eq!(response.status_code, 200);

    let results = results_of(&response.body);
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["request_id"], "req-1");
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["result"]["name"], "John Doe");

    assert_eq!(results[1]["success"], false);
    assert!(results[1]["error"].is_string());

    assert_eq!(results[2]["request_id"], "req-3");
    assert_eq!(results[2]["success"], true);
}

#[tokio::test]
async fn test_direct_invocation_processes_single_message() {
    let server = MockServer::start().await;
    let worker = worker_with_answer(&server, json!({"name": "Jane", "age": 25})).await;

    let event = json!({"request_id": "direct-1", "payload": {"text": "I am Jane, 25"}});
    let response = worker.handle(event).await;

    let results = results_of(&response.body);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["request_id"], "direct-1");
    assert_eq!(results[0]["result"]["age"], 25);
}

#[tokio::test]
async fn test_no_identity_still_counts_as_success() {
    let server = MockServer::start().await;
    let worker = worker_with_answer(&server, Value::Null).await;

    let response = worker
        .handle(json!({"Records": [{"body": message_body("req-9", "weather is nice")}]}))
        .await;

    let results = results_of(&response.body);
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["result"], Value::Null);
}

#[tokio::test]
async fn test_empty_batch_returns_empty_results() {
    let server = MockServer::start().await;
    let worker = Worker::new(extractor_for(&create_test_config(server.uri())));

    let response = worker.handle(json!({"Records": []})).await;

    assert_eq!(response.status_code, 200);
    assert!(results_of(&response.body).is_empty());
}

#[tokio::test]
async fn test_record_without_body_is_failure() {
    let server = MockServer::start().await;
    let worker = Worker::new(extractor_for(&create_test_config(server.uri())));

    let response = worker.handle(json!({"Records": [{"messageId": "m1"}]})).await;

    let results = results_of(&response.body);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["success"], false);
}
