//! Queue worker entry point.
//!
//! Runs under the Lambda runtime and accepts either an SQS delivery batch
//! (`{"Records": [...]}`) or a direct `{"request_id", "payload"}` invocation.

use gen_ai_on_aws::config::Config;
use gen_ai_on_aws::core::extraction::UserExtractor;
use gen_ai_on_aws::core::worker::{Worker, WorkerResponse};
use gen_ai_on_aws::integrations::llm_client::LlmClient;
use gen_ai_on_aws::obs::{init_tracing, log_format_from_env};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    init_tracing(log_format_from_env()?, "gen_ai_on_aws=info");

    let config = Config::from_env()?;
    let llm = LlmClient::new(&config.llm)?;
    tracing::info!("Worker ready ({:?} {})", llm.provider(), llm.model());
    let worker = Worker::new(UserExtractor::new(llm, config.app_version.clone()));

    let worker = &worker;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<WorkerResponse, Error>(worker.handle(event.payload).await)
    }))
    .await
}
