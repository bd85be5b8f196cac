use crate::config::{LlmConfig, LlmProvider};
use crate::errors::AppError;
use reqwest::Client;
use schemars::{gen::SchemaSettings, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Completion client that routes `<provider>/<model>` strings to the
/// matching vendor API and constrains the answer to a JSON schema.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    provider: LlmProvider,
    model: String,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    input: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

/// Inlined draft-07 schema for `T`, without `$ref`s or the meta-schema key.
pub fn json_schema_for<T: JsonSchema>() -> Result<Value, AppError> {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let schema = settings.into_generator().into_root_schema_for::<T>();
    serde_json::to_value(schema)
        .map_err(|e| AppError::Internal(format!("Failed to serialize output schema: {}", e)))
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self, AppError> {
        let (provider, model) = config
            .route()
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        let base_url = config
            .base_url()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::External(format!("Failed to create LLM client: {}", e))
            })?;

        Ok(Self {
            client,
            provider,
            model: model.to_string(),
            api_key: config.api_key.clone(),
            base_url,
        })
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Asks the model for an answer shaped like `T`.
    ///
    /// `tool_name` names the schema on the wire (tool name for Anthropic,
    /// `json_schema.name` for OpenAI).
    pub async fn structured_completion<T>(
        &self,
        tool_name: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<T, AppError>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let schema = json_schema_for::<T>()?;
        let start = std::time::Instant::now();

        let value = match self.provider {
            LlmProvider::Anthropic => {
                self.anthropic_tool_call(tool_name, schema, system_prompt, user_prompt)
                    .await?
            }
            LlmProvider::OpenAi => {
                self.openai_json_schema(tool_name, schema, system_prompt, user_prompt)
                    .await?
            }
        };

        tracing::debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "LLM structured completion"
        );

        serde_json::from_value(value).map_err(|e| {
            AppError::External(format!("LLM answer did not match schema: {}", e))
        })
    }

    async fn anthropic_tool_call(
        &self,
        tool_name: &str,
        schema: Value,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Value, AppError> {
        let url = format!("{}/v1/messages", self.base_url);

        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": system_prompt,
            "messages": [
                {"role": "user", "content": user_prompt}
            ],
            "tools": [{
                "name": tool_name,
                "description": "Record the structured answer.",
                "input_schema": schema,
            }],
            "tool_choice": {"type": "tool", "name": tool_name},
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::External(format!("Anthropic request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::External(format!(
                "Anthropic returned {}: {}",
                status, error_text
            )));
        }

        let parsed: AnthropicResponse = response.json().await.map_err(|e| {
            AppError::External(format!("Failed to parse Anthropic response: {}", e))
        })?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "tool_use")
            .and_then(|block| block.input)
            .ok_or_else(|| {
                AppError::External("Anthropic response has no tool_use block".to_string())
            })
    }

    async fn openai_json_schema(
        &self,
        schema_name: &str,
        schema: Value,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Value, AppError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema_name,
                    "schema": schema,
                    "strict": false,
                }
            },
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::External(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::External(format!(
                "OpenAI returned {}: {}",
                status, error_text
            )));
        }

        let parsed: OpenAiResponse = response.json().await.map_err(|e| {
            AppError::External(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::External("No response from OpenAI".to_string()))?;

        serde_json::from_str(&content).map_err(|e| {
            AppError::External(format!("OpenAI content is not JSON: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractionEnvelope;

    fn config(model: &str) -> LlmConfig {
        LlmConfig {
            model: model.to_string(),
            api_key: "sk-test".to_string(),
            base_url: None,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_client_routes_by_prefix() {
        let client = LlmClient::new(&config("anthropic/claude-sonnet-4-5-20250929")).unwrap();
        assert_eq!(client.provider(), LlmProvider::Anthropic);
        assert_eq!(client.model(), "claude-sonnet-4-5-20250929");
        assert_eq!(client.base_url, "https://api.anthropic.com");

        let client = LlmClient::new(&config("openai/gpt-4o-mini")).unwrap();
        assert_eq!(client.provider(), LlmProvider::OpenAi);
        assert_eq!(client.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_client_rejects_unknown_provider() {
        assert!(matches!(
            LlmClient::new(&config("cohere/command")),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_envelope_schema_is_inlined_object() {
        let schema = json_schema_for::<ExtractionEnvelope>().unwrap();
        assert_eq!(schema["type"], "object");
        assert!(schema.get("definitions").is_none());
        assert!(schema["properties"].get("user").is_some());
        assert!(!schema.to_string().contains("$ref"));
    }
}
