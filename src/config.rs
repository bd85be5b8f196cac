/// Callers rejected before any data-store access when `BLOCKED_CALLER_IDS` is unset.
pub const DEFAULT_BLOCKED_CALLER_IDS: &[&str] = &["+41793000161", "+491787169629"];

pub const DEFAULT_LLM_MODEL: &str = "anthropic/claude-sonnet-4-5-20250929";

/// LLM providers reachable through the `<provider>/<model>` routing prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Anthropic,
    OpenAi,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "https://api.anthropic.com",
            LlmProvider::OpenAi => "https://api.openai.com/v1",
        }
    }

    fn api_key_var(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
            LlmProvider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// Parses a `LOG_FORMAT` value. Unset or blank means compact; matching ignores case.
    pub fn parse(raw: Option<&str>) -> anyhow::Result<Self> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(LogFormat::Compact),
            Some(value) if value.eq_ignore_ascii_case("compact") => Ok(LogFormat::Compact),
            Some(value) if value.eq_ignore_ascii_case("json") => Ok(LogFormat::Json),
            Some(other) => {
                anyhow::bail!("LOG_FORMAT must be 'compact' or 'json', got '{}'", other)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Full routing string, e.g. `anthropic/claude-sonnet-4-5-20250929`.
    pub model: String,
    pub api_key: String,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Splits the routing string into provider and provider-side model name.
    pub fn route(&self) -> anyhow::Result<(LlmProvider, &str)> {
        parse_model_route(&self.model)
    }

    pub fn base_url(&self) -> anyhow::Result<String> {
        let (provider, _) = self.route()?;
        Ok(self
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub llm: LlmConfig,
    pub sqs_queue_url: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub webhook_auth: Option<String>,
    pub blocked_caller_ids: Vec<String>,
    pub app_version: String,
}

/// Parses `<provider>/<model>` into its parts.
pub fn parse_model_route(model: &str) -> anyhow::Result<(LlmProvider, &str)> {
    let (prefix, name) = model
        .split_once('/')
        .ok_or_else(|| anyhow::anyhow!("LLM_MODEL must look like <provider>/<model>, got '{}'", model))?;

    if name.trim().is_empty() {
        anyhow::bail!("LLM_MODEL is missing the model name after '{}/'", prefix);
    }

    let provider = match prefix {
        "anthropic" => LlmProvider::Anthropic,
        "openai" => LlmProvider::OpenAi,
        other => anyhow::bail!("Unsupported LLM provider '{}'", other),
    };

    Ok((provider, name))
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn parse_caller_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let model = optional_var("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string());
        let (provider, _) = parse_model_route(&model)?;

        let llm = LlmConfig {
            api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var(provider.api_key_var()))
                .map_err(|_| {
                    anyhow::anyhow!(
                        "LLM_API_KEY or {} environment variable required",
                        provider.api_key_var()
                    )
                })
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("LLM_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            base_url: optional_var("LLM_BASE_URL")
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("LLM_BASE_URL must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })
                .transpose()?,
            timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("LLM_TIMEOUT_SECS must be a whole number of seconds"))?,
            model,
        };

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            llm,
            sqs_queue_url: optional_var("SQS_QUEUE_URL"),
            supabase_url: optional_var("SUPABASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            supabase_key: optional_var("SUPABASE_KEY"),
            webhook_auth: optional_var("ELEVENLABS_WEBHOOK_AUTH"),
            blocked_caller_ids: match std::env::var("BLOCKED_CALLER_IDS") {
                Ok(raw) => parse_caller_list(&raw),
                Err(_) => DEFAULT_BLOCKED_CALLER_IDS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            app_version: optional_var("APP_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
        };

        // Never log key material
        tracing::debug!("LLM model: {}", config.llm.model);
        if let Some(ref url) = config.sqs_queue_url {
            tracing::debug!("SQS queue URL: {}", url);
        } else {
            tracing::warn!("SQS_QUEUE_URL not set; async extraction is disabled");
        }
        if config.supabase_url.is_none() || config.supabase_key.is_none() {
            tracing::warn!("SUPABASE_URL/SUPABASE_KEY not set; Supabase endpoints are disabled");
        }
        if config.webhook_auth.is_none() {
            tracing::warn!("ELEVENLABS_WEBHOOK_AUTH not set; webhook requests will be rejected");
        }
        tracing::debug!("Blocked caller ids: {}", config.blocked_caller_ids.len());
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Supabase URL and key, only when both are configured.
    pub fn supabase_credentials(&self) -> Option<(&str, &str)> {
        match (&self.supabase_url, &self.supabase_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }

    pub fn is_blocked_caller(&self, caller_id: &str) -> bool {
        self.blocked_caller_ids.iter().any(|id| id == caller_id)
    }
}
