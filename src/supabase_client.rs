use crate::errors::AppError;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Embedded-resource select used for the call-configuration lookup: the
/// phone number with its account and agent, plus per-location extras.
pub const CALL_CONFIGURATION_SELECT: &str = "*,\
phone_number!inner(*,aura_account!inner(*),agent_version!left(*,agent!inner(*))),\
hotel_restaurants!left(*),\
closure_periods!left(*)";

const CALL_CONFIGURATION_TABLE: &str = "onboarding_data";

/// Client for the Supabase PostgREST endpoint.
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    /// Creates a new `SupabaseClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The project URL, without the `/rest/v1` suffix.
    /// * `api_key` - The service key, sent both as `apikey` and bearer token.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::External(format!("Failed to create Supabase client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn get_rows(&self, table: &str, params: &[(&str, String)]) -> Result<Vec<Value>, AppError> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        tracing::debug!("Supabase GET {} ({} params)", url, params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| AppError::External(format!("Supabase request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Upstream {
                status,
                message: error_text,
            });
        }

        response.json().await.map_err(|e| {
            AppError::External(format!("Failed to parse Supabase response: {}", e))
        })
    }

    /// Reads rows from `table`, selecting `select` and optionally capping at `limit`.
    ///
    /// A zero limit is treated as "no limit".
    pub async fn read_table(
        &self,
        table: &str,
        select: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Value>, AppError> {
        let mut params = vec![("select", select.to_string())];
        if let Some(limit) = limit.filter(|l| *l > 0) {
            params.push(("limit", limit.to_string()));
        }

        self.get_rows(table, &params).await
    }

    /// One joined read of every location row configured for `called_number`.
    pub async fn fetch_call_configuration(&self, called_number: &str) -> Result<Vec<Value>, AppError> {
        let params = [
            ("select", CALL_CONFIGURATION_SELECT.to_string()),
            ("phone_number.phone_number", format!("eq.{}", called_number)),
        ];

        self.get_rows(CALL_CONFIGURATION_TABLE, &params).await
    }
}
