use crate::domain::model::{CustomerPage, PageRequest};
use crate::domain::ports::{ConfigProvider, CustomerSource};
use crate::utils::error::{Result, TallyError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.stripe.com";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const CUSTOMERS_PATH: &str = "/v1/customers";

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Lists customers from a Stripe-compatible API with a (restricted) secret key.
#[derive(Clone)]
pub struct StripeCustomerSource {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl std::fmt::Debug for StripeCustomerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 不輸出金鑰
        f.debug_struct("StripeCustomerSource")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl StripeCustomerSource {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.api_key())
            .with_base_url(config.base_url())
            .with_timeout(Duration::from_secs(config.timeout_seconds()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, CUSTOMERS_PATH)
    }
}

#[async_trait]
impl CustomerSource for StripeCustomerSource {
    async fn list_customers(&self, request: &PageRequest) -> Result<CustomerPage> {
        let mut query = vec![("limit", request.limit.to_string())];
        if let Some(cursor) = &request.starting_after {
            query.push(("starting_after", cursor.clone()));
        }

        tracing::debug!("Making API request to: {}", self.endpoint());
        let response = self
            .client
            .get(self.endpoint())
            .bearer_auth(&self.api_key)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        let body = response.text().await?;

        if !status.is_success() {
            return Err(error_for_status(status, &body));
        }

        serde_json::from_str::<CustomerPage>(&body).map_err(|e| TallyError::MalformedResponse {
            message: format!("Could not decode customer list: {}", e),
        })
    }
}

fn error_for_status(status: StatusCode, body: &str) -> TallyError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| format!("Provider request failed with status {}", status));

    match status {
        StatusCode::UNAUTHORIZED => TallyError::Unauthorized { message },
        StatusCode::FORBIDDEN => TallyError::Forbidden { message },
        StatusCode::TOO_MANY_REQUESTS => TallyError::RateLimited { message },
        other => TallyError::Upstream {
            status: other.as_u16(),
            message,
        },
    }
}
