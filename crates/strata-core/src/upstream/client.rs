use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, ClientBuilder, Method, Response,
};
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    errors::UpstreamError,
    retry::{AttemptOutcome, RetryDecision, RetryPolicy},
};

/// Timeout class for a request. Single-entity reads are cheap; paginated
/// list reads get a longer budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallClass {
    Entity,
    List,
}

/// Configuration for the upstream API client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the upstream indexing API.
    pub base_url: String,
    /// Optional API key sent on every request.
    pub api_key: Option<String>,
    /// Header name carrying the API key.
    pub api_key_header: String,
    pub max_retries: u32,
    /// Client-side timeout for [`CallClass::Entity`] requests.
    pub entity_timeout: Duration,
    /// Client-side timeout for [`CallClass::List`] requests.
    pub list_timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.hiro.so".to_string(),
            api_key: None,
            api_key_header: "x-api-key".to_string(),
            max_retries: 2,
            entity_timeout: Duration::from_secs(10),
            list_timeout: Duration::from_secs(15),
        }
    }
}

impl ApiClientConfig {
    fn timeout_for(&self, class: CallClass) -> Duration {
        match class {
            CallClass::Entity => self.entity_timeout,
            CallClass::List => self.list_timeout,
        }
    }
}

/// One HTTP call against the upstream API, with the retry policy applied in
/// a loop. This is the only layer that retries; everything above treats an
/// error from here as final for the call.
pub struct ApiClient {
    http: Client,
    config: ApiClientConfig,
    policy: RetryPolicy,
}

/// What a single send produced, before retry classification.
enum SendResult {
    Success(Value),
    /// Not worth classifying: the call is over regardless of budget.
    Fatal(UpstreamError),
    Failed { outcome: AttemptOutcome, detail: String },
}

impl ApiClient {
    /// # Errors
    ///
    /// Fails when the base URL or API-key header is invalid, or the
    /// underlying HTTP client cannot be built.
    pub fn new(config: ApiClientConfig) -> Result<Self, UpstreamError> {
        url::Url::parse(&config.base_url)
            .map_err(|e| UpstreamError::Network(format!("invalid base url: {e}")))?;

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let name = HeaderName::from_bytes(config.api_key_header.as_bytes())
                .map_err(|e| UpstreamError::Network(format!("invalid api key header: {e}")))?;
            let mut value = HeaderValue::from_str(key)
                .map_err(|e| UpstreamError::Network(format!("invalid api key value: {e}")))?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let http = ClientBuilder::new()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(30))
            .use_rustls_tls()
            .user_agent(concat!("strata/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                UpstreamError::Network(format!("http client build failed: {e}"))
            })?;

        let policy = RetryPolicy::with_max_retries(config.max_retries);
        Ok(Self { http, config, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `path` and parse the JSON body.
    ///
    /// # Errors
    ///
    /// See [`UpstreamError`]; transient failures have already been retried
    /// per the policy by the time an error surfaces.
    pub async fn get_json(&self, path: &str, class: CallClass) -> Result<Value, UpstreamError> {
        self.execute(Method::GET, path, None, class).await
    }

    /// POST a JSON body to `path` and parse the JSON response.
    ///
    /// # Errors
    ///
    /// See [`UpstreamError`].
    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
        class: CallClass,
    ) -> Result<Value, UpstreamError> {
        self.execute(Method::POST, path, Some(body), class).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        class: CallClass,
    ) -> Result<Value, UpstreamError> {
        let url = self.join(path);
        let mut attempt = 0u32;

        loop {
            let (outcome, detail) =
                match self.send_once(method.clone(), &url, body, class).await {
                    SendResult::Success(value) => return Ok(value),
                    SendResult::Fatal(err) => return Err(err),
                    SendResult::Failed { outcome, detail } => (outcome, detail),
                };

            match self.policy.classify(attempt, &outcome) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        url = %url,
                        attempt,
                        delay_secs = delay.as_secs(),
                        "rate limited by upstream; honoring Retry-After"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Backoff(delay) => {
                    warn!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        detail = %detail,
                        "transient upstream failure; backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Fail => {
                    return Err(Self::final_error(&self.policy, outcome, detail, attempt + 1));
                }
            }
            attempt += 1;
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        class: CallClass,
    ) -> SendResult {
        let mut request =
            self.http.request(method, url).timeout(self.config.timeout_for(class));
        if let Some(body) = body {
            request = request.json(body);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!(url = %url, status = response.status().as_u16(), "upstream request ok");
                match response.json::<Value>().await {
                    Ok(value) => SendResult::Success(value),
                    Err(e) => SendResult::Fatal(UpstreamError::InvalidResponse(e.to_string())),
                }
            }
            Ok(response) => {
                let status = response.status().as_u16();
                let retry_after = parse_retry_after(&response);
                let detail = truncated_body(response).await;
                SendResult::Failed {
                    outcome: AttemptOutcome::Status { status, retry_after },
                    detail,
                }
            }
            Err(e) => {
                let (outcome, detail) = classify_send_error(&e);
                SendResult::Failed { outcome, detail }
            }
        }
    }

    /// Maps an exhausted or permanent attempt failure to the public error.
    fn final_error(
        policy: &RetryPolicy,
        outcome: AttemptOutcome,
        detail: String,
        attempts: u32,
    ) -> UpstreamError {
        match outcome {
            AttemptOutcome::Status { status: 429, retry_after } => {
                UpstreamError::RateLimitExceeded {
                    retry_after_secs: retry_after
                        .unwrap_or_else(|| policy.default_retry_after.as_secs()),
                }
            }
            AttemptOutcome::Status { status, .. } if (500..=599).contains(&status) => {
                UpstreamError::Unavailable { attempts, last_error: format!("{status}: {detail}") }
            }
            AttemptOutcome::Status { status, .. } => {
                UpstreamError::Status { status, body: detail }
            }
            AttemptOutcome::Network | AttemptOutcome::Timeout => {
                UpstreamError::Unavailable { attempts, last_error: detail }
            }
        }
    }

    fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

async fn truncated_body(response: Response) -> String {
    let raw = response.text().await.unwrap_or_default();
    if raw.len() > 256 {
        let mut end = 256;
        while !raw.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &raw[..end])
    } else {
        raw
    }
}

/// Sanitizes transport errors so upstream hostnames and paths don't leak
/// into logs or client-facing messages.
fn classify_send_error(error: &reqwest::Error) -> (AttemptOutcome, String) {
    if error.is_timeout() {
        (AttemptOutcome::Timeout, "request timed out".to_string())
    } else if error.is_connect() {
        (AttemptOutcome::Network, "connection refused or unreachable".to_string())
    } else if error.is_body() || error.is_decode() {
        (AttemptOutcome::Network, "response body error".to_string())
    } else {
        (AttemptOutcome::Network, "network error".to_string())
    }
}
