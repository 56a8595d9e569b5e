//! Chat completions client for OpenAI-compatible APIs.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::GenAiConfig;

use super::Generator;
use super::error::{ApiErrorResponse, GenerationError};
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, CompletionRequest};

/// Chat completions API client.
#[derive(Clone)]
pub struct GenAiClient {
    inner: Arc<GenAiClientInner>,
}

struct GenAiClientInner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl GenAiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Config` if the API key or referer contain
    /// invalid header characters, or the HTTP client cannot be built.
    pub fn new(config: &GenAiConfig) -> Result<Self, GenerationError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            config.api_key.expose_secret()
        ))
        .map_err(|_| GenerationError::Config("API key is not a valid header value".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        if let Some(referer) = &config.referer {
            let value = HeaderValue::from_str(referer).map_err(|_| {
                GenerationError::Config("referer is not a valid header value".to_string())
            })?;
            headers.insert("HTTP-Referer", value);
            headers.insert("X-Title", HeaderValue::from_static("BloodConnect"));
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(GenAiClientInner {
                client,
                endpoint: format!(
                    "{}/chat/completions",
                    config.base_url.as_str().trim_end_matches('/')
                ),
                model: config.model.clone(),
            }),
        })
    }

    /// Handle an error status code.
    async fn handle_error_status(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> GenerationError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return GenerationError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return GenerationError::Unauthorized("Invalid API key".to_string());
        }

        match response.text().await {
            Ok(body) => {
                let message = serde_json::from_str::<ApiErrorResponse>(&body)
                    .map_or(body, |api_error| api_error.error.message);
                GenerationError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
            Err(e) => GenerationError::Http(e),
        }
    }
}

#[async_trait]
impl Generator for GenAiClient {
    #[instrument(skip(self, request), fields(model = %self.inner.model, max_tokens = request.max_tokens))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        let body = ChatCompletionRequest {
            model: &self.inner.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_status(status, response).await);
        }

        let text = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Parse(format!("Failed to parse response: {e}")))?;

        Ok(parsed.into_text())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use url::Url;

    use super::*;

    fn config(base_url: &str) -> GenAiConfig {
        GenAiConfig {
            api_key: SecretString::from("sk-or-v1-9fQ2xL7pZ3mK8vB1nR6tY4wE0aJ5cH"),
            base_url: Url::parse(base_url).unwrap(),
            model: "meta-llama/llama-3.3-70b-instruct:free".to_string(),
            referer: Some("https://bloodconnect.app".to_string()),
            timeout: Duration::from_secs(15),
        }
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = GenAiClient::new(&config("https://openrouter.ai/api/v1")).unwrap();
        assert_eq!(
            client.inner.endpoint,
            "https://openrouter.ai/api/v1/chat/completions"
        );

        let client = GenAiClient::new(&config("http://localhost:8080/v1/")).unwrap();
        assert_eq!(client.inner.endpoint, "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_invalid_api_key_header() {
        let mut cfg = config("https://openrouter.ai/api/v1");
        cfg.api_key = SecretString::from("bad\nkey");
        assert!(matches!(
            GenAiClient::new(&cfg),
            Err(GenerationError::Config(_))
        ));
    }
}
