use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::{error::ProviderError, provider::Provider};

/// A single-turn text generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one system + user exchange and return the raw reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;

    fn provider_name(&self) -> &str;
}

/// OpenAI-compatible `/chat/completions` client.
#[derive(Clone)]
pub struct ChatCompletions {
    client: reqwest::Client,
    provider: Provider,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl ChatCompletions {
    /// Build a client for `provider`, reading its API key from the environment.
    pub fn new(provider: Provider, timeout: Duration) -> Result<Self, ProviderError> {
        let api_key = provider.validate_api_key()?;
        Self::with_key(provider, api_key, timeout)
    }

    pub fn with_key(
        provider: Provider,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let config = provider.config();
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            provider,
            api_url: config.api_url.to_string(),
            api_key: api_key.into(),
            model: config.model.to_string(),
            temperature: 0.7,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Pull `choices[0].message.content` out of a chat completion response.
pub fn extract_content(response: &serde_json::Value) -> Result<String, ProviderError> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ProviderError::InvalidResponse {
            reason: format!("no message content in {response}"),
        })
}

#[async_trait]
impl TextGenerator for ChatCompletions {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        debug!(provider = self.provider.name(), model = %self.model, "Sending chat completion");

        let response = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": system,
                    },
                    {
                        "role": "user",
                        "content": user,
                    },
                ],
                "temperature": self.temperature,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response = response.json::<serde_json::Value>().await?;
        extract_content(&response)
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode, header},
        routing::post,
    };

    use super::*;

    type Seen = Arc<Mutex<Vec<(String, serde_json::Value)>>>;

    /// Serve `router` on an ephemeral local port and return its chat completions URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    async fn record_and_reply(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        seen.lock().unwrap().push((auth, body));
        Json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": " What is a money bill? "}}]
        }))
    }

    fn client(api_url: String) -> ChatCompletions {
        ChatCompletions::with_key(Provider::Openai, "test-key", Duration::from_secs(5))
            .unwrap()
            .with_model("test-model")
            .with_api_url(api_url)
    }

    #[tokio::test]
    async fn sends_system_and_user_messages() {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route("/v1/chat/completions", post(record_and_reply))
            .with_state(seen.clone());
        let generator = client(serve(router).await);

        let reply = generator
            .complete("Create a question.", "The Lok Sabha can be dissolved.")
            .await
            .unwrap();
        assert_eq!(reply, " What is a money bill? ");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (auth, body) = &seen[0];
        assert_eq!(auth, "Bearer test-key");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Create a question.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "The Lok Sabha can be dissolved.");
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
        );
        let generator = client(serve(router).await);

        let err = generator.complete("system", "user").await.unwrap_err();
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reply_without_content_is_invalid_response() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(serde_json::json!({"choices": []})) }),
        );
        let generator = client(serve(router).await);

        let err = generator.complete("system", "user").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse { .. }));
    }

    #[test]
    fn extracts_first_choice_content() {
        let response = serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "  What is UPSC?\n"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        });
        assert_eq!(extract_content(&response).unwrap(), "  What is UPSC?\n");
    }

    #[test]
    fn missing_content_is_invalid_response() {
        let response = serde_json::json!({"error": {"message": "quota exceeded"}});
        let err = extract_content(&response).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse { .. }));
        assert!(err.to_string().contains("quota exceeded"));
    }
}
