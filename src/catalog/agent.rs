//! Text-generation agents.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::AgentConfig;

/// Errors from agent calls.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("agent API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("agent response had no message content")]
    EmptyResponse,
}

/// Something that turns a prompt into free-form text.
#[async_trait]
pub trait TextAgent: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError>;
}

/// OpenAI-compatible chat completions client.
pub struct HttpTextAgent {
    client: Client,
    config: AgentConfig,
}

impl HttpTextAgent {
    pub fn new(config: AgentConfig) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextAgent for HttpTextAgent {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        let body = json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let mut request = self.client.post(self.endpoint()).json(&body);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        debug!(model = %self.config.model, "calling text agent");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response.json().await?;
        data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(AgentError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use tokio::sync::Mutex;

    use super::*;

    type Seen = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

    async fn completions(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        seen.lock().await.push((headers, body));
        Json(json!({
            "choices": [{"message": {"role": "assistant", "content": "[]"}, "finish_reason": "stop"}]
        }))
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn config(base_url: String) -> AgentConfig {
        AgentConfig {
            base_url,
            api_key: "sk-test".to_string(),
            model: "test-model".to_string(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_complete_posts_chat_request() {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/v1/chat/completions", post(completions))
            .with_state(seen.clone());
        let agent = HttpTextAgent::new(config(spawn(app).await)).unwrap();

        let text = agent.complete("find restaurants").await.unwrap();
        assert_eq!(text, "[]");

        let seen = seen.lock().await;
        let (headers, body) = &seen[0];
        assert_eq!(headers["authorization"], "Bearer sk-test");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "find restaurants");
    }

    #[tokio::test]
    async fn test_complete_surfaces_api_errors() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let agent = HttpTextAgent::new(config(spawn(app).await)).unwrap();

        match agent.complete("x").await {
            Err(AgentError::Api { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_without_content() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let agent = HttpTextAgent::new(config(spawn(app).await)).unwrap();
        assert!(matches!(
            agent.complete("x").await,
            Err(AgentError::EmptyResponse)
        ));
    }
}
