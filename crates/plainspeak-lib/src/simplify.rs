//! Text simplification through an OpenAI-compatible chat-completion API
//! (OpenRouter by default).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use plainspeak_core::types::{ApiKeySource, SimplifierConfig};

/// System message sent with every request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that simplifies English text.";

const INSTRUCTIONS: &str = "Simplify the following text for someone with dyslexia.

Use:
- Short and simple sentences
- Easy and common words
- Simple vocabulary that a child can understand
- No difficult or complex words
- Clear and direct phrasing
- Avoid long or compound sentences";

/// User message for `text`.
pub fn build_prompt(text: &str) -> String {
    format!("{INSTRUCTIONS}\n\nText:\n{text}\n\nSimplified:")
}

#[derive(Debug, Error)]
pub enum SimplifyError {
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid response: {source}; raw={raw}")]
    InvalidResponse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("response contained no choices")]
    NoChoices,
}

/// Produces a dyslexia-friendly version of a text.
#[async_trait]
pub trait Simplifier: Send + Sync {
    /// Returns the model's answer as-is; trimming and the emptiness check
    /// belong to the caller.
    async fn simplify(&self, text: &str) -> Result<String, SimplifyError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// [`Simplifier`] backed by `POST {api_base}/chat/completions`.
#[derive(Clone)]
pub struct ChatCompletionSimplifier {
    client: reqwest::Client,
    config: SimplifierConfig,
}

impl ChatCompletionSimplifier {
    pub fn new(config: SimplifierConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Resolved on every call so a rotated key is picked up without restart.
    fn api_key(&self) -> Result<String, SimplifyError> {
        match &self.config.api_key {
            ApiKeySource::Static(key) => Ok(key.clone()),
            ApiKeySource::Env(var) => std::env::var(var)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| SimplifyError::MissingApiKey(var.clone())),
        }
    }
}

#[async_trait]
impl Simplifier for ChatCompletionSimplifier {
    async fn simplify(&self, text: &str) -> Result<String, SimplifyError> {
        let api_key = self.api_key()?;
        let prompt = build_prompt(text);
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.config.temperature,
        };

        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));
        debug!("POST {url} model={} ({} chars)", self.config.model, text.len());

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SimplifyError::Status { status, body });
        }

        let raw = resp.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&raw)
            .map_err(|source| SimplifyError::InvalidResponse { source, raw })?;

        let choice = parsed.choices.into_iter().next().ok_or(SimplifyError::NoChoices)?;
        Ok(choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;
    use crate::test_support::spawn_server;

    #[derive(Clone, Default)]
    struct Captured {
        auth: Arc<Mutex<Option<String>>>,
        body: Arc<Mutex<Option<Value>>>,
    }

    /// Completion server that records the request and answers with `reply`.
    async fn completion_server(reply: Value) -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route(
                "/chat/completions",
                post(
                    move |State(captured): State<Captured>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            *captured.auth.lock().unwrap() = headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_owned);
                            *captured.body.lock().unwrap() = Some(body);
                            Json(reply)
                        }
                    },
                ),
            )
            .with_state(captured.clone());
        (spawn_server(app).await, captured)
    }

    fn config(api_base: String) -> SimplifierConfig {
        SimplifierConfig {
            api_base,
            api_key: ApiKeySource::Static("sk-test".into()),
            ..Default::default()
        }
    }

    #[test]
    fn prompt_wraps_text() {
        let prompt = build_prompt("Hard words here.");
        assert!(prompt.starts_with("Simplify the following text for someone with dyslexia."));
        assert!(prompt.contains("- Avoid long or compound sentences"));
        assert!(prompt.ends_with("Text:\nHard words here.\n\nSimplified:"));
    }

    #[tokio::test]
    async fn sends_fixed_model_temperature_and_messages() {
        let reply = json!({ "choices": [{ "message": { "role": "assistant", "content": "  This is easy.\n" } }] });
        let (base, captured) = completion_server(reply).await;
        let simplifier = ChatCompletionSimplifier::new(config(base));

        let out = simplifier.simplify("This is a complex sentence.").await.unwrap();
        assert_eq!(out, "  This is easy.\n");

        assert_eq!(captured.auth.lock().unwrap().as_deref(), Some("Bearer sk-test"));
        let body = captured.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "mistralai/mistral-7b-instruct");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("Text:\nThis is a complex sentence."));
    }

    #[tokio::test]
    async fn missing_content_is_empty_string() {
        let (base, _) = completion_server(json!({ "choices": [{ "message": { "role": "assistant" } }] })).await;
        let out = ChatCompletionSimplifier::new(config(base)).simplify("x").await.unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn no_choices_is_an_error() {
        let (base, _) = completion_server(json!({ "choices": [] })).await;
        let err = ChatCompletionSimplifier::new(config(base)).simplify("x").await.unwrap_err();
        assert!(matches!(err, SimplifyError::NoChoices));
    }

    #[tokio::test]
    async fn http_error_status_is_reported_with_body() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "No auth credentials found") }),
        );
        let base = spawn_server(app).await;
        let err = ChatCompletionSimplifier::new(config(base)).simplify("x").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "API returned 401 Unauthorized: No auth credentials found"
        );
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_response() {
        let app = Router::new().route("/chat/completions", post(|| async { "<html>oops</html>" }));
        let base = spawn_server(app).await;
        let err = ChatCompletionSimplifier::new(config(base)).simplify("x").await.unwrap_err();
        assert!(matches!(err, SimplifyError::InvalidResponse { .. }));
        assert!(err.to_string().contains("raw=<html>oops</html>"));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_request_error() {
        // Port 9 (discard) on localhost is not listening in test environments.
        let simplifier = ChatCompletionSimplifier::new(config("http://127.0.0.1:9".into()));
        let err = simplifier.simplify("x").await.unwrap_err();
        assert!(matches!(err, SimplifyError::Request(_)));
    }

    #[tokio::test]
    async fn unset_env_key_fails_before_any_request() {
        let simplifier = ChatCompletionSimplifier::new(SimplifierConfig {
            api_base: "http://127.0.0.1:9".into(),
            api_key: ApiKeySource::Env("PLAINSPEAK_TEST_KEY_THAT_IS_NEVER_SET".into()),
            ..Default::default()
        });
        let err = simplifier.simplify("x").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "API key not set (expected in $PLAINSPEAK_TEST_KEY_THAT_IS_NEVER_SET)"
        );
    }
}
