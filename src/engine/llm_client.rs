use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::NarratorConfig;

#[derive(Debug, Error)]
pub enum NarratorError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("narrator unavailable: {0}")]
    Unavailable(String),

    #[error("narrator request timed out")]
    Timeout,

    #[error("API key rejected")]
    Unauthorized,

    #[error("narrator returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("narrator returned no text")]
    EmptyResponse,

    #[error("could not read narrator response: {0}")]
    Parse(String),

    #[error("narrator request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for NarratorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NarratorError::Timeout
        } else if err.is_connect() {
            NarratorError::Unavailable(err.to_string())
        } else if err.is_decode() {
            NarratorError::Parse(err.to_string())
        } else {
            NarratorError::Request(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// Something that can voice the Dungeon Master.
pub trait Narrator {
    fn narrate(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String, NarratorError>;

    /// Reachability check for the settings panel.
    fn check(&self, _api_key: &str) -> Result<String, NarratorError> {
        Ok("Narrator ready".to_string())
    }
}

/// OpenAI-compatible `chat/completions` client (Groq by default).
pub struct ChatCompletionClient {
    http: Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionClient {
    pub fn new(config: &NarratorConfig) -> Result<Self, NarratorError> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

impl Narrator for ChatCompletionClient {
    fn narrate(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String, NarratorError> {
        if api_key.trim().is_empty() {
            return Err(NarratorError::MissingApiKey);
        }

        let req = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, messages = messages.len(), "calling narrator");

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key.trim())
            .json(&req)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status, resp.text().unwrap_or_default()));
        }

        let body = resp.json::<ChatCompletionResponse>()?;
        extract_text(body)
    }

    fn check(&self, api_key: &str) -> Result<String, NarratorError> {
        if api_key.trim().is_empty() {
            return Err(NarratorError::MissingApiKey);
        }

        let resp = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(api_key.trim())
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status, resp.text().unwrap_or_default()));
        }

        let models = resp.json::<ModelList>()?;
        Ok(format!("Connected ({} models available)", models.data.len()))
    }
}

fn status_error(status: StatusCode, body: String) -> NarratorError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return NarratorError::Unauthorized;
    }
    NarratorError::Http {
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    }
}

fn extract_text(body: ChatCompletionResponse) -> Result<String, NarratorError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(NarratorError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<String, NarratorError> {
        extract_text(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn takes_first_choice() {
        let text = decode(
            r#"{"choices":[{"message":{"role":"assistant","content":"  The door groans.  "}},
                           {"message":{"content":"ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(text, "The door groans.");
    }

    #[test]
    fn missing_or_blank_content_is_empty() {
        assert!(matches!(
            decode(r#"{"choices":[]}"#),
            Err(NarratorError::EmptyResponse)
        ));
        assert!(matches!(
            decode(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(NarratorError::EmptyResponse)
        ));
        assert!(matches!(
            decode(r#"{"choices":[{"message":{"content":"   "}}]}"#),
            Err(NarratorError::EmptyResponse)
        ));
    }

    #[test]
    fn auth_statuses_map_to_unauthorized() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            NarratorError::Unauthorized
        ));
        match status_error(StatusCode::TOO_MANY_REQUESTS, "x".repeat(500)) {
            NarratorError::Http { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body.len(), 200);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn request_body_has_wire_shape() {
        let messages = vec![ChatMessage::new("system", "Be a DM")];
        let req = ChatCompletionRequest {
            model: "llama-3.3-70b-versatile",
            messages: &messages,
            temperature: 0.5,
            max_tokens: 100,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["max_tokens"], 100);
    }

    #[test]
    fn blank_key_fails_before_any_request() {
        let client = ChatCompletionClient::new(&NarratorConfig::default()).unwrap();
        assert!(matches!(
            client.narrate("  ", &[]),
            Err(NarratorError::MissingApiKey)
        ));
    }
}
