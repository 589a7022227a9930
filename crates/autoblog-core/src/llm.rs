//! Generative text API client (Anthropic Messages API, blocking).

use crate::config::{Credentials, GeneratorConfig};
use crate::error::{AutoblogError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE: &str = "messages API";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// One prompt in, one completion out.
pub trait TextGenerator {
    fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [RequestMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    credentials: Credentials,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// The API key is only required once a completion is requested.
    pub fn new(config: &GeneratorConfig, credentials: &Credentials) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/v1/messages", config.api_base.trim_end_matches('/')),
            credentials: credentials.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

impl TextGenerator for AnthropicClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.credentials.require_anthropic()?;
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(AutoblogError::Api {
                service: SERVICE,
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&text)?;
        parsed
            .content
            .into_iter()
            .find(|b| b.kind == "text")
            .and_then(|b| b.text)
            .ok_or_else(|| AutoblogError::UnexpectedResponse {
                service: SERVICE,
                reason: "no text block in response".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
