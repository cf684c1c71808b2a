//! Messages-API transport.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use sift_core::config::OracleConfig;
use sift_core::errors::{OracleError, SiftResult};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking client for the Anthropic messages API.
pub struct AnthropicClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<UserMessage<'a>>,
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl AnthropicClient {
    /// Build a client from config. Errors when no API key is configured.
    pub fn from_config(config: &OracleConfig) -> SiftResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(OracleError::MissingApiKey)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| OracleError::Http {
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send one user prompt (plus an optional system prompt) and return the
    /// first text block of the response.
    pub fn complete(&self, system: Option<&str>, prompt: &str) -> SiftResult<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: vec![UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .map_err(|e| OracleError::Http {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OracleError::Http {
                message: format!("status {status}: {body}"),
            }
            .into());
        }

        let parsed: MessagesResponse = response.json().map_err(|e| OracleError::Http {
            message: e.to_string(),
        })?;
        let text = parsed
            .content
            .first()
            .map(|block| block.text.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(OracleError::EmptyResponse.into());
        }
        Ok(text)
    }
}

/// Strip a surrounding markdown code fence, if present, so strict JSON
/// parsing can run on the payload.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
