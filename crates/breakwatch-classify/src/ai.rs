// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! AI fallback detection
//!
//! Sends the subject line to an OpenAI-compatible chat-completions endpoint
//! and asks for a yes/no verdict. The call is bounded by a short timeout and
//! every failure degrades to "not breaking".

use std::time::Duration;

use async_trait::async_trait;
use breakwatch_github::Commit;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AiError;
use crate::method::{BreakingMethod, Detection, Detector, Policy};

/// Default chat-completions endpoint
pub const DEFAULT_AI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

/// Default per-request timeout
pub const DEFAULT_AI_TIMEOUT: Duration = Duration::from_millis(800);

/// Instruction sent with every request
pub const SYSTEM_PROMPT: &str = "You classify git commit messages. Answer with exactly one \
     word, yes or no: does this commit introduce a breaking change to a public API, \
     configuration or behaviour that downstream users depend on?";

/// Configuration for an [`AiDetector`]
#[derive(Debug, Clone)]
pub struct AiOptions {
    /// Chat-completions endpoint URL
    pub api_url: String,
    /// Bearer credential
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Completion length bound
    pub max_tokens: u32,
}

impl AiOptions {
    /// Options with defaults for everything but the credential
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_AI_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_AI_MODEL.to_string(),
            timeout: DEFAULT_AI_TIMEOUT,
            max_tokens: 3,
        }
    }

    /// Use a different endpoint
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Use a different model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a different timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Whether a completion reads as an affirmative verdict
#[must_use]
pub fn is_affirmative(reply: &str) -> bool {
    reply.trim().to_ascii_lowercase().starts_with("yes")
}

/// Detector backed by a remote model
#[derive(Debug, Clone)]
pub struct AiDetector {
    client: Client,
    options: AiOptions,
}

impl AiDetector {
    /// Create a detector
    ///
    /// # Errors
    ///
    /// Returns `AiError::Client` if the HTTP client cannot be built.
    pub fn new(options: AiOptions) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(AiError::Client)?;
        Ok(Self { client, options })
    }

    /// The options this detector was built with
    #[must_use]
    pub fn options(&self) -> &AiOptions {
        &self.options
    }

    /// Ask the model whether `message` describes a breaking change
    ///
    /// # Errors
    ///
    /// Returns an `AiError` on timeout, transport failure, non-success
    /// status, or a response without completion text.
    pub async fn ask(&self, message: &str) -> Result<bool, AiError> {
        let request = ChatRequest {
            model: &self.options.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            temperature: 0.0,
            max_tokens: self.options.max_tokens,
        };

        let response = self
            .client
            .post(&self.options.api_url)
            .bearer_auth(&self.options.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Status {
                status: status.as_u16(),
            });
        }

        let body: ChatResponse = response.json().await.map_err(|e| self.transport_error(e))?;
        let reply = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(AiError::EmptyResponse)?;

        Ok(is_affirmative(&reply))
    }

    fn transport_error(&self, error: reqwest::Error) -> AiError {
        if error.is_timeout() {
            AiError::Timeout(self.options.timeout.as_millis())
        } else {
            AiError::Http(error)
        }
    }
}

#[async_trait]
impl Detector for AiDetector {
    fn method(&self) -> BreakingMethod {
        BreakingMethod::Ai
    }

    fn policy(&self) -> Policy {
        Policy::WhenUnflagged
    }

    async fn detect(&self, commit: &Commit) -> Detection {
        match self.ask(&commit.message).await {
            Ok(true) => Detection::Hit,
            Ok(false) => Detection::Miss,
            Err(e) => {
                debug!(
                    repository = %commit.repository,
                    sha = commit.short_sha(),
                    error = %e,
                    "AI classification degraded"
                );
                Detection::Degraded
            }
        }
    }
}
