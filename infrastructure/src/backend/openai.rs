//! OpenAI-compatible chat completions backend.
//!
//! Sends `{system, user}` message pairs to `{base_url}/chat/completions` and
//! returns the first choice's content. Every HTTP-level problem is mapped to a
//! [`BackendError`] so the generation client can retry it; the body is never
//! interpreted beyond extracting the completion text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use tribunal_application::ports::generation_backend::{
    BackendError, CompletionRequest, GenerationBackend,
};
use tribunal_domain::AgentId;

use crate::config::FileBackendConfig;

/// Failure to construct the backend
#[derive(Error, Debug)]
pub enum OpenAiSetupError {
    #[error("No API key: set {env_var} or backend.api_key")]
    MissingApiKey { env_var: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Backend speaking the OpenAI chat completions protocol
pub struct OpenAiBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    agent_models: BTreeMap<AgentId, String>,
    temperature: f32,
}

impl OpenAiBackend {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, OpenAiSetupError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
            agent_models: BTreeMap::new(),
            temperature,
        })
    }

    /// Build from the `[backend]` config section.
    ///
    /// Agent overrides with an unparsable key are skipped; config validation
    /// already warned about them.
    pub fn from_config(config: &FileBackendConfig) -> Result<Self, OpenAiSetupError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| OpenAiSetupError::MissingApiKey {
                env_var: config.api_key_env.clone(),
            })?;

        let mut backend = Self::new(
            &config.base_url,
            api_key,
            config.model.clone(),
            config.temperature,
            Duration::from_secs(config.request_timeout_secs),
        )?;

        for (agent, model) in &config.agent_models {
            if let Ok(agent) = agent.parse::<AgentId>() {
                backend = backend.with_agent_model(agent, model.clone());
            }
        }
        Ok(backend)
    }

    /// Route one agent to a different model.
    pub fn with_agent_model(mut self, agent: AgentId, model: impl Into<String>) -> Self {
        self.agent_models.insert(agent, model.into());
        self
    }

    /// Model serving `agent`
    pub fn model_for(&self, agent: AgentId) -> &str {
        self.agent_models
            .get(&agent)
            .map(String::as_str)
            .unwrap_or(&self.model)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout
        } else if e.is_connect() {
            BackendError::ConnectionError(e.to_string())
        } else {
            BackendError::RequestFailed(e.to_string())
        }
    }

    fn map_status(status: reqwest::StatusCode, body: &str) -> BackendError {
        let detail = format!("{}: {}", status, tribunal_domain::util::preview(body, 200));
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            BackendError::RateLimited(detail)
        } else {
            BackendError::RequestFailed(detail)
        }
    }

    /// Pull the completion text out of a response body.
    ///
    /// Blank content is still a completion; only a missing choice or a null
    /// content counts as an empty response.
    fn extract_content(body: ChatResponse) -> Result<String, BackendError> {
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(BackendError::EmptyResponse)
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, BackendError> {
        let model = self.model_for(request.agent);
        debug!(agent = %request.agent, model, "POST {}", self.endpoint);

        let body = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: request.user_payload,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, &text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Other(format!("Unreadable response body: {}", e)))?;

        Self::extract_content(parsed)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
