//! Gateway backed by an OpenAI-compatible chat completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sitegen_core::{BlockName, FormValues};

use crate::prompts::{PromptSet, SYSTEM_PROMPT};
use crate::sanitize::sanitize_html;
use crate::traits::{Gateway, GatewayError, Generated};

/// Connection settings for [`HttpGateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Chat completions URL
    pub api_url: String,

    /// Model identifier sent with each request
    pub model: String,

    /// Bearer token, if the service needs one
    pub api_key: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// Completion token limit
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout: Duration::from_secs(60),
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// HTTP generation gateway.
pub struct HttpGateway {
    client: Client,
    config: GatewayConfig,
    prompts: PromptSet,
}

impl HttpGateway {
    /// Create a gateway with its own HTTP client.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            client,
            config,
            prompts: PromptSet::new(),
        })
    }

    async fn complete(&self, prompt: String) -> Result<Generated, GatewayError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut request = self.client.post(&self.config.api_url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status.as_u16() {
                401 | 403 => GatewayError::Auth,
                code => GatewayError::Status { code, body: text },
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let raw = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GatewayError::InvalidResponse("no choices in response".to_string()))?;

        Ok(Generated::from_html(sanitize_html(&raw)))
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::Connect(e.to_string())
    } else {
        GatewayError::InvalidResponse(e.to_string())
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn create_head_info(
        &self,
        form: &FormValues,
        body_html: &str,
    ) -> Result<Generated, GatewayError> {
        let prompt = self.prompts.head(form, body_html)?;
        tracing::debug!("Requesting head info from {}", self.config.api_url);
        self.complete(prompt).await
    }

    async fn create_html_block(
        &self,
        name: BlockName,
        form: &FormValues,
    ) -> Result<Generated, GatewayError> {
        let prompt = self.prompts.section(name, form)?;
        tracing::debug!("Requesting {} from {}", name, self.config.api_url);
        self.complete(prompt).await
    }
}
