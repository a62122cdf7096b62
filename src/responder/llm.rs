use {
    anyhow::{bail, Context, Result},
    log::debug,
    serde::{Deserialize, Serialize},
    serde_json::Value as JsonValue,
};

use crate::config::CompletionConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: String::from(content),
        }
    }
}

/// Anything that turns an ordered list of messages into generated text.
pub trait Completion {
    fn complete(&self, messages: &[Message]) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

/// Blocking client for an OpenAI-style chat completions endpoint.
pub struct ChatClient {
    agent: ureq::Agent,
    config: CompletionConfig,
    api_key: Option<String>,
}

impl ChatClient {
    pub fn new(config: CompletionConfig, api_key: Option<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            config,
            api_key,
        }
    }
}

impl Completion for ChatClient {
    fn complete(&self, messages: &[Message]) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("no API key configured; set {}", self.config.api_key_env)
        };

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
        };

        debug!(
            "POST {} model={} temperature={}",
            self.config.endpoint, self.config.model, self.config.temperature
        );

        let response = match self
            .agent
            .post(&self.config.endpoint)
            .set("Authorization", &format!("Bearer {api_key}"))
            .send_json(&request)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                bail!(
                    "completion service returned {}: {}",
                    code,
                    error_message(&body)
                )
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(transport).with_context(|| "unable to reach completion service")
            }
        };

        let response: ChatResponse = response
            .into_json()
            .with_context(|| "malformed completion response")?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .with_context(|| "completion response contained no choices")
    }
}

/// Pull `error.message` out of an error body, or fall back to the body itself.
fn error_message(body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(JsonValue::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
