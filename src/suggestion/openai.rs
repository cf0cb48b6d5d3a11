use std::time::Duration;

use anyhow::Context;
use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::{config::Config, prompt::Prompt};

use super::{SuggestionError, SuggestionProvider};

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    message: String,
}

/// Longest raw error body kept in a message, in characters.
const ERROR_BODY_CHARS: usize = 200;

/// Client for an OpenAI-compatible `chat/completions` endpoint.
pub(crate) struct ChatCompletionsProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    prompt: Prompt,
}

impl ChatCompletionsProvider {
    pub fn new(config: &Config, prompt: Prompt) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("while building HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            prompt,
        })
    }
}

impl SuggestionProvider for ChatCompletionsProvider {
    fn suggest(&self, title: &str, excerpt: &str) -> Result<String, SuggestionError> {
        let prompt = self.prompt.render(title, excerpt)?;
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.temperature,
        };

        debug!("Requesting suggestions for {title:?} from {}...", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SuggestionError::Status {
                status,
                message: error_message(&body),
            });
        }

        let content = first_choice(response.json()?)?;
        debug!("done. reply: {content:?}");
        Ok(content)
    }
}

/// One-line description of an error body: the API's `error.message` when
/// present, the squashed and shortened body otherwise.
fn error_message(body: &str) -> String {
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(e) => e.error.message,
        Err(_) => body.chars().take(ERROR_BODY_CHARS).collect(),
    };
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_choice(response: ChatResponse) -> Result<String, SuggestionError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(SuggestionError::EmptyResponse)
}
