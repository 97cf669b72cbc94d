use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Completion, CompletionProvider, CompletionRequest, Message};

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Client for any OpenAI compatible `chat/completions` endpoint.
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> mealmate_shared::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| mealmate_shared::Error::Server(err.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAiClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: CompletionRequest) -> mealmate_shared::Result<Completion> {
        let payload = ChatCompletionRequest {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.temperature.unwrap_or(self.config.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
        };

        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(err = %err, "AI service is unreachable");
                mealmate_shared::Error::Unavailable("AI service is unreachable".to_owned())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_owned());
            tracing::warn!(status = %status, body = %body, "AI service returned an error");

            return Err(mealmate_shared::Error::Unavailable(format!(
                "AI service returned status {}",
                status.as_u16()
            )));
        }

        let body = response.json::<ChatCompletionResponse>().await.map_err(|err| {
            tracing::error!(err = %err, "AI service returned an unexpected payload");
            mealmate_shared::Error::Server("AI response could not be parsed".to_owned())
        })?;

        let content = body
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty());

        let Some(content) = content else {
            mealmate_shared::server!("AI response could not be parsed");
        };

        Ok(Completion {
            model: body.model.unwrap_or_else(|| self.config.model.to_owned()),
            content,
        })
    }
}
