use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{ChatBackend, FALLBACK_REPLY};
use crate::config::{Config, SamplingOptions};
use crate::error::ChatError;
use crate::state::ChatMessage;

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: SamplingOptions,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    url: String,
    model: String,
    api_key: String,
    sampling: SamplingOptions,
}

impl OllamaClient {
    pub fn new(config: &Config) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ChatError::Client)?;

        Ok(Self {
            client,
            url: config.chat_url(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            sampling: config.sampling,
        })
    }

    /// Send the whole conversation to `/api/chat` and return the reply text.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: self.sampling,
        };

        debug!(url = %self.url, messages = messages.len(), "sending chat request");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status { status, body });
        }

        let body = response.text().await?;
        let chat_response: OllamaChatResponse = serde_json::from_str(&body)?;
        Ok(chat_response.message.content)
    }
}

#[async_trait]
impl ChatBackend for OllamaClient {
    async fn reply(&self, messages: &[ChatMessage]) -> String {
        match self.chat(messages).await {
            Ok(content) => content,
            Err(err @ ChatError::Status { .. }) => {
                error!("{err}");
                FALLBACK_REPLY.to_string()
            }
            Err(err) => {
                error!("Error: {err}");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("rules"), ChatMessage::user("tighten this")];
        let request = OllamaChatRequest {
            model: "deepseek-coder",
            messages: &messages,
            stream: false,
            options: SamplingOptions::default(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "deepseek-coder");
        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["num_predict"], 512);
        assert!((value["options"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(
            value["messages"],
            json!([
                {"role": "system", "content": "rules"},
                {"role": "user", "content": "tighten this"}
            ])
        );
    }

    #[test]
    fn test_response_ignores_extra_fields() {
        let body = r#"{"model":"m","created_at":"now","message":{"role":"assistant","content":"ok"},"done":true}"#;
        let parsed: OllamaChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.content, "ok");
    }

    #[test]
    fn test_response_without_message_is_rejected() {
        assert!(serde_json::from_str::<OllamaChatResponse>(r#"{"response":"old api"}"#).is_err());
        assert!(serde_json::from_str::<OllamaChatResponse>(r#"{"message":{}}"#).is_err());
    }
}
