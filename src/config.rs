use serde::Serialize;
use std::time::Duration;

use crate::error::ConfigError;

pub const BASE_URL_VAR: &str = "OLLAMA_BASE_URL";
pub const MODEL_VAR: &str = "OLLAMA_MODEL";
pub const API_KEY_VAR: &str = "OLLAMA_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.ollama.ai";
pub const DEFAULT_MODEL: &str = "deepseek-coder";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sampling knobs sent under the request's `options` key.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct SamplingOptions {
    pub temperature: f32,
    /// Response length cap in tokens.
    pub num_predict: u32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            num_predict: 512,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub sampling: SamplingOptions,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = lookup(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            sampling: SamplingOptions::default(),
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}
