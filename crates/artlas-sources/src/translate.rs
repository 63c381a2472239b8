//! Artist-name translation
//!
//! Provides OpenAI-compatible and Ollama backends for [`NameTranslator`].
//! Used only to retry a secondary-language lookup under a translated title.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use artlas_core::{ArtlasError, NameTranslator, Result, TranslationConfig, TranslationProvider};

use crate::{http_client, request_error};

const ADAPTER: &str = "translator";
const USER_AGENT: &str = concat!("artlas/", env!("CARGO_PKG_VERSION"));

/// English name of a language code, for prompts
fn language_name(code: &str) -> &str {
    match code {
        "ko" => "Korean",
        "ja" => "Japanese",
        "zh" => "Chinese",
        "en" => "English",
        "fr" => "French",
        "de" => "German",
        "es" => "Spanish",
        other => other,
    }
}

fn system_prompt(target_language: &str) -> String {
    format!(
        "You translate artist names. Reply with the {} name of the artist only, \
         as it would be written in an encyclopedia title, with no other text.",
        language_name(target_language)
    )
}

fn clean_reply(reply: &str) -> Result<String> {
    let name = reply.trim().trim_matches('"').trim();
    if name.is_empty() {
        return Err(ArtlasError::adapter(ADAPTER, "Empty translation"));
    }
    Ok(name.to_string())
}

// ============================================================================
// OpenAI
// ============================================================================

/// OpenAI chat-completions translator
pub struct OpenAiTranslator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

impl OpenAiTranslator {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(ADAPTER, USER_AGENT, timeout)?,
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            max_tokens: 50,
            temperature: 0.1,
        })
    }

    /// Create from config; `None` when no API key is configured
    pub fn from_config(config: &TranslationConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.openai_api_key.as_ref().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };

        let mut translator = Self::new(
            api_key.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        translator.max_tokens = config.max_tokens;
        translator.temperature = config.temperature;
        if let Some(url) = &config.openai_base_url {
            translator = translator.with_base_url(url.clone());
        }
        Ok(Some(translator))
    }

    /// Set custom base URL (for Azure or compatible APIs)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn request(&self, name: &str, target_language: &str) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system_prompt(target_language),
                },
                Message {
                    role: "user".to_string(),
                    content: name.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl NameTranslator for OpenAiTranslator {
    async fn translate_name(&self, name: &str, target_language: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request(name, target_language))
            .send()
            .await
            .map_err(|e| request_error(ADAPTER, e))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ArtlasError::adapter(ADAPTER, format!("OpenAI error: {error_text}")));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| ArtlasError::adapter(ADAPTER, format!("Failed to parse response: {e}")))?;

        let reply = result
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ArtlasError::adapter(ADAPTER, "No translation generated"))?;

        let translated = clean_reply(reply)?;
        tracing::debug!(name, %translated, target_language, "Translated artist name");
        Ok(translated)
    }
}

// ============================================================================
// Ollama
// ============================================================================

/// Ollama generate-API translator
pub struct OllamaTranslator {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    system: String,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaTranslator {
    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(ADAPTER, USER_AGENT, Duration::from_secs(config.timeout_secs))?,
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl NameTranslator for OllamaTranslator {
    async fn translate_name(&self, name: &str, target_language: &str) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            system: system_prompt(target_language),
            prompt: name,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(ADAPTER, e))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ArtlasError::adapter(ADAPTER, format!("Ollama error: {error_text}")));
        }

        let result: OllamaResponse = response.json().await.map_err(|e| {
            ArtlasError::adapter(ADAPTER, format!("Failed to parse Ollama response: {e}"))
        })?;

        clean_reply(&result.response)
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create the configured translator, or `None` when translation is off
pub fn create_translator(config: &TranslationConfig) -> Result<Option<Arc<dyn NameTranslator>>> {
    let translator: Option<Arc<dyn NameTranslator>> = match config.provider {
        TranslationProvider::OpenAI => {
            OpenAiTranslator::from_config(config)?.map(|t| Arc::new(t) as Arc<dyn NameTranslator>)
        }
        TranslationProvider::Ollama => {
            Some(Arc::new(OllamaTranslator::from_config(config)?) as Arc<dyn NameTranslator>)
        }
        TranslationProvider::Disabled => None,
    };

    if translator.is_none() {
        tracing::info!("Name translation disabled");
    }
    Ok(translator)
}
