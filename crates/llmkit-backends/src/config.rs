//! Backend Configuration
//!
//! Flat key/value settings (`backend.generation`, `ollama.host`,
//! `openai.api_key`, ...) loaded once at startup from a YAML document, with
//! environment-variable overrides. The resulting `Settings` struct is the
//! only thing the rest of the library consumes; backends receive explicit
//! values through their constructors, never process-wide globals.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use llmkit_core::{Backend, LlmError, Result};

use crate::ollama::OllamaBackend;
use crate::openai::OpenAIBackend;

/// Which provider to use for a given role.
///
/// Adding a provider means adding a variant here and an arm in
/// `Settings::build`; shared logic never branches on raw strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Ollama,
    OpenAi,
}

/// Provider selection per role
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct BackendSelection {
    pub generation: BackendKind,
    pub embeddings: BackendKind,
}

/// Ollama connection settings
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub host: String,
    pub gen_model: String,
    pub emb_model: String,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".into(),
            gen_model: "qwen2.5".into(),
            emb_model: "mxbai-embed-large".into(),
        }
    }
}

/// OpenAI credentials and model names
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub gen_model: String,
    pub emb_model: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            gen_model: "gpt-4o-mini".into(),
            emb_model: "text-embedding-3-small".into(),
        }
    }
}

/// Resolved configuration for backend construction
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSelection,
    pub ollama: OllamaSettings,
    pub openai: OpenAiSettings,
}

impl Settings {
    /// Load settings from a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())
            .map_err(|e| LlmError::Config(format!("failed to read config file: {e}")))?;
        serde_yaml::from_str(&raw)
            .map_err(|e| LlmError::Config(format!("failed to parse config file: {e}")))
    }

    /// Defaults plus environment overrides, loading `.env` if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut settings = Self::default();
        settings.apply_env();
        settings
    }

    /// Apply `OPENAI_API_KEY` / `OLLAMA_HOST` overrides from the process
    /// environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(env::var("OPENAI_API_KEY").ok(), env::var("OLLAMA_HOST").ok());
    }

    fn apply_overrides(&mut self, openai_key: Option<String>, ollama_host: Option<String>) {
        if let Some(key) = openai_key {
            self.openai.api_key = key;
        }
        if let Some(host) = ollama_host {
            self.ollama.host = host;
        }
    }

    /// Construct the backend selected for text generation.
    pub fn generation_backend(&self) -> Result<Box<dyn Backend>> {
        self.build(
            self.backend.generation,
            &self.ollama.gen_model,
            &self.openai.gen_model,
        )
    }

    /// Construct the backend selected for embeddings.
    pub fn embedding_backend(&self) -> Result<Box<dyn Backend>> {
        self.build(
            self.backend.embeddings,
            &self.ollama.emb_model,
            &self.openai.emb_model,
        )
    }

    fn build(
        &self,
        kind: BackendKind,
        ollama_model: &str,
        openai_model: &str,
    ) -> Result<Box<dyn Backend>> {
        match kind {
            BackendKind::Ollama => Ok(Box::new(OllamaBackend::new(
                self.ollama.host.as_str(),
                ollama_model,
                Duration::ZERO,
            ))),
            BackendKind::OpenAi => {
                if self.openai.api_key.is_empty() {
                    return Err(LlmError::Config(
                        "openai.api_key is required for the OpenAI backend".into(),
                    ));
                }
                Ok(Box::new(OpenAIBackend::new(
                    self.openai.api_key.as_str(),
                    openai_model,
                    Duration::ZERO,
                )))
            }
        }
    }
}
