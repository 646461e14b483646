// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for sentibench
//!
//! Handles loading and saving settings from ~/.sentibench/settings.json

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::backend::Device;
use crate::error::{BenchError, Result};

/// Main settings structure, stored in ~/.sentibench/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Inference engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Test-case generator configuration
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Default settings for commands
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Benchmark tuning
    #[serde(default)]
    pub bench: BenchConfig,
}

/// Inference engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine kind: "sidecar" or "mock"
    #[serde(default = "default_engine_kind")]
    pub kind: String,

    /// Base URL of the inference sidecar
    #[serde(default = "default_engine_base_url")]
    pub base_url: String,

    /// Pipeline task to load
    #[serde(default = "default_task")]
    pub task: String,

    /// Model id to load
    #[serde(default = "default_model")]
    pub model: String,
}

/// Test-case generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for the API key
    #[serde(default = "default_generator_api_key_env")]
    pub api_key_env: String,

    /// Model to generate with
    #[serde(default = "default_generator_model")]
    pub model: String,

    /// Base URL for the generator API
    #[serde(default = "default_generator_base_url")]
    pub base_url: String,
}

/// Default settings for commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default device for load/classify
    #[serde(default)]
    pub device: Device,

    /// Default topic for test-case generation
    #[serde(default = "default_topic")]
    pub topic: String,
}

/// Benchmark tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Target length of the synthetic payload, in characters
    #[serde(default = "default_payload_chars")]
    pub payload_chars: usize,
}

impl Settings {
    /// The sentibench home directory (~/.sentibench)
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sentibench")
    }

    /// Default settings file path
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("settings.json")
    }

    /// Load settings from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load settings from a specific path, falling back to defaults when
    /// the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)
            .map_err(|e| BenchError::Config(format!("invalid settings file: {e}")))?;
        Ok(settings)
    }

    /// Save settings to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save settings to a specific path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the generator API key: config first, then environment
    pub fn generator_api_key(&self) -> Option<String> {
        self.generator
            .api_key
            .clone()
            .or_else(|| std::env::var(&self.generator.api_key_env).ok())
            .filter(|k| !k.is_empty())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: default_engine_kind(),
            base_url: default_engine_base_url(),
            task: default_task(),
            model: default_model(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_generator_api_key_env(),
            model: default_generator_model(),
            base_url: default_generator_base_url(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            device: Device::Cpu,
            topic: default_topic(),
        }
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            payload_chars: default_payload_chars(),
        }
    }
}

// Default value functions
fn default_engine_kind() -> String {
    "sidecar".to_string()
}

fn default_engine_base_url() -> String {
    "http://localhost:3917".to_string()
}

fn default_task() -> String {
    "sentiment-analysis".to_string()
}

fn default_model() -> String {
    "Xenova/distilbert-base-uncased-finetuned-sst-2-english".to_string()
}

fn default_generator_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_generator_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_generator_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_topic() -> String {
    "Customer reviews for a tech gadget".to_string()
}

fn default_payload_chars() -> usize {
    crate::bench::DEFAULT_PAYLOAD_CHARS
}
