// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Inference engine abstraction
//!
//! Defines the seam between sentibench and whatever actually runs the
//! model. The crate only depends on this shape: an engine loads a model
//! for a task with an explicit [`BackendConfig`](crate::backend::BackendConfig)
//! and hands back an opaque instance that classifies text.

pub mod mock;
pub mod sidecar;

pub use mock::MockEngine;
pub use sidecar::SidecarEngine;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::backend::BackendConfig;
use crate::error::Result;

/// A single classification outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Model-defined label, e.g. "POSITIVE" or "NEGATIVE"
    pub label: String,
    /// Confidence in [0, 1]
    pub score: f32,
}

/// Incremental load progress, advisory only
///
/// Engines may emit these while constructing a model; nothing in the
/// load contract depends on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadProgress {
    /// Completion percentage, 0 to 100
    pub percent: f32,
    /// File currently being fetched, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Push-style sink for load progress events
pub type ProgressSink = Arc<dyn Fn(LoadProgress) + Send + Sync>;

/// Options for a model load
#[derive(Clone, Default)]
pub struct LoadOptions {
    /// Execution backend and precision to load with
    pub config: BackendConfig,
    /// Optional progress sink
    pub progress: Option<ProgressSink>,
}

impl LoadOptions {
    /// Options for the given backend config, no progress reporting
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Attach a progress sink
    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Emit a progress event if a sink is attached
    pub fn report(&self, percent: f32, file: Option<String>) {
        if let Some(sink) = &self.progress {
            sink(LoadProgress { percent, file });
        }
    }
}

impl std::fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadOptions")
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Engine identification, surfaced by `probe`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineInfo {
    /// Engine name, e.g. "sidecar" or "mock"
    pub name: String,
    /// Engine version, if the engine reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Main trait for inference engines
#[async_trait]
pub trait InferenceEngine: Send + Sync + std::fmt::Debug {
    /// Engine name, e.g. "sidecar"
    fn name(&self) -> &str;

    /// Engine identification and version
    async fn info(&self) -> Result<EngineInfo>;

    /// Construct a model instance for `task`/`model` with the given options
    ///
    /// Construction failures surface as
    /// [`EngineError::LoadFailure`](crate::error::EngineError); no retry is
    /// attempted here or by callers.
    async fn load(
        &self,
        task: &str,
        model: &str,
        options: LoadOptions,
    ) -> Result<Box<dyn ModelInstance>>;
}

/// An opaque, expensive-to-construct model handle
#[async_trait]
pub trait ModelInstance: Send + Sync + std::fmt::Debug {
    /// Run a single classification over `text`
    async fn classify(&self, text: &str) -> Result<Vec<Classification>>;

    /// Release engine-side resources
    ///
    /// Called by the loader before the instance is replaced; the default
    /// is a no-op for engines whose instances carry no remote state.
    async fn dispose(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Device, ExecutionBackend};
    use std::sync::Mutex;

    #[test]
    fn test_classification_serde() {
        let c = Classification {
            label: "POSITIVE".to_string(),
            score: 0.98,
        };
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("POSITIVE"));
        let parsed: Classification = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn test_load_options_default_config() {
        let options = LoadOptions::default();
        assert_eq!(options.config.backend, ExecutionBackend::Wasm);
        assert!(options.config.quantized);
        assert!(options.progress.is_none());
    }

    #[test]
    fn test_load_options_report_without_sink_is_noop() {
        let options = LoadOptions::new(BackendConfig::for_device(Device::WebGl));
        options.report(50.0, None);
    }

    #[test]
    fn test_load_options_report_reaches_sink() {
        let seen: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(vec![]));
        let seen_clone = Arc::clone(&seen);
        let sink: ProgressSink = Arc::new(move |p: LoadProgress| {
            seen_clone.lock().unwrap().push(p.percent);
        });

        let options = LoadOptions::default().with_progress(sink);
        options.report(0.0, None);
        options.report(100.0, Some("model.onnx".to_string()));

        assert_eq!(*seen.lock().unwrap(), vec![0.0, 100.0]);
    }

    #[test]
    fn test_engine_info_serde_skips_missing_version() {
        let info = EngineInfo {
            name: "mock".to_string(),
            version: None,
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("version"));
    }
}
