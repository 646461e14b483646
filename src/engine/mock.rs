// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock inference engine for testing
//!
//! Provides a configurable mock implementation of the InferenceEngine
//! trait that can be used in unit tests (and via `--engine mock` for
//! offline demos) without a running sidecar.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::backend::ExecutionBackend;
use crate::engine::{Classification, EngineInfo, InferenceEngine, LoadOptions, ModelInstance};
use crate::error::{EngineError, Result};

/// A recorded load request
#[derive(Debug, Clone)]
pub struct RecordedLoad {
    /// Task the model was requested for
    pub task: String,
    /// Model id
    pub model: String,
    /// Execution backend requested
    pub backend: ExecutionBackend,
    /// Quantization flag requested
    pub quantized: bool,
}

#[derive(Debug, Default)]
struct MockState {
    /// Backends whose loads should fail
    failing_backends: HashSet<&'static str>,
    /// Backends whose classify calls should fail
    classify_failing_backends: HashSet<&'static str>,
    /// Recorded load requests, in order
    recorded_loads: Vec<RecordedLoad>,
}

/// A mock inference engine for testing
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    state: Arc<Mutex<MockState>>,
    load_count: Arc<AtomicUsize>,
    classify_count: Arc<AtomicUsize>,
    dispose_count: Arc<AtomicUsize>,
}

impl MockEngine {
    /// Create a new mock engine that succeeds everywhere
    pub fn new() -> Self {
        Self::default()
    }

    /// Make loads fail for the given execution backend id ("wasm", "webgl", "webgpu")
    pub fn with_failing_backend(self, backend_id: &'static str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_backends
            .insert(backend_id);
        self
    }

    /// Make classify calls fail for the given execution backend id
    pub fn with_classify_failure(self, backend_id: &'static str) -> Self {
        self.state
            .lock()
            .unwrap()
            .classify_failing_backends
            .insert(backend_id);
        self
    }

    /// Number of load calls seen
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    /// Number of classify calls seen across all instances
    pub fn classify_count(&self) -> usize {
        self.classify_count.load(Ordering::SeqCst)
    }

    /// Number of instances disposed
    pub fn dispose_count(&self) -> usize {
        self.dispose_count.load(Ordering::SeqCst)
    }

    /// All recorded load requests, in call order
    pub fn recorded_loads(&self) -> Vec<RecordedLoad> {
        self.state.lock().unwrap().recorded_loads.clone()
    }

    /// The last load request, if any
    pub fn last_load(&self) -> Option<RecordedLoad> {
        self.state.lock().unwrap().recorded_loads.last().cloned()
    }
}

#[async_trait]
impl InferenceEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn info(&self) -> Result<EngineInfo> {
        Ok(EngineInfo {
            name: "mock".to_string(),
            version: Some("0.0.0".to_string()),
        })
    }

    async fn load(
        &self,
        task: &str,
        model: &str,
        options: LoadOptions,
    ) -> Result<Box<dyn ModelInstance>> {
        self.load_count.fetch_add(1, Ordering::SeqCst);

        let backend_id = options.config.backend.as_str();
        {
            let mut state = self.state.lock().unwrap();
            state.recorded_loads.push(RecordedLoad {
                task: task.to_string(),
                model: model.to_string(),
                backend: options.config.backend,
                quantized: options.config.quantized,
            });

            if state.failing_backends.contains(backend_id) {
                return Err(EngineError::LoadFailure(format!(
                    "mock load failure for backend {backend_id}"
                ))
                .into());
            }
        }

        options.report(0.0, Some(model.to_string()));
        options.report(50.0, Some(model.to_string()));
        options.report(100.0, Some(model.to_string()));

        let classify_fails = self
            .state
            .lock()
            .unwrap()
            .classify_failing_backends
            .contains(backend_id);

        Ok(Box::new(MockInstance {
            backend_id,
            classify_fails,
            classify_count: Arc::clone(&self.classify_count),
            dispose_count: Arc::clone(&self.dispose_count),
        }))
    }
}

/// Instance handed out by [`MockEngine`]
#[derive(Debug)]
pub struct MockInstance {
    backend_id: &'static str,
    classify_fails: bool,
    classify_count: Arc<AtomicUsize>,
    dispose_count: Arc<AtomicUsize>,
}

#[async_trait]
impl ModelInstance for MockInstance {
    async fn classify(&self, text: &str) -> Result<Vec<Classification>> {
        self.classify_count.fetch_add(1, Ordering::SeqCst);

        if self.classify_fails {
            return Err(EngineError::InferenceFailure(format!(
                "mock inference failure for backend {}",
                self.backend_id
            ))
            .into());
        }

        // Deterministic toy scoring so demos look plausible.
        let label = if text.to_lowercase().contains("terrible")
            || text.to_lowercase().contains("worst")
            || text.to_lowercase().contains("hate")
        {
            "NEGATIVE"
        } else {
            "POSITIVE"
        };

        Ok(vec![Classification {
            label: label.to_string(),
            score: 0.9,
        }])
    }

    async fn dispose(&mut self) {
        self.dispose_count.fetch_add(1, Ordering::SeqCst);
    }
}
