// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Single-slot model loader
//!
//! Owns at most one live model instance at a time, keyed by the device it
//! was loaded for. Switching devices (or forcing a reload) disposes the
//! previous instance before constructing the new one; only one instance
//! is ever resident, since the backends share GPU/CPU memory.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::{BackendConfig, Device};
use crate::engine::{Classification, InferenceEngine, LoadOptions, ModelInstance, ProgressSink};
use crate::error::{EngineError, Result};

struct LoadedModel {
    instance: Box<dyn ModelInstance>,
    device: Device,
}

/// Device-keyed owner of the single live model instance
///
/// All access to the instance goes through this type; nothing else may
/// hold a reference across a device switch.
pub struct ModelLoader {
    engine: Arc<dyn InferenceEngine>,
    task: String,
    model: String,
    slot: RwLock<Option<LoadedModel>>,
}

impl ModelLoader {
    /// Create a loader for the given engine and model
    pub fn new(engine: Arc<dyn InferenceEngine>, task: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            engine,
            task: task.into(),
            model: model.into(),
            slot: RwLock::new(None),
        }
    }

    /// The device the live instance is bound to, if any
    pub async fn bound_device(&self) -> Option<Device> {
        self.slot.read().await.as_ref().map(|m| m.device)
    }

    /// The model id this loader constructs
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Load the model for `device`
    ///
    /// With `force == false` and a live instance already bound to the same
    /// device this is a no-op: the engine is not re-invoked. Otherwise the
    /// previous instance (if any) is disposed and the slot cleared before
    /// construction, so a failed load leaves the loader unbound rather
    /// than half-bound, and the next call retries cleanly.
    pub async fn load(&self, device: Device, force: bool) -> Result<()> {
        self.load_with_progress(device, force, None).await
    }

    /// Like [`load`](Self::load), reporting construction progress to `sink`
    pub async fn load_with_progress(
        &self,
        device: Device,
        force: bool,
        sink: Option<ProgressSink>,
    ) -> Result<()> {
        {
            let guard = self.slot.read().await;
            if let Some(model) = guard.as_ref() {
                if model.device == device && !force {
                    return Ok(());
                }
            }
        }

        let mut guard = self.slot.write().await;

        // Re-check under the write lock.
        if let Some(model) = guard.as_ref() {
            if model.device == device && !force {
                return Ok(());
            }
        }

        if let Some(mut previous) = guard.take() {
            tracing::info!(device = %previous.device, "disposing previous model instance");
            previous.instance.dispose().await;
        }

        let mut options = LoadOptions::new(BackendConfig::for_device(device));
        if let Some(sink) = sink {
            options = options.with_progress(sink);
        }

        tracing::info!(
            device = %device,
            backend = options.config.backend.as_str(),
            quantized = options.config.quantized,
            model = %self.model,
            "loading model"
        );

        let instance = self
            .engine
            .load(&self.task, &self.model, options)
            .await
            .map_err(|e| match e {
                crate::error::BenchError::Engine(inner) => crate::error::BenchError::Engine(inner),
                other => EngineError::LoadFailure(other.to_string()).into(),
            })?;

        *guard = Some(LoadedModel { instance, device });
        Ok(())
    }

    /// Classify `text` with the live instance
    ///
    /// Auto-loads the CPU default when nothing is bound. Inference
    /// failures propagate to the caller; there is no fallback.
    pub async fn classify(&self, text: &str) -> Result<Vec<Classification>> {
        if self.bound_device().await.is_none() {
            self.load(Device::default(), false).await?;
        }

        let guard = self.slot.read().await;
        let model = guard
            .as_ref()
            .ok_or_else(|| EngineError::LoadFailure("model slot empty after load".to_string()))?;

        model.instance.classify(text).await
    }
}
