// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Inference sidecar engine
//!
//! Talks to a local inference sidecar over HTTP. The sidecar owns the
//! actual runtime (ONNX kernels for the wasm/webgl/webgpu backends) and
//! exposes a small JSON API: load a model session, classify through it,
//! drop it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::engine::{Classification, EngineInfo, InferenceEngine, LoadOptions, ModelInstance};
use crate::error::{BenchError, EngineError, Result};

const DEFAULT_SIDECAR_URL: &str = "http://localhost:3917";

/// Engine backed by a local inference sidecar process
#[derive(Debug)]
pub struct SidecarEngine {
    client: Client,
    base_url: String,
}

impl SidecarEngine {
    /// Create a new sidecar engine with the default base URL
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_SIDECAR_URL)
    }

    /// Create with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Check that the sidecar is running and reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/version", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => Err(Self::map_send_error(e)),
        }
    }

    fn map_send_error(e: reqwest::Error) -> BenchError {
        if e.is_connect() {
            BenchError::Engine(EngineError::LoadFailure(
                "inference sidecar is not running; start it with 'sentibench-sidecar serve'"
                    .to_string(),
            ))
        } else {
            BenchError::Http(e)
        }
    }
}

impl Default for SidecarEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceEngine for SidecarEngine {
    fn name(&self) -> &str {
        "sidecar"
    }

    async fn info(&self) -> Result<EngineInfo> {
        let url = format!("{}/api/version", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if !response.status().is_success() {
            return Err(EngineError::LoadFailure(format!(
                "sidecar version check returned {}",
                response.status()
            ))
            .into());
        }

        let body: VersionResponse = response.json().await?;
        Ok(EngineInfo {
            name: "sidecar".to_string(),
            version: Some(body.version),
        })
    }

    async fn load(
        &self,
        task: &str,
        model: &str,
        options: LoadOptions,
    ) -> Result<Box<dyn ModelInstance>> {
        let url = format!("{}/api/load", self.base_url);
        let request = LoadRequest {
            task: task.to_string(),
            model: model.to_string(),
            backend: options.config.backend.as_str().to_string(),
            quantized: options.config.quantized,
        };

        options.report(0.0, Some(model.to_string()));

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(EngineError::LoadFailure(format!(
                "sidecar load returned {status}: {message}"
            ))
            .into());
        }

        let body: LoadResponse = response
            .json()
            .await
            .map_err(|e| EngineError::LoadFailure(format!("invalid load response: {e}")))?;

        options.report(100.0, Some(model.to_string()));
        tracing::info!(
            session = %body.session,
            backend = request.backend,
            quantized = request.quantized,
            "sidecar session ready"
        );

        Ok(Box::new(SidecarInstance {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            session: body.session,
        }))
    }
}

/// A loaded model session held by the sidecar
#[derive(Debug)]
pub struct SidecarInstance {
    client: Client,
    base_url: String,
    session: String,
}

#[async_trait]
impl ModelInstance for SidecarInstance {
    async fn classify(&self, text: &str) -> Result<Vec<Classification>> {
        let url = format!("{}/api/classify", self.base_url);
        let request = ClassifyRequest {
            session: self.session.clone(),
            text: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::InferenceFailure(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(EngineError::InferenceFailure(format!(
                "sidecar classify returned {status}: {message}"
            ))
            .into());
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| EngineError::InferenceFailure(format!("invalid classify response: {e}")))?;

        Ok(body.results)
    }

    async fn dispose(&mut self) {
        let url = format!("{}/api/session/{}", self.base_url, self.session);
        if let Err(e) = self.client.delete(&url).send().await {
            // Best effort: the sidecar also reaps sessions on its own.
            tracing::debug!(session = %self.session, "session release failed: {e}");
        }
    }
}

#[derive(Debug, Serialize)]
struct LoadRequest {
    task: String,
    model: String,
    backend: String,
    quantized: bool,
}

#[derive(Debug, Deserialize)]
struct LoadResponse {
    session: String,
}

#[derive(Debug, Serialize)]
struct ClassifyRequest {
    session: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    results: Vec<Classification>,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}
