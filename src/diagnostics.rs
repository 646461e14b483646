// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Startup diagnostics
//!
//! Ordered health sequence for the `doctor` command: environment check,
//! model load, warm-up inference. A failing step marks the report failed
//! but the report is always returned so the user sees how far it got.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::backend::HostProfile;
use crate::engine::ProgressSink;
use crate::model::ModelLoader;

/// Outcome of a single diagnostic step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Success,
    Error,
}

/// One step of the diagnostic sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticStep {
    /// Step id: "env", "model", "inference"
    pub step: String,
    /// Success or error
    pub status: StepStatus,
    /// Human-readable outcome
    pub message: String,
    /// Step duration in milliseconds
    pub duration_ms: f64,
}

/// Full diagnostic report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// All steps attempted, in order
    pub steps: Vec<DiagnosticStep>,
    /// Whether every step succeeded
    pub ok: bool,
}

/// Runs the diagnostic sequence against the shared loader
pub struct Diagnostics {
    loader: Arc<ModelLoader>,
}

impl Diagnostics {
    /// Create a diagnostic runner over the given loader
    pub fn new(loader: Arc<ModelLoader>) -> Self {
        Self { loader }
    }

    /// Execute the sequence: environment, model load, warm-up inference
    ///
    /// Stops at the first failing step; earlier successful steps stay in
    /// the report.
    pub async fn run(&self, progress: Option<ProgressSink>) -> DiagnosticReport {
        let mut steps = Vec::new();

        // Step 1: environment.
        let start = Instant::now();
        let profile = HostProfile::detect();
        steps.push(DiagnosticStep {
            step: "env".to_string(),
            status: StepStatus::Success,
            message: format!(
                "{} cores, {} GB RAM, webgpu: {}, webgl: {}",
                profile.cpu_cores,
                profile.ram_gb,
                profile.capabilities.webgpu,
                profile.capabilities.webgl
            ),
            duration_ms: elapsed_ms(start),
        });

        // Step 2: model load (CPU default).
        let start = Instant::now();
        match self
            .loader
            .load_with_progress(crate::backend::Device::Cpu, false, progress)
            .await
        {
            Ok(()) => steps.push(DiagnosticStep {
                step: "model".to_string(),
                status: StepStatus::Success,
                message: format!("model '{}' loaded and cached", self.loader.model()),
                duration_ms: elapsed_ms(start),
            }),
            Err(e) => {
                steps.push(DiagnosticStep {
                    step: "model".to_string(),
                    status: StepStatus::Error,
                    message: e.to_string(),
                    duration_ms: elapsed_ms(start),
                });
                return DiagnosticReport { steps, ok: false };
            }
        }

        // Step 3: warm-up inference.
        let start = Instant::now();
        match self.loader.classify("Diagnostic warm up").await {
            Ok(_) => steps.push(DiagnosticStep {
                step: "inference".to_string(),
                status: StepStatus::Success,
                message: "warm-up inference succeeded".to_string(),
                duration_ms: elapsed_ms(start),
            }),
            Err(e) => {
                steps.push(DiagnosticStep {
                    step: "inference".to_string(),
                    status: StepStatus::Error,
                    message: e.to_string(),
                    duration_ms: elapsed_ms(start),
                });
                return DiagnosticReport { steps, ok: false };
            }
        }

        DiagnosticReport { steps, ok: true }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;

    fn diagnostics(engine: &MockEngine) -> Diagnostics {
        let loader = Arc::new(ModelLoader::new(
            Arc::new(engine.clone()),
            "sentiment-analysis",
            "distilbert-sst2",
        ));
        Diagnostics::new(loader)
    }

    #[tokio::test]
    async fn test_diagnostics_all_steps_pass() {
        let engine = MockEngine::new();
        let report = diagnostics(&engine).run(None).await;

        assert!(report.ok);
        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.steps[0].step, "env");
        assert_eq!(report.steps[1].step, "model");
        assert_eq!(report.steps[2].step, "inference");
        assert!(report
            .steps
            .iter()
            .all(|s| s.status == StepStatus::Success));
    }

    #[tokio::test]
    async fn test_diagnostics_stops_on_load_failure() {
        let engine = MockEngine::new().with_failing_backend("wasm");
        let report = diagnostics(&engine).run(None).await;

        assert!(!report.ok);
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.steps[1].status, StepStatus::Error);
    }

    #[tokio::test]
    async fn test_diagnostics_reports_inference_failure() {
        let engine = MockEngine::new().with_classify_failure("wasm");
        let report = diagnostics(&engine).run(None).await;

        assert!(!report.ok);
        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.steps[2].status, StepStatus::Error);
        assert!(report.steps[2].message.contains("Inference failed"));
    }

    #[tokio::test]
    async fn test_diagnostics_report_serializes() {
        let engine = MockEngine::new();
        let report = diagnostics(&engine).run(None).await;

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["steps"][0]["step"], "env");
    }
}
