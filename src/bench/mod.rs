// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Backend benchmark orchestration
//!
//! Drives the model loader across the fixed device sequence
//! [cpu, webgl, webgpu], one device at a time: capability check, forced
//! reload, one warm-up inference, one timed inference. Per-device failures
//! are recorded and the run continues; afterwards the loader is restored
//! to the CPU default so the process is back in its normal low-resource
//! configuration.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::backend::{Capabilities, Device};
use crate::error::Result;
use crate::model::ModelLoader;

/// The fixed device order every benchmark run walks
pub const DEVICE_ORDER: [Device; 3] = [Device::Cpu, Device::WebGl, Device::WebGpu];

/// Sentence repeated to build the synthetic benchmark payload
const PAYLOAD_SENTENCE: &str =
    "The new firmware update made the device noticeably faster and the battery lasts longer. ";

/// Discarded first inference that absorbs one-time kernel compilation cost
const WARMUP_TEXT: &str = "Warming up the inference pipeline.";

/// Default payload length in characters
pub const DEFAULT_PAYLOAD_CHARS: usize = 600;

/// Outcome of a single device's benchmark attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchStatus {
    /// Timed run completed
    Success,
    /// Skipped (backend unavailable) or failed during load/inference
    Error,
}

/// Speedup relative to the CPU run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Speedup {
    /// The CPU row itself, the 1.0x baseline
    Reference,
    /// cpu_ms / device_ms
    Ratio { value: f64 },
    /// Not computable: this row or the CPU row errored or timed at zero
    Unavailable,
}

impl Speedup {
    /// Render for the text report ("1.00x (ref)", "3.42x", "-")
    pub fn display(&self) -> String {
        match self {
            Speedup::Reference => "1.00x (ref)".to_string(),
            Speedup::Ratio { value } => format!("{value:.2}x"),
            Speedup::Unavailable => "-".to_string(),
        }
    }
}

/// One row of a benchmark report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Device this row describes
    pub device: Device,
    /// Wall-clock time of the timed inference, 0 on skip/failure
    pub elapsed_ms: f64,
    /// Success or error
    pub status: BenchStatus,
    /// Human-readable failure/skip reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Speedup relative to the CPU row
    pub speedup: Speedup,
}

impl BenchmarkResult {
    fn error(device: Device, detail: String) -> Self {
        Self {
            device,
            elapsed_ms: 0.0,
            status: BenchStatus::Error,
            detail: Some(detail),
            speedup: Speedup::Unavailable,
        }
    }

    fn success(device: Device, elapsed_ms: f64) -> Self {
        Self {
            device,
            elapsed_ms,
            status: BenchStatus::Success,
            detail: None,
            speedup: Speedup::Unavailable,
        }
    }
}

/// Sequential benchmark runner over the fixed device set
pub struct BenchmarkRunner {
    loader: Arc<ModelLoader>,
    capabilities: Capabilities,
    payload: String,
}

impl BenchmarkRunner {
    /// Create a runner with the default synthetic payload
    pub fn new(loader: Arc<ModelLoader>, capabilities: Capabilities) -> Self {
        Self::with_payload_chars(loader, capabilities, DEFAULT_PAYLOAD_CHARS)
    }

    /// Create a runner whose payload is built to roughly `chars` characters
    pub fn with_payload_chars(
        loader: Arc<ModelLoader>,
        capabilities: Capabilities,
        chars: usize,
    ) -> Self {
        Self {
            loader,
            capabilities,
            payload: synthetic_payload(chars),
        }
    }

    /// Run the full benchmark sequence
    ///
    /// Returns exactly one result per device, in [`DEVICE_ORDER`].
    /// Per-device failures never abort the run; each device is attempted
    /// exactly once. There are no timeouts: an inference call that never
    /// resolves stalls the run (known limitation, by scope).
    pub async fn run(&self) -> Vec<BenchmarkResult> {
        let mut results = Vec::with_capacity(DEVICE_ORDER.len());

        for device in DEVICE_ORDER {
            if device.requires_gpu() && !self.capabilities.supports(device) {
                tracing::info!(device = %device, "backend not available, skipping");
                results.push(BenchmarkResult::error(
                    device,
                    format!("{device} not available on this host"),
                ));
                continue;
            }

            match self.measure(device).await {
                Ok(elapsed_ms) => {
                    tracing::info!(device = %device, elapsed_ms, "benchmark pass complete");
                    results.push(BenchmarkResult::success(device, elapsed_ms));
                }
                Err(e) => {
                    tracing::warn!(device = %device, "benchmark pass failed: {e}");
                    results.push(BenchmarkResult::error(device, e.to_string()));
                }
            }
        }

        // Restore the normal low-resource configuration whatever happened
        // above. A forced reload, so a stale GPU binding never survives.
        if let Err(e) = self.loader.load(Device::Cpu, true).await {
            tracing::warn!("failed to restore cpu default after benchmark: {e}");
        }

        attach_speedups(&mut results);
        results
    }

    /// One device pass: forced reload, warm-up, timed inference
    async fn measure(&self, device: Device) -> Result<f64> {
        // Always force: the timing must reflect this device's real
        // configuration, never a previously cached instance.
        self.loader.load(device, true).await?;

        // Warm-up absorbs shader/kernel compilation; its timing is discarded.
        self.loader.classify(WARMUP_TEXT).await?;

        let start = Instant::now();
        self.loader.classify(&self.payload).await?;
        Ok(start.elapsed().as_secs_f64() * 1000.0)
    }
}

/// Build the fixed-length synthetic payload
fn synthetic_payload(chars: usize) -> String {
    let mut payload = String::with_capacity(chars + PAYLOAD_SENTENCE.len());
    while payload.len() < chars {
        payload.push_str(PAYLOAD_SENTENCE);
    }
    payload
}

/// Fill in the speedup column of a finished result set
///
/// The CPU row is the reference (identity, never computed by division).
/// Every other row gets `cpu_ms / device_ms` only when both rows are
/// successful with non-zero times; otherwise the speedup stays
/// unavailable.
pub fn attach_speedups(results: &mut [BenchmarkResult]) {
    let cpu = results
        .iter()
        .find(|r| r.device == Device::Cpu)
        .map(|r| (r.status, r.elapsed_ms));

    for result in results.iter_mut() {
        let clean = result.status == BenchStatus::Success && result.elapsed_ms > 0.0;

        result.speedup = match (result.device, cpu) {
            (Device::Cpu, _) if clean => Speedup::Reference,
            (Device::Cpu, _) => Speedup::Unavailable,
            (_, Some((BenchStatus::Success, cpu_ms))) if clean && cpu_ms > 0.0 => Speedup::Ratio {
                value: cpu_ms / result.elapsed_ms,
            },
            _ => Speedup::Unavailable,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(device: Device, status: BenchStatus, elapsed_ms: f64) -> BenchmarkResult {
        BenchmarkResult {
            device,
            elapsed_ms,
            status,
            detail: None,
            speedup: Speedup::Unavailable,
        }
    }

    #[test]
    fn test_synthetic_payload_reaches_target_length() {
        let payload = synthetic_payload(600);
        assert!(payload.len() >= 600);
        assert!(payload.len() < 600 + PAYLOAD_SENTENCE.len());
    }

    #[test]
    fn test_attach_speedups_cpu_is_reference() {
        let mut results = vec![
            result(Device::Cpu, BenchStatus::Success, 120.0),
            result(Device::WebGl, BenchStatus::Success, 40.0),
        ];
        attach_speedups(&mut results);

        assert_eq!(results[0].speedup, Speedup::Reference);
        match results[1].speedup {
            Speedup::Ratio { value } => assert!((value - 3.0).abs() < 1e-9),
            other => panic!("expected ratio, got {other:?}"),
        }
    }

    #[test]
    fn test_attach_speedups_unavailable_when_cpu_errored() {
        let mut results = vec![
            result(Device::Cpu, BenchStatus::Error, 0.0),
            result(Device::WebGpu, BenchStatus::Success, 40.0),
        ];
        attach_speedups(&mut results);

        assert_eq!(results[0].speedup, Speedup::Unavailable);
        assert_eq!(results[1].speedup, Speedup::Unavailable);
    }

    #[test]
    fn test_attach_speedups_unavailable_when_device_errored() {
        let mut results = vec![
            result(Device::Cpu, BenchStatus::Success, 120.0),
            result(Device::WebGpu, BenchStatus::Error, 0.0),
        ];
        attach_speedups(&mut results);

        assert_eq!(results[0].speedup, Speedup::Reference);
        assert_eq!(results[1].speedup, Speedup::Unavailable);
    }

    #[test]
    fn test_attach_speedups_zero_time_is_unavailable() {
        // Degenerate but possible: success status with a zero reading
        // must not divide.
        let mut results = vec![
            result(Device::Cpu, BenchStatus::Success, 120.0),
            result(Device::WebGl, BenchStatus::Success, 0.0),
        ];
        attach_speedups(&mut results);

        assert_eq!(results[1].speedup, Speedup::Unavailable);
    }

    #[test]
    fn test_speedup_display() {
        assert_eq!(Speedup::Reference.display(), "1.00x (ref)");
        assert_eq!(Speedup::Ratio { value: 3.416 }.display(), "3.42x");
        assert_eq!(Speedup::Unavailable.display(), "-");
    }

    #[test]
    fn test_bench_status_serde() {
        assert_eq!(
            serde_json::to_string(&BenchStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::to_string(&BenchStatus::Error).unwrap(),
            "\"error\""
        );
    }

    #[test]
    fn test_benchmark_result_serde_shape() {
        let row = result(Device::WebGpu, BenchStatus::Error, 0.0);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["device"], "webgpu");
        assert_eq!(json["status"], "error");
        assert_eq!(json["elapsed_ms"], 0.0);
        assert_eq!(json["speedup"]["kind"], "unavailable");
    }
}
