// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Compute devices and execution-backend configuration
//!
//! A [`Device`] names where inference should run; [`BackendConfig`] is the
//! derived engine configuration (execution backend id + weight precision)
//! that is passed explicitly into every model load.

pub mod probe;

pub use probe::{Capabilities, HostProfile};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Compute device for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// CPU execution via the WASM backend (default)
    #[default]
    Cpu,
    /// GPU execution via the WebGL backend
    #[value(name = "webgl")]
    WebGl,
    /// GPU execution via the WebGPU backend
    #[value(name = "webgpu")]
    WebGpu,
}

impl Device {
    /// Stable lowercase name, used on the wire and in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::WebGl => "webgl",
            Device::WebGpu => "webgpu",
        }
    }

    /// Whether this device needs a GPU-accelerated backend
    pub fn requires_gpu(&self) -> bool {
        !matches!(self, Device::Cpu)
    }

    /// Human-readable label for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            Device::Cpu => "CPU (WASM)",
            Device::WebGl => "GPU (WebGL)",
            Device::WebGpu => "GPU (WebGPU)",
        }
    }

    /// Parse a device name (lowercase wire form)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cpu" | "wasm" => Some(Device::Cpu),
            "webgl" => Some(Device::WebGl),
            "webgpu" => Some(Device::WebGpu),
            _ => None,
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution backend identifier understood by the inference engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionBackend {
    /// CPU kernels compiled to WASM
    Wasm,
    /// WebGL compute path
    WebGl,
    /// WebGPU compute path
    WebGpu,
}

impl ExecutionBackend {
    /// Stable backend id as the engine expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionBackend::Wasm => "wasm",
            ExecutionBackend::WebGl => "webgl",
            ExecutionBackend::WebGpu => "webgpu",
        }
    }
}

/// Engine configuration derived from a [`Device`]
///
/// Quantized (int8) weights are only used on the CPU path: GPU int8 kernels
/// are frequently unavailable and the engine would silently fall back to
/// CPU, which would invalidate any GPU benchmark numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Execution backend to select
    pub backend: ExecutionBackend,
    /// Use int8 quantized weights instead of fp32
    pub quantized: bool,
}

impl BackendConfig {
    /// Map a device to its engine configuration
    ///
    /// Total over all devices; there is no failure case.
    pub fn for_device(device: Device) -> Self {
        match device {
            Device::Cpu => Self {
                backend: ExecutionBackend::Wasm,
                quantized: true,
            },
            Device::WebGl => Self {
                backend: ExecutionBackend::WebGl,
                quantized: false,
            },
            Device::WebGpu => Self {
                backend: ExecutionBackend::WebGpu,
                quantized: false,
            },
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::for_device(Device::Cpu)
    }
}
