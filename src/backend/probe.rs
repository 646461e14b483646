// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Host capability probing
//!
//! Answers two independent questions: does this host expose a WebGPU-class
//! compute path, and does it expose a WebGL-class one? Probing never fails;
//! anything that goes wrong during detection reads as "not supported".

use serde::{Deserialize, Serialize};
use sysinfo::System;

/// GPU backend availability on the current host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// WebGPU-class compute path available
    pub webgpu: bool,
    /// WebGL-class compute path available
    pub webgl: bool,
}

impl Capabilities {
    /// Probe the host's GPU adapters
    ///
    /// A modern-API adapter (Vulkan/Metal/DX12) counts for both backends;
    /// a GL adapter counts for WebGL only. Software rasterizers are
    /// ignored. The env vars `SENTIBENCH_WEBGPU` and `SENTIBENCH_WEBGL`
    /// (`0`/`1`) override detection, for headless hosts and CI.
    pub fn detect() -> Self {
        Self::from_adapters().with_env_overrides()
    }

    /// Whether the given device can run on this host
    pub fn supports(&self, device: crate::backend::Device) -> bool {
        match device {
            crate::backend::Device::Cpu => true,
            crate::backend::Device::WebGl => self.webgl,
            crate::backend::Device::WebGpu => self.webgpu,
        }
    }

    fn from_adapters() -> Self {
        let instance = wgpu::Instance::default();
        let mut caps = Capabilities::default();

        for adapter in instance.enumerate_adapters(wgpu::Backends::all()) {
            let info = adapter.get_info();
            if info.device_type == wgpu::DeviceType::Cpu {
                continue;
            }
            match info.backend {
                wgpu::Backend::Vulkan | wgpu::Backend::Metal | wgpu::Backend::Dx12 => {
                    caps.webgpu = true;
                    caps.webgl = true;
                }
                wgpu::Backend::Gl => caps.webgl = true,
                _ => {}
            }
        }

        tracing::debug!(webgpu = caps.webgpu, webgl = caps.webgl, "probed gpu adapters");
        caps
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(forced) = env_flag("SENTIBENCH_WEBGPU") {
            self.webgpu = forced;
        }
        if let Some(forced) = env_flag("SENTIBENCH_WEBGL") {
            self.webgl = forced;
        }
        self
    }
}

fn env_flag(name: &str) -> Option<bool> {
    match std::env::var(name).ok()?.trim() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Host summary reported by `probe` and `doctor`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostProfile {
    /// Number of logical CPU cores
    pub cpu_cores: usize,
    /// CPU brand/model name
    pub cpu_brand: String,
    /// Total system RAM in GB
    pub ram_gb: usize,
    /// GPU backend availability
    pub capabilities: Capabilities,
}

impl HostProfile {
    /// Detect the current host's profile
    pub fn detect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        let ram_bytes = sys.total_memory();
        let ram_gb = (ram_bytes / (1024 * 1024 * 1024)) as usize;

        let cpu_cores = sys.cpus().len();
        let cpu_brand = sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().to_string())
            .unwrap_or_else(|| "Unknown CPU".to_string());

        Self {
            cpu_cores,
            cpu_brand,
            ram_gb,
            capabilities: Capabilities::detect(),
        }
    }
}
