// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Command handlers for the sentibench CLI
//!
//! Each handler gathers plain data from the services and renders it as
//! text or JSON according to `--format`. Nothing in here is reachable
//! from the library surface; it is presentation only.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::backend::{Capabilities, Device, HostProfile};
use crate::bench::{BenchStatus, BenchmarkRunner};
use crate::cli::OutputFormat;
use crate::config::Settings;
use crate::diagnostics::{Diagnostics, StepStatus};
use crate::engine::{EngineInfo, InferenceEngine, LoadProgress, MockEngine, ProgressSink, SidecarEngine};
use crate::error::{BenchError, EngineError, Result};
use crate::model::ModelLoader;
use crate::testgen::TestCaseGenerator;

/// Build the configured inference engine
pub fn build_engine(kind: &str, settings: &Settings) -> Result<Arc<dyn InferenceEngine>> {
    match kind {
        "sidecar" => Ok(Arc::new(SidecarEngine::with_base_url(
            &settings.engine.base_url,
        ))),
        "mock" => Ok(Arc::new(MockEngine::new())),
        other => Err(BenchError::Config(format!(
            "unknown engine '{other}' (expected 'sidecar' or 'mock')"
        ))),
    }
}

/// Build the model loader for an engine
pub fn build_loader(engine: Arc<dyn InferenceEngine>, settings: &Settings) -> Arc<ModelLoader> {
    Arc::new(ModelLoader::new(
        engine,
        settings.engine.task.clone(),
        settings.engine.model.clone(),
    ))
}

#[derive(Serialize)]
struct ProbeReport {
    host: HostProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    engine: Option<EngineInfo>,
    generator_configured: bool,
}

/// `probe`: host capabilities, engine identification, generator status
pub async fn run_probe(
    engine: &dyn InferenceEngine,
    settings: &Settings,
    format: &OutputFormat,
) -> Result<()> {
    let host = HostProfile::detect();
    let engine_info = match engine.info().await {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!("engine info unavailable: {e}");
            None
        }
    };

    let report = ProbeReport {
        host,
        engine: engine_info,
        generator_configured: settings.generator_api_key().is_some(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("Host");
            println!("  cpu:     {} ({} cores)", report.host.cpu_brand, report.host.cpu_cores);
            println!("  ram:     {} GB", report.host.ram_gb);
            println!("  webgpu:  {}", yes_no(report.host.capabilities.webgpu));
            println!("  webgl:   {}", yes_no(report.host.capabilities.webgl));
            match &report.engine {
                Some(info) => println!(
                    "Engine\n  {} {}",
                    info.name,
                    info.version.as_deref().unwrap_or("(version unknown)")
                ),
                None => println!("Engine\n  unavailable"),
            }
            println!(
                "Generator\n  {}",
                if report.generator_configured {
                    "configured"
                } else {
                    "no API key"
                }
            );
        }
    }
    Ok(())
}

/// `load`: bind the model to a device
pub async fn run_load(
    loader: &ModelLoader,
    capabilities: Capabilities,
    device: Device,
    force: bool,
    format: &OutputFormat,
) -> Result<()> {
    if device.requires_gpu() && !capabilities.supports(device) {
        return Err(EngineError::UnsupportedBackend(device).into());
    }

    let bar = load_bar(device);
    let sink = bar_sink(&bar);
    loader.load_with_progress(device, force, Some(sink)).await?;
    bar.finish_and_clear();

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "device": device, "model": loader.model() })
        ),
        OutputFormat::Text => println!("Model '{}' ready on {}", loader.model(), device.display_name()),
    }
    Ok(())
}

/// `classify`: run one inference over user text
pub async fn run_classify(
    loader: Arc<ModelLoader>,
    device: Option<Device>,
    text: &str,
    format: &OutputFormat,
) -> Result<()> {
    if let Some(device) = device {
        loader.load(device, false).await?;
    }

    let analyzer = Analyzer::new(Arc::clone(&loader));
    let result = analyzer.analyze(text).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            println!("{}  ({:.1}%)", result.label, result.score * 100.0);
        }
    }
    Ok(())
}

/// `bench`: full backend benchmark suite
pub async fn run_bench(
    loader: Arc<ModelLoader>,
    capabilities: Capabilities,
    payload_chars: usize,
    format: &OutputFormat,
) -> Result<()> {
    let runner = BenchmarkRunner::with_payload_chars(loader, capabilities, payload_chars);
    let results = runner.run().await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => {
            println!("{:<14} {:>12} {:>12}", "Device", "Time (ms)", "Speedup");
            for row in &results {
                let time = match row.status {
                    BenchStatus::Success => format!("{:.1}", row.elapsed_ms),
                    BenchStatus::Error => "error".to_string(),
                };
                println!(
                    "{:<14} {:>12} {:>12}",
                    row.device.display_name(),
                    time,
                    row.speedup.display()
                );
                if let Some(detail) = &row.detail {
                    println!("  {detail}");
                }
            }
        }
    }
    Ok(())
}

/// `generate`: synthetic test sentences via the LLM API
pub async fn run_generate(
    settings: &Settings,
    topic: &str,
    count: usize,
    format: &OutputFormat,
) -> Result<()> {
    let generator = TestCaseGenerator::new(&settings.generator);
    let cases = generator.generate(topic, count).await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cases)?),
        OutputFormat::Text => {
            for case in &cases {
                println!("[{:?}] {}", case.expected_sentiment, case.text);
            }
        }
    }
    Ok(())
}

/// `doctor`: startup diagnostic sequence
pub async fn run_doctor(loader: Arc<ModelLoader>, format: &OutputFormat) -> Result<()> {
    let bar = load_bar(Device::Cpu);
    let sink = bar_sink(&bar);
    let report = Diagnostics::new(loader).run(Some(sink)).await;
    bar.finish_and_clear();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            for step in &report.steps {
                let mark = match step.status {
                    StepStatus::Success => "ok",
                    StepStatus::Error => "FAIL",
                };
                println!(
                    "[{:<4}] {:<10} {} ({:.1} ms)",
                    mark, step.step, step.message, step.duration_ms
                );
            }
            println!(
                "{}",
                if report.ok {
                    "All checks passed."
                } else {
                    "Diagnostics failed."
                }
            );
        }
    }
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn load_bar(device: Device) -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:30}] {pos}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message(format!("loading ({device})"));
    bar
}

fn bar_sink(bar: &ProgressBar) -> ProgressSink {
    let bar = bar.clone();
    Arc::new(move |p: LoadProgress| {
        bar.set_position(p.percent.clamp(0.0, 100.0) as u64);
    })
}
