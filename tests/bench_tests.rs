// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::Arc;

use sentibench::backend::{Capabilities, Device, ExecutionBackend};
use sentibench::bench::{BenchStatus, BenchmarkRunner, Speedup, DEVICE_ORDER};
use sentibench::engine::MockEngine;
use sentibench::model::ModelLoader;

fn loader(engine: &MockEngine) -> Arc<ModelLoader> {
    Arc::new(ModelLoader::new(
        Arc::new(engine.clone()),
        "sentiment-analysis",
        "distilbert-sst2",
    ))
}

fn all_capabilities() -> Capabilities {
    Capabilities {
        webgpu: true,
        webgl: true,
    }
}

#[tokio::test]
async fn bench_returns_one_result_per_device_in_order() {
    let engine = MockEngine::new();
    let runner = BenchmarkRunner::new(loader(&engine), all_capabilities());

    let results = runner.run().await;

    assert_eq!(results.len(), 3);
    let devices: Vec<Device> = results.iter().map(|r| r.device).collect();
    assert_eq!(devices, DEVICE_ORDER.to_vec());
    assert!(results.iter().all(|r| r.status == BenchStatus::Success));
}

#[tokio::test]
async fn bench_skips_unsupported_webgpu_without_touching_loader() {
    let engine = MockEngine::new();
    let caps = Capabilities {
        webgpu: false,
        webgl: true,
    };
    let runner = BenchmarkRunner::new(loader(&engine), caps);

    let results = runner.run().await;

    assert_eq!(results[0].device, Device::Cpu);
    assert_eq!(results[0].status, BenchStatus::Success);
    assert_eq!(results[1].device, Device::WebGl);
    assert_eq!(results[1].status, BenchStatus::Success);
    assert_eq!(results[2].device, Device::WebGpu);
    assert_eq!(results[2].status, BenchStatus::Error);
    assert_eq!(results[2].elapsed_ms, 0.0);

    // The loader was never asked for a webgpu backend.
    assert!(engine
        .recorded_loads()
        .iter()
        .all(|l| l.backend != ExecutionBackend::WebGpu));
}

#[tokio::test]
async fn bench_restores_cpu_binding_after_run() {
    let engine = MockEngine::new();
    let loader = loader(&engine);
    let runner = BenchmarkRunner::new(Arc::clone(&loader), all_capabilities());

    runner.run().await;

    assert_eq!(loader.bound_device().await, Some(Device::Cpu));
}

#[tokio::test]
async fn bench_restores_cpu_binding_even_after_failures() {
    let engine = MockEngine::new()
        .with_failing_backend("webgl")
        .with_failing_backend("webgpu");
    let loader = loader(&engine);
    let runner = BenchmarkRunner::new(Arc::clone(&loader), all_capabilities());

    let results = runner.run().await;

    assert_eq!(results[1].status, BenchStatus::Error);
    assert_eq!(results[2].status, BenchStatus::Error);
    assert_eq!(loader.bound_device().await, Some(Device::Cpu));
}

#[tokio::test]
async fn bench_one_device_failure_does_not_abort_the_rest() {
    let engine = MockEngine::new().with_failing_backend("webgl");
    let runner = BenchmarkRunner::new(loader(&engine), all_capabilities());

    let results = runner.run().await;

    assert_eq!(results[1].device, Device::WebGl);
    assert_eq!(results[1].status, BenchStatus::Error);
    assert_eq!(results[1].elapsed_ms, 0.0);

    // webgpu still ran after webgl failed.
    assert_eq!(results[2].device, Device::WebGpu);
    assert_eq!(results[2].status, BenchStatus::Success);
}

#[tokio::test]
async fn bench_inference_failure_is_an_error_row() {
    let engine = MockEngine::new().with_classify_failure("webgl");
    let runner = BenchmarkRunner::new(loader(&engine), all_capabilities());

    let results = runner.run().await;

    assert_eq!(results[1].device, Device::WebGl);
    assert_eq!(results[1].status, BenchStatus::Error);
    assert!(results[1]
        .detail
        .as_deref()
        .unwrap_or_default()
        .contains("Inference failed"));
}

#[tokio::test]
async fn bench_attempts_each_device_exactly_once() {
    let engine = MockEngine::new();
    let runner = BenchmarkRunner::new(loader(&engine), all_capabilities());

    runner.run().await;

    // Three measured loads plus the restore reload; no retries anywhere.
    assert_eq!(engine.load_count(), 4);
    // One warm-up plus one timed inference per successful device.
    assert_eq!(engine.classify_count(), 6);
}

#[tokio::test]
async fn bench_cpu_row_is_reference_speedup() {
    let engine = MockEngine::new();
    let runner = BenchmarkRunner::new(loader(&engine), all_capabilities());

    let results = runner.run().await;

    assert_eq!(results[0].speedup, Speedup::Reference);
    for row in &results[1..] {
        match row.speedup {
            Speedup::Ratio { value } => assert!(value > 0.0),
            other => panic!("expected ratio for {}, got {other:?}", row.device),
        }
    }
}

#[tokio::test]
async fn bench_speedup_unavailable_when_cpu_fails() {
    let engine = MockEngine::new().with_failing_backend("wasm");
    let runner = BenchmarkRunner::new(loader(&engine), all_capabilities());

    let results = runner.run().await;

    assert_eq!(results[0].status, BenchStatus::Error);
    for row in &results {
        assert_eq!(row.speedup, Speedup::Unavailable);
    }
}

#[tokio::test]
async fn bench_speedup_unavailable_for_skipped_device() {
    let engine = MockEngine::new();
    let caps = Capabilities {
        webgpu: false,
        webgl: true,
    };
    let runner = BenchmarkRunner::new(loader(&engine), caps);

    let results = runner.run().await;

    assert_eq!(results[2].speedup, Speedup::Unavailable);
    assert_eq!(results[0].speedup, Speedup::Reference);
}

#[tokio::test]
async fn bench_loads_are_always_forced() {
    // Pre-bind the CPU model; the benchmark must still reload it to
    // observe the true per-device configuration.
    let engine = MockEngine::new();
    let loader = loader(&engine);
    loader.load(Device::Cpu, false).await.unwrap();
    assert_eq!(engine.load_count(), 1);

    let runner = BenchmarkRunner::new(Arc::clone(&loader), all_capabilities());
    runner.run().await;

    // 1 pre-bind + 3 measured + 1 restore.
    assert_eq!(engine.load_count(), 5);
}
