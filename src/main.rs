// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! sentibench - sentiment inference lab for your terminal
//!
//! Entry point for the sentibench CLI application.

use clap::Parser;
use std::sync::Arc;

use sentibench::backend::Capabilities;
use sentibench::cli::{Cli, Commands};
use sentibench::commands;
use sentibench::config::Settings;
use sentibench::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing. Default WARN; `-v` enables crate diagnostics
    // without requiring users to know target names. RUST_LOG still wins.
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    if cli.verbose > 0 {
        let directive = if cli.verbose > 1 {
            "sentibench=trace"
        } else {
            "sentibench=debug"
        };
        if let Ok(parsed) = directive.parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Load settings.
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    let engine_kind = cli
        .engine
        .clone()
        .unwrap_or_else(|| settings.engine.kind.clone());
    let engine = commands::build_engine(&engine_kind, &settings)?;
    let loader = commands::build_loader(Arc::clone(&engine), &settings);

    match &cli.command {
        Commands::Probe => commands::run_probe(engine.as_ref(), &settings, &cli.format).await,
        Commands::Load(args) => {
            let device = args.device.unwrap_or(settings.defaults.device);
            commands::run_load(
                &loader,
                Capabilities::detect(),
                device,
                args.force,
                &cli.format,
            )
            .await
        }
        Commands::Classify(args) => {
            commands::run_classify(loader, args.device, &args.text, &cli.format).await
        }
        Commands::Bench(args) => {
            let payload_chars = args.payload_chars.unwrap_or(settings.bench.payload_chars);
            commands::run_bench(loader, Capabilities::detect(), payload_chars, &cli.format).await
        }
        Commands::Generate(args) => {
            let topic = args.topic.clone().unwrap_or(settings.defaults.topic.clone());
            commands::run_generate(&settings, &topic, args.count, &cli.format).await
        }
        Commands::Doctor => commands::run_doctor(loader, &cli.format).await,
    }
}
