// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for sentibench.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::backend::Device;

/// sentibench - sentiment inference lab for your terminal
#[derive(Parser, Debug)]
#[command(name = "sentibench")]
#[command(version, about = "Sentiment inference lab: probe, classify, benchmark")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Engine override (sidecar, mock)
    #[arg(long, global = true)]
    pub engine: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show host capabilities and engine info
    Probe,

    /// Load the model for a device
    Load(LoadArgs),

    /// Classify a piece of text
    Classify(ClassifyArgs),

    /// Benchmark inference across all backends
    Bench(BenchArgs),

    /// Generate labeled test sentences via the LLM API
    Generate(GenerateArgs),

    /// Run the startup diagnostic sequence
    #[command(alias = "diag")]
    Doctor,
}

/// Arguments for the load subcommand
#[derive(clap::Args, Debug)]
pub struct LoadArgs {
    /// Device to load the model for
    #[arg(short, long, value_enum)]
    pub device: Option<Device>,

    /// Force a reload even if the model is already bound to this device
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the classify subcommand
#[derive(clap::Args, Debug)]
pub struct ClassifyArgs {
    /// The text to classify
    pub text: String,

    /// Device to run on
    #[arg(short, long, value_enum)]
    pub device: Option<Device>,
}

/// Arguments for the bench subcommand
#[derive(clap::Args, Debug)]
pub struct BenchArgs {
    /// Target payload length in characters
    #[arg(long)]
    pub payload_chars: Option<usize>,
}

/// Arguments for the generate subcommand
#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Topic to generate sentences about
    pub topic: Option<String>,

    /// Number of sentences to generate
    #[arg(short, long, default_value = "3")]
    pub count: usize,
}

/// Output format for responses
#[derive(ValueEnum, Clone, Debug, Default, PartialEq)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,

    /// JSON output
    Json,
}
