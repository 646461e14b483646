// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for sentibench
//!
//! This module defines all error types used throughout the application.

use thiserror::Error;

use crate::backend::Device;

/// Main error type for sentibench operations
#[derive(Error, Debug)]
pub enum BenchError {
    /// Inference engine errors
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Generator API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised by the inference engine and the model loader
#[derive(Error, Debug)]
pub enum EngineError {
    /// Requested backend is not available in this environment
    #[error("Backend not available: {0}")]
    UnsupportedBackend(Device),

    /// Model construction failed
    #[error("Model load failed: {0}")]
    LoadFailure(String),

    /// A classification call failed
    #[error("Inference failed: {0}")]
    InferenceFailure(String),
}

/// Errors from the test-case generator API
#[derive(Error, Debug)]
pub enum ApiError {
    /// No API key configured
    #[error("No API key configured: set {0} or run 'sentibench settings'")]
    MissingApiKey(String),

    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// API returned an error status
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for sentibench operations
pub type Result<T> = std::result::Result<T, BenchError>;
