// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Sentiment analysis entry point
//!
//! Thin service over the model loader that enforces the input contract:
//! empty or whitespace-only text is rejected before the engine is touched.

use std::sync::Arc;

use crate::engine::Classification;
use crate::error::{BenchError, EngineError, Result};
use crate::model::ModelLoader;

/// Classifies user text through the shared model loader
pub struct Analyzer {
    loader: Arc<ModelLoader>,
}

impl Analyzer {
    /// Create an analyzer over the given loader
    pub fn new(loader: Arc<ModelLoader>) -> Self {
        Self { loader }
    }

    /// Classify `text`, returning the top result
    ///
    /// Empty/whitespace input is rejected without invoking the engine.
    pub async fn analyze(&self, text: &str) -> Result<Classification> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(BenchError::InvalidInput(
                "nothing to analyze: text is empty".to_string(),
            ));
        }

        let results = self.loader.classify(trimmed).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::InferenceFailure("engine returned no results".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;

    fn analyzer(engine: &MockEngine) -> Analyzer {
        let loader = Arc::new(ModelLoader::new(
            Arc::new(engine.clone()),
            "sentiment-analysis",
            "distilbert-sst2",
        ));
        Analyzer::new(loader)
    }

    #[tokio::test]
    async fn test_analyze_returns_top_result() {
        let engine = MockEngine::new();
        let analyzer = analyzer(&engine);

        let result = analyzer.analyze("I love how easy this is").await.unwrap();
        assert_eq!(result.label, "POSITIVE");
        assert!(result.score > 0.0);
    }

    #[tokio::test]
    async fn test_analyze_rejects_empty_input() {
        let engine = MockEngine::new();
        let analyzer = analyzer(&engine);

        let err = analyzer.analyze("").await.unwrap_err();
        assert!(matches!(err, BenchError::InvalidInput(_)));

        // The engine must not have been touched at all.
        assert_eq!(engine.load_count(), 0);
        assert_eq!(engine.classify_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_rejects_whitespace_input() {
        let engine = MockEngine::new();
        let analyzer = analyzer(&engine);

        let err = analyzer.analyze("   \n\t ").await.unwrap_err();
        assert!(matches!(err, BenchError::InvalidInput(_)));
        assert_eq!(engine.classify_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_trims_before_classifying() {
        let engine = MockEngine::new();
        let analyzer = analyzer(&engine);

        let result = analyzer.analyze("  terrible experience  ").await.unwrap();
        assert_eq!(result.label, "NEGATIVE");
    }
}
