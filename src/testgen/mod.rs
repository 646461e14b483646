// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Synthetic test-case generation
//!
//! Asks a Gemini-style generateContent endpoint for labeled test
//! sentences. This is UI-resilience territory: any failure (missing
//! credential, network, bad status, malformed body) degrades to a fixed
//! static list instead of surfacing to the user.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{ApiError, Result};

/// A generated test sentence with its expected label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// The sentence to analyze
    pub text: String,
    /// Expected sentiment for the sentence
    #[serde(rename = "expectedSentiment")]
    pub expected_sentiment: ExpectedSentiment,
}

/// Expected sentiment of a generated test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpectedSentiment {
    Positive,
    Negative,
    Neutral,
}

/// Client for the test-case generator API
pub struct TestCaseGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl TestCaseGenerator {
    /// Create a generator from settings
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            api_key_env: config.api_key_env.clone(),
        }
    }

    /// Generate `count` test sentences about `topic`
    ///
    /// Never fails: any error is logged and the fixed fallback list is
    /// returned instead.
    pub async fn generate(&self, topic: &str, count: usize) -> Vec<TestCase> {
        match self.generate_inner(topic, count).await {
            Ok(cases) if !cases.is_empty() => cases,
            Ok(_) => {
                tracing::warn!("generator returned no cases, using fallback list");
                fallback_cases()
            }
            Err(e) => {
                tracing::warn!("test-case generation failed, using fallback list: {e}");
                fallback_cases()
            }
        }
    }

    async fn generate_inner(&self, topic: &str, count: usize) -> Result<Vec<TestCase>> {
        let api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ApiError::MissingApiKey(self.api_key_env.clone()))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(topic, count),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::ServerError { status, message }.into());
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| ApiError::InvalidResponse("no candidate text".to_string()))?;

        let cases: Vec<TestCase> = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("candidate is not a case list: {e}")))?;

        Ok(cases)
    }
}

fn build_prompt(topic: &str, count: usize) -> String {
    format!(
        "Generate {count} English sentences about \"{topic}\" for exercising a \
         sentiment-analysis model. Mix positive, negative, and ambiguous/sarcastic \
         tones. Return strictly a JSON array of objects with the fields \"text\" \
         (the sentence) and \"expectedSentiment\" (one of POSITIVE, NEGATIVE, NEUTRAL)."
    )
}

/// The fixed list used whenever generation fails
pub fn fallback_cases() -> Vec<TestCase> {
    vec![
        TestCase {
            text: "The service was absolutely terrible and slow.".to_string(),
            expected_sentiment: ExpectedSentiment::Negative,
        },
        TestCase {
            text: "I simply love how easy this app is to use!".to_string(),
            expected_sentiment: ExpectedSentiment::Positive,
        },
        TestCase {
            text: "It was okay, nothing special but not bad either.".to_string(),
            expected_sentiment: ExpectedSentiment::Neutral,
        },
    ]
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_cases_shape() {
        let cases = fallback_cases();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0].expected_sentiment, ExpectedSentiment::Negative);
        assert_eq!(cases[1].expected_sentiment, ExpectedSentiment::Positive);
        assert_eq!(cases[2].expected_sentiment, ExpectedSentiment::Neutral);
    }

    #[test]
    fn test_test_case_wire_format() {
        let case = TestCase {
            text: "Great phone".to_string(),
            expected_sentiment: ExpectedSentiment::Positive,
        };
        let json = serde_json::to_value(&case).unwrap();
        assert_eq!(json["expectedSentiment"], "POSITIVE");
    }

    #[test]
    fn test_test_case_parses_wire_format() {
        let json = r#"[{"text":"Meh.","expectedSentiment":"NEUTRAL"}]"#;
        let cases: Vec<TestCase> = serde_json::from_str(json).unwrap();
        assert_eq!(cases[0].expected_sentiment, ExpectedSentiment::Neutral);
    }

    #[test]
    fn test_build_prompt_mentions_topic_and_count() {
        let prompt = build_prompt("smartwatch reviews", 5);
        assert!(prompt.contains("smartwatch reviews"));
        assert!(prompt.contains('5'));
        assert!(prompt.contains("NEGATIVE"));
    }

    #[tokio::test]
    async fn test_generate_without_key_returns_fallback() {
        let config = GeneratorConfig {
            api_key: None,
            api_key_env: "SENTIBENCH_TEST_NO_SUCH_KEY_9876".to_string(),
            ..GeneratorConfig::default()
        };
        let generator = TestCaseGenerator::new(&config);

        let cases = generator.generate("anything", 3).await;
        assert_eq!(cases, fallback_cases());
    }
}
