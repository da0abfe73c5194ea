use std::env;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use sleeplog_core::{AnalysisError, Analyst};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "SLEEPLOG_MODEL";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Google Gemini `generateContent` over blocking HTTP.
pub struct GeminiAnalyst {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl GeminiAnalyst {
    pub fn new(api_key: String, model: String) -> Result<Self, AnalysisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AnalysisError::Unreachable(e.to_string()))?;
        Ok(Self { client, api_key, model })
    }

    pub fn from_env() -> Result<Self, AnalysisError> {
        let api_key = env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnalysisError::Unauthorized(format!("{} is not set", API_KEY_ENV)))?;
        let model = env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(api_key, model)
    }
}

impl Analyst for GeminiAnalyst {
    fn analyze(&self, prompt: &str) -> Result<String, AnalysisError> {
        let url = format!("{}/{}:generateContent", ENDPOINT, self.model);
        let body = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
        };

        info!("Requesting analysis from {}", self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| AnalysisError::Unreachable(e.to_string()))?;

        let status = response.status();
        debug!("Analysis service answered {}", status);
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AnalysisError::Unauthorized(status.to_string()));
        }
        if !status.is_success() {
            return Err(AnalysisError::Unreachable(format!("HTTP {}", status)));
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| AnalysisError::Unreachable(e.to_string()))?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(AnalysisError::EmptyResponse)
    }
}
