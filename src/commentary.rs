use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CommentaryError;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const TEMPERATURE: f64 = 0.8;

/// Shown when no API key is configured
pub const NO_CREDENTIALS_FALLBACK: &str =
    "Excellent focus today! Your brain agility is showing great potential.";
/// Shown when the service fails or says nothing
pub const REQUEST_FAILED_FALLBACK: &str = "Great performance! Keep pushing your mental limits.";

/// Produces a one-line verdict on a finished run. Never fails: problems turn
/// into a fixed fallback line.
pub trait Commentator: Send + Sync {
    fn summarize(&self, score: u32, accuracy: f64, max_streak: u32) -> String;
}

pub fn build_prompt(score: u32, accuracy: f64, max_streak: u32) -> String {
    format!(
        "The player just finished a cognitive game.\n\
         Stats: Score {score}, Accuracy {}%, Longest Streak {max_streak}.\n\
         Give a short, punchy, witty 1-sentence assessment of their focus and brain agility.",
        (accuracy * 100.0).round() as u32
    )
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug, Default)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Debug, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Text of the first candidate, trimmed; None when blank
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let joined: String = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Commentary from the Gemini text generation API
#[derive(Debug, Clone)]
pub struct GeminiCommentator {
    api_key: Option<String>,
    model: String,
    api_base: String,
    agent: ureq::Agent,
}

impl GeminiCommentator {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            api_base: API_BASE.to_string(),
            agent,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    pub fn request(&self, prompt: &str) -> Result<String, CommentaryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CommentaryError::MissingCredentials)?;

        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let response: GenerateResponse = self
            .agent
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .send_json(&body)?
            .into_body()
            .read_json()?;

        response.text().ok_or(CommentaryError::Empty)
    }
}

impl Commentator for GeminiCommentator {
    fn summarize(&self, score: u32, accuracy: f64, max_streak: u32) -> String {
        match self.request(&build_prompt(score, accuracy, max_streak)) {
            Ok(text) => text,
            Err(CommentaryError::MissingCredentials) => {
                info!("No commentary API key; using the stock verdict");
                NO_CREDENTIALS_FALLBACK.to_string()
            }
            Err(e) => {
                warn!("Commentary unavailable: {e}");
                REQUEST_FAILED_FALLBACK.to_string()
            }
        }
    }
}
