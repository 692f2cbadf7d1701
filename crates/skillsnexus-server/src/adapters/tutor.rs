//! AI tutor backed by Gemini `generateContent`.
//!
//! `ask` never fails: every error path collapses into a fixed advisory
//! string so the chat always has something to show.

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use skillsnexus_shared::constants::{
    TUTOR_CONNECTION_FAILED, TUTOR_EMPTY_ANSWER, TUTOR_MODEL, TUTOR_TEMPERATURE,
    TUTOR_UNAVAILABLE, TUTOR_WORD_LIMIT,
};

use super::send_json;

#[async_trait]
pub trait TutorModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Answer `query` for a learner currently looking at `context`.
    async fn ask(&self, query: &str, context: &str) -> String;
}

pub fn system_instruction(context: &str) -> String {
    format!(
        "You are the \"SkillsNexus AI Tutor\". \
         Your audience is professionals aged 35-65 in Africa who are non-technical. \
         Your goal is to explain AI concepts simply, professionally, and without \"hype\" or confusing jargon.\n\n\
         Current Course Context: {context}\n\n\
         Keep answers concise (under {TUTOR_WORD_LIMIT} words) unless asked for elaboration. \
         Encourage the user to apply the knowledge to their specific career."
    )
}

/// Used when no generative AI key is configured.
pub struct UnconfiguredTutor;

#[async_trait]
impl TutorModel for UnconfiguredTutor {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn ask(&self, _query: &str, _context: &str) -> String {
        TUTOR_UNAVAILABLE.to_string()
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

pub struct GeminiTutor {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiTutor {
    pub fn new(client: Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl TutorModel for GeminiTutor {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn ask(&self, query: &str, context: &str) -> String {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, TUTOR_MODEL, self.api_key
        );
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": query }] }],
            "systemInstruction": { "parts": [{ "text": system_instruction(context) }] },
            "generationConfig": { "temperature": TUTOR_TEMPERATURE },
        });

        match send_json::<_, GenerateContentResponse>(&self.client, &url, &body, HeaderMap::new())
            .await
        {
            Ok(response) => match response.text() {
                Some(text) => {
                    debug!(chars = text.len(), "Tutor answered");
                    text
                }
                None => TUTOR_EMPTY_ANSWER.to_string(),
            },
            Err(e) => {
                error!(error = %e, "Gemini API error");
                TUTOR_CONNECTION_FAILED.to_string()
            }
        }
    }
}
