use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::config::GenerativeAiSettings;

/// Client for a `generateContent` style text generation API.
pub struct GenerativeAiClient {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Secret<String>,
}

#[derive(serde::Serialize)]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(serde::Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(serde::Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(serde::Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(serde::Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(thiserror::Error)]
pub enum GenerativeAiError {
    #[error("Failed to call the generative AI API.")]
    RequestError(#[from] reqwest::Error),
    #[error("The generative AI API returned no text.")]
    EmptyResponse,
}

impl std::fmt::Debug for GenerativeAiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::utils::error_chain_fmt(self, f)
    }
}

impl GenerativeAiClient {
    pub fn new(
        base_url: String,
        model: String,
        api_key: Secret<String>,
        timeout: time::Duration,
    ) -> Result<GenerativeAiClient, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(GenerativeAiClient {
            http_client,
            base_url,
            model,
            api_key,
        })
    }

    pub fn from_settings(settings: &GenerativeAiSettings) -> Result<Self, reqwest::Error> {
        Self::new(
            settings.base_url.clone(),
            settings.model.clone(),
            settings.api_key.clone(),
            settings.get_timeout(),
        )
    }

    /// Sends a single prompt and returns the trimmed text of the first candidate.
    #[tracing::instrument(name = "Generating text", skip(self, prompt), fields(model = %self.model))]
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerativeAiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentBody {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response: GenerateContentResponse = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerativeAiError::EmptyResponse);
        }

        Ok(text)
    }
}
