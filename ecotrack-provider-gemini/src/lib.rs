//! Text generator implementation for the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ecotrack_core::ports::{GenerationConfig, GenerationRequest, PortError, TextGenerator};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Body of a `generateContent` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'req> {
    contents: [Content<'req>; 1],
    generation_config: WireConfig,
}

#[derive(Debug, Serialize)]
struct Content<'req> {
    role: &'static str,
    parts: [OutgoingPart<'req>; 1],
}

#[derive(Debug, Serialize)]
struct OutgoingPart<'req> {
    text: &'req str,
}

/// Sampling parameters with the field names the API expects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl From<GenerationConfig> for WireConfig {
    fn from(config: GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

// Every level is optional; a reply without text is an empty reply.
#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<IncomingPart>,
}

#[derive(Debug, Deserialize)]
struct IncomingPart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .unwrap_or_default()
    }
}

/// Gemini client bound to one model and API key.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl GeminiClient {
    /// Client for the public Gemini API using the default model.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::NotConfigured`] for an empty key.
    pub fn new(client: Client, api_key: &str) -> Result<Self, PortError> {
        Self::with_base_url(client, api_key, DEFAULT_MODEL, DEFAULT_BASE_URL)
    }

    /// Client pointed at a custom origin, e.g. a mock server in tests.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::NotConfigured`] for an empty key or model, and
    /// [`PortError::Internal`] when `base_url` is not a valid URL.
    pub fn with_base_url(
        client: Client,
        api_key: &str,
        model: &str,
        base_url: &str,
    ) -> Result<Self, PortError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(PortError::NotConfigured("Gemini API key is empty".to_owned()));
        }
        let model = model.trim();
        if model.is_empty() {
            return Err(PortError::NotConfigured("Gemini model is empty".to_owned()));
        }

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|err| PortError::Internal(format!("invalid base URL '{base_url}': {err}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// Model requests are sent to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> Result<Url, PortError> {
        let mut url = self
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", self.model))
            .map_err(|err| PortError::Internal(format!("cannot build endpoint: {err}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, PortError> {
        let body = GenerateBody {
            contents: [Content {
                role: "user",
                parts: [OutgoingPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: request.config.into(),
        };

        debug!(
            model = %self.model,
            prompt_len = request.prompt.len(),
            "sending generation request"
        );
        let response: GenerateResponse =
            fetch_json(self.client.post(self.endpoint()?).json(&body)).await?;

        let text = response.into_text();
        if text.is_empty() {
            warn!(model = %self.model, "generation returned no text");
        }
        Ok(text)
    }
}

// Small helper to fetch and decode JSON with status handling. Errors drop the
// request URL because it carries the API key.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let response = req
        .send()
        .await
        .map_err(|err| PortError::Network(err.without_url()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PortError::Api(format!("status {status}")));
    }

    response
        .json()
        .await
        .map_err(|err| PortError::Decode(err.without_url()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::with_base_url(Client::new(), "k3y", "gemini-2.0-flash", "https://api.example")
            .expect("valid client")
    }

    #[test]
    fn endpoint_carries_model_and_key() {
        let url = client().endpoint().expect("endpoint");
        assert_eq!(
            url.as_str(),
            "https://api.example/v1beta/models/gemini-2.0-flash:generateContent?key=k3y"
        );
    }

    #[test]
    fn empty_key_is_not_configured() {
        let err = GeminiClient::new(Client::new(), "  ").err();
        assert!(matches!(err, Some(PortError::NotConfigured(_))));
    }

    #[test]
    fn missing_parts_yield_empty_text() {
        assert_eq!(GenerateResponse::default().into_text(), "");
        let response = GenerateResponse {
            candidates: vec![Candidate {
                content: Some(CandidateContent { parts: Vec::new() }),
            }],
        };
        assert_eq!(response.into_text(), "");
    }
}
