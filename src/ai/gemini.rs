use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AiError;
use crate::settings::Config;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }

    fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|x| x.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WebChunk {
    pub uri: Option<String>,
    pub title: Option<String>,
}

/// Citation returned alongside search-grounded text.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GroundingChunk {
    pub web: Option<WebChunk>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Generation {
    pub text: String,
    pub grounding_chunks: Vec<GroundingChunk>,
}

impl GenerateContentResponse {
    /// Text and citations of the first candidate.
    pub fn into_generation(self) -> Result<Generation, AiError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(AiError::EmptyResponse)?;
        let text = candidate
            .content
            .map(|x| x.joined_text())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(Generation {
            text,
            grounding_chunks: candidate
                .grounding_metadata
                .map(|x| x.grounding_chunks)
                .unwrap_or_default(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key().map(str::to_string),
        })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    pub async fn generate(&self, request: &GenerateContentRequest) -> Result<Generation, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        tracing::debug!("calling language model {}", self.model);
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let body: GenerateContentResponse = resp.json().await?;
        body.into_generation()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest {
            system_instruction: Some(Content::text(None, "be nice")),
            contents: vec![Content::text(Some("user"), "hello")],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.5),
                max_output_tokens: Some(100),
                response_mime_type: None,
                response_schema: None,
            }),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "systemInstruction": {"parts": [{"text": "be nice"}]},
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "generationConfig": {"temperature": 0.5, "maxOutputTokens": 100}
            })
        );
    }

    #[test]
    fn test_response_into_generation() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]},
                "groundingMetadata": {
                    "groundingChunks": [{"web": {"uri": "https://example.com", "title": "Example"}}]
                }
            }]
        });
        let resp: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let generation = resp.into_generation().unwrap();
        assert_eq!(generation.text, "Hello there");
        assert_eq!(generation.grounding_chunks.len(), 1);
        assert_eq!(
            generation.grounding_chunks[0].web.as_ref().unwrap().title,
            Some("Example".to_string())
        );
    }

    #[test]
    fn test_empty_response_is_error() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(resp.into_generation(), Err(AiError::EmptyResponse)));

        let resp: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"content": {"parts": []}}]})).unwrap();
        assert!(matches!(resp.into_generation(), Err(AiError::EmptyResponse)));
    }
}
