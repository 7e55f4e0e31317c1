//! Gemini REST client for image generation.

use std::time::Duration;

use async_trait::async_trait;
use merchmagic_core::error::{MerchError, MerchResult};
use merchmagic_core::models::mockup::{GenerationRequest, ImageData};
use merchmagic_core::provider::ImageGenerator;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MockupConfig;
use crate::data_url::DEFAULT_MIME_TYPE;
use crate::error::MockupError;
use crate::prompt;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// [`ImageGenerator`] backed by the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiImageGenerator {
    client: Client,
    config: MockupConfig,
    base_url: String,
}

impl GeminiImageGenerator {
    pub fn new(config: MockupConfig) -> MerchResult<Self> {
        if config.gemini_api_key.is_empty() {
            return Err(MockupError::NotConfigured("GEMINI_API_KEY").into());
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| MerchError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Point the client at another host (used against local stubs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request(&self, request: &GenerationRequest) -> GenerateContentRequest {
        match request {
            GenerationRequest::Create {
                logo,
                product_type,
                color,
                prompt: extra,
            } => GenerateContentRequest {
                contents: vec![Content {
                    parts: vec![
                        Part::inline(logo),
                        Part::Text {
                            text: prompt::create_prompt(
                                *product_type,
                                color.as_deref(),
                                extra.as_deref(),
                            ),
                        },
                    ],
                }],
                generation_config: Some(GenerationConfig {
                    image_config: ImageConfig {
                        aspect_ratio: self.config.aspect_ratio.clone(),
                    },
                }),
            },
            GenerationRequest::Edit {
                current_mockup,
                logo,
                instruction,
                ..
            } => GenerateContentRequest {
                contents: vec![Content {
                    parts: vec![
                        Part::inline(current_mockup),
                        Part::inline(logo),
                        Part::Text {
                            text: prompt::edit_prompt(instruction),
                        },
                    ],
                }],
                generation_config: None,
            },
        }
    }

    async fn send_request(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, MockupError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.config.model,
            api_key = self.config.gemini_api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| MockupError::Provider(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        response
            .json()
            .await
            .map_err(|err| MockupError::Provider(format!("Failed to parse Gemini response: {err}")))
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    async fn generate(&self, request: &GenerationRequest) -> MerchResult<Option<ImageData>> {
        let body = self.build_request(request);
        let response = self.send_request(&body).await?;
        let image = extract_image(response);
        debug!(
            model = %self.config.model,
            returned_image = image.is_some(),
            "Gemini call finished"
        );
        Ok(image)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

impl Part {
    fn inline(image: &ImageData) -> Self {
        Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    image_config: ImageConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    #[serde(rename = "inlineData")]
    inline_data: Option<ResponseInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseInlineData {
    mime_type: Option<String>,
    data: String,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// First inline image of the first candidate, if any.
fn extract_image(response: GenerateContentResponse) -> Option<ImageData> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| {
            content
                .parts
                .into_iter()
                .find_map(|part| part.inline_data)
        })
        .filter(|inline| !inline.data.is_empty())
        .map(|inline| ImageData {
            mime_type: inline
                .mime_type
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            data: inline.data,
        })
}

fn map_http_error(status: StatusCode, body: &str) -> MockupError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());
    MockupError::Provider(format!("Gemini API returned {}: {message}", status.as_u16()))
}
