//! Gemini (Google) background-editing provider.

use crate::edit::prompt::instruction_for;
use crate::edit::provider::ImageEditor;
use crate::edit::types::{EditMetadata, EditRequest, EditedImage, EditorKind, ImageFormat};
use crate::error::{parse_retry_after, sanitize_error_message, BackdropError, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Default per-request timeout. Image edits routinely take tens of seconds.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash Image (fast, economical).
    #[default]
    Flash,
    /// Gemini 3 Pro Image (highest quality).
    Pro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash => "gemini-2.5-flash-image",
            Self::Pro => "gemini-3-pro-image-preview",
        }
    }
}

/// Builder for [`GeminiEditor`].
#[derive(Debug, Clone)]
pub struct GeminiEditorBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    timeout: Duration,
}

impl Default for GeminiEditorBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            model: GeminiModel::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GeminiEditorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, then
    /// `GEMINI_API_KEY`, from the environment.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the editor, resolving the API key.
    pub fn build(self) -> Result<GeminiEditor> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                BackdropError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
            })?;

        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(GeminiEditor {
            client,
            api_key,
            model: self.model,
            timeout: self.timeout,
        })
    }
}

/// Gemini background-editing provider.
pub struct GeminiEditor {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
    timeout: Duration,
}

impl GeminiEditor {
    /// Creates a new [`GeminiEditorBuilder`].
    pub fn builder() -> GeminiEditorBuilder {
        GeminiEditorBuilder::new()
    }

    async fn edit_impl(&self, request: &EditRequest) -> Result<EditedImage> {
        request.validate()?;

        let start = Instant::now();

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model.as_str(),
        );

        let body = GeminiRequest::from_edit_request(request);

        tracing::debug!(
            model = self.model.as_str(),
            mode = %request.mode,
            source_bytes = request.image.len(),
            "sending edit request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackdropError::Timeout(self.timeout)
                } else {
                    e.into()
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        // Blocked prompts come back as HTTP 200 with prompt_feedback set
        if let Some(ref feedback) = gemini_response.prompt_feedback {
            if let Some(ref reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .clone()
                    .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
                return Err(BackdropError::ContentBlocked(msg));
            }
        }

        let candidate = gemini_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| {
                BackdropError::UnexpectedResponse("no candidates in Gemini response".into())
            })?;

        if let Some(ref finish_reason) = candidate.finish_reason {
            match finish_reason.as_str() {
                "SAFETY"
                | "IMAGE_SAFETY"
                | "IMAGE_PROHIBITED_CONTENT"
                | "IMAGE_RECITATION"
                | "RECITATION"
                | "PROHIBITED_CONTENT"
                | "BLOCKLIST" => {
                    return Err(BackdropError::ContentBlocked(format!(
                        "content blocked by Gemini safety filter: {}",
                        finish_reason
                    )));
                }
                "IMAGE_OTHER" | "NO_IMAGE" => {
                    return Err(BackdropError::UnexpectedResponse(format!(
                        "edit failed: {}. Try a different photo or backdrop.",
                        finish_reason
                    )));
                }
                _ => {} // STOP, MAX_TOKENS, etc. are normal
            }
        }

        let content = candidate.content.ok_or_else(|| {
            BackdropError::UnexpectedResponse("no content in Gemini candidate".into())
        })?;

        // First inline image part wins; text parts are kept only as a
        // diagnostic when the model declined to emit an image.
        let mut inline = None;
        let mut model_text = None;
        for part in content.parts {
            if inline.is_none() {
                if let Some(data) = part.inline_data {
                    inline = Some(data);
                    continue;
                }
            }
            if model_text.is_none() {
                if let Some(text) = part.text {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        model_text = Some(text);
                    }
                }
            }
        }

        let inline = inline.ok_or_else(|| match model_text {
            Some(text) => BackdropError::UnexpectedResponse(format!(
                "model returned no image: {}",
                sanitize_error_message(&text)
            )),
            None => BackdropError::UnexpectedResponse("no image data in Gemini response".into()),
        })?;

        let data = base64::engine::general_purpose::STANDARD
            .decode(&inline.data)
            .map_err(|e| BackdropError::Decode(e.to_string()))?;

        let format = ImageFormat::from_mime_type(&inline.mime_type)
            .or_else(|| ImageFormat::from_magic_bytes(&data))
            .ok_or_else(|| {
                BackdropError::Decode("unrecognized image payload in Gemini response".into())
            })?;

        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            model = self.model.as_str(),
            mode = %request.mode,
            bytes = data.len(),
            duration_ms,
            "edit complete"
        );

        Ok(EditedImage::new(
            data,
            format,
            EditorKind::Gemini,
            EditMetadata {
                model: Some(self.model.as_str().to_string()),
                duration_ms: Some(duration_ms),
            },
        ))
    }

    fn parse_error(
        &self,
        status: u16,
        text: &str,
        headers: &reqwest::header::HeaderMap,
    ) -> BackdropError {
        let text = sanitize_error_message(text);
        if status == 402 {
            return BackdropError::Billing(
                "Gemini billing issue: enable billing at https://aistudio.google.com".into(),
            );
        }
        if status == 404 {
            return BackdropError::InvalidRequest(
                "model not found. Verify the model name is correct.".into(),
            );
        }
        if status == 429 {
            let retry_after = parse_retry_after(headers).map(Duration::from_secs);
            return BackdropError::RateLimited { retry_after };
        }
        if status == 401 || status == 403 {
            return BackdropError::Auth(text);
        }
        let lower = text.to_lowercase();
        if lower.contains("safety")
            || lower.contains("blocked")
            || lower.contains("content_policy")
            || lower.contains("prohibited")
        {
            return BackdropError::ContentBlocked(text);
        }
        BackdropError::Api {
            status,
            message: text,
        }
    }
}

#[async_trait]
impl ImageEditor for GeminiEditor {
    async fn edit(&self, request: &EditRequest) -> Result<EditedImage> {
        self.edit_impl(request).await
    }

    fn kind(&self) -> EditorKind {
        EditorKind::Gemini
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}",
            self.model.as_str(),
        );

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(BackdropError::Auth("invalid API key".into())),
            404 => Err(BackdropError::InvalidRequest(
                "model not found. Verify the model name is correct.".into(),
            )),
            s if !(200..300).contains(&s) => Err(BackdropError::Api {
                status: s,
                message: "health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
enum GeminiRequestPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequestPart {
    fn inline_image(bytes: &[u8]) -> Self {
        let mime_type = ImageFormat::from_magic_bytes(bytes)
            .map(|f| f.mime_type())
            .unwrap_or("image/png")
            .to_string();

        Self::InlineData {
            inline_data: GeminiInlineData {
                mime_type,
                data: base64::engine::general_purpose::STANDARD.encode(bytes),
            },
        }
    }
}

impl GeminiRequest {
    /// Assembles the wire request: source image, then the reference backdrop
    /// (composite mode only), then the mode's text instruction.
    fn from_edit_request(request: &EditRequest) -> Self {
        let mut parts = Vec::new();

        parts.push(GeminiRequestPart::inline_image(&request.image));

        if let Some(ref reference) = request.reference_image {
            parts.push(GeminiRequestPart::inline_image(reference));
        }

        parts.push(GeminiRequestPart::Text {
            text: instruction_for(request),
        });

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::types::EditMode;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];

    #[test]
    fn test_gemini_model_as_str() {
        assert_eq!(GeminiModel::Flash.as_str(), "gemini-2.5-flash-image");
        assert_eq!(GeminiModel::Pro.as_str(), "gemini-3-pro-image-preview");
    }

    #[test]
    fn test_gemini_model_default() {
        assert_eq!(GeminiModel::default(), GeminiModel::Flash);
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let editor = GeminiEditorBuilder::new()
            .api_key("test-key")
            .model(GeminiModel::Pro)
            .build();
        assert!(editor.is_ok());
    }

    #[test]
    fn test_request_construction_remove() {
        let request = EditRequest::new(PNG_MAGIC.to_vec(), EditMode::Remove);
        let gemini_request = GeminiRequest::from_edit_request(&request);

        // Source image + instruction text
        assert_eq!(gemini_request.contents.len(), 1);
        assert_eq!(gemini_request.contents[0].parts.len(), 2);
        assert_eq!(
            gemini_request.generation_config.response_modalities,
            vec!["IMAGE"]
        );
    }

    #[test]
    fn test_request_construction_composite_carries_two_images() {
        let request = EditRequest::new(PNG_MAGIC.to_vec(), EditMode::Composite)
            .with_reference_image(JPEG_MAGIC.to_vec());
        let gemini_request = GeminiRequest::from_edit_request(&request);

        let json = serde_json::to_value(&gemini_request).unwrap();
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);

        // Source first, reference second, instruction last
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert!(parts[2]["text"]
            .as_str()
            .unwrap()
            .contains("Two images are provided"));
    }

    #[test]
    fn test_request_construction_replace_embeds_prompt() {
        let request = EditRequest::new(JPEG_MAGIC.to_vec(), EditMode::Replace)
            .with_backdrop_prompt("a rainy cobblestone street");
        let gemini_request = GeminiRequest::from_edit_request(&request);

        let json = serde_json::to_value(&gemini_request).unwrap();
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts[1]["text"]
            .as_str()
            .unwrap()
            .contains("a rainy cobblestone street"));
    }

    #[test]
    fn test_request_serialization_uses_camel_case() {
        let request = EditRequest::new(PNG_MAGIC.to_vec(), EditMode::Remove);
        let gemini_request = GeminiRequest::from_edit_request(&request);
        let json = serde_json::to_value(&gemini_request).unwrap();

        assert!(json.get("generationConfig").is_some());
        assert!(json.get("generation_config").is_none());
        assert!(json["contents"][0]["parts"][0].get("inlineData").is_some());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{
                        "inlineData": {
                            "mimeType": "image/png",
                            "data": "iVBORw0KGgo="
                        }
                    }]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(
            response.candidates[0].finish_reason.as_deref(),
            Some("STOP")
        );

        let content = response.candidates[0].content.as_ref().unwrap();
        let inline = content.parts[0].inline_data.as_ref().unwrap();
        assert_eq!(inline.mime_type, "image/png");
    }

    #[test]
    fn test_response_text_only_parts() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{
                        "text": "I cannot edit this image."
                    }]
                }
            }]
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        let content = response.candidates[0].content.as_ref().unwrap();
        assert!(content.parts[0].inline_data.is_none());
        assert_eq!(
            content.parts[0].text.as_deref(),
            Some("I cannot edit this image.")
        );
    }

    #[test]
    fn test_response_with_prompt_feedback_block() {
        let json = r#"{
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(response.candidates.is_empty());
        let feedback = response.prompt_feedback.unwrap();
        assert_eq!(feedback.block_reason.as_deref(), Some("SAFETY"));
        assert_eq!(
            feedback.block_reason_message.as_deref(),
            Some("Prompt was blocked due to safety")
        );
    }

    #[test]
    fn test_response_safety_finish_reason() {
        let json = r#"{
            "candidates": [{
                "finishReason": "IMAGE_SAFETY"
            }]
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.candidates[0].finish_reason.as_deref(),
            Some("IMAGE_SAFETY")
        );
        assert!(response.candidates[0].content.is_none());
    }

    #[tokio::test]
    async fn test_edit_rejects_invalid_request_before_network() {
        let editor = GeminiEditorBuilder::new().api_key("test-key").build().unwrap();

        // Replace mode with no prompt never reaches the network
        let request = EditRequest::new(PNG_MAGIC.to_vec(), EditMode::Replace);
        let err = editor.edit(&request).await.unwrap_err();
        assert!(matches!(err, BackdropError::InvalidRequest(_)));
    }

    #[test]
    fn test_parse_error_mapping() {
        let editor = GeminiEditorBuilder::new().api_key("test-key").build().unwrap();
        let headers = reqwest::header::HeaderMap::new();

        assert!(matches!(
            editor.parse_error(401, "bad key", &headers),
            BackdropError::Auth(_)
        ));
        assert!(matches!(
            editor.parse_error(402, "", &headers),
            BackdropError::Billing(_)
        ));
        assert!(matches!(
            editor.parse_error(404, "", &headers),
            BackdropError::InvalidRequest(_)
        ));
        assert!(matches!(
            editor.parse_error(500, "boom", &headers),
            BackdropError::Api { status: 500, .. }
        ));
        assert!(matches!(
            editor.parse_error(400, "request blocked by safety system", &headers),
            BackdropError::ContentBlocked(_)
        ));

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "7".parse().unwrap());
        match editor.parse_error(429, "", &headers) {
            BackdropError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }
}
