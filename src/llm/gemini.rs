use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::{Config, SafetyProfile};
use crate::editor::error::EditError;
use crate::editor::image::EncodedImage;
use crate::editor::prompt::EditPlan;
use crate::editor::requester::ImageEditBackend;
use crate::llm::media::{gemini_supports_image_mime, DEFAULT_IMAGE_MIME};
use crate::utils::http::get_http_client;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Option<Vec<GeminiCandidate>>,
    #[serde(default)]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GeminiPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    Text {
        text: String,
    },
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiInlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn build_safety_settings(profile: SafetyProfile) -> Vec<Value> {
    let threshold = profile.threshold();
    vec![
        json!({ "category": "HARM_CATEGORY_HARASSMENT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": threshold }),
    ]
}

fn inline_part(image: &EncodedImage) -> Value {
    if !gemini_supports_image_mime(image.mime_type()) {
        warn!(
            mime_type = image.mime_type(),
            "sending an image type the model may not accept"
        );
    }
    json!({
        "inlineData": {
            "mimeType": image.mime_type(),
            "data": image.to_base64()
        }
    })
}

/// Base image first, then the tool's extra images, then the instruction.
pub fn build_edit_parts(base: &EncodedImage, plan: &EditPlan) -> Vec<Value> {
    let mut parts = Vec::with_capacity(plan.attachments.len() + 2);
    parts.push(inline_part(base));
    for attachment in &plan.attachments {
        parts.push(inline_part(attachment));
    }
    parts.push(json!({ "text": plan.instruction }));
    parts
}

pub fn build_edit_payload(base: &EncodedImage, plan: &EditPlan, safety: SafetyProfile) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": build_edit_parts(base, plan) }],
        "generationConfig": { "responseModalities": ["IMAGE"] },
        "safetySettings": build_safety_settings(safety),
    })
}

fn summarize_gemini_parts(parts: &[Value]) -> Vec<Value> {
    parts
        .iter()
        .map(|part| {
            if let Some(text) = part.get("text").and_then(|value| value.as_str()) {
                json!({ "text": truncate_for_log(text, 200) })
            } else if let Some(inline_data) = part.get("inlineData") {
                let mime_type = inline_data
                    .get("mimeType")
                    .and_then(|value| value.as_str())
                    .unwrap_or("unknown");
                let data_len = inline_data
                    .get("data")
                    .and_then(|value| value.as_str())
                    .map(|value| value.len())
                    .unwrap_or(0);
                json!({ "inlineData": { "mimeType": mime_type, "dataLen": data_len } })
            } else {
                json!({ "unknownPart": true })
            }
        })
        .collect()
}

fn summarize_gemini_payload(payload: &Value) -> Value {
    let mut summary = Map::new();

    if let Some(contents) = payload.get("contents").and_then(|value| value.as_array()) {
        let summarized: Vec<Value> = contents
            .iter()
            .map(|content| {
                let parts = content
                    .get("parts")
                    .and_then(|value| value.as_array())
                    .map(|parts| summarize_gemini_parts(parts))
                    .unwrap_or_default();
                json!({ "parts": parts })
            })
            .collect();
        summary.insert("contents".to_string(), Value::Array(summarized));
    }

    if let Some(config) = payload.get("generationConfig") {
        summary.insert("generationConfig".to_string(), config.clone());
    }

    Value::Object(summary)
}

fn summarize_gemini_response(response: &GeminiResponse) -> Value {
    let mut text_parts = 0usize;
    let mut image_parts = 0usize;
    let mut text_preview = None;
    let mut other_kinds: Vec<String> = Vec::new();

    for candidate in response.candidates.as_deref().unwrap_or(&[]) {
        let parts = candidate
            .content
            .as_ref()
            .and_then(|content| content.parts.as_deref())
            .unwrap_or(&[]);
        for part in parts {
            match part {
                GeminiPart::Text { text } => {
                    text_parts += 1;
                    if text_preview.is_none() && !text.trim().is_empty() {
                        text_preview = Some(truncate_for_log(text, 200));
                    }
                }
                GeminiPart::InlineData { .. } => image_parts += 1,
                GeminiPart::Other(value) => {
                    let kind = value
                        .as_object()
                        .and_then(|object| object.keys().next().cloned())
                        .unwrap_or_else(|| "unknown".to_string());
                    other_kinds.push(kind);
                }
            }
        }
    }

    json!({
        "candidates": response.candidates.as_ref().map(|c| c.len()).unwrap_or(0),
        "textParts": text_parts,
        "imageParts": image_parts,
        "textPreview": text_preview,
        "otherParts": other_kinds,
        "blockReason": response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.clone()),
    })
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string())
            });
        return (message, truncate_for_log(&value.to_string(), 2000));
    }

    (None, truncate_for_log(trimmed, 2000))
}

/// Picks the first inline image of the first candidate.
///
/// No parts at all means the prompt was most likely filtered; parts without
/// inline data mean the model answered with text only.
pub fn extract_first_image(response: &GeminiResponse) -> Result<EncodedImage, EditError> {
    let candidate = response
        .candidates
        .as_deref()
        .and_then(|candidates| candidates.first());
    let parts = candidate
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.as_ref());

    let Some(parts) = parts else {
        let reason = response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.clone())
            .or_else(|| candidate.and_then(|candidate| candidate.finish_reason.clone()));
        return Err(EditError::Blocked { reason });
    };

    let inline = parts.iter().find_map(|part| match part {
        GeminiPart::InlineData { inline_data } => Some(inline_data),
        _ => None,
    });
    let Some(inline) = inline else {
        return Err(EditError::NoImageReturned);
    };

    let mime_type = if inline.mime_type.trim().is_empty() {
        DEFAULT_IMAGE_MIME
    } else {
        inline.mime_type.as_str()
    };
    let image = EncodedImage::from_base64(&inline.data, mime_type)?;
    if image.is_empty() {
        return Err(EditError::InvalidImagePayload("empty image data".to_string()));
    }
    Ok(image)
}

/// Client for the `generateContent` endpoint with image output.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    api_base: String,
    model: String,
    safety: SafetyProfile,
    timeout: Option<Duration>,
}

impl GeminiClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: config.gemini_api_key.clone(),
            api_base: config.gemini_api_base.clone(),
            model: config.gemini_image_model.clone(),
            safety: config.gemini_safety_settings,
            timeout: config.gemini_request_timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn redact(&self, text: &str) -> String {
        let key = self.api_key.trim();
        if key.is_empty() {
            return text.to_string();
        }
        text.replace(key, "[redacted]")
    }

    async fn send(&self, payload: Value) -> Result<GeminiResponse, EditError> {
        let client = get_http_client();
        if tracing::enabled!(tracing::Level::DEBUG) {
            let payload_summary = summarize_gemini_payload(&payload);
            debug!(target: "llm.gemini", model = %self.model, payload = %payload_summary);
        }

        let mut request = client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let err_text = self.redact(&err.to_string());
                warn!(
                    "Gemini request failed to send: {} (timeout={}, connect={}, status={:?})",
                    err_text,
                    err.is_timeout(),
                    err.is_connect(),
                    err.status()
                );
                return Err(EditError::Transport(err_text));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let (message, body_summary) = summarize_error_body(&body);
            warn!("Gemini API error: status={}, body={}", status, body_summary);
            return Err(EditError::Api {
                status,
                message: self.redact(&message.unwrap_or(body_summary)),
            });
        }

        let value = response
            .json::<GeminiResponse>()
            .await
            .map_err(|err| EditError::Transport(self.redact(&err.to_string())))?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            let response_summary = summarize_gemini_response(&value);
            debug!(target: "llm.gemini", model = %self.model, response = %response_summary);
        }
        Ok(value)
    }
}

impl ImageEditBackend for GeminiClient {
    fn provider(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        base: &EncodedImage,
        plan: &EditPlan,
    ) -> Result<GeminiResponse, EditError> {
        let payload = build_edit_payload(base, plan, self.safety);
        self.send(payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::tools::ToolId;

    fn response(value: Value) -> GeminiResponse {
        serde_json::from_value(value).expect("valid response json")
    }

    fn plan_with_attachment() -> EditPlan {
        EditPlan {
            tool: ToolId::ClothingSwap,
            instruction: "troque a roupa".to_string(),
            attachments: vec![EncodedImage::new(vec![9, 9], "image/jpeg")],
        }
    }

    #[test]
    fn parts_are_ordered_base_reference_text() {
        let base = EncodedImage::new(vec![1, 2, 3], "image/png");
        let parts = build_edit_parts(&base, &plan_with_attachment());
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], base.to_base64());
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[2]["text"], "troque a roupa");
    }

    #[test]
    fn payload_requests_image_output() {
        let base = EncodedImage::new(vec![1], "image/png");
        let payload = build_edit_payload(&base, &plan_with_attachment(), SafetyProfile::Standard);
        assert_eq!(payload["generationConfig"]["responseModalities"], json!(["IMAGE"]));
        assert_eq!(payload["contents"][0]["role"], "user");
        assert_eq!(
            payload["safetySettings"][0]["threshold"],
            "BLOCK_MEDIUM_AND_ABOVE"
        );
    }

    #[test]
    fn summaries_never_include_image_data() {
        let base = EncodedImage::new(vec![7; 64], "image/png");
        let payload = build_edit_payload(&base, &plan_with_attachment(), SafetyProfile::Permissive);
        let summary = summarize_gemini_payload(&payload).to_string();
        assert!(!summary.contains(&base.to_base64()));
        assert!(summary.contains("dataLen"));
    }

    #[test]
    fn extracts_the_first_inline_image() {
        let parsed = response(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here you go" },
                    { "inlineData": { "mimeType": "image/png", "data": "AQID" } },
                    { "inlineData": { "mimeType": "image/png", "data": "BAUG" } }
                ]}
            }]
        }));
        let image = extract_first_image(&parsed).expect("image");
        assert_eq!(image.bytes(), &[1, 2, 3]);
        assert_eq!(image.to_data_url(), "data:image/png;base64,AQID");
    }

    #[test]
    fn text_only_response_is_incomplete() {
        let parsed = response(json!({
            "candidates": [{ "content": { "parts": [{ "text": "I cannot edit this." }] } }]
        }));
        assert!(matches!(
            extract_first_image(&parsed),
            Err(EditError::NoImageReturned)
        ));
    }

    #[test]
    fn missing_content_is_treated_as_blocked() {
        let parsed = response(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }));
        match extract_first_image(&parsed) {
            Err(EditError::Blocked { reason }) => assert_eq!(reason.as_deref(), Some("SAFETY")),
            other => panic!("unexpected result: {other:?}"),
        }

        let parsed = response(json!({
            "candidates": [{ "finishReason": "PROHIBITED_CONTENT" }]
        }));
        match extract_first_image(&parsed) {
            Err(EditError::Blocked { reason }) => {
                assert_eq!(reason.as_deref(), Some("PROHIBITED_CONTENT"))
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert!(matches!(
            extract_first_image(&GeminiResponse::default()),
            Err(EditError::Blocked { reason: None })
        ));
    }

    #[test]
    fn empty_inline_data_is_rejected() {
        let parsed = response(json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "" } }
            ]}}]
        }));
        assert!(matches!(
            extract_first_image(&parsed),
            Err(EditError::InvalidImagePayload(_))
        ));
    }

    #[test]
    fn unknown_parts_do_not_break_parsing() {
        let parsed = response(json!({
            "candidates": [{ "content": { "parts": [
                { "thoughtSignature": "abc" },
                { "inlineData": { "mimeType": "image/webp", "data": "AQID" } }
            ]}}]
        }));
        let image = extract_first_image(&parsed).expect("image");
        assert_eq!(image.mime_type(), "image/webp");
    }

    #[test]
    fn error_bodies_prefer_the_api_message() {
        let (message, _) =
            summarize_error_body(r#"{"error":{"code":400,"message":"API key not valid"}}"#);
        assert_eq!(message.as_deref(), Some("API key not valid"));
        let (message, summary) = summarize_error_body("   ");
        assert!(message.is_none());
        assert_eq!(summary, "empty response body");
    }

    #[test]
    fn redacts_the_api_key() {
        let client = GeminiClient {
            api_key: "secret-key".to_string(),
            api_base: "https://example.test".to_string(),
            model: "m".to_string(),
            safety: SafetyProfile::Standard,
            timeout: None,
        };
        assert_eq!(
            client.redact("bad key secret-key in url"),
            "bad key [redacted] in url"
        );
        assert_eq!(
            client.endpoint(),
            "https://example.test/models/m:generateContent"
        );
    }
}
