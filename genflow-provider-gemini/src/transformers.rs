//! Conversions between genflow requests/responses and the Gemini wire format

use genflow_core::{ContentClassifier, MediaAsset};
use genflow_core::error::{GenflowError, Result};
use genflow_core::request::augment_with_documents;
use genflow_core::types::{
    FinishReason, GenerateRequest, GenerateResponse, GenerationConfig, Message, Part, Role, Usage,
};

use crate::types::*;

const PROVIDER_ID: &str = "gemini";

/// Option names already match `generationConfig`, so every key is forwarded as is.
pub fn convert_generation_config(
    config: &GenerationConfig,
) -> Option<serde_json::Map<String, serde_json::Value>> {
    if config.is_empty() {
        return None;
    }
    Some(
        config
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
    )
}

fn convert_part(part: &Part) -> GeminiPart {
    match part {
        Part::Text { text } => GeminiPart::text(text.clone()),
        Part::Media { media } => GeminiPart::inline(media.mime_type(), media.data()),
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Model => "model",
        // Gemini has no tool turn without function calling; tool output is user input
        Role::User | Role::Tool | Role::System => "user",
    }
}

/// Convert a message to a Gemini `Content`
pub fn convert_message(message: &Message) -> Content {
    Content {
        role: Some(role_name(message.role).to_string()),
        parts: message.content.iter().map(convert_part).collect(),
    }
}

/// Build a `generateContent` body.
///
/// System messages are merged into `systemInstruction`; documents are rendered
/// into the last user message first.
pub fn build_request(request: &GenerateRequest) -> GenerateContentRequest {
    let request = augment_with_documents(request.clone());

    let (system, conversation): (Vec<&Message>, Vec<&Message>) = request
        .messages
        .iter()
        .partition(|m| m.role == Role::System);

    let system_parts: Vec<GeminiPart> = system
        .iter()
        .flat_map(|m| m.content.iter().map(convert_part))
        .collect();

    GenerateContentRequest {
        contents: conversation.into_iter().map(convert_message).collect(),
        system_instruction: (!system_parts.is_empty()).then_some(Content {
            role: None,
            parts: system_parts,
        }),
        generation_config: convert_generation_config(&request.config),
    }
}

/// Map Gemini's `finishReason`
pub fn parse_finish_reason(reason: Option<&str>) -> Option<FinishReason> {
    match reason? {
        "STOP" => Some(FinishReason::Stop),
        "MAX_TOKENS" => Some(FinishReason::Length),
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
            Some(FinishReason::ContentFilter)
        }
        "FINISH_REASON_UNSPECIFIED" => None,
        other => Some(FinishReason::Other(other.to_string())),
    }
}

fn convert_usage(usage: &UsageMetadata) -> Usage {
    let input = usage.prompt_token_count.unwrap_or(0);
    let output = usage.candidates_token_count.unwrap_or(0);
    let mut converted = Usage::new(input, output);
    if let Some(total) = usage.total_token_count {
        converted.total_tokens = total;
    }
    converted
}

/// Inline data coming back is classified from its bytes; the declared
/// `mimeType` only applies when the bytes carry no known signature.
fn convert_response_part(part: &GeminiPart) -> Result<Option<Part>> {
    if let Some(blob) = &part.inline_data {
        let classifier = ContentClassifier::new().with_fallback(blob.mime_type.as_str());
        let media = MediaAsset::from_base64_classified_by(&classifier, &blob.data, None)
            .and_then(|asset| asset.encode())
            .map_err(|e| GenflowError::backend(PROVIDER_ID, format!("inline data: {e}")))?;
        return Ok(Some(Part::media(media)));
    }
    Ok(part.text.as_ref().map(Part::text))
}

/// Convert the first candidate into a response.
///
/// A reply without candidates means the prompt was blocked; that is surfaced
/// as a backend error carrying the block reason.
pub fn convert_response(response: GenerateContentResponse) -> Result<GenerateResponse> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(GenflowError::backend(
            PROVIDER_ID,
            format!("prompt blocked: {reason}"),
        ));
    };

    let mut content = Vec::new();
    for part in candidate.content.iter().flat_map(|c| c.parts.iter()) {
        content.extend(convert_response_part(part)?);
    }

    let mut converted = GenerateResponse::new(Message::new(Role::Model, content));
    converted.model = response.model_version;
    converted.finish_reason = parse_finish_reason(candidate.finish_reason.as_deref());
    converted.usage = response.usage_metadata.as_ref().map(convert_usage);
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use genflow_core::types::{Document, encode};
    use serde_json::json;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn generation_config_forwards_every_key() {
        let config = GenerationConfig::new()
            .with_temperature(1.0)
            .with_top_k(40)
            .with_max_output_tokens(256)
            .with_stop_sequences(["END"])
            .with_option("seed", 7);
        let converted = convert_generation_config(&config).unwrap();
        assert_eq!(
            serde_json::Value::Object(converted),
            json!({
                "temperature": 1.0,
                "topK": 40,
                "maxOutputTokens": 256,
                "stopSequences": ["END"],
                "seed": 7
            })
        );
        assert!(convert_generation_config(&GenerationConfig::new()).is_none());
    }

    #[test]
    fn system_messages_become_system_instruction() {
        let request = GenerateRequest {
            messages: vec![
                Message::system("Be brief.").build(),
                Message::user("Hi").build(),
                Message::model("Hello").build(),
                Message::tool("42").build(),
            ],
            ..Default::default()
        };
        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(
            body["systemInstruction"],
            json!({"parts": [{"text": "Be brief."}]})
        );
        let roles: Vec<&str> = body["contents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn media_is_sent_as_inline_data() {
        let image = encode(PNG, "image/png").unwrap();
        let request = GenerateRequest {
            documents: vec![Document::from_text("Pumpkins are orange")],
            messages: vec![Message::user("Describe").with_media(image.clone()).build()],
            ..Default::default()
        };
        let body = build_request(&request);
        assert_eq!(body.contents.len(), 1);
        let parts = &body.contents[0].parts;
        assert_eq!(parts[0].text.as_deref(), Some("Describe"));
        assert!(
            parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .any(|t| t.contains("- [0]: Pumpkins are orange"))
        );
        let inline: Vec<&Blob> = parts.iter().filter_map(|p| p.inline_data.as_ref()).collect();
        assert_eq!(inline.len(), 1);
        assert_eq!(inline[0].mime_type, "image/png");
        assert_eq!(inline[0].data, image.data());
    }

    #[test]
    fn finish_reasons() {
        assert_eq!(parse_finish_reason(Some("STOP")), Some(FinishReason::Stop));
        assert_eq!(parse_finish_reason(Some("MAX_TOKENS")), Some(FinishReason::Length));
        assert_eq!(
            parse_finish_reason(Some("SAFETY")),
            Some(FinishReason::ContentFilter)
        );
        assert_eq!(
            parse_finish_reason(Some("OTHER")),
            Some(FinishReason::Other("OTHER".into()))
        );
        assert_eq!(parse_finish_reason(None), None);
    }

    #[test]
    fn response_takes_first_candidate() {
        let wire: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Spooky."}, {"text": " Very."}]},
                 "finishReason": "STOP"},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 3, "totalTokenCount": 9},
            "modelVersion": "gemini-1.5-flash-002"
        }))
        .unwrap();
        let response = convert_response(wire).unwrap();
        assert_eq!(
            response.message.content,
            vec![Part::text("Spooky."), Part::text(" Very.")]
        );
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.model.as_deref(), Some("gemini-1.5-flash-002"));
        let usage = response.usage.unwrap();
        assert_eq!((usage.input_tokens, usage.output_tokens), (5, 3));
        assert_eq!(usage.total_tokens, 9);
    }

    #[test]
    fn inline_response_data_is_classified_from_bytes() {
        let data = encode(PNG, "image/png").unwrap();
        let wire: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "application/octet-stream", "data": data.data()}}
            ]}}]
        }))
        .unwrap();
        let response = convert_response(wire).unwrap();
        let media = response.message.content[0].as_media().unwrap();
        assert_eq!(media.mime_type(), "image/png");
    }

    #[test]
    fn inline_text_data_keeps_declared_type() {
        let data = encode(b"a,b\n1,2\n", "text/csv").unwrap();
        let wire: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "text/csv", "data": data.data()}}
            ]}}]
        }))
        .unwrap();
        let response = convert_response(wire).unwrap();
        let media = response.message.content[0].as_media().unwrap();
        assert_eq!(media.mime_type(), "text/csv");
    }

    #[test]
    fn oversized_usage_counts_saturate() {
        let wire: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "ok"}]}}],
            "usageMetadata": {"promptTokenCount": 4294967295u32, "candidatesTokenCount": 1}
        }))
        .unwrap();
        let usage = convert_response(wire).unwrap().usage.unwrap();
        assert_eq!(usage.total_tokens, u32::MAX);
    }

    #[test]
    fn blocked_prompt_is_backend_error() {
        let wire: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        let err = convert_response(wire).unwrap_err();
        assert_eq!(err, GenflowError::backend("gemini", "prompt blocked: SAFETY"));
    }
}
