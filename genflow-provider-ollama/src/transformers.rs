//! Conversions between genflow requests/responses and the Ollama wire format

use std::collections::BTreeMap;

use genflow_core::request::augment_with_documents;
use genflow_core::types::{
    FinishReason, GenerateRequest, GenerateResponse, GenerationConfig, Message, Part, Role, Usage,
    config::keys,
};

use crate::types::*;

/// Translate option names onto Ollama's `options` object.
///
/// Unknown keys pass through untouched so model-specific knobs (`seed`,
/// `num_ctx`, `mirostat`, ...) keep working.
pub fn convert_options(config: &GenerationConfig) -> Option<BTreeMap<String, serde_json::Value>> {
    if config.is_empty() {
        return None;
    }
    let options = config
        .iter()
        .map(|(key, value)| {
            let key = match key {
                keys::TOP_K => "top_k",
                keys::TOP_P => "top_p",
                keys::MAX_OUTPUT_TOKENS => "num_predict",
                keys::STOP_SEQUENCES => "stop",
                other => other,
            };
            (key.to_string(), value.clone())
        })
        .collect();
    Some(options)
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::System => "system",
        Role::Model => "assistant",
        Role::Tool => "tool",
    }
}

fn images_of(parts: &[Part]) -> Vec<String> {
    parts
        .iter()
        .filter_map(Part::as_media)
        .map(|m| m.data().to_string())
        .collect()
}

/// Convert a message to Ollama chat format
pub fn convert_chat_message(message: &Message) -> OllamaChatMessage {
    let images = images_of(&message.content);
    OllamaChatMessage {
        role: role_name(message.role).to_string(),
        content: message.text().unwrap_or_default(),
        images: (!images.is_empty()).then_some(images),
    }
}

/// Build a `/api/generate` body.
///
/// System messages become `system`; every other message contributes its text
/// to `prompt` (one line each) and its media to `images`. Documents are
/// rendered into the prompt first.
pub fn build_generate_request(
    model: &str,
    request: &GenerateRequest,
    keep_alive: Option<&str>,
) -> OllamaGenerateRequest {
    let request = augment_with_documents(request.clone());

    let mut system = Vec::new();
    let mut prompt = Vec::new();
    let mut images = Vec::new();
    for message in &request.messages {
        let text = message.text();
        if message.role == Role::System {
            system.extend(text);
        } else {
            prompt.extend(text);
        }
        images.extend(images_of(&message.content));
    }

    OllamaGenerateRequest {
        model: model.to_string(),
        prompt: prompt.join("\n"),
        system: (!system.is_empty()).then(|| system.join("\n")),
        images: (!images.is_empty()).then_some(images),
        options: convert_options(&request.config),
        keep_alive: keep_alive.map(str::to_string),
        stream: false,
    }
}

/// Build a `/api/chat` body. Documents are rendered into the last user message.
pub fn build_chat_request(
    model: &str,
    request: &GenerateRequest,
    keep_alive: Option<&str>,
) -> OllamaChatRequest {
    let request = augment_with_documents(request.clone());
    OllamaChatRequest {
        model: model.to_string(),
        messages: request.messages.iter().map(convert_chat_message).collect(),
        options: convert_options(&request.config),
        keep_alive: keep_alive.map(str::to_string),
        stream: false,
    }
}

/// Map Ollama's `done_reason`
pub fn parse_finish_reason(done: bool, done_reason: Option<&str>) -> Option<FinishReason> {
    match done_reason {
        Some("stop") => Some(FinishReason::Stop),
        Some("length") => Some(FinishReason::Length),
        Some(other) => Some(FinishReason::Other(other.to_string())),
        None if done => Some(FinishReason::Stop),
        None => None,
    }
}

fn usage_from(prompt_eval_count: Option<u32>, eval_count: Option<u32>) -> Option<Usage> {
    if prompt_eval_count.is_none() && eval_count.is_none() {
        return None;
    }
    Some(Usage::new(
        prompt_eval_count.unwrap_or(0),
        eval_count.unwrap_or(0),
    ))
}

fn finish(
    text: String,
    model: Option<String>,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
) -> GenerateResponse {
    let mut response = GenerateResponse::from_text(text);
    response.model = model;
    response.finish_reason = finish_reason;
    response.usage = usage;
    response
}

pub fn convert_generate_response(response: OllamaGenerateResponse) -> GenerateResponse {
    let finish_reason = parse_finish_reason(response.done, response.done_reason.as_deref());
    let usage = usage_from(response.prompt_eval_count, response.eval_count);
    finish(response.response, response.model, finish_reason, usage)
}

pub fn convert_chat_response(response: OllamaChatResponse) -> GenerateResponse {
    let finish_reason = parse_finish_reason(response.done, response.done_reason.as_deref());
    let usage = usage_from(response.prompt_eval_count, response.eval_count);
    finish(response.message.content, response.model, finish_reason, usage)
}
