//! `genflow describe`: one multimodal request to an Ollama model.

use std::io::Write;
use std::path::Path;

use genflow::providers::ollama::{Ollama, OllamaConfig, OllamaModelDefinition};
use genflow::types::{
    Document, EncodedMedia, GenerateRequest, GenerationConfig, Message, ModelCapabilities,
};
use genflow::{FlowContext, MediaAsset, ModelRegistry, RequestBuilder, text_parts};

use crate::args::DescribeArgs;
use crate::error::{CliError, Result};

pub const CONTEXT_DOCUMENT: &str = "Glasses are often a sign of evil people";
pub const QUESTION: &str = "What do you think about this animated character?";

/// What a llava-style model accepts: a system prompt and images, one turn.
pub fn vision_capabilities() -> ModelCapabilities {
    ModelCapabilities::new().with_system_role().with_media()
}

pub fn describe_request(
    image: EncodedMedia,
    capabilities: &ModelCapabilities,
) -> Result<GenerateRequest> {
    let request = RequestBuilder::new()
        .document(Document::from_text(CONTEXT_DOCUMENT))
        .message(Message::user(QUESTION).with_media(image).build())
        .config(
            GenerationConfig::new()
                .with_temperature(2.0)
                .with_top_k(50)
                .with_top_p(0.5),
        )
        .build_for(capabilities)?;
    Ok(request)
}

async fn load_image(path: &Path) -> Result<MediaAsset> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CliError::ImageNotFound(path.to_path_buf()),
        _ => CliError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    Ok(MediaAsset::from_bytes(bytes, path.to_str()))
}

pub async fn run<W: Write>(
    args: &DescribeArgs,
    ollama_address: &str,
    ctx: &FlowContext,
    out: &mut W,
) -> Result<()> {
    let asset = load_image(&args.path).await?;
    tracing::debug!(path = %args.path.display(), mime_type = asset.mime_type(), "image loaded");

    let ollama = Ollama::new(OllamaConfig::new(ollama_address))?;
    let mut models = ModelRegistry::new();
    let model = ollama.define_model(
        &mut models,
        OllamaModelDefinition::generate(&args.model),
        vision_capabilities(),
    )?;

    let request = describe_request(asset.encode()?, model.capabilities())?;

    writeln!(out, "Sending request to {} model...", model.name())?;
    out.flush()?;
    let response = model.generate(ctx, request).await?;

    writeln!(out, "\nModel Response:")?;
    for text in text_parts(&response) {
        writeln!(out, "{text}")?;
    }
    Ok(())
}
