//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use genflow::providers::ollama::DEFAULT_SERVER_ADDRESS;

pub const DEFAULT_IMAGE: &str = "wally.jpeg";
pub const DEFAULT_OLLAMA_MODEL: &str = "llava";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Parser, Debug)]
#[command(name = "genflow", version, about = "Multimodal generation and flows")]
pub struct Cli {
    /// Ollama server address
    #[arg(
        long,
        global = true,
        env = "OLLAMA_SERVER_ADDRESS",
        default_value = DEFAULT_SERVER_ADDRESS
    )]
    pub ollama_address: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a multimodal Ollama model what it thinks of an image
    Describe(DescribeArgs),
    /// Run shortTerrorFlow on Gemini (needs GOOGLE_GENAI_API_KEY)
    Flow(FlowArgs),
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Image to send
    #[arg(default_value = DEFAULT_IMAGE)]
    pub path: PathBuf,

    /// Ollama model name
    #[arg(long, default_value = DEFAULT_OLLAMA_MODEL)]
    pub model: String,
}

#[derive(Args, Debug)]
pub struct FlowArgs {
    /// Theme to run once; without it, one run per stdin line
    #[arg(long)]
    pub input: Option<String>,

    /// Gemini model name
    #[arg(long, default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,
}
