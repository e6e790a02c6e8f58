//! `genflow flow`: `shortTerrorFlow` on a Gemini model.

use std::io::Write;

use genflow::providers::gemini::Gemini;
use genflow::types::GenerationConfig;
use genflow::{
    FlowContext, FlowOutcome, Genflow, RequestBuilder, Result as GenflowResult, extract_text,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use crate::args::FlowArgs;
use crate::error::Result;

pub const FLOW_NAME: &str = "shortTerrorFlow";

pub fn prompt_for(theme: &str) -> String {
    format!("Write a small terror-based paragraph themed on {theme}")
}

/// Define `shortTerrorFlow` on an already registered model.
pub fn define_terror_flow(genflow: &mut Genflow, model: &str) -> GenflowResult<()> {
    let model = genflow.resolve(model)?;
    genflow.define_flow(FLOW_NAME, move |ctx: FlowContext, theme: String| {
        let model = model.clone();
        async move {
            let request = RequestBuilder::new()
                .user_text(prompt_for(&theme))
                .config(GenerationConfig::new().with_temperature(1.0))
                .build()?;
            let response = model.generate(&ctx, request).await?;
            extract_text(&response)
        }
    })
}

pub async fn run<W: Write>(args: &FlowArgs, ctx: &FlowContext, out: &mut W) -> Result<()> {
    let gemini = Gemini::from_env()?;
    let mut genflow = Genflow::new().with_context(ctx.clone());
    gemini.define_model(genflow.models_mut(), &args.gemini_model)?;
    define_terror_flow(&mut genflow, &args.gemini_model)?;

    match &args.input {
        Some(theme) => run_once(&genflow, theme, out).await,
        None => serve(&genflow, BufReader::new(tokio::io::stdin()), out).await,
    }
}

pub async fn run_once<W: Write>(genflow: &Genflow, theme: &str, out: &mut W) -> Result<()> {
    let text: String = genflow.run_flow(FLOW_NAME, theme).await?;
    writeln!(out, "{text}")?;
    Ok(())
}

/// One invocation per non-empty input line, each on its own task.
///
/// Stops reading at EOF or when the root context is cancelled, then waits for
/// the runs already started.
pub async fn serve<R, W>(genflow: &Genflow, reader: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();
    let mut running = JoinSet::new();
    let mut reading = true;

    loop {
        tokio::select! {
            _ = genflow.context().cancelled(), if reading => {
                tracing::debug!("no longer accepting input");
                reading = false;
            }
            line = lines.next_line(), if reading => match line? {
                Some(line) if !line.trim().is_empty() => {
                    let theme = line.trim().to_string();
                    let invocation = genflow.start_flow(FLOW_NAME, &theme)?;
                    tracing::debug!(run_id = %invocation.id(), %theme, "flow started");
                    running.spawn(async move { (theme, invocation.outcome().await) });
                }
                Some(_) => {}
                None => reading = false,
            },
            Some(joined) = running.join_next() => {
                let (theme, outcome) = joined.map_err(|e| {
                    genflow::GenflowError::InternalError(format!("flow task failed: {e}"))
                })?;
                report(out, &theme, outcome)?;
            }
            else => break,
        }
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, theme: &str, outcome: FlowOutcome) -> std::io::Result<()> {
    match outcome {
        FlowOutcome::Completed(serde_json::Value::String(text)) => {
            writeln!(out, "[{theme}] {text}")
        }
        FlowOutcome::Completed(other) => writeln!(out, "[{theme}] {other}"),
        FlowOutcome::Failed(e) => writeln!(out, "[{theme}] error: {e}"),
        FlowOutcome::Cancelled(reason) => writeln!(out, "[{theme}] cancelled: {reason}"),
    }
}
