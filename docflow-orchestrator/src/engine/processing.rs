//! LLM processing node
//!
//! Stands in for a model call: summaries are a prefix of the chunk text and
//! classifications a label derived from the output schema.

use docflow_core::domain::run::LlmOutput;

use super::context::{ExecutionContext, NodeOutput};
use super::node::LlmConfig;

/// Characters kept by the summarize mode
pub const SUMMARY_LENGTH: usize = 200;

pub fn process(config: &LlmConfig, ctx: &ExecutionContext) -> NodeOutput {
    let content = if ctx.chunks.is_empty() {
        ctx.input.request.text_payload.clone().unwrap_or_default()
    } else {
        ctx.chunks.join(" ")
    };

    let result = match config.mode.as_str() {
        "classify" => format!("classified:{}", config.output_schema_id),
        _ => content.chars().take(SUMMARY_LENGTH).collect(),
    };

    NodeOutput::Processed(LlmOutput {
        mode: config.mode.clone(),
        model_name: config.model_name.clone(),
        prompt_template_id: config.prompt_template_id.clone(),
        output_schema_id: config.output_schema_id.clone(),
        result,
    })
}
