// Runtime orchestrator for card pipelines

use anyhow::{anyhow, Context, Result};

use crate::data::Dataset;
use crate::ir::SeriesEntry;
use crate::parser::ast::CardSpec;
use crate::{parser, render, resolve, transform, RenderOptions};

/// Parse a card DSL string into a validated spec
pub fn parse_card(dsl: &str) -> Result<CardSpec> {
    match parser::parse_card_spec(dsl) {
        Ok((_, spec)) => Ok(spec),
        Err(e) => Err(anyhow!("Failed to parse card spec: {:?}", e)),
    }
}

/// Run a parsed card over a dataset, producing chart series entries
pub fn build_series(spec: &CardSpec, data: &Dataset) -> Result<Vec<SeriesEntry>> {
    let plan =
        resolve::resolve_card(spec, data).context("Failed to resolve card against dataset")?;
    Ok(transform::apply_card(&plan, data))
}

/// Serialize a series the way dashboard chart components consume it
pub fn series_to_json(entries: &[SeriesEntry]) -> Result<String> {
    serde_json::to_string_pretty(entries).context("Failed to serialize series")
}

/// Run a card and render the result as PNG bytes
pub fn render_chart(spec: &CardSpec, data: &Dataset, options: &RenderOptions) -> Result<Vec<u8>> {
    let entries = build_series(spec, data)?;
    render::render_series(&entries, options, &spec.labels.clone().unwrap_or_default())
        .context("Failed to render chart")
}
