//! Link command - train, then classify every candidate pair

use anyhow::Result;
use console::style;
use reclink::config::LinkageConfig;
use reclink::linkage::find_matches;
use reclink::reporters::{report_with_format, LinkageReport, OutputFormat};
use std::path::Path;
use std::time::Instant;

use super::inputs::Inputs;
use super::spinner;

pub fn run(
    config: &LinkageConfig,
    sources: &super::SourceArgs,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let started = Instant::now();
    let inputs = Inputs::load(config, sources)?;
    let extractor = inputs.extractor()?;
    let blocking = inputs.blocking()?;

    let progress = spinner(format, "Linking...");
    let linkage = find_matches(
        &inputs.left,
        &inputs.right,
        &inputs.links,
        &extractor,
        &inputs.training,
        &blocking,
    );
    progress.finish_and_clear();
    let linkage = linkage?;

    let report = LinkageReport::from_linkage(&inputs.context(), &linkage);
    super::emit(&report_with_format(&report, format)?, output)?;

    if format == OutputFormat::Text {
        eprintln!(
            "{}",
            style(format!(
                "{} candidate pairs in {:.2?}",
                linkage.outcome.candidates(),
                started.elapsed()
            ))
            .dim()
        );
    }
    Ok(())
}
