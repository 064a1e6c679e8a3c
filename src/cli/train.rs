//! Train command - fit a model and show the pattern partition

use anyhow::Result;
use reclink::config::LinkageConfig;
use reclink::linkage::train;
use reclink::reporters::{report_with_format, LinkageReport, OutputFormat};
use std::path::Path;

use super::inputs::Inputs;
use super::spinner;

pub fn run(
    config: &LinkageConfig,
    sources: &super::SourceArgs,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let inputs = Inputs::load(config, sources)?;
    let extractor = inputs.extractor()?;

    let progress = spinner(format, "Training...");
    let model = train(
        &inputs.left,
        &inputs.right,
        &inputs.links,
        &extractor,
        &inputs.training,
    );
    progress.finish_and_clear();
    let model = model?;

    let report = LinkageReport::from_model(&inputs.context(), &model);
    super::emit(&report_with_format(&report, format)?, output)
}
