//! Text (terminal) reporter

use super::LinkageReport;
use crate::linkage::Label;
use anyhow::Result;
use console::style;

fn label_style(label: Label) -> console::StyledObject<String> {
    let text = format!("{:<8}", label.to_string().to_uppercase());
    match label {
        Label::Match => style(text).green(),
        Label::Possible => style(text).yellow(),
        Label::Unmatch => style(text).dim(),
    }
}

/// One-line outcome summary of a full run
pub fn summary_line(report: &LinkageReport) -> Option<String> {
    let summary = report.linkage.as_ref()?;
    let blocking = match &report.blocking {
        Some(field) => format!("with blocking on {}", field),
        None => "without blocking".to_string(),
    };
    Some(format!(
        "Found {} matches, {} possible matches, and {} unmatches {}.",
        summary.matches, summary.possible, summary.unmatches, blocking
    ))
}

/// Render report as formatted terminal output
pub fn render(report: &LinkageReport) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{} {} ↔ {}\n",
        style("reclink").bold(),
        report.left,
        report.right
    ));
    out.push_str(&format!(
        "{}\n",
        style("──────────────────────────────────────").dim()
    ));
    out.push_str(&format!(
        "Fields: {}  mu: {}  lambda: {}  seed: {}\n",
        report.fields.join(", "),
        report.training.mu,
        report.training.lambda,
        report.training.seed
    ));
    out.push_str(&format!(
        "Samples: {} match, {} unmatch\n\n",
        report.match_sample_size, report.unmatch_sample_size
    ));

    out.push_str(&format!("{}\n", style("PATTERNS").bold()));
    for stat in report.patterns.iter().filter(|s| s.ratio.is_some()) {
        let ratio = stat
            .ratio
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "  {} {:<28} m={:.4}  u={:.4}  ratio={}\n",
            label_style(stat.label),
            stat.pattern.to_string(),
            stat.m,
            stat.u,
            ratio
        ));
    }
    let unseen = report.patterns.iter().filter(|s| s.ratio.is_none()).count();
    if unseen > 0 {
        out.push_str(&format!(
            "  {}\n",
            style(format!("{} unobserved patterns → POSSIBLE", unseen)).dim()
        ));
    }

    let p = &report.partition;
    out.push_str(&format!(
        "\nPartition: {} match, {} possible, {} unmatch\n",
        p.matches, p.possible, p.unmatches
    ));

    if let Some(line) = summary_line(report) {
        out.push('\n');
        out.push_str(&line);
        out.push('\n');
    }

    Ok(out)
}
