use anyhow::{Context, Result};
use dimark_core::{analyze, CancellationToken};
use std::path::Path;
use std::process::ExitCode;

use super::{load_compilation, load_config};

pub fn run(input: &Path, config: Option<&Path>, deny_warnings: bool, json: bool) -> Result<ExitCode> {
    let compilation = load_compilation(input)?;
    let config = load_config(config)?;
    let analysis = analyze(&compilation, &config, &CancellationToken::new())
        .context("analysis failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis.diagnostics)?);
    } else {
        for diagnostic in &analysis.diagnostics {
            println!("{}", diagnostic);
        }
        println!(
            "{} registrations, {} errors, {} warnings",
            analysis.records.len(),
            analysis.error_count(),
            analysis.warning_count()
        );
    }

    let failed = analysis.has_errors() || (deny_warnings && analysis.warning_count() > 0);
    if failed {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
