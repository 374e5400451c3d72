use anyhow::{Context, Result};
use dimark_codegen::CodeGenerator;
use dimark_core::CancellationToken;
use std::path::Path;
use std::process::ExitCode;

use super::{load_compilation, load_config};

pub fn run(input: &Path, out: &Path, config: Option<&Path>, dry_run: bool) -> Result<ExitCode> {
    let compilation = load_compilation(input)?;
    let generator = CodeGenerator::new(load_config(config)?);
    let output = generator
        .generate(&compilation, &CancellationToken::new())
        .context("code generation failed")?;

    for diagnostic in &output.analysis.diagnostics {
        eprintln!("{}", diagnostic);
    }

    if dry_run {
        for source in &output.sources {
            println!("// ===== {} =====", source.file_name);
            println!("{}", source.content);
        }
    } else {
        let summary = generator
            .write(&output, out)
            .with_context(|| format!("failed to write sources to {}", out.display()))?;
        for path in &summary.written {
            println!("wrote {}", path.display());
        }
        for path in &summary.removed {
            println!("removed {}", path.display());
        }
        println!(
            "✓ {} units ({} written, {} unchanged, {} removed)",
            output.sources.len(),
            summary.written.len(),
            summary.unchanged,
            summary.removed.len()
        );
    }

    if output.analysis.has_errors() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
