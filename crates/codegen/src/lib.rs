pub mod csharp;
pub mod emitter;
pub mod templates;
pub mod writer;

pub use emitter::*;
pub use writer::*;

use dimark_core::{analyze, Analysis, CancellationToken, Compilation, CoreError, GeneratorConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Analysis plus the units rendered from it
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedOutput {
    pub analysis: Analysis,
    pub sources: Vec<GeneratedSource>,
}

impl GeneratedOutput {
    pub fn source(&self, file_name: &str) -> Option<&GeneratedSource> {
        self.sources.iter().find(|s| s.file_name == file_name)
    }
}

/// Files touched by [`CodeGenerator::write`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub unchanged: usize,
    pub removed: Vec<PathBuf>,
}

pub struct CodeGenerator {
    pub config: GeneratorConfig,
}

impl CodeGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn generate(
        &self,
        compilation: &Compilation,
        cancel: &CancellationToken,
    ) -> Result<GeneratedOutput, CoreError> {
        let analysis = analyze(compilation, &self.config, cancel)?;
        cancel.check()?;
        let sources = SourceEmitter::new(&self.config).emit(&analysis)?;
        Ok(GeneratedOutput { analysis, sources })
    }

    /// Write the units of `output` into `out_dir` and drop stale units
    pub fn write(&self, output: &GeneratedOutput, out_dir: &Path) -> Result<WriteSummary, CoreError> {
        let writer = CodeWriter::new();
        let written = writer.write_all(out_dir, &output.sources)?;
        let removed = writer.prune_stale(out_dir, &output.sources)?;
        Ok(WriteSummary {
            unchanged: output.sources.len() - written.len(),
            written,
            removed,
        })
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}
