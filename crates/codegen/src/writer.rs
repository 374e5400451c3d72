use dimark_core::CoreError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::emitter::GeneratedSource;

/// Suffix shared by every generated unit
pub const GENERATED_SUFFIX: &str = ".g.cs";

pub struct CodeWriter;

impl CodeWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write `content` unless the file already holds it. Returns whether the
    /// file was written.
    pub fn write_if_changed(&self, path: &Path, content: &str) -> Result<bool, CoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            let existing = fs::read_to_string(path)?;
            if existing == content {
                return Ok(false);
            }
        }

        fs::write(path, content)?;
        Ok(true)
    }

    /// Write every unit into `out_dir`, returning the paths that changed
    pub fn write_all(
        &self,
        out_dir: &Path,
        sources: &[GeneratedSource],
    ) -> Result<Vec<PathBuf>, CoreError> {
        let mut written = Vec::new();
        for source in sources {
            let path = out_dir.join(&source.file_name);
            if self.write_if_changed(&path, &source.content)? {
                tracing::debug!("Wrote {}", path.display());
                written.push(path);
            }
        }
        Ok(written)
    }

    /// Remove generated units in `out_dir` that are not in `sources`
    pub fn prune_stale(
        &self,
        out_dir: &Path,
        sources: &[GeneratedSource],
    ) -> Result<Vec<PathBuf>, CoreError> {
        if !out_dir.exists() {
            return Ok(Vec::new());
        }

        let current: HashSet<&str> = sources.iter().map(|s| s.file_name.as_str()).collect();
        let mut removed = Vec::new();
        for entry in fs::read_dir(out_dir)? {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if path.is_file() && file_name.ends_with(GENERATED_SUFFIX) && !current.contains(file_name) {
                fs::remove_file(&path)?;
                tracing::debug!("Removed stale {}", path.display());
                removed.push(path);
            }
        }
        removed.sort();
        Ok(removed)
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source(name: &str, content: &str) -> GeneratedSource {
        GeneratedSource {
            file_name: name.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_write_if_changed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/App.g.cs");
        let writer = CodeWriter::new();

        assert!(writer.write_if_changed(&path, "a").unwrap());
        assert!(!writer.write_if_changed(&path, "a").unwrap());
        assert!(writer.write_if_changed(&path, "b").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "b");
    }

    #[test]
    fn test_prune_keeps_foreign_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Old.g.cs"), "old").unwrap();
        fs::write(dir.path().join("Handwritten.cs"), "keep").unwrap();

        let writer = CodeWriter::new();
        let sources = vec![source("New.g.cs", "new")];
        writer.write_all(dir.path(), &sources).unwrap();
        let removed = writer.prune_stale(dir.path(), &sources).unwrap();

        assert_eq!(removed, vec![dir.path().join("Old.g.cs")]);
        assert!(dir.path().join("Handwritten.cs").exists());
        assert!(dir.path().join("New.g.cs").exists());
    }
}
