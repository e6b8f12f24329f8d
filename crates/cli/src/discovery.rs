//! Source file discovery
//!
//! Directories are walked recursively; entries whose file name matches one
//! of the configured ignore patterns are pruned together with everything
//! below them. Explicitly named files are always taken as given.

use anyhow::{Context, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tplfold_core::FilesConfig;
use walkdir::{DirEntry, WalkDir};

/// Compiled form of [`FilesConfig`]
#[derive(Debug, Clone)]
pub struct FileFilter {
    extensions: Vec<String>,
    ignore_patterns: Vec<Pattern>,
}

impl FileFilter {
    pub fn new(config: &FilesConfig) -> Result<Self> {
        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).with_context(|| format!("Invalid ignore pattern '{pattern}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            extensions: config
                .extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            ignore_patterns,
        })
    }

    /// True when a file or directory name matches an ignore pattern
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches(name))
    }

    /// True when `path` has one of the configured extensions
    pub fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    fn keeps(&self, entry: &DirEntry) -> bool {
        // The walk root itself is never pruned
        entry.depth() == 0 || !self.is_ignored(&entry.file_name().to_string_lossy())
    }
}

/// Expand `paths` into the sorted, de-duplicated list of source files
pub fn discover_files(paths: &[PathBuf], filter: &FileFilter) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }

        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| filter.keeps(entry))
        {
            let entry =
                entry.with_context(|| format!("Failed to walk directory {}", path.display()))?;
            if entry.file_type().is_file() && filter.has_source_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    tracing::debug!(count = files.len(), "Discovered source files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_discover_skips_ignored_and_foreign_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/app.ts");
        touch(dir.path(), "src/view.tsx");
        touch(dir.path(), "src/readme.md");
        touch(dir.path(), "src/vendor.min.js");
        touch(dir.path(), "node_modules/lib/index.js");
        touch(dir.path(), "dist/app.js");

        let filter = FileFilter::new(&FilesConfig::default()).unwrap();
        let files = discover_files(&[dir.path().to_path_buf()], &filter).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();

        assert_eq!(names, vec!["src/app.ts", "src/view.tsx"]);
    }

    #[test]
    fn test_explicit_files_are_kept() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "dist/bundle.js");
        let file = dir.path().join("dist/bundle.js");

        let filter = FileFilter::new(&FilesConfig::default()).unwrap();
        let files = discover_files(&[file.clone(), file.clone()], &filter).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let filter = FileFilter::new(&FilesConfig::default()).unwrap();
        let result = discover_files(&[PathBuf::from("/nonexistent/tplfold")], &filter);
        assert!(result.is_err());
    }
}
