use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::parsers::is_tped_path;

/// File discovery for TPED marker panels
pub struct FileDiscovery {
    recursive: bool,
}

impl FileDiscovery {
    pub fn new(recursive: bool) -> Self {
        Self { recursive }
    }

    /// Collect panel files from a mix of file and directory paths
    pub fn discover(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() {
                if is_tped_path(path) {
                    files.push(path.clone());
                }
            } else if path.is_dir() {
                files.extend(self.discover_in_directory(path)?);
            }
        }

        // Remove duplicates while preserving order
        let mut seen = HashSet::new();
        files.retain(|path| seen.insert(path.clone()));

        Ok(files)
    }

    pub fn discover_in_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if self.recursive {
            for entry in WalkDir::new(dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && is_tped_path(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            let entries = fs::read_dir(dir)
                .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

            for entry in entries {
                let entry = entry.with_context(|| {
                    format!("Failed to read directory entry in: {}", dir.display())
                })?;
                let path = entry.path();

                if path.is_file() && is_tped_path(&path) {
                    files.push(path);
                }
            }
            files.sort();
        }

        Ok(files)
    }
}
