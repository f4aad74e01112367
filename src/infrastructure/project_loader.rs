use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &[".git", "target"];

pub struct ProjectLoader;

impl ProjectLoader {
    /// Every file under `root` whose extension is in `extensions`, sorted by
    /// path so reduction order is stable between runs.
    pub fn collect_sources(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            bail!("Target {} is not a directory", root.display());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped(e))
        {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            let path = entry.path();
            if entry.file_type().is_dir() {
                info!("Processing {}", path.display());
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }

            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)));
            if matches {
                info!("Found source file {}", path.display());
                files.push(path.to_path_buf());
            } else {
                debug!("ignoring {}", path.display());
            }
        }

        files.sort();
        Ok(files)
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}
