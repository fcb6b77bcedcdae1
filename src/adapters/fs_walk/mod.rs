//! Recursive library enumeration with walkdir

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use walkdir::WalkDir;

use crate::domain::errors::ScanError;
use crate::domain::rules::ExtensionMatcher;
use crate::ports::LibraryPort;

pub struct WalkDirLibrary {
    matcher: ExtensionMatcher,
}

impl WalkDirLibrary {
    pub fn new(matcher: ExtensionMatcher) -> Self {
        Self { matcher }
    }

    /// Every regular file under `root` accepted by the matcher, sorted by path
    pub fn scan(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(false) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.matcher.matches(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    // Unreadable entries are skipped, the scan goes on
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }
        files.sort();

        tracing::debug!(
            root = %root.display(),
            count = files.len(),
            extensions = ?self.matcher.extensions(),
            "Library scan complete"
        );
        Ok(files)
    }
}

impl Default for WalkDirLibrary {
    fn default() -> Self {
        Self::new(ExtensionMatcher::default())
    }
}

#[async_trait]
impl LibraryPort for WalkDirLibrary {
    async fn enumerate(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        self.scan(root)
    }
}
