//! Persistence writer for extracted page content
//!
//! The output directory doubles as the resume index: a page whose file exists
//! is considered captured and is never fetched again. Files are written to a
//! sibling `.part` file and renamed into place, so an interrupted write never
//! leaves a truncated file that a later run would mistake for a captured page.

use crate::config::OutputConfig;
use crate::url::{to_file_path_with_extension, CanonicalUrl};
use crate::SweepError;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes page content to `base_dir/<host>/<segments>.<extension>`
#[derive(Debug, Clone)]
pub struct PageWriter {
    base_dir: PathBuf,
    extension: String,
}

impl PageWriter {
    pub fn new(base_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.base_dir, &config.extension)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the file a canonical URL is stored in
    pub fn path_for(&self, url: &CanonicalUrl) -> PathBuf {
        to_file_path_with_extension(url, &self.base_dir, &self.extension)
    }

    /// Returns true if the page's file already exists
    ///
    /// Only existence is checked; contents are never read.
    pub fn is_captured(&self, url: &CanonicalUrl) -> bool {
        self.path_for(url).exists()
    }

    /// Creates the output root
    ///
    /// Called once before crawling; failure here is fatal for the run.
    pub fn ensure_root(&self) -> Result<(), SweepError> {
        fs::create_dir_all(&self.base_dir).map_err(|source| SweepError::OutputRoot {
            path: self.base_dir.display().to_string(),
            source,
        })
    }

    /// Writes page content, creating parent directories as needed
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - The file that was written
    /// * `Err(SweepError::Write)` - Directory creation or the write failed
    pub fn write(&self, url: &CanonicalUrl, content: &str) -> Result<PathBuf, SweepError> {
        let path = self.path_for(url);
        let write_err = |source: std::io::Error| SweepError::Write {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut partial = path.clone().into_os_string();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        fs::write(&partial, content.as_bytes()).map_err(write_err)?;
        if let Err(source) = fs::rename(&partial, &path) {
            let _ = fs::remove_file(&partial);
            return Err(write_err(source));
        }

        Ok(path)
    }
}
