//! Report feeds.
//!
//! A feed yields the raw text of the latest weather reports, one report per
//! line. The runner polls it on the fetch interval and treats any error as a
//! failed fetch.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Outcome of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// New content, split into non-blank report lines.
    Updated(Vec<String>),
    /// The source has not changed since the previous fetch.
    Unchanged,
}

/// A source of raw report lines.
#[async_trait]
pub trait ReportFeed: Send {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Fetch the current reports.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    async fn fetch(&mut self) -> Result<FetchResult>;
}

/// Reads reports from a text file, one report per line.
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
    last_hash: Option<String>,
}

impl FileFeed {
    /// Create a feed for the given file. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_hash: None,
        }
    }

    /// The file being read.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportFeed for FileFeed {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&mut self) -> Result<FetchResult> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::feed_read(&self.path, e))?;

        let hash = content_hash(&content);
        if self.last_hash.as_ref() == Some(&hash) {
            trace!(path = %self.path.display(), "Report file unchanged");
            return Ok(FetchResult::Unchanged);
        }
        self.last_hash = Some(hash);

        let lines = split_lines(&content);
        debug!(
            path = %self.path.display(),
            lines = lines.len(),
            "Read report file"
        );
        Ok(FetchResult::Updated(lines))
    }
}

/// BLAKE3 hash of a response body.
#[must_use]
pub fn content_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Split a response body into non-blank lines with line endings removed.
#[must_use]
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
