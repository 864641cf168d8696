use crate::classifier::Category;
use serde::{Deserialize, Serialize};

/// A playlist location read from the sources configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    pub url: String,
}

impl SourceEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Entry whose display name is the URL itself.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: url.clone(),
            url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub logo: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub name: Category,
    pub channels: Vec<ChannelRecord>,
}

/// The document consumed by the downstream application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCatalog {
    pub updated_at: String,
    pub categories: Vec<CategoryGroup>,
}

impl ChannelCatalog {
    pub fn channel_count(&self) -> usize {
        self.categories.iter().map(|c| c.channels.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub content: String,
    pub error: Option<String>,
    pub response_time_ms: u64,
}

impl FetchResult {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_parts(self) -> (String, Option<String>) {
        (self.content, self.error)
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_playlist_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "M3U-Aggregator/1.0".to_string(),
            timeout_seconds: 15,
            max_playlist_size_mb: 50,
            max_redirects: 5,
        }
    }
}

/// Counts reported at the end of every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_sources: usize,
    pub successful: usize,
    pub failed: usize,
    pub output_path: String,
    pub total_channels: usize,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Sources: {} total, {} succeeded, {} failed", self.total_sources, self.successful, self.failed)?;
        writeln!(f, "Output: {}", self.output_path)?;
        write!(f, "Channels: {}", self.total_channels)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP {status} for url: {url}")]
    HttpStatus { status: reqwest::StatusCode, url: String },

    #[error("Playlist size exceeds limit: {size_mb}MB")]
    PlaylistTooLarge { size_mb: usize },

    #[error("Sources config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Publish step failed: {0}")]
    Publish(String),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
