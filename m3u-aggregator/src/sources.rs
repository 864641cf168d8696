use crate::types::{AggregatorError, Result, SourceEntry};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_SOURCES_PATH: &str = "config/m3u_sources.json";

/// Written to the sources file when it does not exist yet.
pub const DEFAULT_SOURCE_URLS: [&str; 2] = [
    "https://iptv-org.github.io/iptv/genres/religion.m3u",
    "https://iptv-org.github.io/iptv/streams/news.m3u",
];

pub fn default_sources() -> Vec<SourceEntry> {
    DEFAULT_SOURCE_URLS
        .iter()
        .map(|url| SourceEntry::from_url(*url))
        .collect()
}

/// Load the ordered source list from `config_path`.
///
/// A missing file is created with `defaults`. An unreadable or malformed
/// file is logged and `defaults` are returned without touching the file.
pub fn load_sources(config_path: &Path, defaults: &[SourceEntry]) -> Result<Vec<SourceEntry>> {
    if !config_path.exists() {
        write_defaults(config_path, defaults)?;
        info!(
            "Created sources config {} with {} default entries",
            config_path.display(),
            defaults.len()
        );
        return Ok(defaults.to_vec());
    }

    match read_sources(config_path) {
        Ok(sources) => {
            info!("Loaded {} sources from {}", sources.len(), config_path.display());
            Ok(sources)
        }
        Err(e) => {
            warn!(
                "Could not load sources from {}: {}; using {} defaults",
                config_path.display(),
                e,
                defaults.len()
            );
            Ok(defaults.to_vec())
        }
    }
}

fn read_sources(config_path: &Path) -> Result<Vec<SourceEntry>> {
    let content = fs::read_to_string(config_path)?;
    parse_sources(&content)
}

/// Parse the JSON array form of the sources file.
pub fn parse_sources(content: &str) -> Result<Vec<SourceEntry>> {
    let value: Value = serde_json::from_str(content)?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(AggregatorError::Config(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )))
        }
    };

    Ok(items.iter().filter_map(source_from_value).collect())
}

fn source_from_value(value: &Value) -> Option<SourceEntry> {
    match value {
        Value::String(url) => usable_url(url).map(SourceEntry::from_url),
        Value::Object(map) => {
            let url = map.get("url").and_then(Value::as_str).and_then(usable_url)?;
            let name = ["name", "title"]
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .find(|name| !name.is_empty())
                .unwrap_or(url);
            Some(SourceEntry::new(name, url))
        }
        _ => None,
    }
}

fn usable_url(url: &str) -> Option<&str> {
    let url = url.trim();
    (!url.is_empty()).then_some(url)
}

fn write_defaults(config_path: &Path, defaults: &[SourceEntry]) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(defaults)?;
    fs::write(config_path, json)?;
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
