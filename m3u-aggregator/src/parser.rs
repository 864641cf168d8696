use crate::classifier::Category;
use crate::types::ChannelRecord;
use tracing::debug;

/// Marker that opens a channel descriptor line.
pub const EXTINF_MARKER: &str = "#EXTINF";

/// Line-oriented M3U playlist parser.
///
/// Each `#EXTINF` line starts one record. The display name is the text after
/// the last comma and the stream URL is the line that follows. Nothing is
/// validated: a descriptor at the end of input yields an empty URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct M3uParser;

impl M3uParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, content: &str) -> Vec<ChannelRecord> {
        let lines: Vec<&str> = content.lines().collect();
        let mut channels = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            if !line.starts_with(EXTINF_MARKER) {
                continue;
            }

            let url = lines.get(i + 1).map(|next| next.trim()).unwrap_or_default();

            channels.push(ChannelRecord {
                name: display_name(line),
                url: url.to_string(),
                logo: String::new(),
                category: Category::Other,
            });
        }

        debug!("Parsed playlist with {} channels", channels.len());
        channels
    }
}

pub fn parse(content: &str) -> Vec<ChannelRecord> {
    M3uParser::new().parse(content)
}

// Last comma-separated segment; the whole line when there is no comma.
fn display_name(line: &str) -> String {
    line.rsplit(',').next().unwrap_or(line).trim().to_string()
}
