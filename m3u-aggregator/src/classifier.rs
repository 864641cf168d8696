use crate::types::ChannelRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse channel category. Serialized by variant name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Quran,
    News,
    Sports,
    Entertainment,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Quran,
        Category::News,
        Category::Sports,
        Category::Entertainment,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Quran => "Quran",
            Category::News => "News",
            Category::Sports => "Sports",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword rules, evaluated top to bottom. Order matters: a name matching
/// several rules takes the first one.
const RULES: &[(Category, &[&str])] = &[
    (Category::Quran, &["quran", "islam"]),
    (Category::News, &["news", "aljazeera", "cnn"]),
    (Category::Sports, &["sport", "football"]),
    (Category::Entertainment, &["music", "entertainment"]),
];

/// Category for a channel display name.
///
/// Keywords are matched case-insensitively against the name and against the
/// name with whitespace removed, so "Al Jazeera" matches "aljazeera". The
/// compact form can also match across word boundaries: "Kiss Port FM"
/// contains "sport" once spaces are dropped and lands in `Sports`.
pub fn category_for(name: &str) -> Category {
    let name = name.to_lowercase();
    let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();

    RULES
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|k| name.contains(k) || compact.contains(k))
        })
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

pub fn classify(mut record: ChannelRecord) -> ChannelRecord {
    record.category = category_for(&record.name);
    record
}
