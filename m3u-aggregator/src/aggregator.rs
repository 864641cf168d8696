use crate::classifier::{self, Category};
use crate::fetcher::FetchText;
use crate::parser::M3uParser;
use crate::types::{CategoryGroup, ChannelCatalog, ChannelRecord, FailureRecord, SourceEntry};
use chrono::Local;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Result of one source: its classified channels or the reason it failed.
#[derive(Debug)]
pub enum SourceOutcome {
    Channels(Vec<ChannelRecord>),
    Failed(FailureRecord),
}

#[derive(Debug)]
pub struct AggregateOutcome {
    pub catalog: ChannelCatalog,
    pub failures: Vec<FailureRecord>,
    pub total_sources: usize,
}

impl AggregateOutcome {
    pub fn successful(&self) -> usize {
        self.total_sources - self.failures.len()
    }
}

pub struct ChannelAggregator<F> {
    fetcher: F,
    parser: M3uParser,
    concurrency: usize,
}

impl<F: FetchText> ChannelAggregator<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            parser: M3uParser::new(),
            concurrency: 1,
        }
    }

    /// Fetch up to `concurrency` sources at once. Output order is unchanged.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn process_source(&self, source: &SourceEntry) -> SourceOutcome {
        let result = self.fetcher.fetch_playlist(&source.url).await;
        debug!("Source {} answered in {}ms", source.name, result.response_time_ms);
        let (content, error) = result.into_parts();

        if let Some(error) = error {
            return SourceOutcome::Failed(FailureRecord {
                source: source.url.clone(),
                error,
            });
        }

        let channels: Vec<ChannelRecord> = self
            .parser
            .parse(&content)
            .into_iter()
            .map(classifier::classify)
            .collect();

        info!("Source {}: {} channels", source.name, channels.len());
        SourceOutcome::Channels(channels)
    }

    pub async fn aggregate(&self, sources: &[SourceEntry]) -> AggregateOutcome {
        info!("Aggregating {} sources", sources.len());

        // `buffered` yields in input order regardless of completion order.
        let outcomes: Vec<SourceOutcome> = stream::iter(sources)
            .map(|source| self.process_source(source))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut channels = Vec::new();
        let mut failures = Vec::new();

        for outcome in outcomes {
            match outcome {
                SourceOutcome::Channels(mut found) => channels.append(&mut found),
                SourceOutcome::Failed(failure) => {
                    warn!("Skipping source {}: {}", failure.source, failure.error);
                    failures.push(failure);
                }
            }
        }

        let catalog = ChannelCatalog {
            updated_at: run_date(),
            categories: group_by_category(channels),
        };

        AggregateOutcome {
            catalog,
            failures,
            total_sources: sources.len(),
        }
    }
}

/// Group channels by category, categories in first-seen order.
pub fn group_by_category(channels: Vec<ChannelRecord>) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut index: HashMap<Category, usize> = HashMap::new();

    for channel in channels {
        let slot = *index.entry(channel.category).or_insert_with(|| {
            groups.push(CategoryGroup {
                name: channel.category,
                channels: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].channels.push(channel);
    }

    groups
}

/// Date stamp for `updated_at`, e.g. `2026-01-08`.
pub fn run_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
