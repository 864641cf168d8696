pub mod types;
pub mod sources;
pub mod fetcher;
pub mod parser;
pub mod classifier;
pub mod aggregator;
pub mod publisher;
pub mod watcher;
pub mod logging;

pub use types::*;
pub use classifier::{classify, Category};
pub use fetcher::{FetchText, Fetcher};
pub use parser::M3uParser;
pub use sources::load_sources;
pub use aggregator::{AggregateOutcome, ChannelAggregator};
pub use publisher::{publish, GitPublisher};
pub use watcher::ConfigWatcher;
