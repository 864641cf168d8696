use async_trait::async_trait;
use m3u_aggregator::{FetchResult, FetchText};
use std::collections::HashMap;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();
    });
}

/// Serves canned playlist text (or errors) by URL.
#[derive(Default)]
pub struct StubFetcher {
    responses: HashMap<String, Result<String, String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn fail(mut self, url: &str, error: &str) -> Self {
        self.responses.insert(url.to_string(), Err(error.to_string()));
        self
    }
}

#[async_trait]
impl FetchText for StubFetcher {
    async fn fetch_playlist(&self, url: &str) -> FetchResult {
        let (content, error) = match self.responses.get(url) {
            Some(Ok(body)) => (body.clone(), None),
            Some(Err(e)) => (String::new(), Some(e.clone())),
            None => (String::new(), Some(format!("no stub for {}", url))),
        };
        FetchResult {
            url: url.to_string(),
            content,
            error,
            response_time_ms: 0,
        }
    }
}

pub const NEWS_PLAYLIST: &str = "#EXTM3U\n\
#EXTINF:-1 tvg-id=\"AlJazeera.qa\",Al Jazeera English\n\
http://example/aje\n\
#EXTINF:-1,BBC World News\n\
http://example/bbc\n\
#EXTINF:-1,Cartoon Time\n\
http://example/cartoon\n";

pub const SPORTS_PLAYLIST: &str = "#EXTM3U\n\
#EXTINF:-1,beIN Sports\n\
http://example/bein\n\
#EXTINF:-1,Quran Kareem\n\
http://example/quran\n\
#EXTINF:-1,Music Box\n\
http://example/music\n";
