//! Paper search screen.

use crate::api::{ApiClient, SearchQuery, Source};
use crate::error::Error;
use crate::history::SearchHistory;
use crate::storage::KeyValueStore;

use super::card::PaperCard;

pub const FETCH_FAILED: &str = "Failed to fetch papers.";
pub const NETWORK_FAILED: &str = "Network error or server issue.";

/// Suggested queries offered next to the search box.
pub const POPULAR_QUERIES: [&str; 10] = [
    "machine learning",
    "artificial intelligence",
    "cancer research",
    "quantum computing",
    "climate change",
    "renewable energy",
    "covid-19",
    "blockchain",
    "robotics",
    "genetics",
];

/// Search form, results and recent queries.
#[derive(Debug)]
pub struct SearchView<S> {
    history: SearchHistory<S>,
    query: String,
    source: Source,
    limit: u32,
    cards: Vec<PaperCard>,
    error: Option<String>,
    searched: bool,
}

impl<S: KeyValueStore> SearchView<S> {
    pub fn new(history: SearchHistory<S>) -> Self {
        Self {
            history,
            query: String::new(),
            source: Source::All,
            limit: SearchQuery::DEFAULT_LIMIT,
            cards: Vec::new(),
            error: None,
            searched: false,
        }
    }

    pub fn set_source(&mut self, source: Source) {
        self.source = source;
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
    }

    /// Run a search. Blank queries are ignored and return `false`.
    ///
    /// Success replaces the results and records the query in history.
    /// Failure clears the results and leaves a message in [`Self::error`].
    pub async fn submit(&mut self, api: &ApiClient, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        self.query = query.to_string();
        self.error = None;
        self.searched = true;

        let request = SearchQuery::new(query)
            .with_source(self.source)
            .with_limit(self.limit);

        match api.search(&request).await {
            Ok(papers) => {
                self.cards = papers.into_iter().map(PaperCard::listing).collect();
                if let Err(e) = self.history.add(query) {
                    tracing::warn!(error = %e, "Could not save search history");
                }
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "Search failed");
                self.cards.clear();
                self.error = Some(
                    match e {
                        Error::Rejected(_) | Error::Status { .. } => FETCH_FAILED,
                        _ => NETWORK_FAILED,
                    }
                    .to_string(),
                );
            }
        }
        true
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn cards(&self) -> &[PaperCard] {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> &mut [PaperCard] {
        &mut self.cards
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// A search ran, succeeded and matched nothing.
    pub fn is_empty_result(&self) -> bool {
        self.searched && self.cards.is_empty() && self.error.is_none()
    }

    pub fn history(&self) -> &SearchHistory<S> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut SearchHistory<S> {
        &mut self.history
    }
}
