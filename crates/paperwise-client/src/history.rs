//! Recent search queries, persisted next to the session.

use crate::error::Result;
use crate::storage::KeyValueStore;

const HISTORY_KEY: &str = "searchHistory";

/// Maximum number of queries remembered.
pub const MAX_HISTORY: usize = 10;

/// Most-recent-first list of distinct search queries.
///
/// Shared by whoever uses the device; not tied to the signed-in user.
#[derive(Debug)]
pub struct SearchHistory<S> {
    store: S,
    entries: Vec<String>,
}

impl<S: KeyValueStore> SearchHistory<S> {
    /// Load history from storage. Unparseable data is dropped silently.
    pub fn load(store: S) -> Result<Self> {
        let entries = match store.get(HISTORY_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(MAX_HISTORY);
                    entries
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring unreadable search history");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Ok(Self { store, entries })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a query at the front, moving it there if already present.
    pub fn add(&mut self, query: &str) -> Result<()> {
        self.entries.retain(|q| q != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(MAX_HISTORY);
        self.persist()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.store.remove(HISTORY_KEY)
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, &json)
    }
}
