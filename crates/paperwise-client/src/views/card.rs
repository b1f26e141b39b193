//! Paper cards and bookmark synchronization.

use std::collections::HashSet;

use crate::api::{ApiClient, Paper};
use crate::error::Result;
use crate::session::SessionContext;
use crate::storage::KeyValueStore;

/// Longest summary excerpt shown on a card, ellipsis included.
pub const SUMMARY_EXCERPT_LEN: usize = 150;

/// Number of authors listed by name before collapsing to "+N more".
const AUTHORS_SHOWN: usize = 3;

/// Where a card is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardContext {
    /// Search results, field listings, featured papers.
    Listing,
    /// The signed-in user's bookmark list.
    Profile,
}

/// Result of a bookmark action on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkOutcome {
    /// No session; nothing was sent and nothing changed.
    SignedOut,
    Bookmarked,
    Unbookmarked,
    /// Unbookmarked from the profile list; the owner should drop the card.
    RemovedFromProfile,
}

/// A paper as displayed in a list, with its bookmark indicator.
///
/// The indicator starts as a guess: callers in listing contexts do not know
/// the real bookmark state, so a card counts as bookmarked when the paper
/// carries a backend record id (only bookmark records have one). Use
/// [`PaperCard::reconcile`] with a fetched bookmark list to replace the guess.
#[derive(Debug, Clone)]
pub struct PaperCard {
    paper: Paper,
    context: CardContext,
    bookmarked: bool,
}

impl PaperCard {
    pub fn new(paper: Paper, context: CardContext) -> Self {
        let bookmarked = paper.record_id.is_some();
        Self {
            paper,
            context,
            bookmarked,
        }
    }

    pub fn listing(paper: Paper) -> Self {
        Self::new(paper, CardContext::Listing)
    }

    pub fn in_profile(paper: Paper) -> Self {
        Self::new(paper, CardContext::Profile)
    }

    pub fn paper(&self) -> &Paper {
        &self.paper
    }

    pub fn context(&self) -> CardContext {
        self.context
    }

    pub fn is_bookmarked(&self) -> bool {
        self.bookmarked
    }

    pub fn title(&self) -> &str {
        &self.paper.title
    }

    /// "By A, B, C +2 more", or `None` when the paper lists no authors.
    pub fn authors_line(&self) -> Option<String> {
        let authors = &self.paper.authors;
        if authors.is_empty() {
            return None;
        }
        let shown = authors
            .iter()
            .take(AUTHORS_SHOWN)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if authors.len() > AUTHORS_SHOWN {
            Some(format!("By {} +{} more", shown, authors.len() - AUTHORS_SHOWN))
        } else {
            Some(format!("By {}", shown))
        }
    }

    pub fn summary_excerpt(&self) -> String {
        truncate_text(&self.paper.summary, SUMMARY_EXCERPT_LEN)
    }

    /// Set the indicator from a known set of bookmarked keys.
    pub fn reconcile(&mut self, bookmarked_keys: &HashSet<String>) {
        self.bookmarked = self
            .paper
            .identifying_key()
            .is_some_and(|key| bookmarked_keys.contains(key));
    }

    /// Save the paper to the signed-in user's bookmarks.
    ///
    /// On error the indicator is left as it was.
    pub async fn bookmark<S: KeyValueStore>(
        &mut self,
        session: &SessionContext<S>,
        api: &ApiClient,
    ) -> Result<BookmarkOutcome> {
        if !session.is_signed_in() {
            return Ok(BookmarkOutcome::SignedOut);
        }
        let auth = session.auth_headers()?;
        api.add_bookmark(&auth, &self.paper).await?;
        self.bookmarked = true;
        Ok(BookmarkOutcome::Bookmarked)
    }

    /// Remove the paper from the signed-in user's bookmarks.
    pub async fn unbookmark<S: KeyValueStore>(
        &mut self,
        session: &SessionContext<S>,
        api: &ApiClient,
    ) -> Result<BookmarkOutcome> {
        if !session.is_signed_in() {
            return Ok(BookmarkOutcome::SignedOut);
        }
        let key = self
            .paper
            .identifying_key()
            .ok_or(crate::error::Error::MissingKey)?
            .to_string();
        let auth = session.auth_headers()?;
        api.remove_bookmark(&auth, &key).await?;
        self.bookmarked = false;
        Ok(match self.context {
            CardContext::Profile => BookmarkOutcome::RemovedFromProfile,
            CardContext::Listing => BookmarkOutcome::Unbookmarked,
        })
    }

    /// The card's bookmark button: profile cards only remove, listing cards
    /// flip the current indicator.
    pub async fn toggle<S: KeyValueStore>(
        &mut self,
        session: &SessionContext<S>,
        api: &ApiClient,
    ) -> Result<BookmarkOutcome> {
        if self.context == CardContext::Profile || self.bookmarked {
            self.unbookmark(session, api).await
        } else {
            self.bookmark(session, api).await
        }
    }
}

/// Cut `text` to at most `max_len` characters, marking the cut with "...".
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::session::User;
    use crate::storage::MemoryStore;

    fn paper(title: &str, authors: &[&str]) -> Paper {
        Paper {
            title: title.to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            summary: "A short abstract.".to_string(),
            link: Some(format!("https://arxiv.org/abs/{}", title.len())),
            ..Paper::default()
        }
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 150), "short");

        let long = "x".repeat(200);
        let cut = truncate_text(&long, 150);
        assert_eq!(cut.chars().count(), 150);
        assert!(cut.ends_with("..."));

        let exact = "y".repeat(150);
        assert_eq!(truncate_text(&exact, 150), exact);
    }

    #[test]
    fn test_truncate_multibyte() {
        let long = "é".repeat(160);
        let cut = truncate_text(&long, 150);
        assert_eq!(cut.chars().count(), 150);
    }

    #[test]
    fn test_authors_line() {
        let card = PaperCard::listing(paper("Solo", &["Curie"]));
        assert_eq!(card.authors_line().as_deref(), Some("By Curie"));

        let card = PaperCard::listing(paper("Crowd", &["A", "B", "C", "D", "E"]));
        assert_eq!(card.authors_line().as_deref(), Some("By A, B, C +2 more"));

        let card = PaperCard::listing(paper("Anonymous", &[]));
        assert!(card.authors_line().is_none());
    }

    #[test]
    fn test_initial_indicator_guess() {
        let card = PaperCard::listing(paper("Fresh", &[]));
        assert!(!card.is_bookmarked());

        let mut saved = paper("Saved", &[]);
        saved.record_id = Some("65f0".to_string());
        assert!(PaperCard::listing(saved).is_bookmarked());
    }

    #[test]
    fn test_reconcile() {
        let p = paper("Known", &[]);
        let key = p.identifying_key().unwrap().to_string();
        let mut card = PaperCard::listing(p);

        card.reconcile(&HashSet::from([key]));
        assert!(card.is_bookmarked());

        card.reconcile(&HashSet::new());
        assert!(!card.is_bookmarked());
    }

    #[test]
    fn test_bookmark_signed_out_is_noop() {
        let session = SessionContext::restore(MemoryStore::new()).unwrap();
        // Nothing listens on this origin; a request would fail with a network error
        let api = ApiClient::new(&ClientConfig::new("http://127.0.0.1:1")).unwrap();
        let mut card = PaperCard::listing(paper("Offline", &[]));

        let outcome = tokio_test::block_on(card.bookmark(&session, &api)).unwrap();
        assert_eq!(outcome, BookmarkOutcome::SignedOut);
        assert!(!card.is_bookmarked());

        let outcome = tokio_test::block_on(card.toggle(&session, &api)).unwrap();
        assert_eq!(outcome, BookmarkOutcome::SignedOut);
    }

    #[tokio::test]
    async fn test_failed_bookmark_keeps_indicator() {
        let mut session = SessionContext::restore(MemoryStore::new()).unwrap();
        session
            .sign_in("t0k3n", User::new("u-1", "Ada", "ada@example.com"))
            .unwrap();
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let api = ApiClient::new(&ClientConfig::new(format!("http://127.0.0.1:{}", port))).unwrap();
        let mut card = PaperCard::listing(paper("Unlucky", &[]));

        assert!(card.bookmark(&session, &api).await.is_err());
        assert!(!card.is_bookmarked());
    }
}
