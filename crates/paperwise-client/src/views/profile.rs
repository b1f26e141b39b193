//! Signed-in user's profile and bookmarks.

use std::collections::HashSet;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::session::{SessionContext, User};
use crate::storage::KeyValueStore;

use super::card::{BookmarkOutcome, PaperCard};
use super::failure_message;

const PROFILE_FAILED: &str = "Failed to load profile";

#[derive(Debug)]
pub struct ProfileView {
    profile: Option<User>,
    cards: Vec<PaperCard>,
    error: Option<String>,
}

impl ProfileView {
    /// Load profile and bookmarks. Requires a session.
    ///
    /// Bookmarks are always re-fetched from the backend; a failing bookmark
    /// request shows as an empty list.
    pub async fn load<S: KeyValueStore>(
        session: &SessionContext<S>,
        api: &ApiClient,
    ) -> Result<Self> {
        if !session.is_signed_in() {
            return Err(Error::NotSignedIn);
        }
        let auth = session.auth_headers()?;
        let (profile, bookmarks) = tokio::join!(api.profile(&auth), api.bookmarks(&auth));

        let (profile, error) = match profile {
            Ok(user) => (Some(user), None),
            Err(e) => {
                tracing::warn!(error = %e, "Profile request failed");
                (None, Some(failure_message(&e, PROFILE_FAILED)))
            }
        };

        let cards = match bookmarks {
            Ok(papers) => papers.into_iter().map(PaperCard::in_profile).collect(),
            Err(e) => {
                tracing::debug!(error = %e, "Bookmark list unavailable");
                Vec::new()
            }
        };

        Ok(Self {
            profile,
            cards,
            error,
        })
    }

    pub fn profile(&self) -> Option<&User> {
        self.profile.as_ref()
    }

    pub fn cards(&self) -> &[PaperCard] {
        &self.cards
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Identifying keys of every bookmarked paper.
    pub fn bookmark_keys(&self) -> HashSet<String> {
        self.cards
            .iter()
            .filter_map(|c| c.paper().identifying_key().map(str::to_string))
            .collect()
    }

    /// Remove the bookmark shown at `index`. The card leaves the list once
    /// the backend confirms. Returns `None` when there is no such card.
    pub async fn remove<S: KeyValueStore>(
        &mut self,
        index: usize,
        session: &SessionContext<S>,
        api: &ApiClient,
    ) -> Result<Option<BookmarkOutcome>> {
        let Some(card) = self.cards.get_mut(index) else {
            return Ok(None);
        };
        let outcome = card.unbookmark(session, api).await?;
        if outcome == BookmarkOutcome::RemovedFromProfile {
            self.cards.remove(index);
        }
        Ok(Some(outcome))
    }
}

/// Identifying keys of the user's bookmarks, straight from the backend.
///
/// Unlike [`ProfileView::load`], a failed request is returned as an error
/// rather than read as an empty list.
pub async fn fetch_bookmark_keys<S: KeyValueStore>(
    session: &SessionContext<S>,
    api: &ApiClient,
) -> Result<HashSet<String>> {
    if !session.is_signed_in() {
        return Err(Error::NotSignedIn);
    }
    let papers = api.bookmarks(&session.auth_headers()?).await?;
    Ok(papers
        .iter()
        .filter_map(|p| p.identifying_key().map(str::to_string))
        .collect())
}
