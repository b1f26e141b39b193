//! View state for each screen of the client.
//!
//! Views own their local state, call the API on user actions and turn every
//! failure into a message the front end can show. A failed call never
//! discards what the view was already showing, and nothing is retried.

pub mod assistant;
pub mod auth;
pub mod card;
pub mod detail;
pub mod fields;
pub mod home;
pub mod profile;
pub mod search;

pub use assistant::{AssistantView, ChatMessage, Role};
pub use auth::{SignInForm, SignUpForm};
pub use card::{BookmarkOutcome, CardContext, PaperCard};
pub use detail::PaperDetailView;
pub use fields::FieldView;
pub use home::HomeView;
pub use profile::{fetch_bookmark_keys, ProfileView};
pub use search::SearchView;

use crate::error::Error;

/// Message from the backend if it sent one, otherwise `fallback`.
pub fn failure_message(err: &Error, fallback: &str) -> String {
    err.backend_message()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}
