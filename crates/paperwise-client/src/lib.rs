//! Paperwise client library
//!
//! Client-side state and API access for the Wise Paper research service.
//!
//! This crate provides:
//! - Local session store and the session context built on top of it
//! - Search history persisted next to the session
//! - HTTP client for search, field browsing, bookmarks and AI explanations
//! - View state for each screen of the client (search, fields, paper detail, assistant, profile)

pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod session;
pub mod storage;
pub mod views;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use history::SearchHistory;
pub use session::{AuthHeaders, Session, SessionContext, SessionStore, User};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
