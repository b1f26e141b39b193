//! Remote API access.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{
    AuthResponse, ExplainKind, ExplainRequest, Explanation, Field, Paper, SearchQuery, SignInRequest,
    SignUpRequest, Source,
};
