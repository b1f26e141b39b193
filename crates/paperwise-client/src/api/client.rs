//! HTTP client for the research API.

use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use super::types::{
    AnswerEnvelope, AuthResponse, BookmarksEnvelope, ErrorBody, ExplainEnvelope, ExplainRequest,
    Explanation, Field, FieldsEnvelope, Paper, PapersEnvelope, ProfileEnvelope, SearchQuery,
    SignInRequest, SignUpRequest,
};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::AuthHeaders;

/// HTTP client for the research API.
///
/// Every endpoint hangs off one configured origin. Authenticated calls take
/// the headers produced by the session store rather than reading it
/// themselves, so the client stays free of session state.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<AuthResponse> {
        tracing::debug!(email = %request.email, "Signing in");
        let response = self
            .client
            .post(self.url("/api/auth/signin"))
            .json(request)
            .send()
            .await?;
        decode(response, "sign-in response").await
    }

    /// Create an account; the backend signs the new user in directly.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthResponse> {
        tracing::debug!(email = %request.email, "Signing up");
        let response = self
            .client
            .post(self.url("/api/auth/signup"))
            .json(request)
            .send()
            .await?;
        decode(response, "sign-up response").await
    }

    /// Search papers across the configured repositories.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>> {
        tracing::debug!(
            query = %query.query,
            source = %query.source,
            limit = query.limit,
            "Searching papers"
        );
        let limit = query.limit.to_string();
        let response = self
            .client
            .get(self.url("/api/papers/search"))
            .query(&[
                ("query", query.query.as_str()),
                ("source", query.source.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;
        let envelope: PapersEnvelope = decode(response, "search results").await?;
        papers_or_rejection(envelope)
    }

    /// List the research fields available for browsing.
    pub async fn fields(&self) -> Result<Vec<Field>> {
        let response = self.client.get(self.url("/api/papers/fields")).send().await?;
        let envelope: FieldsEnvelope = decode(response, "field list").await?;
        Ok(envelope.fields)
    }

    /// Latest papers in one research field.
    pub async fn field_papers(&self, field_id: &str, limit: u32) -> Result<Vec<Paper>> {
        tracing::debug!(field_id, limit, "Fetching field papers");
        let url = self.segment_url("/api/papers/field", field_id)?;
        let response = self
            .client
            .get(url)
            .query(&[("limit", limit.to_string())])
            .send()
            .await?;
        let envelope: PapersEnvelope = decode(response, "field papers").await?;
        papers_or_rejection(envelope)
    }

    /// Ask the AI assistant a free-form question.
    ///
    /// A `success: false` flag, or an answer that is not a string, comes back
    /// as [`Error::Rejected`].
    pub async fn answer(&self, question: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url("/api/ai/answer"))
            .json(&serde_json::json!({ "question": question }))
            .send()
            .await?;
        let envelope: AnswerEnvelope = decode(response, "assistant answer").await?;
        match envelope.answer {
            Some(serde_json::Value::String(answer)) if envelope.success => Ok(answer),
            _ => Err(Error::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "assistant did not return an answer".to_string()),
            )),
        }
    }

    /// Request a plain-language explanation.
    pub async fn explain(&self, request: &ExplainRequest) -> Result<Explanation> {
        let response = self
            .client
            .post(self.url("/api/ai/explain"))
            .json(request)
            .send()
            .await?;
        let envelope: ExplainEnvelope = decode(response, "explanation").await?;
        match envelope.explanation {
            Some(explanation) if envelope.success => Ok(explanation),
            _ => Err(Error::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "no explanation returned".to_string()),
            )),
        }
    }

    /// Profile of the user the headers authenticate.
    pub async fn profile(&self, auth: &AuthHeaders) -> Result<crate::session::User> {
        let request = self.client.get(self.url("/api/user/profile"));
        let response = with_auth(request, auth).send().await?;
        let envelope: ProfileEnvelope = decode(response, "profile").await?;
        Ok(envelope.user)
    }

    /// Papers the user has bookmarked.
    pub async fn bookmarks(&self, auth: &AuthHeaders) -> Result<Vec<Paper>> {
        let request = self.client.get(self.url("/api/user/bookmarks"));
        let response = with_auth(request, auth).send().await?;
        let envelope: BookmarksEnvelope = decode(response, "bookmarks").await?;
        Ok(envelope.bookmarks)
    }

    /// Bookmark a paper. The full paper is sent, with `paperId` set to its
    /// identifying key.
    pub async fn add_bookmark(&self, auth: &AuthHeaders, paper: &Paper) -> Result<()> {
        let key = paper.identifying_key().ok_or(Error::MissingKey)?;
        let mut payload = paper.clone();
        payload.paper_id = Some(key.to_string());

        tracing::debug!(key, "Adding bookmark");
        let request = self
            .client
            .post(self.url("/api/user/bookmarks"))
            .json(&serde_json::json!({ "paper": payload }));
        let response = with_auth(request, auth).send().await?;
        expect_success(response).await
    }

    /// Remove the bookmark addressed by `key`.
    pub async fn remove_bookmark(&self, auth: &AuthHeaders, key: &str) -> Result<()> {
        tracing::debug!(key, "Removing bookmark");
        let url = self.segment_url("/api/user/bookmarks", key)?;
        let response = with_auth(self.client.delete(url), auth).send().await?;
        expect_success(response).await
    }

    /// Backend health probe.
    pub async fn health(&self) -> Result<serde_json::Value> {
        let response = self.client.get(self.url("/api/health")).send().await?;
        decode(response, "health").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `path` plus one trailing segment, percent-encoded as a whole so that
    /// keys containing `/` (links) stay a single segment.
    fn segment_url(&self, path: &str, segment: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url(path))
            .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("API URL '{}' cannot be a base", self.base_url)))?
            .push(segment);
        Ok(url)
    }
}

fn with_auth(mut request: RequestBuilder, auth: &AuthHeaders) -> RequestBuilder {
    for (name, value) in auth {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

fn papers_or_rejection(envelope: PapersEnvelope) -> Result<Vec<Paper>> {
    if envelope.success {
        Ok(envelope.papers)
    } else {
        Err(Error::Rejected(
            envelope.error.unwrap_or_else(|| "request was not successful".to_string()),
        ))
    }
}

async fn error_from(response: Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| body.trim().to_string());
    tracing::warn!(status, message = %message, "Backend returned an error");
    Error::Status { status, message }
}

async fn expect_success(response: Response) -> Result<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_from(response).await)
    }
}

async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    if !response.status().is_success() {
        return Err(error_from(response).await);
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Decode(format!("{}: {}", what, e)))
}
