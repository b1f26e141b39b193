//! Wire types for the research API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::session::User;

/// Paper repository to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    All,
    Arxiv,
    Pubmed,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::All => "all",
            Source::Arxiv => "arxiv",
            Source::Pubmed => "pubmed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Source::All => "All Sources",
            Source::Arxiv => "arXiv",
            Source::Pubmed => "PubMed",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Source::All),
            "arxiv" => Ok(Source::Arxiv),
            "pubmed" => Ok(Source::Pubmed),
            other => Err(format!("unknown source '{}'. Use: all, arxiv, or pubmed", other)),
        }
    }
}

/// A paper as returned by search, field listings and the bookmark list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paper {
    /// Backend record id; only bookmarked papers carry one.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,

    #[serde(rename = "paperId", default, skip_serializing_if = "Option::is_none")]
    pub paper_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,

    /// Fields this client does not interpret; sent back untouched when bookmarking.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Paper {
    /// Key used to address the paper for bookmarking: the canonical link,
    /// falling back to the explicit paper id.
    pub fn identifying_key(&self) -> Option<&str> {
        self.link
            .as_deref()
            .filter(|l| !l.is_empty())
            .or_else(|| self.paper_id.as_deref().filter(|id| !id.is_empty()))
    }
}

/// Research field offered for browsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub source: Source,
    pub limit: u32,
}

impl SearchQuery {
    /// Fixed page size used when the caller does not choose one.
    pub const DEFAULT_LIMIT: u32 = 20;

    /// Page sizes a caller may choose from.
    pub const LIMITS: [u32; 4] = [10, 20, 50, 100];

    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            source: Source::All,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Successful sign-in or sign-up.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// What an explanation request's `content` describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplainKind {
    Paper,
    Query,
}

/// Body of `POST /api/ai/explain`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExplainRequest {
    /// Explain a paper (JSON-encoded title/summary/authors) or a bare title.
    Content {
        content: String,
        #[serde(rename = "type")]
        kind: ExplainKind,
    },
    /// Follow-up question about a paper.
    Question {
        question: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        paper: Option<Paper>,
    },
}

/// AI explanation of a paper or question.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,

    #[serde(rename = "keyPoints", default, deserialize_with = "null_as_default")]
    pub key_points: Vec<String>,
}

// Response envelopes. Only an explicit `success: true` counts as success.

#[derive(Debug, Deserialize)]
pub(crate) struct PapersEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub papers: Vec<Paper>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldsEnvelope {
    pub fields: Vec<Field>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub answer: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExplainEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub explanation: Option<Explanation>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileEnvelope {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BookmarksEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub bookmarks: Vec<Paper>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default, alias = "message")]
    pub error: Option<String>,
}

/// Read an explicit `null` the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifying_key_prefers_link() {
        let paper = Paper {
            link: Some("https://arxiv.org/abs/2401.00001".to_string()),
            paper_id: Some("2401.00001".to_string()),
            ..Paper::default()
        };
        assert_eq!(
            paper.identifying_key(),
            Some("https://arxiv.org/abs/2401.00001")
        );

        let paper = Paper {
            link: Some(String::new()),
            paper_id: Some("PMC123".to_string()),
            ..Paper::default()
        };
        assert_eq!(paper.identifying_key(), Some("PMC123"));

        assert_eq!(Paper::default().identifying_key(), None);
    }

    #[test]
    fn test_paper_keeps_unknown_fields() {
        let json = serde_json::json!({
            "_id": "65f0",
            "title": "Attention Is All You Need",
            "authors": ["Vaswani", "Shazeer"],
            "summary": "Transformers.",
            "link": "https://arxiv.org/abs/1706.03762",
            "source": "arXiv",
            "categories": ["cs.CL"]
        });

        let paper: Paper = serde_json::from_value(json).unwrap();
        assert_eq!(paper.record_id.as_deref(), Some("65f0"));
        assert_eq!(paper.authors.len(), 2);
        assert_eq!(paper.extra["categories"][0], "cs.CL");

        let back = serde_json::to_value(&paper).unwrap();
        assert_eq!(back["categories"][0], "cs.CL");
        assert!(back.get("paperId").is_none());
    }

    #[test]
    fn test_paper_with_null_fields() {
        let paper: Paper = serde_json::from_value(serde_json::json!({
            "title": null,
            "authors": null,
            "summary": null,
            "link": "https://arxiv.org/abs/2401.00002"
        }))
        .unwrap();
        assert_eq!(paper.title, "");
        assert!(paper.authors.is_empty());
        assert_eq!(paper.summary, "");
        assert_eq!(paper.identifying_key(), Some("https://arxiv.org/abs/2401.00002"));
    }

    #[test]
    fn test_papers_envelope_needs_success_flag() {
        let envelope: PapersEnvelope =
            serde_json::from_value(serde_json::json!({"papers": []})).unwrap();
        assert!(!envelope.success);

        let envelope: PapersEnvelope =
            serde_json::from_value(serde_json::json!({"success": true, "papers": null})).unwrap();
        assert!(envelope.success);
        assert!(envelope.papers.is_empty());
    }

    #[test]
    fn test_explain_request_shapes() {
        let req = ExplainRequest::Content {
            content: "Quantum error correction".to_string(),
            kind: ExplainKind::Query,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"content": "Quantum error correction", "type": "query"})
        );

        let req = ExplainRequest::Question {
            question: "Why does it matter?".to_string(),
            paper: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"question": "Why does it matter?"})
        );
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!("arXiv".parse::<Source>().unwrap(), Source::Arxiv);
        assert_eq!("pubmed".parse::<Source>().unwrap(), Source::Pubmed);
        assert!("scholar".parse::<Source>().is_err());
        assert_eq!(Source::default().to_string(), "all");
    }
}
