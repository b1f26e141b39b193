//! Paper detail with AI explanation and follow-up questions.

use serde::Serialize;

use crate::api::{ApiClient, ExplainKind, ExplainRequest, Explanation, Paper};

use super::failure_message;

/// Key points shown from an explanation.
pub const KEY_POINTS_SHOWN: usize = 6;

const EXPLAIN_FAILED: &str = "No explanation available. Please try again.";

#[derive(Serialize)]
struct PaperContent<'a> {
    title: &'a str,
    summary: &'a str,
    authors: &'a [String],
}

/// Detail screen for one paper.
///
/// Opened either with the full paper (from a card) or with only a title or
/// id to explain, when the paper itself is not at hand.
#[derive(Debug)]
pub struct PaperDetailView {
    paper: Option<Paper>,
    fallback_title: String,
    explanation: Option<Explanation>,
    error: Option<String>,
}

impl PaperDetailView {
    pub fn new(paper: Option<Paper>, fallback_title: impl Into<String>) -> Self {
        Self {
            paper,
            fallback_title: fallback_title.into(),
            explanation: None,
            error: None,
        }
    }

    pub fn for_paper(paper: Paper) -> Self {
        let title = paper.title.clone();
        Self::new(Some(paper), title)
    }

    pub fn paper(&self) -> Option<&Paper> {
        self.paper.as_ref()
    }

    pub fn title(&self) -> &str {
        self.paper
            .as_ref()
            .map(|p| p.title.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(self.fallback_title.as_str())
    }

    /// Request sent when the screen opens: the paper's title, summary and
    /// authors when a summary exists, otherwise just the title as a query.
    pub fn explain_request(&self) -> ExplainRequest {
        match &self.paper {
            Some(paper) if !paper.summary.is_empty() => {
                let content = PaperContent {
                    title: &paper.title,
                    summary: &paper.summary,
                    authors: &paper.authors,
                };
                ExplainRequest::Content {
                    // Serializing borrowed strings cannot fail
                    content: serde_json::to_string(&content).unwrap_or_default(),
                    kind: ExplainKind::Paper,
                }
            }
            _ => ExplainRequest::Content {
                content: self.title().to_string(),
                kind: ExplainKind::Query,
            },
        }
    }

    /// Fetch the initial explanation.
    pub async fn explain(&mut self, api: &ApiClient) {
        let request = self.explain_request();
        self.apply(api.explain(&request).await);
    }

    /// Ask a follow-up question about the paper. Blank questions are ignored.
    pub async fn ask(&mut self, api: &ApiClient, question: &str) -> bool {
        let question = question.trim();
        if question.is_empty() {
            return false;
        }
        let request = ExplainRequest::Question {
            question: question.to_string(),
            paper: self.paper.clone(),
        };
        self.apply(api.explain(&request).await);
        true
    }

    fn apply(&mut self, result: crate::error::Result<Explanation>) {
        match result {
            Ok(explanation) => {
                self.explanation = Some(explanation);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(title = %self.title(), error = %e, "Explanation failed");
                self.error = Some(failure_message(&e, EXPLAIN_FAILED));
            }
        }
    }

    pub fn explanation(&self) -> Option<&Explanation> {
        self.explanation.as_ref()
    }

    pub fn key_points(&self) -> &[String] {
        match &self.explanation {
            Some(e) => &e.key_points[..e.key_points.len().min(KEY_POINTS_SHOWN)],
            None => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_request_with_summary() {
        let view = PaperDetailView::for_paper(Paper {
            title: "Quantum Supremacy".to_string(),
            summary: "Sycamore processor.".to_string(),
            authors: vec!["Arute".to_string()],
            ..Paper::default()
        });

        match view.explain_request() {
            ExplainRequest::Content { content, kind } => {
                assert_eq!(kind, ExplainKind::Paper);
                let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
                assert_eq!(parsed["title"], "Quantum Supremacy");
                assert_eq!(parsed["authors"][0], "Arute");
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_explain_request_without_paper() {
        let view = PaperDetailView::new(None, "CRISPR gene editing");
        assert_eq!(view.title(), "CRISPR gene editing");
        match view.explain_request() {
            ExplainRequest::Content { content, kind } => {
                assert_eq!(kind, ExplainKind::Query);
                assert_eq!(content, "CRISPR gene editing");
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_key_points_capped() {
        let mut view = PaperDetailView::new(None, "Topic");
        assert!(view.key_points().is_empty());

        view.apply(Ok(Explanation {
            explanation: "Simple words.".to_string(),
            key_points: (1..=9).map(|i| format!("point {}", i)).collect(),
        }));
        assert_eq!(view.key_points().len(), KEY_POINTS_SHOWN);
    }

    #[test]
    fn test_failure_keeps_previous_explanation() {
        let mut view = PaperDetailView::new(None, "Topic");
        view.apply(Ok(Explanation {
            explanation: "First.".to_string(),
            key_points: vec![],
        }));
        view.apply(Err(crate::error::Error::Network("reset".to_string())));

        assert_eq!(view.explanation().unwrap().explanation, "First.");
        assert_eq!(view.error(), Some(EXPLAIN_FAILED));
    }
}
