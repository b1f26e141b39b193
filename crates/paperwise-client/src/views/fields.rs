//! Papers for one research field.

use crate::api::{ApiClient, Field, SearchQuery};

use super::card::PaperCard;
use super::failure_message;

const DEFAULT_DESCRIPTION: &str = "Latest research papers in this field";
const FETCH_FAILED: &str = "Failed to fetch papers";

/// Field header plus its latest papers.
#[derive(Debug)]
pub struct FieldView {
    field_id: String,
    field: Option<Field>,
    cards: Vec<PaperCard>,
    error: Option<String>,
}

impl FieldView {
    /// Fetch the field list and the field's papers side by side.
    ///
    /// A failing field list only costs the header details; failing papers
    /// leave a message.
    pub async fn load(api: &ApiClient, field_id: &str) -> Self {
        let (fields, papers) = tokio::join!(
            api.fields(),
            api.field_papers(field_id, SearchQuery::DEFAULT_LIMIT)
        );

        let field = match fields {
            Ok(fields) => fields.into_iter().find(|f| f.id == field_id),
            Err(e) => {
                tracing::debug!(error = %e, "Field list unavailable");
                None
            }
        };

        let (cards, error) = match papers {
            Ok(papers) => (papers.into_iter().map(PaperCard::listing).collect(), None),
            Err(e) => {
                tracing::warn!(field_id, error = %e, "Field papers failed");
                (Vec::new(), Some(failure_message(&e, FETCH_FAILED)))
            }
        };

        Self {
            field_id: field_id.to_string(),
            field,
            cards,
            error,
        }
    }

    pub fn field_id(&self) -> &str {
        &self.field_id
    }

    pub fn name(&self) -> &str {
        self.field
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or(self.field_id.as_str())
    }

    pub fn description(&self) -> &str {
        self.field
            .as_ref()
            .map(|f| f.description.as_str())
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION)
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
}
