//! Landing screen: backend probe, research fields, featured papers.

use crate::api::{ApiClient, Field, SearchQuery, Source};

use super::card::PaperCard;

const FEATURED_QUERY: &str = "AI";
const FEATURED_LIMIT: u32 = 12;
const FEATURED_SHOWN: usize = 6;

#[derive(Debug, Default)]
pub struct HomeView {
    backend_up: bool,
    fields: Vec<Field>,
    featured: Vec<PaperCard>,
}

impl HomeView {
    /// Load everything the landing screen shows. Each part degrades to empty
    /// on its own.
    pub async fn load(api: &ApiClient) -> Self {
        let featured_query = SearchQuery::new(FEATURED_QUERY)
            .with_source(Source::Arxiv)
            .with_limit(FEATURED_LIMIT);

        let (health, fields, featured) =
            tokio::join!(api.health(), api.fields(), api.search(&featured_query));

        let backend_up = match health {
            Ok(body) => {
                tracing::debug!(health = %body, "Backend health");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Backend health check failed");
                false
            }
        };

        Self {
            backend_up,
            fields: fields.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Could not load fields");
                Vec::new()
            }),
            featured: featured
                .map(|papers| papers.into_iter().map(PaperCard::listing).collect())
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Could not load featured papers");
                    Vec::new()
                }),
        }
    }

    pub fn backend_up(&self) -> bool {
        self.backend_up
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Featured papers on display (the first few of those fetched).
    pub fn featured(&self) -> &[PaperCard] {
        &self.featured[..self.featured.len().min(FEATURED_SHOWN)]
    }

    pub fn featured_fetched(&self) -> usize {
        self.featured.len()
    }
}
