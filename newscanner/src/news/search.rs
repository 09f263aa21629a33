use std::sync::Arc;
use tracing::{info, warn};

use super::{EverythingQuery, NewsProvider, NewsResponse, SortBy, SourceQuery};
use crate::error::{Result, ScannerError};

pub const MISSING_PARAMS: &str = "Both 'query' and 'category' parameters are required";

/// What to do when a category resolves to no sources at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyScopePolicy {
    /// Search every source (the `sources` filter is omitted).
    #[default]
    Unscoped,
    /// Fail with a validation error before searching.
    Reject,
}

/// Search knobs, resolved from configuration once at startup.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub language: String,
    pub country: String,
    pub page_size: u32,
    pub max_sources: usize,
    pub on_empty_scope: EmptyScopePolicy,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            language: common::DEFAULT_LANGUAGE.to_string(),
            country: common::DEFAULT_COUNTRY.to_string(),
            page_size: common::DEFAULT_PAGE_SIZE,
            max_sources: common::DEFAULT_MAX_SOURCES,
            on_empty_scope: EmptyScopePolicy::Unscoped,
        }
    }
}

impl From<&common::NewsConfig> for SearchSettings {
    fn from(cfg: &common::NewsConfig) -> Self {
        Self {
            language: cfg.language().to_string(),
            country: cfg.country().to_string(),
            page_size: cfg.page_size(),
            max_sources: cfg.max_sources(),
            on_empty_scope: if cfg.rejects_empty_scope() {
                EmptyScopePolicy::Reject
            } else {
                EmptyScopePolicy::Unscoped
            },
        }
    }
}

/// Resolves a category to a bounded source scope, then searches within it.
pub struct SearchOrchestrator {
    provider: Arc<dyn NewsProvider>,
    settings: SearchSettings,
}

impl SearchOrchestrator {
    pub fn new(provider: Arc<dyn NewsProvider>, settings: SearchSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub async fn search(&self, query: &str, category: &str) -> Result<NewsResponse> {
        if query.trim().is_empty() || category.trim().is_empty() {
            return Err(ScannerError::Validation(MISSING_PARAMS.to_string()));
        }

        let scope = self.resolve_scope(category).await?;

        let request = EverythingQuery {
            q: query.to_string(),
            sources: scope,
            sort_by: SortBy::PublishedAt,
            page_size: self.settings.page_size,
            page: 1,
            language: self.settings.language.clone(),
        };

        let response = self.provider.everything(&request).await?;
        info!(
            query = %query,
            category = %category,
            total_results = response.total_results,
            returned = response.articles.len(),
            "news search complete"
        );
        Ok(response)
    }

    /// Source ids for `category`, in provider order, truncated to `max_sources`
    /// and joined with commas. `None` means unscoped.
    async fn resolve_scope(&self, category: &str) -> Result<Option<String>> {
        let lookup = SourceQuery {
            category: category.to_lowercase(),
            language: self.settings.language.clone(),
            country: self.settings.country.clone(),
        };
        let catalog = self.provider.sources(&lookup).await?;

        let ids: Vec<&str> = catalog
            .sources
            .iter()
            .take(self.settings.max_sources)
            .map(|s| s.id.as_str())
            .collect();

        if ids.is_empty() {
            return match self.settings.on_empty_scope {
                EmptyScopePolicy::Unscoped => {
                    warn!(category = %lookup.category, "no sources for category; searching unscoped");
                    Ok(None)
                }
                EmptyScopePolicy::Reject => Err(ScannerError::Validation(format!(
                    "No news sources found for category '{}'",
                    category
                ))),
            };
        }

        info!(category = %lookup.category, sources = ids.len(), "resolved source scope");
        Ok(Some(ids.join(",")))
    }
}
