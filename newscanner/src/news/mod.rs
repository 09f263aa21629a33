use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::Result;

pub mod remote;
pub mod search;

/// Boundary to the news-search provider (NewsAPI v2 shaped).
#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    /// Look up the source catalog filtered by category, language and country.
    async fn sources(&self, query: &SourceQuery) -> Result<SourcesResponse>;

    /// Full-text search across articles.
    async fn everything(&self, query: &EverythingQuery) -> Result<NewsResponse>;
}

/// Filters for the source catalog lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    pub category: String,
    pub language: String,
    pub country: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Relevancy,
    Popularity,
    PublishedAt,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Relevancy => "relevancy",
            SortBy::Popularity => "popularity",
            SortBy::PublishedAt => "publishedAt",
        }
    }
}

/// Parameters for the full-text search call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EverythingQuery {
    pub q: String,
    /// Comma-joined source ids; `None` searches every source.
    pub sources: Option<String>,
    pub sort_by: SortBy,
    pub page_size: u32,
    pub page: u32,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: String,
}

/// Article as returned by the provider, passed through to the client unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: PublishedAt,
    pub content: Option<String>,
}

/// RFC 3339 publication time. Checked on decode, but the provider's text is kept as-is
/// so fraction digits and offsets reach the client untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PublishedAt(String);

impl PublishedAt {
    pub fn parse(raw: impl Into<String>) -> std::result::Result<Self, chrono::ParseError> {
        let raw = raw.into();
        DateTime::parse_from_rfc3339(&raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublishedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PublishedAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub status: String,
    pub total_results: u64,
    pub articles: Vec<NewsArticle>,
}

/// One entry of the provider's source catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesResponse {
    pub status: String,
    pub sources: Vec<NewsSource>,
}
