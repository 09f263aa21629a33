use anyhow::{Context, Result};
use std::path::PathBuf;

/// Categories understood by the NewsAPI source catalog.
pub const BUILTIN_CATEGORIES: [&str; 7] = [
    "Business",
    "Entertainment",
    "General",
    "Health",
    "Science",
    "Sports",
    "Technology",
];

/// Ordered, static list of category names offered to the client.
///
/// When backed by a file the JSON array is re-read on every call, so the list can be
/// edited without a restart.
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    path: Option<PathBuf>,
}

impl CategoryCatalog {
    pub fn builtin() -> Self {
        Self { path: None }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn from_config(cfg: &common::CategoriesConfig) -> Self {
        match &cfg.path {
            Some(p) => Self::from_file(p),
            None => Self::builtin(),
        }
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        let Some(path) = &self.path else {
            return Ok(BUILTIN_CATEGORIES.iter().map(|c| c.to_string()).collect());
        };

        let data = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read categories file: {}", path.display()))?;
        let categories: Vec<String> = serde_json::from_str(&data)
            .with_context(|| format!("Categories file is not a JSON array of strings: {}", path.display()))?;
        Ok(categories)
    }
}
