use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{EverythingQuery, NewsProvider, NewsResponse, SourceQuery, SourcesResponse};
use crate::error::{Result, ScannerError};

const PROVIDER: &str = "NewsAPI";

/// NewsAPI v2 client. One instance is built by the composition root and shared.
pub struct NewsApiClient {
    base_url: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl NewsApiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(15),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self
    }

    fn endpoint(&self, path: &str) -> Result<url::Url> {
        let raw = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        url::Url::parse(&raw)
            .map_err(|e| ScannerError::Upstream(format!("{}: invalid endpoint {}: {}", PROVIDER, raw, e)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(endpoint = %url, params = params.len(), "newsapi request");

        let exchange = async {
            let response = self
                .client
                .get(url)
                .header("X-Api-Key", &self.api_key)
                .query(params)
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };
        let (status, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ScannerError::Upstream(format!("{} request timed out", PROVIDER)))?
            .map_err(|e| ScannerError::transport(PROVIDER, e))?;

        if !status.is_success() {
            return Err(ScannerError::from_status(
                PROVIDER,
                status.as_u16(),
                &error_message(&body),
            ));
        }

        // A 200 can still carry {"status": "error"}.
        if let Ok(err) = serde_json::from_str::<ApiErrorBody>(&body) {
            if err.status == "error" {
                return Err(ScannerError::Upstream(format!(
                    "{} error {}: {}",
                    PROVIDER,
                    err.code.unwrap_or_default(),
                    err.message.unwrap_or_default()
                )));
            }
        }

        serde_json::from_str(&body).map_err(|e| {
            ScannerError::MalformedResponse(format!(
                "{} returned an unexpected payload for {}: {}",
                PROVIDER, path, e
            ))
        })
    }
}

#[async_trait::async_trait]
impl NewsProvider for NewsApiClient {
    async fn sources(&self, query: &SourceQuery) -> Result<SourcesResponse> {
        let params = [
            ("category", query.category.clone()),
            ("language", query.language.clone()),
            ("country", query.country.clone()),
        ];
        self.get_json("top-headlines/sources", &params).await
    }

    async fn everything(&self, query: &EverythingQuery) -> Result<NewsResponse> {
        let mut params = vec![("q", query.q.clone())];
        if let Some(sources) = &query.sources {
            params.push(("sources", sources.clone()));
        }
        params.extend([
            ("sortBy", query.sort_by.as_str().to_string()),
            ("pageSize", query.page_size.to_string()),
            ("page", query.page.to_string()),
            ("language", query.language.clone()),
        ]);
        self.get_json("everything", &params).await
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Prefer the provider's `message` field over the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.to_string())
}
