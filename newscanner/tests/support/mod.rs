#![allow(dead_code)]
// In-process providers that record every call, for pipeline and route tests.

use std::sync::Mutex;

use newscanner::error::{Result, ScannerError};
use newscanner::llm::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};
use newscanner::news::{
    ArticleSource, EverythingQuery, NewsArticle, NewsProvider, NewsResponse, NewsSource,
    PublishedAt, SourceQuery, SourcesResponse,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsCall {
    Sources(SourceQuery),
    Everything(EverythingQuery),
}

pub struct FakeNews {
    pub sources: Result<SourcesResponse>,
    pub articles: Result<NewsResponse>,
    pub calls: Mutex<Vec<NewsCall>>,
}

impl FakeNews {
    pub fn new(source_ids: &[&str], article_count: usize) -> Self {
        Self {
            sources: Ok(sources_response(source_ids)),
            articles: Ok(news_response(article_count)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_sources(err: ScannerError) -> Self {
        Self {
            sources: Err(err),
            ..Self::new(&[], 0)
        }
    }

    pub fn failing_search(source_ids: &[&str], err: ScannerError) -> Self {
        Self {
            articles: Err(err),
            ..Self::new(source_ids, 0)
        }
    }

    pub fn calls(&self) -> Vec<NewsCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn everything_calls(&self) -> Vec<EverythingQuery> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                NewsCall::Everything(q) => Some(q),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl NewsProvider for FakeNews {
    async fn sources(&self, query: &SourceQuery) -> Result<SourcesResponse> {
        self.calls.lock().unwrap().push(NewsCall::Sources(query.clone()));
        self.sources.clone()
    }

    async fn everything(&self, query: &EverythingQuery) -> Result<NewsResponse> {
        self.calls.lock().unwrap().push(NewsCall::Everything(query.clone()));
        self.articles.clone()
    }
}

pub struct FakeLlm {
    pub reply: Result<String>,
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl FakeLlm {
    pub fn replying(content: &str) -> Self {
        Self {
            reply: Ok(content.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: ScannerError) -> Self {
        Self {
            reply: Err(err),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmProvider for FakeLlm {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().unwrap().push(request);
        let content = self.reply.clone()?;
        Ok(LlmResponse {
            content,
            usage: UsageMetadata::default(),
            model: "fake-model".to_string(),
        })
    }
}

pub fn sources_response(ids: &[&str]) -> SourcesResponse {
    SourcesResponse {
        status: "ok".to_string(),
        sources: ids
            .iter()
            .map(|id| NewsSource {
                id: id.to_string(),
                name: id.to_uppercase(),
                description: None,
                url: None,
                category: Some("business".to_string()),
                language: Some("en".to_string()),
                country: Some("us".to_string()),
            })
            .collect(),
    }
}

pub fn article(n: usize) -> NewsArticle {
    NewsArticle {
        source: ArticleSource {
            id: Some("bloomberg".to_string()),
            name: "Bloomberg".to_string(),
        },
        author: if n % 2 == 0 { Some(format!("Author {}", n)) } else { None },
        title: format!("Tesla headline {}", n),
        description: Some(format!("Description {}", n)),
        url: format!("https://example.com/articles/{}", n),
        url_to_image: None,
        published_at: PublishedAt::parse(format!("2024-05-01T12:{:02}:00Z", n % 60)).unwrap(),
        content: Some(format!("Content {}", n)),
    }
}

pub fn news_response(count: usize) -> NewsResponse {
    NewsResponse {
        status: "ok".to_string(),
        total_results: count as u64,
        articles: (0..count).map(article).collect(),
    }
}
