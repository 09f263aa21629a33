use mockito::Matcher;
use newscanner::error::ScannerError;
use newscanner::news::remote::NewsApiClient;
use newscanner::news::{EverythingQuery, NewsProvider, SortBy, SourceQuery};

const SOURCES_BODY: &str = r#"{
    "status": "ok",
    "sources": [
        {"id": "bloomberg", "name": "Bloomberg", "description": "Business news", "url": "https://www.bloomberg.com", "category": "business", "language": "en", "country": "us"},
        {"id": "business-insider", "name": "Business Insider", "description": "", "url": "http://www.businessinsider.com", "category": "business", "language": "en", "country": "us"},
        {"id": "fortune", "name": "Fortune", "description": "", "url": "http://fortune.com", "category": "business", "language": "en", "country": "us"}
    ]
}"#;

const EVERYTHING_BODY: &str = r#"{
    "status": "ok",
    "totalResults": 2,
    "articles": [
        {
            "source": {"id": "bloomberg", "name": "Bloomberg"},
            "author": "Jane Doe",
            "title": "Tesla recalls vehicles",
            "description": "Tesla is recalling cars over a software defect.",
            "url": "https://www.bloomberg.com/tesla-recall",
            "urlToImage": "https://www.bloomberg.com/tesla.jpg",
            "publishedAt": "2024-05-01T12:34:56Z",
            "content": "Tesla Inc. is recalling..."
        },
        {
            "source": {"id": null, "name": "Fortune"},
            "author": null,
            "title": "Tesla shares slide",
            "description": null,
            "url": "http://fortune.com/tesla-shares",
            "urlToImage": null,
            "publishedAt": "2024-05-01T09:00:00Z",
            "content": null
        }
    ]
}"#;

fn everything_query(sources: Option<&str>) -> EverythingQuery {
    EverythingQuery {
        q: "tesla".to_string(),
        sources: sources.map(str::to_string),
        sort_by: SortBy::PublishedAt,
        page_size: 6,
        page: 1,
        language: "en".to_string(),
    }
}

#[tokio::test]
async fn sources_lookup_sends_filters_and_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/top-headlines/sources")
        .match_header("x-api-key", "news-key")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("category".into(), "business".into()),
            Matcher::UrlEncoded("language".into(), "en".into()),
            Matcher::UrlEncoded("country".into(), "us".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SOURCES_BODY)
        .create_async()
        .await;

    let client = NewsApiClient::new(server.url(), "news-key");
    let response = client
        .sources(&SourceQuery {
            category: "business".to_string(),
            language: "en".to_string(),
            country: "us".to_string(),
        })
        .await
        .unwrap();

    let ids: Vec<&str> = response.sources.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["bloomberg", "business-insider", "fortune"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn everything_sends_scope_and_paging() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/everything")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "tesla".into()),
            Matcher::UrlEncoded("sources".into(), "bloomberg,fortune".into()),
            Matcher::UrlEncoded("sortBy".into(), "publishedAt".into()),
            Matcher::UrlEncoded("pageSize".into(), "6".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("language".into(), "en".into()),
        ]))
        .with_status(200)
        .with_body(EVERYTHING_BODY)
        .create_async()
        .await;

    let client = NewsApiClient::new(server.url(), "news-key");
    let response = client
        .everything(&everything_query(Some("bloomberg,fortune")))
        .await
        .unwrap();

    assert_eq!(response.status, "ok");
    assert_eq!(response.total_results, 2);
    assert_eq!(response.articles.len(), 2);
    assert_eq!(response.articles[0].url_to_image.as_deref(), Some("https://www.bloomberg.com/tesla.jpg"));
    assert_eq!(response.articles[1].source.id, None);
    mock.assert_async().await;
}

#[tokio::test]
async fn unscoped_search_omits_sources_parameter() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/everything")
        .match_query(Matcher::Regex("^q=tesla&sortBy=".to_string()))
        .with_status(200)
        .with_body(EVERYTHING_BODY)
        .create_async()
        .await;

    let client = NewsApiClient::new(server.url(), "news-key");
    client.everything(&everything_query(None)).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn articles_round_trip_unmodified() {
    // Fraction digits and offsets are the provider's, not ours.
    for published_at in [
        "2024-05-01T12:34:56Z",
        "2024-02-27T17:46:56.0813288Z",
        "2024-05-01T12:34:56.000Z",
        "2024-05-01T12:34:56+00:00",
    ] {
        let body = EVERYTHING_BODY.replace("2024-05-01T12:34:56Z", published_at);
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/everything")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(&body)
            .create_async()
            .await;

        let client = NewsApiClient::new(server.url(), "news-key");
        let response = client.everything(&everything_query(None)).await.unwrap();
        assert_eq!(response.articles[0].published_at.as_str(), published_at);

        let original: serde_json::Value = serde_json::from_str(&body).unwrap();
        let reserialized = serde_json::to_value(&response).unwrap();
        assert_eq!(original, reserialized, "publishedAt {}", published_at);
    }
}

#[tokio::test]
async fn unparseable_published_at_is_malformed() {
    let body = EVERYTHING_BODY.replace("2024-05-01T12:34:56Z", "last tuesday");
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/everything")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let client = NewsApiClient::new(server.url(), "news-key");
    let err = client.everything(&everything_query(None)).await.unwrap_err();
    assert!(matches!(err, ScannerError::MalformedResponse(_)), "got {:?}", err);
}

#[tokio::test]
async fn error_statuses_are_classified() {
    for (status, kind) in [(401, "auth"), (400, "request"), (429, "throttled"), (500, "upstream")] {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/everything")
            .match_query(Matcher::Any)
            .with_status(status)
            .with_body(r#"{"status":"error","code":"someCode","message":"provider said no"}"#)
            .create_async()
            .await;

        let client = NewsApiClient::new(server.url(), "news-key");
        let err = client.everything(&everything_query(None)).await.unwrap_err();
        assert_eq!(err.kind(), kind, "status {}", status);
    }
}

#[tokio::test]
async fn ok_status_with_error_payload_is_upstream() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/top-headlines/sources")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"error","code":"unexpectedError","message":"try later"}"#)
        .create_async()
        .await;

    let client = NewsApiClient::new(server.url(), "news-key");
    let err = client
        .sources(&SourceQuery {
            category: "business".to_string(),
            language: "en".to_string(),
            country: "us".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ScannerError::Upstream("NewsAPI error unexpectedError: try later".to_string())
    );
}

#[tokio::test]
async fn schema_violations_are_malformed() {
    let mut server = mockito::Server::new_async().await;
    // Articles missing the required `title` and `url` fields.
    let _mock = server
        .mock("GET", "/everything")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"ok","totalResults":1,"articles":[{"source":{"id":null,"name":"X"}}]}"#)
        .create_async()
        .await;

    let client = NewsApiClient::new(server.url(), "news-key");
    let err = client.everything(&everything_query(None)).await.unwrap_err();
    assert!(matches!(err, ScannerError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_provider_is_upstream() {
    // Nothing listens on port 9 locally.
    let client = NewsApiClient::new("http://127.0.0.1:9", "news-key").with_timeout(5);
    let err = client.everything(&everything_query(None)).await.unwrap_err();
    assert_eq!(err.kind(), "upstream");
}
