use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use dnews_core::{Article, Snapshot, SnapshotCache, TopicRegistry};
use dnews_server::{build_router, AppState};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct TestServer {
    addr: SocketAddr,
    cache: SnapshotCache,
    topics: Arc<TopicRegistry>,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        let cache = SnapshotCache::new();
        let topics = Arc::new(TopicRegistry::builtin());
        let app = build_router(AppState {
            cache: cache.clone(),
            topics: topics.clone(),
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            cache,
            topics,
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, path_and_query: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(format!("http://{}{}", self.addr, path_and_query))
            .send()
            .await
            .unwrap();
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn populate(&self, topic: &str, count: usize) -> chrono::DateTime<Utc> {
        let articles: Vec<Article> = (0..count)
            .map(|i| {
                Article::from_value(json!({
                    "title": format!("{topic} #{i}"),
                    "url": format!("https://news/{topic}/{i}")
                }))
                .unwrap()
            })
            .collect();
        let mut map = HashMap::new();
        map.insert(topic.to_owned(), articles);
        let at = Utc::now();
        self.cache
            .publish(Snapshot::new(&self.topics, map, at))
            .await;
        at
    }
}

#[tokio::test]
async fn empty_cache_reports_null_timestamp_everywhere() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "last_updated": null}));

    let (status, body) = server.get("/articles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"], "policy");
    assert!(body["last_updated"].is_null());
    assert_eq!(body["count"], 0);
    assert_eq!(body["articles"], json!([]));
}

#[tokio::test]
async fn limit_truncates_cached_articles() {
    let server = TestServer::start().await;
    server.populate("metals", 10).await;

    let (status, body) = server.get("/articles?topic=metals&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let articles = body["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0]["title"], "metals #0");
    assert_eq!(articles[1]["url"], "https://news/metals/1");

    let (_, body) = server.get("/articles?topic=metals&limit=0").await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn default_limit_is_thirty() {
    let server = TestServer::start().await;
    server.populate("policy", 45).await;

    let (_, body) = server.get("/articles").await;
    assert_eq!(body["count"], 30);
    assert_eq!(body["articles"].as_array().unwrap().len(), 30);

    let (_, body) = server.get("/articles?topic=policy&limit=100").await;
    assert_eq!(body["count"], 45);
}

#[tokio::test]
async fn unknown_topic_is_rejected() {
    let server = TestServer::start().await;
    server.populate("policy", 3).await;

    let (status, body) = server.get("/articles?topic=crypto").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("crypto"));
    assert!(detail.contains("policy, fx, metals, investment, vietnam"));
}

#[tokio::test]
async fn malformed_limit_is_a_client_error() {
    let server = TestServer::start().await;
    for query in ["limit=-1", "limit=many", "topic=fx&limit=2.5"] {
        let (status, body) = server.get(&format!("/articles?{query}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Invalid limit"), "{detail}");
    }
}

#[tokio::test]
async fn responses_share_the_snapshot_timestamp() {
    let server = TestServer::start().await;
    let at = server.populate("fx", 1).await;

    let (_, health) = server.get("/health").await;
    let (_, fx) = server.get("/articles?topic=fx").await;
    let (_, vietnam) = server.get("/articles?topic=vietnam").await;

    let expected = serde_json::to_value(at).unwrap();
    assert_eq!(health["last_updated"], expected);
    assert_eq!(fx["last_updated"], expected);
    assert_eq!(vietnam["last_updated"], expected);
    assert_eq!(vietnam["count"], 0);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let server = TestServer::start().await;
    let response = server
        .client
        .get(format!("http://{}/health", server.addr))
        .header("Origin", "http://dashboard.example")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn articles_keep_upstream_field_order() {
    let server = TestServer::start().await;
    let raw = r#"{"url":"https://news/z","title":"Z","author":"a","content":null}"#;
    let article: Article = serde_json::from_str(raw).unwrap();
    let mut map = HashMap::new();
    map.insert("fx".to_owned(), vec![article]);
    server
        .cache
        .publish(Snapshot::new(&server.topics, map, Utc::now()))
        .await;

    let body = server
        .client
        .get(format!("http://{}/articles?topic=fx", server.addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains(&format!(r#""articles":[{raw}]"#)), "{body}");
}
