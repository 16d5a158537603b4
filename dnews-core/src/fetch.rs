use async_trait::async_trait;
use reqwest::{redirect, Client, ClientBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::article::Article;
use crate::config::ServiceConfig;
use crate::error::FetchError;

const USER_AGENT: &str = concat!("dnews/", env!("CARGO_PKG_VERSION"));

/// Something that can return the newest articles for a query in one language.
///
/// Implementations absorb their own failures: an unreachable or misbehaving
/// upstream yields an empty list, never an error.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self, query: &str, language: &str, page_size: u32) -> Vec<Article>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Value>,
}

/// Client for the upstream `everything` search endpoint.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .redirect(redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// The client's own timeout bounds every request.
    pub fn with_client(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub async fn try_fetch(
        &self,
        query: &str,
        language: &str,
        page_size: u32,
    ) -> Result<Vec<Article>, FetchError> {
        let page_size = page_size.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("language", language),
                ("pageSize", page_size.as_str()),
                ("sortBy", "publishedAt"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<SearchResponse>(&bytes)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_owned());
            return Err(FetchError::Status { status, message });
        }

        let body: SearchResponse = serde_json::from_slice(&bytes)?;
        if body.status.as_deref() == Some("error") {
            return Err(FetchError::Upstream {
                code: body.code.unwrap_or_default(),
                message: body.message.unwrap_or_default(),
            });
        }

        let total = body.articles.len();
        let articles: Vec<Article> = body
            .articles
            .into_iter()
            .filter_map(Article::from_value)
            .collect();
        if articles.len() < total {
            debug!(
                skipped = total - articles.len(),
                "dropped non-object article records"
            );
        }
        Ok(articles)
    }
}

#[async_trait]
impl ArticleSource for NewsApiClient {
    async fn fetch(&self, query: &str, language: &str, page_size: u32) -> Vec<Article> {
        if self.api_key.is_empty() {
            debug!(language, "no API key configured, skipping fetch");
            return Vec::new();
        }
        if query.trim().is_empty() || page_size == 0 {
            debug!(
                language,
                page_size,
                "empty query or page size, skipping fetch"
            );
            return Vec::new();
        }

        match self.try_fetch(query, language, page_size).await {
            Ok(articles) => articles,
            Err(err) => {
                warn!(language, error = %err, "failed to fetch articles");
                Vec::new()
            }
        }
    }
}
