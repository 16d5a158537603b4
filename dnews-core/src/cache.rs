use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::article::Article;
use crate::topics::TopicRegistry;

/// Complete cache state for every topic at one point in time.
///
/// Holds either no topics at all (before the first refresh) or every topic of
/// the registry it was built against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    articles: HashMap<String, Vec<Article>>,
    last_updated: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Topics missing from `articles` get an empty list; ids unknown to the
    /// registry are discarded.
    pub fn new(
        registry: &TopicRegistry,
        mut articles: HashMap<String, Vec<Article>>,
        last_updated: DateTime<Utc>,
    ) -> Self {
        let articles = registry
            .ids()
            .map(|id| (id.to_owned(), articles.remove(id).unwrap_or_default()))
            .collect();
        Self {
            articles,
            last_updated: Some(last_updated),
        }
    }

    /// Articles cached for `topic_id`; empty for a topic with no data yet.
    pub fn articles(&self, topic_id: &str) -> &[Article] {
        self.articles
            .get(topic_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn topic_count(&self) -> usize {
        self.articles.len()
    }

    pub fn total_articles(&self) -> usize {
        self.articles.values().map(Vec::len).sum()
    }

    pub fn is_populated(&self) -> bool {
        self.last_updated.is_some()
    }
}

/// One topic's articles together with the timestamp of the snapshot they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicView {
    pub articles: Vec<Article>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Shared handle on the latest published [`Snapshot`].
///
/// The lock guards only the `Arc` pointer: `publish` swaps in a fully built
/// snapshot and readers clone the pointer, so nobody ever sees a partially
/// updated mapping.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        let mut current = self.inner.write().await;
        *current = snapshot;
    }

    pub async fn current(&self) -> Arc<Snapshot> {
        self.inner.read().await.clone()
    }

    /// Callers validate `topic_id` against the registry first.
    pub async fn read(&self, topic_id: &str) -> TopicView {
        let snapshot = self.current().await;
        TopicView {
            articles: snapshot.articles(topic_id).to_vec(),
            last_updated: snapshot.last_updated(),
        }
    }

    pub async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.current().await.last_updated()
    }
}
