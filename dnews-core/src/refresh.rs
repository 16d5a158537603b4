use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::article::Article;
use crate::cache::{Snapshot, SnapshotCache};
use crate::config::ServiceConfig;
use crate::error::RefreshError;
use crate::fetch::ArticleSource;
use crate::merge::merge;
use crate::topics::TopicRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    /// Primary language first; merge order follows this list.
    pub languages: Vec<String>,
    pub page_size: u32,
}

impl Default for FetchPlan {
    fn default() -> Self {
        ServiceConfig::default().into()
    }
}

impl From<ServiceConfig> for FetchPlan {
    fn from(config: ServiceConfig) -> Self {
        Self {
            languages: config.languages,
            page_size: config.page_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub topics: usize,
    pub articles: usize,
    pub refreshed_at: DateTime<Utc>,
}

/// Runs refresh cycles: fetch every (topic, language) pair, merge per topic,
/// publish the result as one snapshot.
pub struct Refresher<S> {
    source: Arc<S>,
    topics: Arc<TopicRegistry>,
    cache: SnapshotCache,
    plan: FetchPlan,
    cycle: Arc<Mutex<()>>,
}

impl<S> Clone for Refresher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            topics: Arc::clone(&self.topics),
            cache: self.cache.clone(),
            plan: self.plan.clone(),
            cycle: Arc::clone(&self.cycle),
        }
    }
}

impl<S: ArticleSource + 'static> Refresher<S> {
    pub fn new(
        source: Arc<S>,
        topics: Arc<TopicRegistry>,
        cache: SnapshotCache,
        plan: FetchPlan,
    ) -> Self {
        Self {
            source,
            topics,
            cache,
            plan,
            cycle: Arc::new(Mutex::new(())),
        }
    }

    /// One full cycle. Concurrent calls are serialized; the cache only changes
    /// once every topic has been fetched and merged.
    pub async fn refresh_once(&self) -> RefreshSummary {
        let _cycle = self.cycle.lock().await;

        let requests = self.topics.iter().flat_map(|topic| {
            self.plan.languages.iter().map(move |language| {
                let source = Arc::clone(&self.source);
                let page_size = self.plan.page_size;
                async move {
                    let articles = source.fetch(&topic.query, language, page_size).await;
                    debug!(
                        topic = %topic.id,
                        language = %language,
                        count = articles.len(),
                        "fetched"
                    );
                    (topic.id.as_str(), articles)
                }
            })
        });

        let mut per_topic: HashMap<&str, Vec<Vec<Article>>> = HashMap::new();
        for (topic, articles) in join_all(requests).await {
            per_topic.entry(topic).or_default().push(articles);
        }

        let merged: HashMap<String, Vec<Article>> = per_topic
            .into_iter()
            .map(|(topic, lists)| {
                let articles = merge(lists);
                let newest = articles.first();
                debug!(
                    topic,
                    count = articles.len(),
                    newest_at = ?newest.and_then(Article::published_at),
                    newest_title = newest.and_then(Article::title).unwrap_or_default(),
                    "merged"
                );
                (topic.to_owned(), articles)
            })
            .collect();

        let refreshed_at = Utc::now();
        let snapshot = Snapshot::new(&self.topics, merged, refreshed_at);
        let summary = RefreshSummary {
            topics: snapshot.topic_count(),
            articles: snapshot.total_articles(),
            refreshed_at,
        };
        self.cache.publish(snapshot).await;
        summary
    }

    /// Runs [`Self::refresh_once`] in its own task so that a failing cycle is
    /// reported instead of unwinding into the caller. The previously published
    /// snapshot stays in place on failure.
    pub async fn run_cycle(&self) -> Result<RefreshSummary, RefreshError> {
        let this = self.clone();
        let summary = tokio::spawn(async move { this.refresh_once().await }).await?;
        info!(
            topics = summary.topics,
            articles = summary.articles,
            refreshed_at = %summary.refreshed_at,
            "refresh cycle complete"
        );
        Ok(summary)
    }
}

#[must_use = "dropping the handle stops the refresh loop"]
pub struct RefresherHandle {
    cancel_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl RefresherHandle {
    pub async fn stop(self) -> Result<(), RefreshError> {
        let _ = self.cancel_tx.send(());
        self.join.await.map_err(RefreshError::from)
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Spawns the periodic refresh loop.
///
/// The first cycle runs one `interval` after spawning; callers wanting data at
/// startup run [`Refresher::run_cycle`] themselves first.
///
/// The loop lives as long as the returned handle: dropping it closes the
/// shutdown channel and the loop exits after its current cycle.
pub fn spawn_refresher<S: ArticleSource + 'static>(
    refresher: Refresher<S>,
    interval: Duration,
) -> RefresherHandle {
    let (cancel_tx, mut cancel_rx) = broadcast::channel(1);
    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel_rx.recv() => {
                    info!("refresher shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(err) = refresher.run_cycle().await {
                        warn!(error = %err, "refresh cycle failed, keeping previous snapshot");
                    }
                }
            }
        }
    });

    RefresherHandle { cancel_tx, join }
}
