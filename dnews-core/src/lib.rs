pub mod article;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod refresh;
pub mod topics;

pub use article::Article;
pub use cache::{Snapshot, SnapshotCache, TopicView};
pub use config::ServiceConfig;
pub use error::{ConfigError, FetchError, RefreshError, RegistryError};
pub use fetch::{ArticleSource, NewsApiClient};
pub use merge::merge;
pub use refresh::{spawn_refresher, FetchPlan, RefreshSummary, Refresher, RefresherHandle};
pub use topics::{TopicDescriptor, TopicRegistry};
