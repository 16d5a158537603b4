use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upstream returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("response decoding error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("upstream error {code}: {message}")]
    Upstream { code: String, message: String },
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("refresh task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parsing error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("topic registry must contain at least one topic")]
    Empty,
    #[error("duplicate topic id: {0}")]
    DuplicateId(String),
    #[error("topic {0} has an empty query")]
    EmptyQuery(String),
}
