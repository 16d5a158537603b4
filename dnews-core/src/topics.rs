use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TopicDescriptor {
    pub id: String,
    pub query: String,
}

impl TopicDescriptor {
    pub fn new(id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            query: query.into(),
        }
    }
}

const BUILTIN_TOPICS: &[(&str, &str)] = &[
    (
        "policy",
        "Fed OR Federal Reserve OR ECB OR European Central Bank OR \"State Bank of Vietnam\" OR SBV OR \"interest rate\" OR \"rate hike\" OR \"rate cut\" OR monetary policy",
    ),
    (
        "fx",
        "exchange rate OR USD OR EUR OR currency OR \"tỷ giá\" OR forex",
    ),
    (
        "metals",
        "gold OR silver OR vàng OR bạc OR \"giá vàng\" OR \"giá bạc\" OR platinum",
    ),
    (
        "investment",
        "FDI OR ODA OR \"foreign direct investment\" OR investment OR \"đầu tư nước ngoài\" OR trade OR tariff OR tax",
    ),
    (
        "vietnam",
        "Vietnam OR Vietnam economy OR SBV OR \"Ngân hàng Nhà nước\" OR \"tỷ giá\" OR Cafef OR Vietstock OR VnEconomy OR chính sách",
    ),
];

/// Fixed mapping from topic id to upstream search expression.
///
/// Built once at startup and never mutated afterwards; share it behind an `Arc`.
/// Iteration follows declaration order and the first topic is the default one
/// served when a client does not name a topic.
#[derive(Debug, Clone)]
pub struct TopicRegistry {
    topics: Vec<TopicDescriptor>,
}

impl TopicRegistry {
    pub fn new(topics: Vec<TopicDescriptor>) -> Result<Self, RegistryError> {
        if topics.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut ids = HashSet::new();
        for topic in &topics {
            if topic.query.trim().is_empty() {
                return Err(RegistryError::EmptyQuery(topic.id.clone()));
            }
            if !ids.insert(topic.id.as_str()) {
                return Err(RegistryError::DuplicateId(topic.id.clone()));
            }
        }
        Ok(Self { topics })
    }

    /// Topics of the reference deployment.
    pub fn builtin() -> Self {
        Self {
            topics: BUILTIN_TOPICS
                .iter()
                .map(|(id, query)| TopicDescriptor::new(*id, *query))
                .collect(),
        }
    }

    pub fn query_for(&self, topic_id: &str) -> Option<&str> {
        self.topics
            .iter()
            .find(|topic| topic.id == topic_id)
            .map(|topic| topic.query.as_str())
    }

    pub fn contains(&self, topic_id: &str) -> bool {
        self.query_for(topic_id).is_some()
    }

    pub fn default_topic(&self) -> &str {
        // `new` and `builtin` both guarantee at least one topic.
        &self.topics[0].id
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|topic| topic.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicDescriptor> {
        self.topics.iter()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
