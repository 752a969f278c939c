use std::fmt;

use crate::article::ArticleKey;
use crate::engine::Status;

/// Unique, strictly increasing index assigned to every submitted request.
pub type CorrelationId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestKind {
    Index {
        key: ArticleKey,
        /// Seconds, taken from `Cache-Control: max-age`
        ttl: i64,
        content: Vec<u8>,
    },
    Remove {
        key: ArticleKey,
    },
    Rank {
        period: i64,
        language: String,
        category: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: CorrelationId,
    pub kind: RequestKind,
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RequestKind::Index { key, ttl, content } => write!(
                f,
                "#{} index {} (ttl {}, {} bytes)",
                self.id,
                key,
                ttl,
                content.len()
            ),
            RequestKind::Remove { key } => write!(f, "#{} remove {}", self.id, key),
            RequestKind::Rank {
                period,
                language,
                category,
            } => write!(
                f,
                "#{} rank period={} lang={} category={}",
                self.id, period, language, category
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub id: CorrelationId,
    pub status: Status,
    /// JSON for rank responses, empty otherwise
    pub body: String,
}

impl Response {
    pub fn empty(id: CorrelationId, status: Status) -> Self {
        Self {
            id,
            status,
            body: String::new(),
        }
    }
}
