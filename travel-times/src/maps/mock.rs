//! Mock routing client for running batches without API access.
//!
//! Loads canned Distance Matrix responses from a JSON file and serves them
//! as if they were live answers. Recent queries are recorded so tests can
//! check what would have been sent.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::{ResolvedQuery, TripOutcome};

use super::TripRouter;
use super::convert::classify_response;
use super::error::MapsError;
use super::types::DistanceMatrixResponse;

/// Queries kept in the log before the oldest are dropped.
const DEFAULT_QUERY_LOG_LIMIT: usize = 1000;

/// A canned reply for one origin/destination pair.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Serve this decoded response.
    Response(DistanceMatrixResponse),
    /// Fail as if the network request had failed.
    Failure(String),
}

/// One entry of a mock response file.
#[derive(Debug, Deserialize)]
struct MockEntry {
    origin: String,
    destination: String,
    response: Option<DistanceMatrixResponse>,
    failure: Option<String>,
}

/// Mock routing client that serves replies from memory.
///
/// Pairs without a reply fail with a transport error. Clones share
/// replies, the query log and the call counter.
#[derive(Clone)]
pub struct MockMapsClient {
    replies: Arc<RwLock<HashMap<(String, String), MockReply>>>,
    queries: Arc<RwLock<VecDeque<ResolvedQuery>>>,
    query_log_limit: usize,
    calls: Arc<AtomicUsize>,
}

impl Default for MockMapsClient {
    fn default() -> Self {
        Self {
            replies: Arc::default(),
            queries: Arc::default(),
            query_log_limit: DEFAULT_QUERY_LOG_LIMIT,
            calls: Arc::default(),
        }
    }
}

impl MockMapsClient {
    /// Create a mock with no replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` queries in the log.
    pub fn with_query_log_limit(mut self, limit: usize) -> Self {
        self.query_log_limit = limit;
        self
    }

    /// Load replies from a JSON file.
    ///
    /// The file holds an array of entries, each with `origin`,
    /// `destination` and either a `response` (a Distance Matrix response
    /// body) or a `failure` message.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MapsError> {
        let path = path.as_ref();

        let json = std::fs::read_to_string(path)
            .map_err(|e| MapsError::Config(format!("failed to read {}: {e}", path.display())))?;

        let entries: Vec<MockEntry> = serde_json::from_str(&json).map_err(|e| MapsError::Json {
            message: format!("failed to parse {}: {e}", path.display()),
            body: None,
        })?;

        let mut replies = HashMap::new();
        for entry in entries {
            let reply = match (entry.response, entry.failure) {
                (Some(response), None) => MockReply::Response(response),
                (None, Some(message)) => MockReply::Failure(message),
                _ => {
                    return Err(MapsError::Config(format!(
                        "mock entry {} -> {} needs exactly one of `response` or `failure`",
                        entry.origin, entry.destination
                    )));
                }
            };
            replies.insert((entry.origin, entry.destination), reply);
        }

        if replies.is_empty() {
            return Err(MapsError::Config(format!(
                "no mock responses found in {}",
                path.display()
            )));
        }

        Ok(Self {
            replies: Arc::new(RwLock::new(replies)),
            ..Self::default()
        })
    }

    /// Register a reply for a pair, replacing any previous one.
    pub async fn insert(
        &self,
        origin: impl Into<String>,
        destination: impl Into<String>,
        reply: MockReply,
    ) {
        self.replies
            .write()
            .await
            .insert((origin.into(), destination.into()), reply);
    }

    /// Register a raw JSON response body for a pair.
    pub async fn insert_json(
        &self,
        origin: impl Into<String>,
        destination: impl Into<String>,
        body: &str,
    ) -> Result<(), MapsError> {
        let response = serde_json::from_str(body).map_err(|e| MapsError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;
        self.insert(origin, destination, MockReply::Response(response))
            .await;
        Ok(())
    }

    /// The most recent queries, oldest first.
    pub async fn queries(&self) -> Vec<ResolvedQuery> {
        self.queries.read().await.iter().cloned().collect()
    }

    /// Number of queries received so far, including any dropped from the log.
    pub async fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MockMapsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockMapsClient").finish_non_exhaustive()
    }
}

impl TripRouter for MockMapsClient {
    async fn route(&self, query: &ResolvedQuery) -> TripOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut queries = self.queries.write().await;
            if self.query_log_limit > 0 {
                if queries.len() >= self.query_log_limit {
                    queries.pop_front();
                }
                queries.push_back(query.clone());
            }
        }

        let replies = self.replies.read().await;
        let key = (query.origin.clone(), query.destination.clone());

        match replies.get(&key) {
            Some(MockReply::Response(response)) => classify_response(response),
            Some(MockReply::Failure(message)) => TripOutcome::transport_error(message.clone()),
            None => TripOutcome::transport_error(format!(
                "no mock response for {} -> {}",
                query.origin, query.destination
            )),
        }
    }
}
