//! Recent single-post generations, newest first.
//!
//! The store is the only shared mutable state in the service. It sits behind
//! a trait so a persistent backend can replace the in-memory one.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{GenerationResult, LengthBucket};

/// Entries kept by the in-memory store.
pub const HISTORY_CAPACITY: usize = 5;

/// What the caller asked for, kept alongside the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryInputs {
    /// Fully composed base prompt sent to generation.
    pub prompt: String,
    pub topic: Option<String>,
    pub custom_prompt: Option<String>,
    pub length: LengthBucket,
    pub language: String,
    pub tone: String,
    pub used_document: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub result: GenerationResult,
    pub inputs: HistoryInputs,
}

impl HistoryEntry {
    pub fn new(result: GenerationResult, inputs: HistoryInputs) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            result,
            inputs,
        }
    }
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn push(&self, entry: HistoryEntry);

    /// Newest first.
    async fn list(&self) -> Vec<HistoryEntry>;

    async fn clear(&self);
}

pub struct InMemoryHistory {
    entries: RwLock<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl InMemoryHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    async fn push(&self, entry: HistoryEntry) {
        let mut entries = self.entries.write().await;
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    async fn list(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(post: &str) -> HistoryEntry {
        HistoryEntry::new(
            GenerationResult {
                post_text: post.to_string(),
                hashtags: vec![],
                engagement_score: 0.0,
                variant_label: "Professional".to_string(),
                failed: false,
                error_detail: None,
            },
            HistoryInputs {
                prompt: format!("Generate a LinkedIn post about {post}."),
                topic: Some(post.to_string()),
                custom_prompt: None,
                length: LengthBucket::Medium,
                language: "English".to_string(),
                tone: "professional".to_string(),
                used_document: false,
            },
        )
    }

    #[tokio::test]
    async fn test_newest_first() {
        let store = InMemoryHistory::default();
        store.push(entry("one")).await;
        store.push(entry("two")).await;

        let posts: Vec<String> = store
            .list()
            .await
            .into_iter()
            .map(|e| e.result.post_text)
            .collect();
        assert_eq!(posts, vec!["two", "one"]);
    }

    #[tokio::test]
    async fn test_capacity_drops_oldest() {
        let store = InMemoryHistory::default();
        for i in 0..7 {
            store.push(entry(&format!("post {i}"))).await;
        }

        let listed = store.list().await;
        assert_eq!(listed.len(), HISTORY_CAPACITY);
        assert_eq!(listed[0].result.post_text, "post 6");
        assert_eq!(listed[HISTORY_CAPACITY - 1].result.post_text, "post 2");
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryHistory::default();
        store.push(entry("one")).await;
        store.clear().await;
        assert!(store.list().await.is_empty());
    }
}
