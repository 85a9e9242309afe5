//! Play queue seen through the orchestrator

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::types::QueueEntry;

/// Ordered play queue with a cursor on the current entry.
///
/// The queue is owned outside the player; the player only reads entries and
/// moves the cursor.
#[async_trait]
pub trait PlayQueue: Send + Sync {
    async fn entries(&self) -> Vec<QueueEntry>;
    async fn current_index(&self) -> usize;
    async fn set_current_index(&self, index: usize);
}

/// In-process queue
#[derive(Clone, Default)]
pub struct MemoryQueue {
    entries: Arc<RwLock<Vec<QueueEntry>>>,
    current: Arc<RwLock<usize>>,
}

impl MemoryQueue {
    pub fn new(entries: Vec<QueueEntry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
            current: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn current(&self) -> Option<QueueEntry> {
        let index = *self.current.read().await;
        self.entries.read().await.get(index).cloned()
    }
}

#[async_trait]
impl PlayQueue for MemoryQueue {
    async fn entries(&self) -> Vec<QueueEntry> {
        self.entries.read().await.clone()
    }

    async fn current_index(&self) -> usize {
        *self.current.read().await
    }

    async fn set_current_index(&self, index: usize) {
        *self.current.write().await = index;
    }
}
