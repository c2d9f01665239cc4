//! Per-conversation request serialization.
//!
//! Requests for the same conversation must not interleave between context
//! read and history write, or the context could miss the exchange being
//! written. A keyed async mutex serializes them; the key map is LRU-bounded
//! so it cannot grow without limit.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Default maximum number of tracked conversations.
const DEFAULT_MAX_CONVERSATIONS: usize = 10_000;

/// A bounded map of per-conversation locks.
pub struct ConversationLocks {
    locks: Mutex<IndexMap<String, Arc<Mutex<()>>>>,
    max_conversations: usize,
}

impl Default for ConversationLocks {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONVERSATIONS)
    }
}

impl ConversationLocks {
    pub fn new(max_conversations: usize) -> Self {
        Self {
            locks: Mutex::new(IndexMap::new()),
            max_conversations,
        }
    }

    /// Acquire the lock for a conversation, creating it on first use.
    ///
    /// Re-inserting on access keeps the map in least-recently-used order, so
    /// eviction removes the conversation idle the longest.
    pub async fn acquire(&self, conversation_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;

            let lock = match locks.shift_remove(conversation_id) {
                Some(existing) => existing,
                None => Arc::new(Mutex::new(())),
            };
            locks.insert(conversation_id.to_string(), lock.clone());

            while locks.len() > self.max_conversations {
                locks.shift_remove_index(0);
            }

            lock
        };

        lock.lock_owned().await
    }

    /// Number of tracked conversations.
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }
}
