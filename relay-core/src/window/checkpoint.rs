//! Checkpoint Store (C19): a bounded LRU of message-array snapshots for
//! pre-compression rollback.

use relay_protocol::Checkpoint;
use relay_protocol::ContextMessage;
use std::num::NonZeroUsize;
use std::sync::Arc;
use uuid::Uuid;

/// Bounded `id -> Checkpoint` store, evicting least-recently-read entries
/// once `capacity` is exceeded.
pub struct CheckpointStore {
    entries: lru::LruCache<String, Checkpoint>,
}

impl CheckpointStore {
    /// `capacity` is clamped to at least 1; the spec's default is 5.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: lru::LruCache::new(capacity),
        }
    }

    /// Snapshots `messages` under a freshly generated id. `messages` is
    /// shared by reference count, not deep-copied; callers must not mutate
    /// the blocks inside a checkpointed `ContextMessage` in place.
    pub fn create(&mut self, messages: Arc<Vec<ContextMessage>>, label: Option<String>, now_ms: i64) -> String {
        let id = Uuid::new_v4().to_string();
        self.entries.put(
            id.clone(),
            Checkpoint {
                id: id.clone(),
                label,
                created_at: now_ms,
                messages,
            },
        );
        id
    }

    /// Returns the stored messages for `id`, marking it most-recently-used;
    /// `None` when absent or evicted (the caller maps this to
    /// `RESOURCE_NOT_FOUND`).
    pub fn rollback(&mut self, id: &str) -> Option<Arc<Vec<ContextMessage>>> {
        self.entries.get(id).map(|checkpoint| checkpoint.messages.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_protocol::MessageContent;
    use relay_protocol::Role;

    fn messages() -> Arc<Vec<ContextMessage>> {
        Arc::new(vec![ContextMessage::new(
            "m0",
            Role::User,
            MessageContent::Text("hi".to_string()),
        )])
    }

    #[test]
    fn create_then_rollback_returns_the_snapshot() {
        let mut store = CheckpointStore::new(5);
        let id = store.create(messages(), Some("before compaction".to_string()), 1000);
        let rolled_back = store.rollback(&id).unwrap();
        assert_eq!(rolled_back.len(), 1);
    }

    #[test]
    fn missing_id_returns_none() {
        let mut store = CheckpointStore::new(5);
        assert!(store.rollback("nonexistent").is_none());
    }

    #[test]
    fn eviction_drops_least_recently_read_entry() {
        let mut store = CheckpointStore::new(2);
        let id1 = store.create(messages(), None, 1);
        let id2 = store.create(messages(), None, 2);
        // touch id1 so id2 becomes the least-recently-used entry.
        store.rollback(&id1);
        let id3 = store.create(messages(), None, 3);
        assert!(store.rollback(&id2).is_none());
        assert!(store.rollback(&id1).is_some());
        assert!(store.rollback(&id3).is_some());
    }
}
