use std::collections::HashMap;
use std::sync::Arc;

use crate::config::PersistMode;
use crate::constants::RELATION_STORE_NAME;
use crate::events::{EventBus, StoreEvent};
use crate::models::relations::{insert_unique, remove_value};
use crate::models::UserRelations;
use crate::persistence::{load_snapshot, SnapshotStorage, SnapshotWriter};

/// Per-user bookmark and favorite sets.
///
/// All operations are total: unknown users read as empty, and adding or
/// removing an entry that is already in the requested state is a no-op that
/// neither persists nor publishes.
pub struct VideoRelationStore {
    relations: HashMap<String, UserRelations>,
    writer: SnapshotWriter,
    bus: Arc<EventBus>,
}

impl VideoRelationStore {
    /// Rehydrate from `storage`, starting empty if the snapshot is unusable.
    pub fn open(storage: Arc<dyn SnapshotStorage>, mode: PersistMode, bus: Arc<EventBus>) -> Self {
        let mut relations: HashMap<String, UserRelations> =
            load_snapshot(storage.as_ref(), RELATION_STORE_NAME);
        for user_relations in relations.values_mut() {
            user_relations.dedup();
        }
        tracing::debug!(users = relations.len(), "video relation store loaded");

        Self {
            relations,
            writer: SnapshotWriter::new(storage, RELATION_STORE_NAME, mode),
            bus,
        }
    }

    // ===== Queries =====

    pub fn get_bookmarks(&self, user_id: &str) -> &[String] {
        self.relations
            .get(user_id)
            .map(|r| r.bookmarks.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_favorites(&self, user_id: &str) -> &[String] {
        self.relations
            .get(user_id)
            .map(|r| r.favorites.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_bookmarked(&self, user_id: &str, video_id: &str) -> bool {
        self.relations
            .get(user_id)
            .is_some_and(|r| r.is_bookmarked(video_id))
    }

    pub fn is_favorite(&self, user_id: &str, video_id: &str) -> bool {
        self.relations
            .get(user_id)
            .is_some_and(|r| r.is_favorite(video_id))
    }

    pub fn persistence_degraded(&self) -> bool {
        self.writer.is_degraded()
    }

    // ===== Mutations =====
    // Each returns whether the user's set changed.

    pub fn add_bookmark(&mut self, user_id: &str, video_id: &str) -> bool {
        let relations = self.relations.entry(user_id.to_string()).or_default();
        if !insert_unique(&mut relations.bookmarks, video_id) {
            return false;
        }
        self.commit(StoreEvent::BookmarksChanged {
            user_id: user_id.to_string(),
        });
        true
    }

    pub fn remove_bookmark(&mut self, user_id: &str, video_id: &str) -> bool {
        let Some(relations) = self.relations.get_mut(user_id) else {
            return false;
        };
        if !remove_value(&mut relations.bookmarks, video_id) {
            return false;
        }
        self.commit(StoreEvent::BookmarksChanged {
            user_id: user_id.to_string(),
        });
        true
    }

    pub fn add_favorite(&mut self, user_id: &str, video_id: &str) -> bool {
        let relations = self.relations.entry(user_id.to_string()).or_default();
        if !insert_unique(&mut relations.favorites, video_id) {
            return false;
        }
        self.commit(StoreEvent::FavoritesChanged {
            user_id: user_id.to_string(),
        });
        true
    }

    pub fn remove_favorite(&mut self, user_id: &str, video_id: &str) -> bool {
        let Some(relations) = self.relations.get_mut(user_id) else {
            return false;
        };
        if !remove_value(&mut relations.favorites, video_id) {
            return false;
        }
        self.commit(StoreEvent::FavoritesChanged {
            user_id: user_id.to_string(),
        });
        true
    }

    /// Bookmark if absent, unbookmark if present. Returns the new membership.
    pub fn toggle_bookmark(&mut self, user_id: &str, video_id: &str) -> bool {
        if self.is_bookmarked(user_id, video_id) {
            self.remove_bookmark(user_id, video_id);
            false
        } else {
            self.add_bookmark(user_id, video_id);
            true
        }
    }

    /// Favorite if absent, unfavorite if present. Returns the new membership.
    pub fn toggle_favorite(&mut self, user_id: &str, video_id: &str) -> bool {
        if self.is_favorite(user_id, video_id) {
            self.remove_favorite(user_id, video_id);
            false
        } else {
            self.add_favorite(user_id, video_id);
            true
        }
    }

    /// Drop the user's record without publishing; the caller announces it.
    pub(crate) fn take_user(&mut self, user_id: &str) -> Option<UserRelations> {
        let removed = self.relations.remove(user_id)?;
        self.writer.record(&self.relations);
        Some(removed)
    }

    pub fn flush(&mut self) {
        self.writer.flush(&self.relations);
    }

    fn commit(&mut self, event: StoreEvent) {
        self.writer.record(&self.relations);
        self.bus.publish(&event);
    }
}

impl Drop for VideoRelationStore {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::tests::FailingStorage;
    use crate::persistence::MemorySnapshotStorage;
    use parking_lot::Mutex;

    fn store() -> VideoRelationStore {
        VideoRelationStore::open(
            Arc::new(MemorySnapshotStorage::new()),
            PersistMode::Immediate,
            Arc::new(EventBus::new()),
        )
    }

    #[test]
    fn test_add_bookmark_is_idempotent() {
        let mut store = store();
        assert!(store.add_bookmark("u1", "v1"));
        assert!(!store.add_bookmark("u1", "v1"));
        assert!(!store.add_bookmark("u1", "v1"));

        assert_eq!(store.get_bookmarks("u1"), ["v1"]);
    }

    #[test]
    fn test_remove_bookmark_twice_is_noop() {
        let mut store = store();
        store.add_bookmark("u1", "v1");
        assert!(store.remove_bookmark("u1", "v1"));
        assert!(!store.remove_bookmark("u1", "v1"));

        assert!(store.get_bookmarks("u1").is_empty());
    }

    #[test]
    fn test_remove_for_unknown_user_is_noop() {
        let mut store = store();
        assert!(!store.remove_bookmark("ghost", "v1"));
        assert!(!store.remove_favorite("ghost", "v1"));
        assert!(store.get_bookmarks("ghost").is_empty());
    }

    #[test]
    fn test_bookmarks_and_favorites_are_independent() {
        let mut store = store();
        store.add_favorite("u1", "v1");

        assert!(store.get_bookmarks("u1").is_empty());
        assert_eq!(store.get_favorites("u1"), ["v1"]);
        assert!(store.is_favorite("u1", "v1"));
        assert!(!store.is_bookmarked("u1", "v1"));
    }

    #[test]
    fn test_users_are_partitioned() {
        let mut store = store();
        store.add_bookmark("u1", "v1");

        assert!(store.get_bookmarks("u2").is_empty());
        assert!(!store.is_bookmarked("u2", "v1"));
    }

    #[test]
    fn test_empty_user_key_is_just_another_partition() {
        let mut store = store();
        store.add_bookmark("", "v1");

        assert_eq!(store.get_bookmarks(""), ["v1"]);
        assert!(store.get_bookmarks("u1").is_empty());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut store = store();
        store.add_bookmark("u1", "v2");
        store.add_bookmark("u1", "v1");
        store.add_bookmark("u1", "v3");
        store.remove_bookmark("u1", "v1");

        assert_eq!(store.get_bookmarks("u1"), ["v2", "v3"]);
    }

    #[test]
    fn test_toggle() {
        let mut store = store();
        assert!(store.toggle_bookmark("u1", "v1"));
        assert!(store.is_bookmarked("u1", "v1"));
        assert!(!store.toggle_bookmark("u1", "v1"));
        assert!(!store.is_bookmarked("u1", "v1"));

        assert!(store.toggle_favorite("u1", "v1"));
        assert!(!store.toggle_favorite("u1", "v1"));
        assert!(store.get_favorites("u1").is_empty());
    }

    #[test]
    fn test_events_published_only_on_change() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(move |e: &StoreEvent| sink.lock().push(e.clone()));

        let mut store = VideoRelationStore::open(
            Arc::new(MemorySnapshotStorage::new()),
            PersistMode::Immediate,
            bus,
        );
        store.add_bookmark("u1", "v1");
        store.add_bookmark("u1", "v1");
        store.add_favorite("u1", "v1");
        store.remove_bookmark("u1", "missing");
        store.remove_bookmark("u1", "v1");

        let names: Vec<&str> = seen.lock().iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["bookmarks-changed", "favorites-changed", "bookmarks-changed"]
        );
        assert!(seen.lock().iter().all(|e| e.user_id() == "u1"));
    }

    #[test]
    fn test_listener_observes_state_after_mutation() {
        let storage = Arc::new(MemorySnapshotStorage::new());
        let bus = Arc::new(EventBus::new());
        let snapshot_seen = Arc::new(Mutex::new(None));
        let sink = snapshot_seen.clone();
        let storage_for_listener = storage.clone();
        bus.subscribe(move |_: &StoreEvent| {
            *sink.lock() = storage_for_listener.get(RELATION_STORE_NAME);
        });

        let mut store = VideoRelationStore::open(storage, PersistMode::Immediate, bus);
        store.add_bookmark("u1", "v1");

        let written = snapshot_seen.lock().clone().unwrap();
        assert!(written.contains("v1"));
    }

    #[test]
    fn test_reopen_restores_state() {
        let storage = Arc::new(MemorySnapshotStorage::new());
        {
            let mut store = VideoRelationStore::open(
                storage.clone(),
                PersistMode::Immediate,
                Arc::new(EventBus::new()),
            );
            store.add_bookmark("u1", "v1");
            store.add_bookmark("u1", "v2");
            store.add_favorite("u1", "v1");
        }

        let store = VideoRelationStore::open(storage, PersistMode::Immediate, Arc::new(EventBus::new()));
        assert_eq!(store.get_bookmarks("u1"), ["v1", "v2"]);
        assert_eq!(store.get_favorites("u1"), ["v1"]);
    }

    #[test]
    fn test_deferred_mode_writes_on_drop() {
        let storage = Arc::new(MemorySnapshotStorage::new());
        {
            let mut store = VideoRelationStore::open(
                storage.clone(),
                PersistMode::Deferred,
                Arc::new(EventBus::new()),
            );
            store.add_bookmark("u1", "v1");
            assert!(storage.get(RELATION_STORE_NAME).is_none());
        }

        let store = VideoRelationStore::open(storage, PersistMode::Immediate, Arc::new(EventBus::new()));
        assert_eq!(store.get_bookmarks("u1"), ["v1"]);
    }

    #[test]
    fn test_write_failure_keeps_working_in_memory() {
        let mut store = VideoRelationStore::open(
            Arc::new(FailingStorage::default()),
            PersistMode::Immediate,
            Arc::new(EventBus::new()),
        );

        store.add_bookmark("u1", "v1");
        store.add_bookmark("u1", "v2");

        assert!(store.persistence_degraded());
        assert_eq!(store.get_bookmarks("u1"), ["v1", "v2"]);
    }

    #[test]
    fn test_duplicate_entries_in_snapshot_are_collapsed() {
        let storage = Arc::new(MemorySnapshotStorage::new());
        storage.insert(
            RELATION_STORE_NAME,
            r#"{"version":1,"saved_at":"2024-01-01T00:00:00Z","state":{"u1":{"bookmarks":["v1","v1"],"favorites":[]}}}"#,
        );

        let store = VideoRelationStore::open(storage, PersistMode::Immediate, Arc::new(EventBus::new()));
        assert_eq!(store.get_bookmarks("u1"), ["v1"]);
    }
}
