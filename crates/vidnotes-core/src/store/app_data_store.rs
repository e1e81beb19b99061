use std::sync::Arc;

use crate::config::{CoreConfig, PersistMode};
use crate::events::{EventBus, StoreEvent};
use crate::identity::IdentityProvider;
use crate::models::Note;
use crate::persistence::{FileSnapshotStorage, MemorySnapshotStorage, SnapshotStorage};

use super::{NoteStore, VideoRelationStore};

/// Single source of truth for user-specific relational data.
///
/// Constructed once at startup and handed to every consumer. Owns both
/// stores and the event bus they publish on; consumers that cache derived
/// views subscribe via [`AppDataStore::events`].
pub struct AppDataStore {
    relations: VideoRelationStore,
    notes: NoteStore,
    bus: Arc<EventBus>,
}

impl AppDataStore {
    /// Open file-backed stores in `config.data_dir`.
    pub fn open(config: &CoreConfig) -> Self {
        let storage = Arc::new(FileSnapshotStorage::new(&config.data_dir));
        Self::with_storage(storage, config.persist_mode)
    }

    pub fn with_storage(storage: Arc<dyn SnapshotStorage>, mode: PersistMode) -> Self {
        let bus = Arc::new(EventBus::new());
        Self {
            relations: VideoRelationStore::open(storage.clone(), mode, bus.clone()),
            notes: NoteStore::open(storage, mode, bus.clone()),
            bus,
        }
    }

    /// Stores that never touch disk.
    pub fn in_memory() -> Self {
        Self::with_storage(Arc::new(MemorySnapshotStorage::new()), PersistMode::Immediate)
    }

    pub fn relations(&self) -> &VideoRelationStore {
        &self.relations
    }

    pub fn relations_mut(&mut self) -> &mut VideoRelationStore {
        &mut self.relations
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut NoteStore {
        &mut self.notes
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Remove every bookmark, favorite and note of the user as one unit.
    /// Publishes a single `UserDataCleared` if anything was removed.
    pub fn clear_user_data(&mut self, user_id: &str) -> bool {
        let relations = self.relations.take_user(user_id);
        let notes = self.notes.take_user(user_id);
        if relations.is_none() && notes.is_none() {
            return false;
        }

        tracing::info!(
            user_id,
            bookmarks = relations.as_ref().map_or(0, |r| r.bookmarks.len()),
            favorites = relations.as_ref().map_or(0, |r| r.favorites.len()),
            notes = notes.as_ref().map_or(0, Vec::len),
            "cleared user data"
        );
        self.bus.publish(&StoreEvent::UserDataCleared {
            user_id: user_id.to_string(),
        });
        true
    }

    pub fn flush(&mut self) {
        self.relations.flush();
        self.notes.flush();
    }

    /// True once either store fell back to in-memory operation.
    pub fn persistence_degraded(&self) -> bool {
        self.relations.persistence_degraded() || self.notes.persistence_degraded()
    }

    // ===== Signed-in user views =====
    // Empty when nobody is signed in.

    pub fn bookmarks_for(&self, identity: &dyn IdentityProvider) -> &[String] {
        match identity.current_user_id() {
            Some(user_id) => self.relations.get_bookmarks(&user_id),
            None => &[],
        }
    }

    pub fn favorites_for(&self, identity: &dyn IdentityProvider) -> &[String] {
        match identity.current_user_id() {
            Some(user_id) => self.relations.get_favorites(&user_id),
            None => &[],
        }
    }

    pub fn notes_for(&self, identity: &dyn IdentityProvider) -> &[Note] {
        match identity.current_user_id() {
            Some(user_id) => self.notes.get_notes(&user_id),
            None => &[],
        }
    }
}
