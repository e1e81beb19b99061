use std::collections::HashMap;
use std::sync::Arc;

use crate::config::PersistMode;
use crate::constants::NOTE_STORE_NAME;
use crate::events::{EventBus, StoreEvent};
use crate::models::Note;
use crate::persistence::{load_snapshot, SnapshotStorage, SnapshotWriter};

/// Per-user notes, each attached to a video, kept in creation order.
pub struct NoteStore {
    notes: HashMap<String, Vec<Note>>,
    writer: SnapshotWriter,
    bus: Arc<EventBus>,
}

impl NoteStore {
    pub fn open(storage: Arc<dyn SnapshotStorage>, mode: PersistMode, bus: Arc<EventBus>) -> Self {
        let notes: HashMap<String, Vec<Note>> = load_snapshot(storage.as_ref(), NOTE_STORE_NAME);
        tracing::debug!(
            users = notes.len(),
            notes = notes.values().map(Vec::len).sum::<usize>(),
            "note store loaded"
        );

        Self {
            notes,
            writer: SnapshotWriter::new(storage, NOTE_STORE_NAME, mode),
            bus,
        }
    }

    // ===== Queries =====

    /// All notes of the user, oldest first.
    pub fn get_notes(&self, user_id: &str) -> &[Note] {
        self.notes
            .get(user_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get_note(&self, user_id: &str, note_id: &str) -> Option<&Note> {
        self.get_notes(user_id).iter().find(|n| n.id == note_id)
    }

    pub fn persistence_degraded(&self) -> bool {
        self.writer.is_degraded()
    }

    // ===== Mutations =====

    /// Append a new note. Callers are expected to trim `content` and skip
    /// empty input; the store itself accepts any string.
    pub fn add_note(&mut self, user_id: &str, video_id: &str, content: &str) -> Note {
        let note = Note::new(video_id, content);
        self.notes
            .entry(user_id.to_string())
            .or_default()
            .push(note.clone());
        self.commit(user_id);
        note
    }

    /// Returns `false` if no note with that id exists for the user.
    pub fn remove_note(&mut self, user_id: &str, note_id: &str) -> bool {
        let Some(notes) = self.notes.get_mut(user_id) else {
            return false;
        };
        let before = notes.len();
        notes.retain(|n| n.id != note_id);
        if notes.len() == before {
            return false;
        }
        self.commit(user_id);
        true
    }

    /// Replace the content of a note in place; id, video and creation time
    /// are left untouched. Returns `false` if the note does not exist.
    pub fn update_note(&mut self, user_id: &str, note_id: &str, content: &str) -> bool {
        let Some(note) = self
            .notes
            .get_mut(user_id)
            .and_then(|notes| notes.iter_mut().find(|n| n.id == note_id))
        else {
            return false;
        };
        if note.content == content {
            return true;
        }
        note.content = content.to_string();
        self.commit(user_id);
        true
    }

    pub(crate) fn take_user(&mut self, user_id: &str) -> Option<Vec<Note>> {
        let removed = self.notes.remove(user_id)?;
        self.writer.record(&self.notes);
        Some(removed)
    }

    pub fn flush(&mut self) {
        self.writer.flush(&self.notes);
    }

    fn commit(&mut self, user_id: &str) {
        self.writer.record(&self.notes);
        self.bus.publish(&StoreEvent::NotesChanged {
            user_id: user_id.to_string(),
        });
    }
}

impl Drop for NoteStore {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemorySnapshotStorage;
    use chrono::Utc;
    use parking_lot::Mutex;

    fn store() -> NoteStore {
        NoteStore::open(
            Arc::new(MemorySnapshotStorage::new()),
            PersistMode::Immediate,
            Arc::new(EventBus::new()),
        )
    }

    #[test]
    fn test_add_note() {
        let mut store = store();
        let before = Utc::now();
        store.add_note("u1", "v1", "hello");

        let notes = store.get_notes("u1");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "hello");
        assert_eq!(notes[0].video_id, "v1");
        assert!(notes[0].created_at >= before);
    }

    #[test]
    fn test_identical_notes_get_distinct_ids() {
        let mut store = store();
        let a = store.add_note("u1", "v1", "same");
        let b = store.add_note("u1", "v1", "same");

        assert_ne!(a.id, b.id);
        assert_eq!(store.get_notes("u1").len(), 2);
    }

    #[test]
    fn test_notes_kept_in_creation_order() {
        let mut store = store();
        store.add_note("u1", "v1", "first");
        store.add_note("u1", "v2", "second");
        store.add_note("u1", "v1", "third");

        let contents: Vec<&str> = store
            .get_notes("u1")
            .iter()
            .map(|n| n.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_update_changes_only_content() {
        let mut store = store();
        let original = store.add_note("u1", "v1", "draft");

        assert!(store.update_note("u1", &original.id, "edited"));

        let updated = store.get_note("u1", &original.id).unwrap();
        assert_eq!(updated.content, "edited");
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.video_id, original.video_id);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[test]
    fn test_update_unknown_note_is_noop() {
        let mut store = store();
        store.add_note("u1", "v1", "keep");

        assert!(!store.update_note("u1", "missing", "edited"));
        assert!(!store.update_note("ghost", "missing", "edited"));
        assert_eq!(store.get_notes("u1")[0].content, "keep");
    }

    #[test]
    fn test_remove_only_target_note() {
        let mut store = store();
        let a = store.add_note("u1", "v1", "a");
        let b = store.add_note("u1", "v1", "b");
        let other = store.add_note("u2", "v1", "other user");

        assert!(store.remove_note("u1", &a.id));
        assert!(!store.remove_note("u1", &a.id));

        assert_eq!(store.get_notes("u1"), [b]);
        assert_eq!(store.get_notes("u2"), [other]);
    }

    #[test]
    fn test_remove_with_other_users_id_is_noop() {
        let mut store = store();
        let note = store.add_note("u1", "v1", "mine");

        assert!(!store.remove_note("u2", &note.id));
        assert_eq!(store.get_notes("u1").len(), 1);
    }

    #[test]
    fn test_unknown_user_has_no_notes() {
        let store = store();
        assert!(store.get_notes("nobody").is_empty());
        assert!(store.get_note("nobody", "x").is_none());
    }

    #[test]
    fn test_events() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(move |e: &StoreEvent| sink.lock().push(e.clone()));

        let mut store = NoteStore::open(
            Arc::new(MemorySnapshotStorage::new()),
            PersistMode::Immediate,
            bus,
        );
        let note = store.add_note("u1", "v1", "hello");
        store.update_note("u1", &note.id, "hello");
        store.update_note("u1", &note.id, "changed");
        store.remove_note("u1", "missing");
        store.remove_note("u1", &note.id);

        let expected = StoreEvent::NotesChanged {
            user_id: "u1".to_string(),
        };
        assert_eq!(*seen.lock(), vec![expected.clone(), expected.clone(), expected]);
    }

    #[test]
    fn test_reopen_restores_notes() {
        let storage = Arc::new(MemorySnapshotStorage::new());
        let note = {
            let mut store =
                NoteStore::open(storage.clone(), PersistMode::Immediate, Arc::new(EventBus::new()));
            store.add_note("u1", "v1", "persist me")
        };

        let store = NoteStore::open(storage, PersistMode::Immediate, Arc::new(EventBus::new()));
        assert_eq!(store.get_notes("u1"), [note]);
    }
}
