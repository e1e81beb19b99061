pub mod app_data_store;
pub mod note_store;
pub mod relation_store;
pub mod views;

pub use app_data_store::AppDataStore;
pub use note_store::NoteStore;
pub use relation_store::VideoRelationStore;
pub use views::{
    group_notes_by_video, note_count_for_video, notes_for_video, search_notes, total_notes,
    VideoNotes,
};
