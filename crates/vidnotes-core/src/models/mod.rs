pub mod filters;
pub mod note;
pub mod relations;
pub mod video;

pub use filters::{DurationFilter, QualityFilter, UploadDateFilter, VideoFilters};
pub use note::Note;
pub use relations::UserRelations;
pub use video::{Video, VideoDetails};
