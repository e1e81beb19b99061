//! Application-wide constants
//!
//! Centralized location for store names, file names and catalog defaults
//! that are used across multiple modules.

/// Snapshot name for bookmark/favorite relations
pub const RELATION_STORE_NAME: &str = "video-storage";

/// Snapshot name for per-user notes
pub const NOTE_STORE_NAME: &str = "note-storage";

/// File holding the signed-in identity
pub const SESSION_FILE_NAME: &str = "session.json";

/// Default directory name under the platform data dir
pub const DEFAULT_DATA_DIR_NAME: &str = "vidnotes";

// Catalog defaults
pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_REGION_CODE: &str = "US";
/// Number of videos shown per page in listings
pub const VIDEOS_PER_PAGE: usize = 9;
/// Number of raw results requested from search before local filtering
pub const SEARCH_FETCH_SIZE: usize = 50;
