use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A free-text note a user attached to a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub video_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Create a note with a fresh UUID v4 id stamped with the current time.
    pub fn new(video_id: &str, content: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            video_id: video_id.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_for_video(&self, video_id: &str) -> bool {
        self.video_id == video_id
    }

    /// Case-insensitive substring match on the content.
    /// `query` must already be lowercased.
    pub fn matches_lowercase(&self, query: &str) -> bool {
        self.content.to_lowercase().contains(query)
    }
}
