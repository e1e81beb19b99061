use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A video as shown in listings, with display-ready counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub channel: String,
    /// Formatted view count, e.g. "1.2M"
    pub views: String,
    /// Relative upload time, e.g. "3 days ago"
    pub timestamp: String,
    /// Formatted duration, e.g. "4:05"
    pub duration: String,
    pub duration_secs: u64,
    pub thumbnail: String,
    pub language: String,
    pub genre: String,
    pub quality: String,
    pub upload_date: DateTime<Utc>,
}

/// Full metadata for the detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub like_count: u64,
    pub thumbnail: String,
}
