//! Video metadata service collaborator.
//!
//! The stores only hold video ids; resolving an id to display metadata, and
//! listing or searching videos, goes through a [`VideoCatalog`].

pub mod format;
pub mod youtube;

use async_trait::async_trait;

use crate::models::{Video, VideoDetails, VideoFilters};
use crate::store::VideoNotes;

pub use youtube::YouTubeCatalog;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("No API key configured for the video catalog")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog API error ({status}): {body}")]
    Api { status: u16, body: String },
}

#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Full metadata for one video, `None` if the id is unknown.
    async fn fetch_video(&self, video_id: &str) -> Result<Option<VideoDetails>, CatalogError>;

    /// Most popular videos, at most `max_results`.
    async fn popular(&self, max_results: usize) -> Result<Vec<Video>, CatalogError>;

    /// Videos matching `filters`; empty filters return the popular list.
    async fn search(&self, filters: &VideoFilters) -> Result<Vec<Video>, CatalogError>;
}

/// Fill in `video_title` for each group. Lookups that fail or find nothing
/// leave the title unset.
pub async fn attach_video_titles(catalog: &dyn VideoCatalog, groups: &mut [VideoNotes]) {
    for group in groups.iter_mut() {
        match catalog.fetch_video(&group.video_id).await {
            Ok(Some(details)) => group.video_title = Some(details.title),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(video_id = %group.video_id, error = %e, "failed to resolve video title");
            }
        }
    }
}
