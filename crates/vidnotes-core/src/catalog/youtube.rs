use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use super::format::{format_duration, format_published_at, format_views, parse_iso_duration};
use super::{CatalogError, VideoCatalog};
use crate::constants::{DEFAULT_REGION_CODE, SEARCH_FETCH_SIZE, VIDEOS_PER_PAGE, YOUTUBE_API_BASE};
use crate::models::{Video, VideoDetails, VideoFilters};

const DEFAULT_LANGUAGE: &str = "English";
const DEFAULT_GENRE: &str = "General";
const POPULAR_GENRE: &str = "Entertainment";
const DEFAULT_QUALITY: &str = "HD";

// ===== API response shapes =====

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    #[serde(default)]
    snippet: Option<Snippet>,
    #[serde(default)]
    content_details: Option<ContentDetails>,
    #[serde(default)]
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    channel_title: String,
    published_at: DateTime<Utc>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    maxres: Option<Thumbnail>,
}

impl Thumbnails {
    fn best(&self) -> String {
        self.maxres
            .as_ref()
            .or(self.high.as_ref())
            .map(|t| t.url.clone())
            .unwrap_or_default()
    }

    fn high(&self) -> String {
        self.high
            .as_ref()
            .map(|t| t.url.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

fn parse_count(value: Option<&String>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

struct Enrichment<'a> {
    content_details: Option<&'a ContentDetails>,
    statistics: Option<&'a Statistics>,
}

fn to_video(
    id: String,
    snippet: &Snippet,
    extra: Enrichment<'_>,
    language: &str,
    genre: &str,
    now: DateTime<Utc>,
) -> Video {
    let duration_secs = extra
        .content_details
        .and_then(|c| parse_iso_duration(&c.duration))
        .unwrap_or(0);
    let views = parse_count(extra.statistics.and_then(|s| s.view_count.as_ref()));

    Video {
        id,
        title: snippet.title.clone(),
        channel: snippet.channel_title.clone(),
        views: format_views(views),
        timestamp: format_published_at(snippet.published_at, now),
        duration: format_duration(duration_secs),
        duration_secs,
        thumbnail: snippet.thumbnails.high(),
        language: language.to_string(),
        genre: genre.to_string(),
        quality: DEFAULT_QUALITY.to_string(),
        upload_date: snippet.published_at,
    }
}

/// YouTube Data API v3 client
pub struct YouTubeCatalog {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl YouTubeCatalog {
    pub fn new(api_key: String) -> Result<Self, CatalogError> {
        if api_key.trim().is_empty() {
            return Err(CatalogError::MissingApiKey);
        }
        Ok(Self {
            api_key,
            base_url: YOUTUBE_API_BASE.to_string(),
            client: reqwest::Client::new(),
        })
    }

    /// Point the client at a different API root (for proxies and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get<T>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T, CatalogError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, "catalog request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    /// Duration and statistics for a batch of ids, keyed by id.
    async fn fetch_details(&self, ids: &[String]) -> Result<HashMap<String, VideoItem>, CatalogError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let response: ListResponse<VideoItem> = self
            .get(
                "videos",
                &[
                    ("part", "contentDetails,statistics".to_string()),
                    ("id", ids.join(",")),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| (item.id.clone(), item))
            .collect())
    }
}

#[async_trait]
impl VideoCatalog for YouTubeCatalog {
    async fn fetch_video(&self, video_id: &str) -> Result<Option<VideoDetails>, CatalogError> {
        let response: ListResponse<VideoItem> = self
            .get(
                "videos",
                &[
                    ("part", "snippet,statistics".to_string()),
                    ("id", video_id.to_string()),
                ],
            )
            .await?;

        let Some(item) = response.items.into_iter().next() else {
            return Ok(None);
        };
        let Some(snippet) = item.snippet else {
            return Ok(None);
        };
        let statistics = item.statistics.unwrap_or_default();

        Ok(Some(VideoDetails {
            id: item.id,
            title: snippet.title,
            description: snippet.description,
            channel_title: snippet.channel_title,
            published_at: snippet.published_at,
            view_count: parse_count(statistics.view_count.as_ref()),
            like_count: parse_count(statistics.like_count.as_ref()),
            thumbnail: snippet.thumbnails.best(),
        }))
    }

    async fn popular(&self, max_results: usize) -> Result<Vec<Video>, CatalogError> {
        let response: ListResponse<VideoItem> = self
            .get(
                "videos",
                &[
                    ("part", "snippet,contentDetails,statistics".to_string()),
                    ("chart", "mostPopular".to_string()),
                    ("maxResults", max_results.to_string()),
                    ("regionCode", DEFAULT_REGION_CODE.to_string()),
                ],
            )
            .await?;

        let now = Utc::now();
        Ok(response
            .items
            .into_iter()
            .filter_map(|item| {
                let snippet = item.snippet.as_ref()?;
                let extra = Enrichment {
                    content_details: item.content_details.as_ref(),
                    statistics: item.statistics.as_ref(),
                };
                Some(to_video(
                    item.id.clone(),
                    snippet,
                    extra,
                    DEFAULT_LANGUAGE,
                    POPULAR_GENRE,
                    now,
                ))
            })
            .collect())
    }

    async fn search(&self, filters: &VideoFilters) -> Result<Vec<Video>, CatalogError> {
        if filters.is_empty() {
            return self.popular(VIDEOS_PER_PAGE).await;
        }

        let mut query = vec![
            ("part", "snippet".to_string()),
            ("type", "video".to_string()),
            ("maxResults", SEARCH_FETCH_SIZE.to_string()),
        ];
        if let Some(language) = &filters.language {
            query.push(("relevanceLanguage", language.to_lowercase()));
        }
        if let Some(genre) = &filters.genre {
            query.push(("q", genre.clone()));
        }

        let response: ListResponse<SearchItem> = self.get("search", &query).await?;
        let hits: Vec<(String, Snippet)> = response
            .items
            .into_iter()
            .filter_map(|item| Some((item.id.video_id?, item.snippet)))
            .collect();

        let ids: Vec<String> = hits.iter().map(|(id, _)| id.clone()).collect();
        let details = self.fetch_details(&ids).await?;

        let language = filters.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
        let genre = filters.genre.as_deref().unwrap_or(DEFAULT_GENRE);
        let now = Utc::now();
        let videos: Vec<Video> = hits
            .into_iter()
            .map(|(id, snippet)| {
                let detail = details.get(&id);
                let extra = Enrichment {
                    content_details: detail.and_then(|d| d.content_details.as_ref()),
                    statistics: detail.and_then(|d| d.statistics.as_ref()),
                };
                to_video(id, &snippet, extra, language, genre, now)
            })
            .collect();

        let mut filtered = filters.apply(videos, now);
        filtered.truncate(VIDEOS_PER_PAGE);
        Ok(filtered)
    }
}
