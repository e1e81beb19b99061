use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Video;

const SHORT_MAX_SECS: u64 = 4 * 60;
const MEDIUM_MAX_SECS: u64 = 20 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationFilter {
    /// Under 4 minutes
    Short,
    /// 4 to 20 minutes inclusive
    Medium,
    /// Over 20 minutes
    Long,
}

impl DurationFilter {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Short => "Short (<4 min)",
            Self::Medium => "Medium (4-20 min)",
            Self::Long => "Long (>20 min)",
        }
    }

    pub fn matches(&self, duration_secs: u64) -> bool {
        match self {
            Self::Short => duration_secs < SHORT_MAX_SECS,
            Self::Medium => (SHORT_MAX_SECS..=MEDIUM_MAX_SECS).contains(&duration_secs),
            Self::Long => duration_secs > MEDIUM_MAX_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadDateFilter {
    Today,
    ThisWeek,
    ThisMonth,
    ThisYear,
}

impl UploadDateFilter {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::ThisWeek => "This week",
            Self::ThisMonth => "This month",
            Self::ThisYear => "This year",
        }
    }

    pub fn max_age_days(&self) -> i64 {
        match self {
            Self::Today => 0,
            Self::ThisWeek => 7,
            Self::ThisMonth => 30,
            Self::ThisYear => 365,
        }
    }

    pub fn matches(&self, uploaded: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let age_days = (now - uploaded).num_days();
        age_days <= self.max_age_days()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityFilter {
    All,
    Only(String),
}

impl QualityFilter {
    pub fn matches(&self, quality: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == quality,
        }
    }
}

/// Filters selected in the sidebar. An empty filter set means "popular".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFilters {
    pub language: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<DurationFilter>,
    pub upload_date: Option<UploadDateFilter>,
    pub quality: Option<QualityFilter>,
}

impl VideoFilters {
    pub fn is_empty(&self) -> bool {
        self.language.is_none()
            && self.genre.is_none()
            && self.duration.is_none()
            && self.upload_date.is_none()
            && self.quality.is_none()
    }

    /// Apply the locally evaluated filters (duration, upload date, quality).
    /// Language and genre are handled by the remote search.
    pub fn apply(&self, videos: Vec<Video>, now: DateTime<Utc>) -> Vec<Video> {
        videos
            .into_iter()
            .filter(|v| self.duration.map_or(true, |d| d.matches(v.duration_secs)))
            .filter(|v| {
                self.upload_date
                    .map_or(true, |u| u.matches(v.upload_date, now))
            })
            .filter(|v| {
                self.quality
                    .as_ref()
                    .map_or(true, |q| q.matches(&v.quality))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFilterError(String);

impl fmt::Display for ParseFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized filter value: {}", self.0)
    }
}

impl std::error::Error for ParseFilterError {}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace(['_', '-'], " ")
}

impl FromStr for DurationFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.split_whitespace().next().unwrap_or("") {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

impl FromStr for UploadDateFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "today" => Ok(Self::Today),
            "this week" | "week" => Ok(Self::ThisWeek),
            "this month" | "month" => Ok(Self::ThisMonth),
            "this year" | "year" => Ok(Self::ThisYear),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

impl FromStr for QualityFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseFilterError(s.to_string()));
        }
        if trimmed.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Only(trimmed.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn video(id: &str, duration_secs: u64, age_days: i64, quality: &str, now: DateTime<Utc>) -> Video {
        Video {
            id: id.to_string(),
            title: format!("Video {}", id),
            channel: "channel".to_string(),
            views: "0".to_string(),
            timestamp: String::new(),
            duration: String::new(),
            duration_secs,
            thumbnail: String::new(),
            language: "English".to_string(),
            genre: "General".to_string(),
            quality: quality.to_string(),
            upload_date: now - Duration::days(age_days),
        }
    }

    #[test]
    fn test_duration_boundaries() {
        assert!(DurationFilter::Short.matches(239));
        assert!(!DurationFilter::Short.matches(240));
        assert!(DurationFilter::Medium.matches(240));
        assert!(DurationFilter::Medium.matches(1200));
        assert!(!DurationFilter::Medium.matches(1201));
        assert!(DurationFilter::Long.matches(1201));
    }

    #[test]
    fn test_upload_date_windows() {
        let now = Utc::now();
        assert!(UploadDateFilter::Today.matches(now - Duration::hours(3), now));
        assert!(!UploadDateFilter::Today.matches(now - Duration::days(1), now));
        assert!(UploadDateFilter::ThisWeek.matches(now - Duration::days(7), now));
        assert!(!UploadDateFilter::ThisWeek.matches(now - Duration::days(8), now));
        assert!(UploadDateFilter::ThisYear.matches(now - Duration::days(365), now));
    }

    #[test]
    fn test_apply_combines_filters() {
        let now = Utc::now();
        let videos = vec![
            video("short-new-hd", 100, 1, "HD", now),
            video("short-old-hd", 100, 40, "HD", now),
            video("long-new-hd", 2000, 1, "HD", now),
            video("short-new-sd", 100, 1, "SD", now),
        ];
        let filters = VideoFilters {
            duration: Some(DurationFilter::Short),
            upload_date: Some(UploadDateFilter::ThisMonth),
            quality: Some(QualityFilter::Only("HD".to_string())),
            ..Default::default()
        };

        let ids: Vec<String> = filters.apply(videos, now).into_iter().map(|v| v.id).collect();
        assert_eq!(ids, vec!["short-new-hd"]);
    }

    #[test]
    fn test_quality_all_keeps_everything() {
        let now = Utc::now();
        let videos = vec![video("a", 10, 0, "HD", now), video("b", 10, 0, "SD", now)];
        let filters = VideoFilters {
            quality: Some(QualityFilter::All),
            ..Default::default()
        };
        assert_eq!(filters.apply(videos, now).len(), 2);
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!("short".parse::<DurationFilter>().unwrap(), DurationFilter::Short);
        assert_eq!(
            "Medium (4-20 min)".parse::<DurationFilter>().unwrap(),
            DurationFilter::Medium
        );
        assert_eq!(
            "this-week".parse::<UploadDateFilter>().unwrap(),
            UploadDateFilter::ThisWeek
        );
        assert_eq!("All".parse::<QualityFilter>().unwrap(), QualityFilter::All);
        assert!("forever".parse::<UploadDateFilter>().is_err());
    }

    #[test]
    fn test_empty_filters() {
        assert!(VideoFilters::default().is_empty());
        let filters = VideoFilters {
            genre: Some("music".to_string()),
            ..Default::default()
        };
        assert!(!filters.is_empty());
    }
}
