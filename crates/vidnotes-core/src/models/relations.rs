use serde::{Deserialize, Serialize};

/// Bookmark and favorite membership for one user.
///
/// Both lists keep insertion order and never contain duplicates; the store
/// only mutates them through `insert_unique` and `remove_value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRelations {
    #[serde(default)]
    pub bookmarks: Vec<String>,
    #[serde(default)]
    pub favorites: Vec<String>,
}

impl UserRelations {
    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty() && self.favorites.is_empty()
    }

    pub fn is_bookmarked(&self, video_id: &str) -> bool {
        self.bookmarks.iter().any(|id| id == video_id)
    }

    pub fn is_favorite(&self, video_id: &str) -> bool {
        self.favorites.iter().any(|id| id == video_id)
    }

    /// Drop duplicate entries a hand-edited snapshot might contain.
    pub(crate) fn dedup(&mut self) {
        dedup_in_order(&mut self.bookmarks);
        dedup_in_order(&mut self.favorites);
    }
}

/// Appends `value` unless present. Returns whether the list changed.
pub(crate) fn insert_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|v| v == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

/// Removes `value` if present. Returns whether the list changed.
pub(crate) fn remove_value(list: &mut Vec<String>, value: &str) -> bool {
    let before = list.len();
    list.retain(|v| v != value);
    list.len() != before
}

fn dedup_in_order(list: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    list.retain(|v| seen.insert(v.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_unique() {
        let mut list = Vec::new();
        assert!(insert_unique(&mut list, "v1"));
        assert!(!insert_unique(&mut list, "v1"));
        assert!(insert_unique(&mut list, "v2"));
        assert_eq!(list, vec!["v1", "v2"]);
    }

    #[test]
    fn test_remove_value() {
        let mut list = vec!["v1".to_string(), "v2".to_string()];
        assert!(remove_value(&mut list, "v1"));
        assert!(!remove_value(&mut list, "v1"));
        assert_eq!(list, vec!["v2"]);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let relations: UserRelations = serde_json::from_str(r#"{"bookmarks":["v1"]}"#).unwrap();
        assert_eq!(relations.bookmarks, vec!["v1"]);
        assert!(relations.favorites.is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut relations = UserRelations {
            bookmarks: vec!["b".into(), "a".into(), "b".into()],
            favorites: vec!["x".into(), "x".into()],
        };
        relations.dedup();
        assert_eq!(relations.bookmarks, vec!["b", "a"]);
        assert_eq!(relations.favorites, vec!["x"]);
    }
}
