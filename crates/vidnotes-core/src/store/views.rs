//! Derived note views computed by callers from `NoteStore::get_notes`.
//! Nothing here is stored.

use serde::Serialize;

use crate::models::Note;

/// The notes of one video, as shown on the saved-notes page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoNotes {
    pub video_id: String,
    /// Display title resolved by the caller, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
    pub notes: Vec<Note>,
}

pub fn notes_for_video<'a>(notes: &'a [Note], video_id: &'a str) -> impl Iterator<Item = &'a Note> + 'a {
    notes.iter().filter(move |n| n.is_for_video(video_id))
}

pub fn note_count_for_video(notes: &[Note], video_id: &str) -> usize {
    notes_for_video(notes, video_id).count()
}

/// Group notes by video. Groups appear in the order their first note was
/// created; notes within a group keep creation order.
pub fn group_notes_by_video(notes: &[Note]) -> Vec<VideoNotes> {
    let mut groups: Vec<VideoNotes> = Vec::new();
    for note in notes {
        match groups.iter_mut().find(|g| g.video_id == note.video_id) {
            Some(group) => group.notes.push(note.clone()),
            None => groups.push(VideoNotes {
                video_id: note.video_id.clone(),
                video_title: None,
                notes: vec![note.clone()],
            }),
        }
    }
    groups
}

/// Case-insensitive search over note content and resolved video titles.
/// Groups without a match are dropped; an empty query keeps everything.
pub fn search_notes(groups: &[VideoNotes], query: &str) -> Vec<VideoNotes> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return groups.to_vec();
    }

    groups
        .iter()
        .filter_map(|group| {
            let title_matches = group
                .video_title
                .as_ref()
                .is_some_and(|t| t.to_lowercase().contains(&query));
            let matched: Vec<Note> = group
                .notes
                .iter()
                .filter(|n| title_matches || n.matches_lowercase(&query))
                .cloned()
                .collect();
            (!matched.is_empty()).then(|| VideoNotes {
                video_id: group.video_id.clone(),
                video_title: group.video_title.clone(),
                notes: matched,
            })
        })
        .collect()
}

pub fn total_notes(groups: &[VideoNotes]) -> usize {
    groups.iter().map(|g| g.notes.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes() -> Vec<Note> {
        vec![
            Note::new("v1", "Intro is great"),
            Note::new("v2", "check the chorus"),
            Note::new("v1", "watch again"),
        ]
    }

    #[test]
    fn test_notes_for_video() {
        let notes = notes();
        let contents: Vec<&str> = notes_for_video(&notes, "v1")
            .map(|n| n.content.as_str())
            .collect();
        assert_eq!(contents, vec!["Intro is great", "watch again"]);
        assert_eq!(note_count_for_video(&notes, "v2"), 1);
        assert_eq!(note_count_for_video(&notes, "v9"), 0);
    }

    #[test]
    fn test_group_by_video_preserves_order() {
        let groups = group_notes_by_video(&notes());
        let ids: Vec<&str> = groups.iter().map(|g| g.video_id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "v2"]);
        assert_eq!(groups[0].notes.len(), 2);
        assert_eq!(groups[0].notes[1].content, "watch again");
        assert_eq!(total_notes(&groups), 3);
    }

    #[test]
    fn test_search_is_case_insensitive_and_drops_empty_groups() {
        let groups = group_notes_by_video(&notes());
        let found = search_notes(&groups, "  INTRO ");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].video_id, "v1");
        assert_eq!(found[0].notes.len(), 1);
    }

    #[test]
    fn test_search_matches_video_title() {
        let mut groups = group_notes_by_video(&notes());
        groups[1].video_title = Some("Song Breakdown".to_string());

        let found = search_notes(&groups, "breakdown");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].video_id, "v2");
        assert_eq!(found[0].notes.len(), 1);
    }

    #[test]
    fn test_empty_query_returns_all() {
        let groups = group_notes_by_video(&notes());
        assert_eq!(search_notes(&groups, ""), groups);
    }
}
