use vidnotes_core::models::VideoFilters;

/// Which relation set a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Bookmarks,
    Favorites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationAction {
    List,
    Add,
    Remove,
    Toggle,
}

/// CLI command parsed from arguments
#[derive(Debug, Clone)]
pub enum CliCommand {
    /// Sign in as the given user
    Login {
        user_id: String,
        display_name: Option<String>,
        email: Option<String>,
    },
    /// Sign out the current user
    Logout,
    /// Show the signed-in user and a summary of their data
    WhoAmI,
    /// Query or mutate bookmarks/favorites of the signed-in user
    Relation {
        kind: RelationKind,
        action: RelationAction,
        video_id: Option<String>,
    },
    /// List notes, optionally for one video, grouped or searched
    ListNotes {
        video_id: Option<String>,
        search: Option<String>,
        grouped: bool,
        with_titles: bool,
    },
    AddNote { video_id: String, content: String },
    EditNote { note_id: String, content: String },
    RemoveNote { note_id: String },
    /// Remove every bookmark, favorite and note of the signed-in user
    ClearData,
    /// Most popular videos
    PopularVideos { max_results: usize },
    /// Search videos by filters
    SearchVideos { filters: VideoFilters },
    /// Detail view: metadata plus the user's relation to the video
    ShowVideo { video_id: String },
}

