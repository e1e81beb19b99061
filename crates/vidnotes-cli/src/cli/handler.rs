use std::sync::mpsc::Receiver;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Value};
use vidnotes_core::catalog::{attach_video_titles, VideoCatalog, YouTubeCatalog};
use vidnotes_core::store::{
    group_notes_by_video, note_count_for_video, notes_for_video, search_notes, total_notes,
};
use vidnotes_core::{AppDataStore, IdentityProvider, SessionStorage, StoreEvent, UserIdentity};

use super::command::{CliCommand, RelationAction, RelationKind};
use super::config::CliConfig;

/// Everything a command needs: the stores, the session and, when an API
/// key is configured, the video catalog.
pub struct App {
    store: AppDataStore,
    session: SessionStorage,
    catalog: Option<Box<dyn VideoCatalog>>,
    events: Receiver<StoreEvent>,
}

impl App {
    pub fn new(config: &CliConfig) -> Result<Self> {
        let core_config = config.core_config();
        let store = AppDataStore::open(&core_config);
        let session = SessionStorage::new(&core_config.data_dir);
        let catalog = match config.api_key() {
            Some(key) => Some(Box::new(YouTubeCatalog::new(key)?) as Box<dyn VideoCatalog>),
            None => None,
        };
        Ok(Self::with_parts(store, session, catalog))
    }

    pub fn with_parts(
        store: AppDataStore,
        session: SessionStorage,
        catalog: Option<Box<dyn VideoCatalog>>,
    ) -> Self {
        let events = store.events().subscribe_channel();
        Self {
            store,
            session,
            catalog,
            events,
        }
    }

    pub fn store(&self) -> &AppDataStore {
        &self.store
    }

    fn require_user(&self) -> Result<String> {
        self.session
            .current_user_id()
            .ok_or_else(|| anyhow!("Not signed in. Run `vidnotes login <user-id>` first."))
    }

    fn catalog(&self) -> Result<&dyn VideoCatalog> {
        self.catalog.as_deref().context(
            "No YouTube API key configured (set YOUTUBE_API_KEY or apiKey in the config file)",
        )
    }

    /// Names of the store events published since the last call.
    fn drain_events(&self) -> Vec<String> {
        self.events.try_iter().map(|e| e.name().to_string()).collect()
    }

    pub async fn execute(&mut self, command: CliCommand) -> Result<Value> {
        tracing::debug!(?command, "executing");
        match command {
            CliCommand::Login {
                user_id,
                display_name,
                email,
            } => {
                let identity = UserIdentity {
                    user_id: user_id.trim().to_string(),
                    display_name,
                    email,
                };
                self.session.sign_in(identity.clone())?;
                Ok(json!({ "userId": identity.user_id, "label": identity.label() }))
            }

            CliCommand::Logout => {
                self.session.sign_out()?;
                Ok(json!({ "signedIn": false }))
            }

            CliCommand::WhoAmI => Ok(match self.session.current_user() {
                Some(identity) => json!({
                    "signedIn": true,
                    "userId": identity.user_id,
                    "label": identity.label(),
                    "bookmarks": self.store.bookmarks_for(&self.session).len(),
                    "favorites": self.store.favorites_for(&self.session).len(),
                    "notes": self.store.notes_for(&self.session).len(),
                }),
                None => json!({ "signedIn": false }),
            }),

            CliCommand::Relation {
                kind,
                action,
                video_id,
            } => self.relation(kind, action, video_id),

            CliCommand::ListNotes {
                video_id,
                search,
                grouped,
                with_titles,
            } => {
                let notes: Vec<_> = match &video_id {
                    Some(video_id) => notes_for_video(self.store.notes_for(&self.session), video_id)
                        .cloned()
                        .collect(),
                    None => self.store.notes_for(&self.session).to_vec(),
                };

                if !grouped && !with_titles && search.is_none() {
                    return Ok(json!({ "total": notes.len(), "notes": notes }));
                }

                let mut groups = group_notes_by_video(&notes);
                if with_titles {
                    attach_video_titles(self.catalog()?, &mut groups).await;
                }
                if let Some(query) = &search {
                    groups = search_notes(&groups, query);
                }
                Ok(json!({ "total": total_notes(&groups), "groups": groups }))
            }

            CliCommand::AddNote { video_id, content } => {
                let user_id = self.require_user()?;
                let content = content.trim();
                if content.is_empty() {
                    bail!("Note content must not be empty");
                }
                let note = self.store.notes_mut().add_note(&user_id, &video_id, content);
                Ok(json!({ "note": note, "events": self.drain_events() }))
            }

            CliCommand::EditNote { note_id, content } => {
                let user_id = self.require_user()?;
                let content = content.trim();
                if content.is_empty() {
                    bail!("Note content must not be empty");
                }
                let updated = self.store.notes_mut().update_note(&user_id, &note_id, content);
                Ok(json!({
                    "updated": updated,
                    "note": self.store.notes().get_note(&user_id, &note_id),
                    "events": self.drain_events(),
                }))
            }

            CliCommand::RemoveNote { note_id } => {
                let user_id = self.require_user()?;
                let removed = self.store.notes_mut().remove_note(&user_id, &note_id);
                Ok(json!({ "removed": removed, "events": self.drain_events() }))
            }

            CliCommand::ClearData => {
                let user_id = self.require_user()?;
                let cleared = self.store.clear_user_data(&user_id);
                Ok(json!({ "cleared": cleared, "events": self.drain_events() }))
            }

            CliCommand::PopularVideos { max_results } => {
                let videos = self.catalog()?.popular(max_results).await?;
                Ok(json!({ "videos": videos }))
            }

            CliCommand::SearchVideos { filters } => {
                let videos = self.catalog()?.search(&filters).await?;
                Ok(json!({ "videos": videos }))
            }

            CliCommand::ShowVideo { video_id } => {
                let details = self
                    .catalog()?
                    .fetch_video(&video_id)
                    .await?
                    .ok_or_else(|| anyhow!("Video not found: {}", video_id))?;

                let user_id = self.session.current_user_id().unwrap_or_default();
                let relations = self.store.relations();
                let notes = self.store.notes().get_notes(&user_id);
                Ok(json!({
                    "video": details,
                    "bookmarked": relations.is_bookmarked(&user_id, &video_id),
                    "favorite": relations.is_favorite(&user_id, &video_id),
                    "noteCount": note_count_for_video(notes, &video_id),
                    "notes": notes_for_video(notes, &video_id).collect::<Vec<_>>(),
                }))
            }
        }
    }

    fn relation(
        &mut self,
        kind: RelationKind,
        action: RelationAction,
        video_id: Option<String>,
    ) -> Result<Value> {
        let key = match kind {
            RelationKind::Bookmarks => "bookmarks",
            RelationKind::Favorites => "favorites",
        };

        if action == RelationAction::List {
            let videos = match kind {
                RelationKind::Bookmarks => self.store.bookmarks_for(&self.session),
                RelationKind::Favorites => self.store.favorites_for(&self.session),
            };
            return Ok(json!({ key: videos }));
        }

        let user_id = self.require_user()?;
        let video_id = video_id.context("A video id is required")?;
        let relations = self.store.relations_mut();
        let member = match (kind, action) {
            (RelationKind::Bookmarks, RelationAction::Add) => {
                relations.add_bookmark(&user_id, &video_id);
                true
            }
            (RelationKind::Bookmarks, RelationAction::Remove) => {
                relations.remove_bookmark(&user_id, &video_id);
                false
            }
            (RelationKind::Bookmarks, _) => relations.toggle_bookmark(&user_id, &video_id),
            (RelationKind::Favorites, RelationAction::Add) => {
                relations.add_favorite(&user_id, &video_id);
                true
            }
            (RelationKind::Favorites, RelationAction::Remove) => {
                relations.remove_favorite(&user_id, &video_id);
                false
            }
            (RelationKind::Favorites, _) => relations.toggle_favorite(&user_id, &video_id),
        };

        let videos = match kind {
            RelationKind::Bookmarks => self.store.relations().get_bookmarks(&user_id),
            RelationKind::Favorites => self.store.relations().get_favorites(&user_id),
        };
        Ok(json!({
            "videoId": video_id,
            "member": member,
            key: videos,
            "events": self.drain_events(),
        }))
    }
}
