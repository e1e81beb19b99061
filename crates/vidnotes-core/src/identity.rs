//! Identity provider collaborator.
//!
//! The stores only ever see the user id as an opaque partition key. This
//! module supplies it: a JSON-file-backed session for the CLI and a static
//! provider for embedding and tests.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::SESSION_FILE_NAME;
use crate::persistence::PersistenceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            email: None,
        }
    }

    /// Display name, else email, else the raw id.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.user_id)
    }
}

pub trait IdentityProvider {
    /// The signed-in user, or `None` when unauthenticated.
    fn current_user(&self) -> Option<UserIdentity>;

    fn current_user_id(&self) -> Option<String> {
        self.current_user().map(|u| u.user_id)
    }
}

/// Fixed identity, e.g. for tests or a host application that manages auth.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<UserIdentity>);

impl StaticIdentity {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self(Some(UserIdentity::new(user_id)))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.0.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("User id must not be empty")]
    EmptyUserId,

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Signed-in identity persisted to `<data_dir>/session.json`.
///
/// A missing or malformed session file means nobody is signed in.
pub struct SessionStorage {
    path: PathBuf,
    identity: Option<UserIdentity>,
}

impl SessionStorage {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let path = data_dir.as_ref().join(SESSION_FILE_NAME);
        let identity = Self::load_from_file(&path);
        Self { path, identity }
    }

    fn load_from_file(path: &Path) -> Option<UserIdentity> {
        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str::<UserIdentity>(&contents) {
            Ok(identity) if !identity.user_id.trim().is_empty() => Some(identity),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed session file");
                None
            }
        }
    }

    fn save_to_file(&self, identity: &UserIdentity) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(identity)?;
        fs::write(&self.path, json).map_err(|source| PersistenceError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn sign_in(&mut self, identity: UserIdentity) -> Result<(), IdentityError> {
        if identity.user_id.trim().is_empty() {
            return Err(IdentityError::EmptyUserId);
        }
        self.save_to_file(&identity)?;
        tracing::info!(user_id = %identity.user_id, "signed in");
        self.identity = Some(identity);
        Ok(())
    }

    /// Signing out when nobody is signed in is not an error.
    pub fn sign_out(&mut self) -> Result<(), IdentityError> {
        if let Some(identity) = self.identity.take() {
            tracing::info!(user_id = %identity.user_id, "signed out");
        }
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Io {
                path: self.path.clone(),
                source,
            }
            .into()),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }
}

impl IdentityProvider for SessionStorage {
    fn current_user(&self) -> Option<UserIdentity> {
        self.identity.clone()
    }
}
