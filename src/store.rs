//! Local JSON store for tracker data.
//!
//! One file holds every user known on this machine plus the current login.
//! While nobody is logged in, commands work on the offline [`LOCAL_USER`].

use routlin_core::UserData;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// User whose data is edited while logged out.
pub const LOCAL_USER: &str = "local";

/// On-disk shape of the store file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalState {
    #[serde(default)]
    pub current_user: Option<String>,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub users: BTreeMap<String, UserData>,
}

/// The session context every command works through.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    state: LocalState,
    empty: UserData,
}

impl Store {
    /// Loads the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| StoreError::ParseError(path.clone(), e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => LocalState::default(),
            Err(e) => return Err(StoreError::IoError(path, e)),
        };
        tracing::debug!(path = %path.display(), users = state.users.len(), "opened store");

        Ok(Self {
            path,
            state,
            empty: UserData::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the store to a sibling temp file, then renames it over the
    /// real one.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::IoError(parent.to_path_buf(), e))?;
        }

        let json = serde_json::to_string_pretty(&self.state).map_err(StoreError::SerializeError)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| StoreError::IoError(tmp_path.clone(), e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::IoError(self.path.clone(), e))?;

        tracing::debug!(path = %self.path.display(), "saved store");
        Ok(())
    }

    /// The logged-in user, or [`LOCAL_USER`].
    pub fn active_user(&self) -> &str {
        self.state.current_user.as_deref().unwrap_or(LOCAL_USER)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session().is_some()
    }

    /// Username and session token of the current login.
    pub fn session(&self) -> Option<(&str, &str)> {
        match (&self.state.current_user, &self.state.session_token) {
            (Some(user), Some(token)) => Some((user.as_str(), token.as_str())),
            _ => None,
        }
    }

    /// Data of the active user.
    pub fn data(&self) -> &UserData {
        self.state
            .users
            .get(self.active_user())
            .unwrap_or(&self.empty)
    }

    pub fn data_mut(&mut self) -> &mut UserData {
        let user = self.active_user().to_string();
        self.state.users.entry(user).or_default()
    }

    /// Makes `username` the active user with the server's copy of their data.
    pub fn login(&mut self, username: &str, session_token: &str, data: UserData) {
        self.state.current_user = Some(username.to_string());
        self.state.session_token = Some(session_token.to_string());
        self.state.users.insert(username.to_string(), data);
    }

    /// Ends the current login. The user's cached data stays on disk.
    pub fn logout(&mut self) -> Option<String> {
        self.state.session_token = None;
        self.state.current_user.take()
    }

    /// Drops a user's cached data, logging them out if they are active.
    pub fn remove_user(&mut self, username: &str) -> Option<UserData> {
        if self.state.current_user.as_deref() == Some(username) {
            self.logout();
        }
        self.state.users.remove(username)
    }
}

#[derive(Debug)]
pub enum StoreError {
    IoError(PathBuf, io::Error),
    ParseError(PathBuf, serde_json::Error),
    SerializeError(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StoreError::ParseError(path, e) => {
                write!(f, "Failed to parse data file {}: {}", path.display(), e)
            }
            StoreError::SerializeError(e) => write!(f, "Failed to serialize data: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::IoError(_, e) => Some(e),
            StoreError::ParseError(_, e) => Some(e),
            StoreError::SerializeError(e) => Some(e),
        }
    }
}
