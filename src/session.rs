use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::storage::{BrowserStorage, KeyValueStorage};

pub const SESSION_KEY: &str = "eaxy_user";
pub const LEGACY_TOKEN_KEY: &str = "token";
pub const DEFAULT_BRANCH: &str = "Barcelona";

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub token: String,
    #[serde(default = "default_branch", alias = "tienda")]
    pub branch: String,
}

/// Owns the persisted login. Every read goes back to storage so that a
/// session written by another tab is picked up on the next request.
#[derive(Clone)]
pub struct SessionStore {
    storage: Rc<dyn KeyValueStorage>,
}

impl SessionStore {
    pub fn new(storage: Rc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn browser() -> Self {
        Self::new(Rc::new(BrowserStorage))
    }

    pub fn save(&self, token: &str, username: &str, branch: &str) {
        let session = Session {
            username: username.to_string(),
            token: token.to_string(),
            branch: branch.to_string(),
        };
        match serde_json::to_string(&session) {
            Ok(raw) => self.storage.set_item(SESSION_KEY, &raw),
            Err(e) => log::warn!("Could not serialize session: {}", e),
        }
        self.storage.set_item(LEGACY_TOKEN_KEY, token);
    }

    pub fn load(&self) -> Option<Session> {
        let raw = self.storage.get_item(SESSION_KEY)?;
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if !session.token.is_empty() => Some(session),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Ignoring corrupt stored session: {}", e);
                None
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        if let Some(session) = self.load() {
            return Some(session.token);
        }
        self.storage
            .get_item(LEGACY_TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn clear(&self) {
        self.storage.remove_item(SESSION_KEY);
        self.storage.remove_item(LEGACY_TOKEN_KEY);
    }
}

impl PartialEq for SessionStore {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }
}
