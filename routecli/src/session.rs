//! Token/user session storage
//!
//! The on-disk analog of the browser's local storage: the token and user
//! summary live under fixed keys in a small JSON file, written on
//! register/login and removed on logout or any 401.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::models::UserSummary;

pub const TOKEN_KEY: &str = "rs_token";
pub const USER_KEY: &str = "rs_user";

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location: ~/.routesaver/session.json
    pub fn default_path() -> PathBuf {
        home::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".routesaver")
            .join("session.json")
    }

    fn read_map(&self) -> Map<String, Value> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default()
    }

    fn write_map(&self, map: &Map<String, Value>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(map)?)
    }

    pub fn token(&self) -> Option<String> {
        self.read_map()
            .get(TOKEN_KEY)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    pub fn user(&self) -> Option<UserSummary> {
        self.read_map()
            .get(USER_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn store(&self, token: &str, user: &UserSummary) -> io::Result<()> {
        let mut map = self.read_map();
        map.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        map.insert(
            USER_KEY.to_string(),
            serde_json::to_value(user).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?,
        );
        self.write_map(&map)
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_store() -> SessionStore {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "routesaver-session-test-{}-{}.json",
            std::process::id(),
            n
        ));
        let _ = fs::remove_file(&path);
        SessionStore::new(path)
    }

    fn sample_user() -> UserSummary {
        UserSummary {
            id: "U_TEST01".to_string(),
            name: "Ana".to_string(),
            email: "a@x.com".to_string(),
        }
    }

    #[test]
    fn test_store_and_load_round_trip() {
        let store = temp_store();
        assert!(!store.is_authenticated());

        store.store("tok-123", &sample_user()).unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("tok-123"));
        assert_eq!(store.user(), Some(sample_user()));

        store.clear().unwrap();
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = temp_store();
        store.store("tok-123", &sample_user()).unwrap();

        store.clear().unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(store.user(), None);

        // Clearing an already-clean session is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let store = temp_store();
        if let Some(parent) = store.path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&store.path, "{ not json").unwrap();

        assert_eq!(store.token(), None);
        assert_eq!(store.user(), None);

        store.clear().unwrap();
    }
}
