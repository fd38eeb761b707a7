//! Filesystem storage for the session and cached profile.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use duet_core::error::{Error, StorageError};
use duet_core::{AccessToken, RefreshToken, Result, Session, SessionStore, User};

/// On-disk document. Tokens live in one file so a refresh replaces both at
/// once.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
    /// RFC 3339 time of the last write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

impl StoredDocument {
    fn session(&self) -> Option<Session> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Some(Session::new(
                AccessToken::new(access.clone()),
                RefreshToken::new(refresh.clone()),
            )),
            _ => None,
        }
    }
}

/// A session store backed by a single JSON file.
///
/// Writes go to a uniquely named sibling file which is then renamed over the
/// store file, under an exclusive lock on `<file>.lock`. On Unix the file is
/// readable by its owner only.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store at the given file path. Nothing is written until the
    /// first [`SessionStore::set`].
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
        .into()
    }

    /// Take the exclusive lock, creating parent directories as needed.
    /// The lock is released when the returned file is dropped.
    fn lock(&self) -> Result<File> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| self.io_error(e))?;

        lock_file.lock_exclusive().map_err(|e| self.io_error(e))?;
        Ok(lock_file)
    }

    fn read_document(&self) -> Result<StoredDocument> {
        if !self.path.exists() {
            return Ok(StoredDocument::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(StoredDocument::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            StorageError::Corrupt {
                path: self.path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    fn write_document(&self, doc: &mut StoredDocument) -> Result<()> {
        doc.updated_at = Some(Utc::now().to_rfc3339());

        let content = serde_json::to_string_pretty(doc).map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut tmp_name = self.path.as_os_str().to_os_string();
        tmp_name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = create_private(&tmp_path).map_err(|e| self.io_error(e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.io_error(e));
        }

        Ok(())
    }

    /// Read-modify-write under the lock. `apply` returns false to leave the
    /// file untouched.
    fn update(&self, apply: impl FnOnce(&mut StoredDocument) -> bool) -> Result<bool> {
        let lock = self.lock()?;
        let mut doc = self.read_document()?;
        let result = if apply(&mut doc) {
            self.write_document(&mut doc).map(|()| true)
        } else {
            Ok(false)
        };
        lock.unlock().map_err(|e| self.io_error(e))?;
        result
    }
}

#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .create_new(true)
        .write(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create_new(true).write(true).open(path)
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self) -> Result<Option<Session>> {
        Ok(self.read_document()?.session())
    }

    #[instrument(skip(self, session), fields(path = %self.path.display()))]
    async fn set(&self, session: &Session) -> Result<()> {
        self.update(|doc| {
            doc.access_token = Some(session.access_token().as_str().to_string());
            doc.refresh_token = Some(session.refresh_token().as_str().to_string());
            true
        })?;
        debug!("Saved session");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn clear(&self) -> Result<()> {
        let lock = self.lock()?;
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| self.io_error(e))?;
        }
        lock.unlock().map_err(|e| self.io_error(e))?;
        debug!("Removed session file");
        Ok(())
    }

    async fn get_profile(&self) -> Result<Option<User>> {
        Ok(self.read_document()?.user)
    }

    #[instrument(skip(self, user), fields(path = %self.path.display(), user_id = user.id))]
    async fn set_profile(&self, user: &User) -> Result<()> {
        let cached = self.update(|doc| {
            if doc.session().is_none() {
                return false;
            }
            doc.user = Some(user.clone());
            true
        })?;
        if cached {
            debug!("Cached user profile");
        } else {
            debug!("No session stored; profile not cached");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(access: &str, refresh: &str) -> Session {
        Session::new(AccessToken::new(access), RefreshToken::new(refresh))
    }

    fn user() -> User {
        User {
            id: 42,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            nickname: "Al".to_string(),
            avatar_url: Some("https://cdn.example.com/a.png".to_string()),
            bio: None,
            created_at: "2024-02-14T08:00:00".to_string(),
        }
    }

    fn store_in(dir: &TempDir) -> FileSessionStore {
        FileSessionStore::new(dir.path().join("nested").join("session.json"))
    }

    #[tokio::test]
    async fn missing_file_means_no_session() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.get().await.unwrap().is_none());
        assert!(store.get_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn session_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        store_in(&dir).set(&session("a1", "r1")).await.unwrap();

        let reopened = store_in(&dir);
        let stored = reopened.get().await.unwrap().unwrap();
        assert_eq!(stored.access_token().as_str(), "a1");
        assert_eq!(stored.refresh_token().as_str(), "r1");
    }

    #[tokio::test]
    async fn set_keeps_cached_profile() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set(&session("a1", "r1")).await.unwrap();
        store.set_profile(&user()).await.unwrap();
        store.set(&session("a2", "r2")).await.unwrap();

        assert_eq!(store.get_profile().await.unwrap(), Some(user()));
        assert_eq!(store.get().await.unwrap(), Some(session("a2", "r2")));
    }

    #[tokio::test]
    async fn clear_leaves_nothing_retrievable() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set(&session("a1", "r1")).await.unwrap();
        store.set_profile(&user()).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.get().await.unwrap().is_none());
        assert!(store.get_profile().await.unwrap().is_none());
        assert!(!store.path().exists());

        // Clearing twice is fine.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn profile_without_session_is_not_written() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set(&session("a1", "r1")).await.unwrap();
        store.clear().await.unwrap();
        store.set_profile(&user()).await.unwrap();

        assert!(!store.path().exists());
        assert!(store.get_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set(&session("a1", "r1")).await.unwrap();
        store.set(&session("a2", "r2")).await.unwrap();

        let leftovers: Vec<_> = fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        let err = store.get().await.unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn half_written_pair_is_not_a_session() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"access_token":"a1"}"#).unwrap();

        assert!(store.get().await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(&session("a1", "r1")).await.unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
