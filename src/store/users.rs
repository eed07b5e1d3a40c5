//! The credential store: one user collection, owned in memory and mirrored to
//! a JSON file.

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::error::{AppError, AppResult};
use crate::models::User;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use super::file::{read_users, write_users};

/// Users loaded from `path`. Every mutation holds the lock across its
/// read-modify-write and the file rewrite, so at most one is in flight.
pub struct UserStore {
    path: PathBuf,
    users: Mutex<Vec<User>>,
}

impl UserStore {
    /// Load the collection at `path`; a missing file yields an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let users = read_users(&path).await?;
        check_unique(&users)?;
        info!(path = %path.display(), count = users.len(), "user store loaded");
        Ok(Self {
            path,
            users: Mutex::new(users),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }

    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        let users = self.users.lock().await;
        users.iter().find(|u| u.email == email).cloned()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<User> {
        let users = self.users.lock().await;
        users.iter().find(|u| u.id == id).cloned()
    }

    /// Create an active user with a fresh id and a salted hash of `password`.
    ///
    /// The returned record still carries the hash; use [`User::public`]
    /// before exposing it.
    pub async fn register(&self, email: &str, password: &str) -> AppResult<User> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == email) {
            warn!(email = %email, "registration rejected: duplicate email");
            return Err(AppError::DuplicateUser(email.to_string()));
        }

        let hash = hash_password_blocking(password).await?;
        let mut user = User::new(email, hash);
        while users.iter().any(|u| u.id == user.id) {
            user.id = Uuid::new_v4();
        }

        let mut next = users.clone();
        next.push(user.clone());
        write_users(&self.path, &next).await?;
        *users = next;

        info!(user_id = %user.id, email = %email, "user registered");
        Ok(user)
    }

    /// `Ok(false)` for an unknown email or a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<bool> {
        let hash = match self.find_by_email(email).await {
            Some(user) => user.password,
            None => return Ok(false),
        };
        let ok = verify_password_blocking(password, &hash).await?;
        if !ok {
            warn!(email = %email, "login rejected: wrong password");
        }
        Ok(ok)
    }

    /// Re-read the file and return the refreshed collection.
    ///
    /// A file whose emails or ids repeat is rejected and the cache kept.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut users = self.users.lock().await;
        let on_disk = read_users(&self.path).await?;
        check_unique(&on_disk)?;
        *users = on_disk;
        Ok(users.clone())
    }

    /// Replace the whole collection and persist it.
    pub async fn persist_users(&self, next: Vec<User>) -> AppResult<()> {
        check_unique(&next)?;
        let mut users = self.users.lock().await;
        write_users(&self.path, &next).await?;
        info!(path = %self.path.display(), count = next.len(), "user store persisted");
        *users = next;
        Ok(())
    }

    /// Persist the in-memory collection as it stands.
    pub async fn save(&self) -> AppResult<()> {
        let users = self.users.lock().await;
        write_users(&self.path, &users).await
    }
}

fn check_unique(users: &[User]) -> AppResult<()> {
    let mut emails = HashSet::new();
    let mut ids = HashSet::new();
    for user in users {
        if !emails.insert(user.email.as_str()) {
            return Err(AppError::DuplicateUser(user.email.clone()));
        }
        if !ids.insert(user.id) {
            return Err(AppError::DuplicateUser(format!("id {}", user.id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::{tempdir, TempDir};
    use tokio_test::{assert_err, assert_ok};

    async fn temp_store() -> (TempDir, UserStore) {
        let dir = tempdir().unwrap();
        let store = UserStore::load(dir.path().join("users.json")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn register_then_login() {
        let (_dir, store) = temp_store().await;

        let user = store.register("a@x.com", "pw1").await.unwrap();
        assert!(!user.id.is_nil());
        assert!(user.active);
        assert_ne!(user.password, "pw1");

        assert!(store.login("a@x.com", "pw1").await.unwrap());
        assert!(!store.login("a@x.com", "wrong").await.unwrap());

        let err = store.register("a@x.com", "pw2").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUser(_)));
    }

    #[tokio::test]
    async fn login_for_unknown_email_is_false() {
        let (_dir, store) = temp_store().await;
        assert!(!store.login("ghost@x.com", "pw").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_register_leaves_file_untouched() {
        let (_dir, store) = temp_store().await;
        store.register("a@x.com", "pw1").await.unwrap();
        let before = std::fs::read(store.path()).unwrap();

        assert_err!(store.register("a@x.com", "pw2").await);

        assert_eq!(std::fs::read(store.path()).unwrap(), before);
        assert_eq!(store.len().await, 1);
        assert!(store.login("a@x.com", "pw1").await.unwrap());
    }

    #[tokio::test]
    async fn registration_survives_reload() {
        let (dir, store) = temp_store().await;
        let user = store.register("a@x.com", "pw1").await.unwrap();

        let reloaded = UserStore::load(dir.path().join("users.json")).await.unwrap();
        assert_eq!(reloaded.find_by_id(user.id).await, Some(user.clone()));
        assert_eq!(reloaded.find_by_email("a@x.com").await, Some(user));
        assert!(reloaded.login("a@x.com", "pw1").await.unwrap());
    }

    #[tokio::test]
    async fn lookups_miss_without_error() {
        let (_dir, store) = temp_store().await;
        assert!(store.is_empty().await);
        assert!(store.find_by_email("nobody@x.com").await.is_none());
        assert!(store.find_by_id(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn corrupt_file_fails_to_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "not json").unwrap();
        let err = UserStore::load(&path).await.err().unwrap();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[tokio::test]
    async fn malformed_stored_hash_surfaces_hash_error() {
        let (_dir, store) = temp_store().await;
        store
            .persist_users(vec![User::new("a@x.com", "garbage")])
            .await
            .unwrap();

        let err = store.login("a@x.com", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::Hash(_)));
    }

    #[tokio::test]
    async fn bcrypt_records_can_log_in() {
        let (_dir, store) = temp_store().await;
        let hash = bcrypt::hash("legacy-pw", 4).unwrap();
        store
            .persist_users(vec![User::new("old@x.com", hash)])
            .await
            .unwrap();
        assert!(store.login("old@x.com", "legacy-pw").await.unwrap());
        assert!(!store.login("old@x.com", "other").await.unwrap());
    }

    #[tokio::test]
    async fn list_users_picks_up_external_writes() {
        let (_dir, store) = temp_store().await;
        store.register("a@x.com", "pw").await.unwrap();

        let mut on_disk = read_users(store.path()).await.unwrap();
        on_disk.push(User::new("b@x.com", "hash"));
        write_users(store.path(), &on_disk).await.unwrap();

        let listed = store.list_users().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(store.find_by_email("b@x.com").await.is_some());
    }

    #[tokio::test]
    async fn failed_write_leaves_collection_unchanged() {
        let (_dir, store) = temp_store().await;
        store.register("a@x.com", "pw1").await.unwrap();

        // A non-empty directory at the target path makes the rename fail.
        std::fs::remove_file(store.path()).unwrap();
        std::fs::create_dir(store.path()).unwrap();
        std::fs::write(store.path().join("keep"), "x").unwrap();

        let err = store.register("b@x.com", "pw2").await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(store.len().await, 1);
        assert!(store.find_by_email("b@x.com").await.is_none());
        assert!(store.find_by_email("a@x.com").await.is_some());
        assert!(!store.path().with_extension("json.tmp").exists());

        let err = store
            .persist_users(vec![User::new("c@x.com", "h")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(store.len().await, 1);
        assert!(store.find_by_email("c@x.com").await.is_none());
    }

    #[tokio::test]
    async fn list_users_rejects_externally_duplicated_emails() {
        let (_dir, store) = temp_store().await;
        store.register("a@x.com", "pw").await.unwrap();

        let on_disk = vec![User::new("dup@x.com", "h1"), User::new("dup@x.com", "h2")];
        write_users(store.path(), &on_disk).await.unwrap();

        let err = store.list_users().await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUser(_)));
        assert_eq!(store.len().await, 1);
        assert!(store.find_by_email("a@x.com").await.is_some());
    }

    #[tokio::test]
    async fn load_rejects_duplicated_emails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let on_disk = vec![User::new("dup@x.com", "h1"), User::new("dup@x.com", "h2")];
        write_users(&path, &on_disk).await.unwrap();

        let err = UserStore::load(&path).await.err().unwrap();
        assert!(matches!(err, AppError::DuplicateUser(_)));
    }

    #[tokio::test]
    async fn persist_users_rejects_duplicates() {
        let (_dir, store) = temp_store().await;
        let a = User::new("a@x.com", "h");
        let mut b = User::new("a@x.com", "h");
        let err = store.persist_users(vec![a.clone(), b.clone()]).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUser(_)));

        b.email = "b@x.com".to_string();
        b.id = a.id;
        let err = store.persist_users(vec![a, b]).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUser(_)));

        assert!(store.is_empty().await);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn save_is_idempotent() {
        let (dir, store) = temp_store().await;
        store.register("a@x.com", "pw").await.unwrap();
        store.register("b@x.com", "pw").await.unwrap();
        let before = read_users(store.path()).await.unwrap();

        let reloaded = UserStore::load(dir.path().join("users.json")).await.unwrap();
        assert_ok!(reloaded.save().await);
        assert_eq!(read_users(store.path()).await.unwrap(), before);
    }

    #[tokio::test]
    async fn concurrent_registrations_are_all_persisted() {
        let (dir, store) = temp_store().await;
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.register(&format!("user{}@x.com", i), "pw").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let on_disk = read_users(&dir.path().join("users.json")).await.unwrap();
        assert_eq!(on_disk.len(), 16);
    }

    #[tokio::test]
    async fn concurrent_registrations_of_one_email_yield_one_user() {
        let (_dir, store) = temp_store().await;
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.register("same@x.com", "pw").await
            }));
        }
        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AppError::DuplicateUser(_)) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }
}
