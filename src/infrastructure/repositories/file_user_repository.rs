use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::errors::DomainError;
use crate::domain::models::user::User;
use crate::domain::repositories::user_repository::UserRepository;
use crate::infrastructure::persistence::file_system::{read_json_file_or_default, write_json_file};

/// Users table kept in a single JSON file
pub struct FileUserRepository {
    users_file: PathBuf,
    cache: Arc<Mutex<Option<Vec<User>>>>,
}

impl FileUserRepository {
    pub fn new(users_file: PathBuf) -> Self {
        Self {
            users_file,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    async fn load_all_users(&self) -> Result<Vec<User>, DomainError> {
        let mut cache = self.cache.lock().await;
        Ok(self.cached_users(&mut cache).await?.clone())
    }

    /// Users held under the caller's cache guard, loading them on first use
    async fn cached_users<'a>(
        &self,
        cache: &'a mut Option<Vec<User>>,
    ) -> Result<&'a mut Vec<User>, DomainError> {
        if cache.is_none() {
            let mut users: Vec<User> = read_json_file_or_default(&self.users_file).await?;
            users.sort_by_key(|user| user.uid);
            tracing::debug!("Loaded {} users from {:?}", users.len(), self.users_file);
            *cache = Some(users);
        }

        Ok(cache.get_or_insert_with(Vec::new))
    }
}

#[async_trait]
impl UserRepository for FileUserRepository {
    async fn find_by_id(&self, uid: u32) -> Result<User, DomainError> {
        self.load_all_users()
            .await?
            .into_iter()
            .find(|user| user.uid == uid)
            .ok_or_else(|| DomainError::NotFound(format!("User not found: {}", uid)))
    }

    async fn find_with_avatar(&self) -> Result<Vec<User>, DomainError> {
        let users = self.load_all_users().await?;
        Ok(users.into_iter().filter(User::has_avatar).collect())
    }

    async fn update_avatar(&self, uid: u32, avatar: &str) -> Result<(), DomainError> {
        let mut cache = self.cache.lock().await;
        let mut users = self.cached_users(&mut cache).await?.clone();

        let user = users
            .iter_mut()
            .find(|user| user.uid == uid)
            .ok_or_else(|| DomainError::NotFound(format!("User not found: {}", uid)))?;
        user.avatar = avatar.to_string();

        write_json_file(&self.users_file, &users).await?;
        *cache = Some(users);

        tracing::debug!("Updated avatar of user {}: {}", uid, avatar);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::random;
    use tokio::fs;

    fn unique_users_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("webpp-users-{}", random::<u64>()))
            .join("users.json")
    }

    async fn seed(path: &PathBuf, users: &[User]) {
        write_json_file(path, &users.to_vec())
            .await
            .expect("seed users file");
    }

    #[tokio::test]
    async fn missing_file_reads_as_no_users() {
        let repository = FileUserRepository::new(unique_users_file());

        let users = repository.find_with_avatar().await.expect("list users");
        assert!(users.is_empty());
        assert!(matches!(
            repository.find_by_id(1).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn find_with_avatar_skips_empty_and_sorts() {
        let path = unique_users_file();
        seed(
            &path,
            &[
                User::new(3, "./uploads/avatars/avatar_3.png"),
                User::new(1, "./uploads/avatars/avatar_1.jpg?dateline=1"),
                User::new(2, ""),
            ],
        )
        .await;
        let repository = FileUserRepository::new(path.clone());

        let uids: Vec<u32> = repository
            .find_with_avatar()
            .await
            .expect("list users")
            .into_iter()
            .map(|user| user.uid)
            .collect();
        assert_eq!(uids, vec![1, 3]);

        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent).await;
        }
    }

    #[tokio::test]
    async fn concurrent_updates_keep_every_write() {
        let path = unique_users_file();
        let users: Vec<User> = (1..=8)
            .map(|uid| User::new(uid, format!("./uploads/avatars/avatar_{}.png", uid)))
            .collect();
        seed(&path, &users).await;
        let repository = Arc::new(FileUserRepository::new(path.clone()));

        let handles: Vec<_> = (1..=8)
            .map(|uid| {
                let repository = repository.clone();
                tokio::spawn(async move {
                    repository
                        .update_avatar(uid, &format!("./uploads/avatars/avatar_{}.webp", uid))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.expect("join update").expect("update avatar");
        }

        let reloaded = FileUserRepository::new(path.clone());
        for uid in 1..=8 {
            let user = reloaded.find_by_id(uid).await.expect("find user");
            assert_eq!(user.avatar, format!("./uploads/avatars/avatar_{}.webp", uid));
        }

        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent).await;
        }
    }

    #[tokio::test]
    async fn update_avatar_persists_to_disk() {
        let path = unique_users_file();
        seed(&path, &[User::new(5, "./uploads/avatars/avatar_5.png")]).await;
        let repository = FileUserRepository::new(path.clone());

        repository
            .update_avatar(5, "./uploads/avatars/avatar_5.webp?dateline=1700000000")
            .await
            .expect("update avatar");

        let reloaded = FileUserRepository::new(path.clone());
        let user = reloaded.find_by_id(5).await.expect("find user");
        assert_eq!(user.avatar, "./uploads/avatars/avatar_5.webp?dateline=1700000000");

        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent).await;
        }
    }
}
