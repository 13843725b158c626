use async_trait::async_trait;

use crate::domain::errors::DomainError;
use crate::domain::models::user::User;

/// Access to the stored avatar reference of each forum user
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, uid: u32) -> Result<User, DomainError>;

    /// Users whose avatar is non-empty, ordered by uid
    async fn find_with_avatar(&self) -> Result<Vec<User>, DomainError>;

    async fn update_avatar(&self, uid: u32, avatar: &str) -> Result<(), DomainError>;
}
