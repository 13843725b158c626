use serde::{Deserialize, Serialize};

use crate::domain::models::avatar::AvatarReference;

/// Forum user row as far as avatars are concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: u32,
    /// Stored avatar reference, empty when no avatar is set
    #[serde(default)]
    pub avatar: String,
}

impl User {
    pub fn new(uid: u32, avatar: impl Into<String>) -> Self {
        Self {
            uid,
            avatar: avatar.into(),
        }
    }

    pub fn has_avatar(&self) -> bool {
        !self.avatar.is_empty()
    }

    pub fn avatar_reference(&self) -> AvatarReference {
        AvatarReference::parse(&self.avatar)
    }
}
