//! Users, follows and sessions

use crate::error::ServiceResult;
use async_trait::async_trait;
use bm_model::{User, UserId};
use serde::{Deserialize, Serialize};

/// A logged-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque session token (cookie value)
    pub token: String,
    pub user_id: UserId,
    /// Token expected in the `csrftoken` header of mutating requests
    pub csrf_token: String,
}

impl Session {
    /// Create a session with fresh random tokens
    #[must_use]
    pub fn generate(user_id: UserId) -> Self {
        Self {
            token: random_token(),
            user_id,
            csrf_token: random_token(),
        }
    }
}

/// 128 random bits as 32 hex characters
fn random_token() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait UserQueryService: Send + Sync {
    async fn get_user(&self, id: UserId) -> ServiceResult<Option<User>>;
}

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait FollowQueryService: Send + Sync {
    /// Ids of the users `id` follows
    async fn following_user_ids(&self, id: UserId) -> ServiceResult<Vec<UserId>>;
}

/// Session lookup and creation
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Resolve a session token; unknown tokens resolve to `None`
    async fn resolve(&self, token: &str) -> ServiceResult<Option<Session>>;

    /// Open a new session for a user
    ///
    /// # Errors
    /// `ServiceError::UserNotFound` if the user is unknown
    async fn create(&self, user_id: UserId) -> ServiceResult<Session>;
}
