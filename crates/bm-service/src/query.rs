//! Breezemoon query service

use crate::error::ServiceResult;
use async_trait::async_trait;
use bm_model::{AvatarViewMode, Breezemoon, BreezemoonId, BreezemoonPage, BreezemoonView, UserId};

/// Read side of breezemoons
///
/// Listings contain valid breezemoons only, newest first.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait BreezemoonQueryService: Send + Sync {
    /// Breezemoons written by the users `user_id` follows
    async fn get_following_user_breezemoons(
        &self,
        avatar_view_mode: AvatarViewMode,
        user_id: UserId,
        page_num: usize,
        page_size: usize,
    ) -> ServiceResult<Vec<BreezemoonView>>;

    /// All breezemoons, or one author's when `author_id` is set
    async fn get_breezemoons(
        &self,
        avatar_view_mode: AvatarViewMode,
        author_id: Option<UserId>,
        page_num: usize,
        page_size: usize,
    ) -> ServiceResult<BreezemoonPage>;

    /// Single breezemoon by id, whatever its status
    async fn get_breezemoon(&self, id: BreezemoonId) -> ServiceResult<Option<Breezemoon>>;

    /// Listing projection of a single breezemoon
    async fn get_breezemoon_view(
        &self,
        avatar_view_mode: AvatarViewMode,
        id: BreezemoonId,
    ) -> ServiceResult<Option<BreezemoonView>>;
}
