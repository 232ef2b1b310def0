//! In-memory implementations of the collaborator services
//!
//! [`MemoryStore`] owns every table; the services are thin views over a
//! shared `Arc<MemoryStore>`:
//! - [`MemoryBreezemoonService`] - query + management
//! - [`MemoryUserService`] - users, follows, sessions

use crate::error::{ServiceError, ServiceResult};
use crate::mgmt::{validate_content, BreezemoonMgmtService, DEFAULT_MAX_CONTENT_LEN};
use crate::query::BreezemoonQueryService;
use crate::user::{FollowQueryService, Session, SessionService, UserQueryService};
use async_trait::async_trait;
use bm_model::pagination::DEFAULT_WINDOW_SIZE;
use bm_model::{
    AvatarViewMode, Breezemoon, BreezemoonDraft, BreezemoonId, BreezemoonPage, BreezemoonStatus,
    BreezemoonUpdate, BreezemoonView, Pagination, User, UserId,
};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Shared in-memory tables
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<UserId, User>,
    breezemoons: DashMap<BreezemoonId, Breezemoon>,
    sessions: DashMap<String, Session>,
    /// follower -> followees
    follows: RwLock<HashMap<UserId, HashSet<UserId>>>,
}

impl MemoryStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user
    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    #[must_use]
    pub fn user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|u| u.value().clone())
    }

    /// Record that `follower` follows `followee`
    pub fn follow(&self, follower: UserId, followee: UserId) {
        self.follows.write().entry(follower).or_default().insert(followee);
    }

    #[must_use]
    pub fn following(&self, follower: UserId) -> Vec<UserId> {
        self.follows
            .read()
            .get(&follower)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Insert or replace a breezemoon as-is (no validation)
    pub fn insert_breezemoon(&self, breezemoon: Breezemoon) {
        self.breezemoons.insert(breezemoon.id, breezemoon);
    }

    #[must_use]
    pub fn breezemoon(&self, id: BreezemoonId) -> Option<Breezemoon> {
        self.breezemoons.get(&id).map(|b| b.value().clone())
    }

    #[must_use]
    pub fn breezemoon_count(&self) -> usize {
        self.breezemoons.len()
    }

    /// Valid breezemoons matching `filter`, newest first
    fn valid_breezemoons<F>(&self, filter: F) -> Vec<Breezemoon>
    where
        F: Fn(&Breezemoon) -> bool,
    {
        let mut found: Vec<Breezemoon> = self
            .breezemoons
            .iter()
            .filter(|entry| entry.is_valid() && filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));
        found
    }

    fn insert_session(&self, session: Session) {
        self.sessions.insert(session.token.clone(), session);
    }

    fn session(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).map(|s| s.value().clone())
    }
}

/// Breezemoon query and management over a [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct MemoryBreezemoonService {
    store: Arc<MemoryStore>,
    max_content_len: usize,
    window_size: usize,
}

impl MemoryBreezemoonService {
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            max_content_len: DEFAULT_MAX_CONTENT_LEN,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    /// With content limit in characters
    #[inline]
    #[must_use]
    pub fn with_max_content_len(mut self, max: usize) -> Self {
        self.max_content_len = max;
        self
    }

    /// With pagination window size
    #[inline]
    #[must_use]
    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Project breezemoons whose author still exists
    fn views(&self, breezemoons: &[Breezemoon], mode: AvatarViewMode) -> Vec<BreezemoonView> {
        let now = Utc::now();
        breezemoons
            .iter()
            .filter_map(|bm| match self.store.user(bm.author_id) {
                Some(author) => Some(BreezemoonView::new(bm, &author, mode, now)),
                None => {
                    tracing::warn!(
                        breezemoon_id = %bm.id,
                        author_id = %bm.author_id,
                        "Skipping breezemoon with unknown author"
                    );
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl BreezemoonQueryService for MemoryBreezemoonService {
    async fn get_following_user_breezemoons(
        &self,
        avatar_view_mode: AvatarViewMode,
        user_id: UserId,
        page_num: usize,
        page_size: usize,
    ) -> ServiceResult<Vec<BreezemoonView>> {
        let following: HashSet<UserId> = self.store.following(user_id).into_iter().collect();
        if following.is_empty() {
            return Ok(Vec::new());
        }

        let all = self
            .store
            .valid_breezemoons(|bm| following.contains(&bm.author_id));
        let pagination = Pagination::paginate(page_num, page_size, all.len(), self.window_size);

        Ok(self.views(pagination.slice(&all), avatar_view_mode))
    }

    async fn get_breezemoons(
        &self,
        avatar_view_mode: AvatarViewMode,
        author_id: Option<UserId>,
        page_num: usize,
        page_size: usize,
    ) -> ServiceResult<BreezemoonPage> {
        let all = self
            .store
            .valid_breezemoons(|bm| author_id.map_or(true, |id| bm.author_id == id));
        let pagination = Pagination::paginate(page_num, page_size, all.len(), self.window_size);
        let breezemoons = self.views(pagination.slice(&all), avatar_view_mode);

        Ok(BreezemoonPage {
            pagination,
            breezemoons,
        })
    }

    async fn get_breezemoon(&self, id: BreezemoonId) -> ServiceResult<Option<Breezemoon>> {
        Ok(self.store.breezemoon(id))
    }

    async fn get_breezemoon_view(
        &self,
        avatar_view_mode: AvatarViewMode,
        id: BreezemoonId,
    ) -> ServiceResult<Option<BreezemoonView>> {
        let Some(bm) = self.store.breezemoon(id).filter(Breezemoon::is_valid) else {
            return Ok(None);
        };
        Ok(self.views(std::slice::from_ref(&bm), avatar_view_mode).pop())
    }
}

#[async_trait]
impl BreezemoonMgmtService for MemoryBreezemoonService {
    async fn add_breezemoon(&self, draft: BreezemoonDraft) -> ServiceResult<BreezemoonId> {
        let content = validate_content(&draft.content, self.max_content_len)?;
        if self.store.user(draft.author_id).is_none() {
            return Err(ServiceError::UserNotFound(draft.author_id.to_string()));
        }

        let now = Utc::now();
        let breezemoon = Breezemoon {
            id: BreezemoonId::new(),
            content,
            author_id: draft.author_id,
            ua: draft.ua,
            created: now,
            updated: now,
            status: BreezemoonStatus::Valid,
        };
        let id = breezemoon.id;
        self.store.insert_breezemoon(breezemoon);

        tracing::info!(breezemoon_id = %id, author_id = %draft.author_id, "Breezemoon added");
        Ok(id)
    }

    async fn update_breezemoon(&self, update: BreezemoonUpdate) -> ServiceResult<()> {
        let content = validate_content(&update.content, self.max_content_len)?;

        let mut entry = self
            .store
            .breezemoons
            .get_mut(&update.id)
            .ok_or_else(|| ServiceError::NotFound(update.id.to_string()))?;
        if entry.author_id != update.author_id {
            return Err(ServiceError::NotAuthor);
        }

        entry.content = content;
        entry.ua = update.ua;
        entry.updated = Utc::now();
        drop(entry);

        tracing::info!(breezemoon_id = %update.id, "Breezemoon updated");
        Ok(())
    }

    async fn remove_breezemoon(&self, id: BreezemoonId) -> ServiceResult<()> {
        self.store
            .breezemoons
            .remove(&id)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;

        tracing::info!(breezemoon_id = %id, "Breezemoon removed");
        Ok(())
    }
}

/// Users, follows and sessions over a [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct MemoryUserService {
    store: Arc<MemoryStore>,
}

impl MemoryUserService {
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserQueryService for MemoryUserService {
    async fn get_user(&self, id: UserId) -> ServiceResult<Option<User>> {
        Ok(self.store.user(id))
    }
}

#[async_trait]
impl FollowQueryService for MemoryUserService {
    async fn following_user_ids(&self, id: UserId) -> ServiceResult<Vec<UserId>> {
        Ok(self.store.following(id))
    }
}

#[async_trait]
impl SessionService for MemoryUserService {
    async fn resolve(&self, token: &str) -> ServiceResult<Option<Session>> {
        Ok(self.store.session(token))
    }

    async fn create(&self, user_id: UserId) -> ServiceResult<Session> {
        if self.store.user(user_id).is_none() {
            return Err(ServiceError::UserNotFound(user_id.to_string()));
        }

        let session = Session::generate(user_id);
        self.store.insert_session(session.clone());
        tracing::debug!(user_id = %user_id, "Session created");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn setup() -> (Arc<MemoryStore>, MemoryBreezemoonService, User, User) {
        let store = Arc::new(MemoryStore::new());
        let alice = User::new("alice").with_points(25);
        let bob = User::new("bob").with_points(404);
        store.insert_user(alice.clone());
        store.insert_user(bob.clone());
        let service = MemoryBreezemoonService::new(Arc::clone(&store));
        (store, service, alice, bob)
    }

    fn stored(author: UserId, content: &str, minutes_ago: i64) -> Breezemoon {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        Breezemoon {
            id: BreezemoonId::new(),
            content: content.to_string(),
            author_id: author,
            ua: String::new(),
            created: at,
            updated: at,
            status: BreezemoonStatus::Valid,
        }
    }

    #[tokio::test]
    async fn add_and_list() {
        let (_, service, alice, _) = setup();

        let id = service
            .add_breezemoon(BreezemoonDraft::new("  hello  ", alice.id, "test-ua"))
            .await
            .unwrap();

        let page = service
            .get_breezemoons(AvatarViewMode::Original, None, 1, 10)
            .await
            .unwrap();
        assert_eq!(page.pagination.record_count, 1);
        assert_eq!(page.breezemoons[0].id, id);
        assert_eq!(page.breezemoons[0].content, "hello");
        assert_eq!(page.breezemoons[0].author_color, "111999");
        assert_eq!(page.breezemoons[0].ua, "test-ua");
    }

    #[tokio::test]
    async fn add_rejects_blank_and_unknown_author() {
        let (_, service, alice, _) = setup();

        let err = service
            .add_breezemoon(BreezemoonDraft::new("   ", alice.id, ""))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::ContentEmpty);

        let err = service
            .add_breezemoon(BreezemoonDraft::new("hi", UserId::new(), ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn add_respects_max_content_len() {
        let (store, _, alice, _) = setup();
        let service = MemoryBreezemoonService::new(store).with_max_content_len(3);

        let err = service
            .add_breezemoon(BreezemoonDraft::new("four", alice.id, ""))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::ContentTooLong { max: 3, actual: 4 });
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_paginated() {
        let (store, service, alice, _) = setup();
        for (i, minutes_ago) in [30, 10, 20].into_iter().enumerate() {
            store.insert_breezemoon(stored(alice.id, &format!("bm{i}"), minutes_ago));
        }

        let page = service
            .get_breezemoons(AvatarViewMode::Original, None, 1, 2)
            .await
            .unwrap();
        let contents: Vec<_> = page.breezemoons.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, vec!["bm1", "bm2"]);
        assert_eq!(page.pagination.page_count, 2);

        let page = service
            .get_breezemoons(AvatarViewMode::Original, None, 2, 2)
            .await
            .unwrap();
        assert_eq!(page.breezemoons.len(), 1);
        assert_eq!(page.breezemoons[0].content, "bm0");
    }

    #[tokio::test]
    async fn listing_hides_invalid_and_filters_author() {
        let (store, service, alice, bob) = setup();
        let mut hidden = stored(alice.id, "hidden", 1);
        hidden.status = BreezemoonStatus::Invalid;
        store.insert_breezemoon(hidden.clone());
        store.insert_breezemoon(stored(alice.id, "alice", 2));
        store.insert_breezemoon(stored(bob.id, "bob", 3));

        let page = service
            .get_breezemoons(AvatarViewMode::Original, Some(bob.id), 1, 10)
            .await
            .unwrap();
        assert_eq!(page.breezemoons.len(), 1);
        assert_eq!(page.breezemoons[0].author_name, "bob");

        let all = service
            .get_breezemoons(AvatarViewMode::Original, None, 1, 10)
            .await
            .unwrap();
        assert_eq!(all.pagination.record_count, 2);

        assert!(service.get_breezemoon(hidden.id).await.unwrap().is_some());
        assert!(service
            .get_breezemoon_view(AvatarViewMode::Original, hidden.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn following_feed_only_has_followees() {
        let (store, service, alice, bob) = setup();
        store.insert_breezemoon(stored(alice.id, "mine", 1));
        store.insert_breezemoon(stored(bob.id, "bobs", 2));

        let feed = service
            .get_following_user_breezemoons(AvatarViewMode::Original, alice.id, 1, 10)
            .await
            .unwrap();
        assert!(feed.is_empty());

        store.follow(alice.id, bob.id);
        let feed = service
            .get_following_user_breezemoons(AvatarViewMode::Original, alice.id, 1, 10)
            .await
            .unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].content, "bobs");
    }

    #[tokio::test]
    async fn update_checks_author_and_existence() {
        let (store, service, alice, bob) = setup();
        let bm = stored(alice.id, "before", 5);
        store.insert_breezemoon(bm.clone());

        let err = service
            .update_breezemoon(BreezemoonUpdate {
                id: bm.id,
                content: "hijack".into(),
                author_id: bob.id,
                ua: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::NotAuthor);

        let err = service
            .update_breezemoon(BreezemoonUpdate {
                id: BreezemoonId::new(),
                content: "x".into(),
                author_id: alice.id,
                ua: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        service
            .update_breezemoon(BreezemoonUpdate {
                id: bm.id,
                content: "after".into(),
                author_id: alice.id,
                ua: "ua2".into(),
            })
            .await
            .unwrap();
        let updated = store.breezemoon(bm.id).unwrap();
        assert_eq!(updated.content, "after");
        assert_eq!(updated.ua, "ua2");
        assert!(updated.updated > updated.created);
    }

    #[tokio::test]
    async fn remove_unknown_is_not_found() {
        let (store, service, alice, _) = setup();
        let bm = stored(alice.id, "bye", 1);
        store.insert_breezemoon(bm.clone());

        service.remove_breezemoon(bm.id).await.unwrap();
        assert_eq!(store.breezemoon_count(), 0);

        let err = service.remove_breezemoon(bm.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn sessions_resolve_after_create() {
        let store = Arc::new(MemoryStore::new());
        let user = User::new("carol");
        store.insert_user(user.clone());
        let users = MemoryUserService::new(store);

        tokio_test::block_on(async {
            let session = users.create(user.id).await.unwrap();
            let resolved = users.resolve(&session.token).await.unwrap();
            assert_eq!(resolved, Some(session));
            assert_eq!(users.resolve("unknown").await.unwrap(), None);
            assert!(users.create(UserId::new()).await.is_err());
            assert_eq!(users.get_user(user.id).await.unwrap().map(|u| u.name), Some("carol".to_string()));
        });
    }
}
