//! Testing utilities for the breezemoon workspace
//!
//! Shared fixtures: a wired application with known users and sessions, and
//! request builders that attach session cookies and CSRF headers.

#![allow(missing_docs)]

use bm_model::{
    AvatarViewMode, Breezemoon, BreezemoonId, BreezemoonStatus, GuideStep, Role, User, UserId,
};
use bm_server::{App, Router, ServerConfig};
use bm_service::memory::{MemoryStore, MemoryUserService};
use bm_service::{ArticleSummary, CommentSummary, Session, SessionService, SiteData};
use chrono::{Duration, Utc};
use serde_json::Value;
use std::sync::Arc;

pub const TEST_SERVE_PATH: &str = "http://localhost:8080";

pub fn test_config() -> ServerConfig {
    ServerConfig::new().with_serve_path(TEST_SERVE_PATH)
}

pub fn test_site_data() -> SiteData {
    SiteData {
        articles: (1..=8)
            .map(|n| ArticleSummary {
                title: format!("Article {n}"),
                permalink: format!("/article/{n}"),
                view_count: n * 100,
            })
            .collect(),
        tags: vec!["rust".to_string(), "moon".to_string()],
        comments: vec![CommentSummary {
            author_name: "bob".to_string(),
            content: "first".to_string(),
            article_title: "Article 1".to_string(),
        }],
    }
}

/// A stored breezemoon created `minutes_ago` minutes in the past
pub fn stored_breezemoon(author: UserId, content: &str, minutes_ago: i64) -> Breezemoon {
    let at = Utc::now() - Duration::minutes(minutes_ago);
    Breezemoon {
        id: BreezemoonId::new(),
        content: content.to_string(),
        author_id: author,
        ua: "test".to_string(),
        created: at,
        updated: at,
        status: BreezemoonStatus::Valid,
    }
}

/// A wired application with a fixed cast of users
///
/// - `alice`: default role, follows `bob`
/// - `bob`: default role, 404 points, static avatars
/// - `visitor`: visitor role
/// - `newbie`: has not finished the guide
pub struct TestWorld {
    pub store: Arc<MemoryStore>,
    pub users: Arc<MemoryUserService>,
    pub router: Arc<Router>,
    pub alice: User,
    pub bob: User,
    pub visitor: User,
    pub newbie: User,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let app = App::new(config, test_site_data());

        let alice = User::new("alice").with_points(25);
        let bob = User::new("bob")
            .with_points(404)
            .with_avatar("https://img.test/bob.gif", AvatarViewMode::Static);
        let visitor = User::new("visitor").with_role(Role::Visitor);
        let newbie = User::new("newbie").with_guide_step(GuideStep::UploadAvatar);
        for user in [&alice, &bob, &visitor, &newbie] {
            app.store.insert_user(user.clone());
        }
        app.store.follow(alice.id, bob.id);

        Self {
            store: app.store,
            users: app.users,
            router: Arc::new(app.router),
            alice,
            bob,
            visitor,
            newbie,
        }
    }

    /// Open a session for `user`
    ///
    /// # Panics
    /// If the user was never inserted
    pub async fn login(&self, user: &User) -> Session {
        self.users.create(user.id).await.unwrap()
    }

    /// Store a breezemoon directly, bypassing validation
    pub fn post(&self, author: &User, content: &str, minutes_ago: i64) -> BreezemoonId {
        let bm = stored_breezemoon(author.id, content, minutes_ago);
        let id = bm.id;
        self.store.insert_breezemoon(bm);
        id
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Request builder carrying `session`'s cookie and CSRF header
pub fn authed(method: &str, path: &str, session: &Session) -> warp::test::RequestBuilder {
    warp::test::request()
        .method(method)
        .path(path)
        .header("cookie", format!("bm_session={}", session.token))
        .header("csrftoken", session.csrf_token.as_str())
}

/// Parse a warp test response body as JSON
///
/// # Panics
/// If the body is not JSON
pub fn body_json(response: &warp::http::Response<bytes::Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}
