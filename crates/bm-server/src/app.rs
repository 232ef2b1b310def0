//! Application wiring
//!
//! Builds the in-memory services, the breezemoon processor and the router
//! from a [`ServerConfig`]. Every collaborator is constructed here and
//! passed down explicitly.

use crate::config::ServerConfig;
use crate::processor::BreezemoonProcessor;
use crate::router::{Router, SessionResolver};
use bm_model::{AvatarViewMode, BreezemoonDraft, GuideStep, Role, User};
use bm_service::memory::{MemoryBreezemoonService, MemoryStore, MemoryUserService};
use bm_service::{
    ArticleSummary, BreezemoonMgmtService, CommentSummary, ServiceResult, Session, SessionService,
    SiteData, SiteDataModelService,
};
use std::sync::Arc;

/// A wired application
#[derive(Debug)]
pub struct App {
    pub config: ServerConfig,
    pub store: Arc<MemoryStore>,
    pub breezemoons: Arc<MemoryBreezemoonService>,
    pub users: Arc<MemoryUserService>,
    pub router: Router,
}

impl App {
    /// Wire services and routes over a fresh store
    #[must_use]
    pub fn new(config: ServerConfig, site: SiteData) -> Self {
        let store = Arc::new(MemoryStore::new());
        let breezemoons = Arc::new(
            MemoryBreezemoonService::new(Arc::clone(&store))
                .with_max_content_len(config.max_breezemoon_len)
                .with_window_size(config.pagination_window_size),
        );
        let users = Arc::new(MemoryUserService::new(Arc::clone(&store)));
        let data_model = Arc::new(
            SiteDataModelService::new(site, config.serve_path())
                .with_static_resource_version(config.static_resource_version.clone()),
        );

        let processor = Arc::new(BreezemoonProcessor::new(
            breezemoons.clone(),
            breezemoons.clone(),
            data_model,
            config.clone(),
        ));

        let mut router =
            Router::new().with_sessions(SessionResolver::new(users.clone(), users.clone()));
        processor.register(&mut router);

        tracing::debug!(routes = ?router.route_names(), "Application wired");
        Self {
            config,
            store,
            breezemoons,
            users,
            router,
        }
    }

    /// Populate demo users, follows and breezemoons
    ///
    /// Returns a session for the demo admin.
    ///
    /// # Errors
    /// Propagates service failures while seeding
    pub async fn seed_demo(&self) -> ServiceResult<Session> {
        let admin = User::new("admin")
            .with_role(Role::Admin)
            .with_points(1_043_562)
            .with_list_page_size(10);
        let moon = User::new("moon")
            .with_points(404)
            .with_avatar("https://img.example.com/moon.gif", AvatarViewMode::Original);
        let visitor = User::new("visitor").with_role(Role::Visitor);
        let newbie = User::new("newbie").with_guide_step(GuideStep::FollowTags);

        for user in [&admin, &moon, &visitor, &newbie] {
            self.store.insert_user(user.clone());
        }
        self.store.follow(admin.id, moon.id);

        for (author, content) in [
            (&moon, "First breezemoon of the night"),
            (&moon, "**Bold** moves under a _quiet_ moon"),
            (&admin, "Welcome to the watch page"),
        ] {
            self.breezemoons
                .add_breezemoon(BreezemoonDraft::new(content, author.id, "bm-server/demo"))
                .await?;
        }

        let session = self.users.create(admin.id).await?;
        tracing::info!(user = %admin.name, "Demo data seeded");
        Ok(session)
    }
}

/// Side panel content used by the demo server
#[must_use]
pub fn demo_site_data() -> SiteData {
    let article = |title: &str, slug: &str, view_count| ArticleSummary {
        title: title.to_string(),
        permalink: format!("/article/{slug}"),
        view_count,
    };

    SiteData {
        articles: vec![
            article("Getting started", "getting-started", 1_204),
            article("Markdown cheatsheet", "markdown", 877),
            article("Community guidelines", "guidelines", 3_310),
            article("Release notes", "release-notes", 412),
        ],
        tags: ["rust", "life", "music", "moon"]
            .into_iter()
            .map(String::from)
            .collect(),
        comments: vec![CommentSummary {
            author_name: "moon".to_string(),
            content: "Nice write-up".to_string(),
            article_title: "Getting started".to_string(),
        }],
    }
}
