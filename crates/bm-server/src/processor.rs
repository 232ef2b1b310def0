//! Breezemoon processor
//!
//! Request handlers for breezemoons:
//! - Shows watched breezemoons (`/watch/bm`, GET)
//! - Adds a breezemoon (`/bm`, POST)
//! - Updates a breezemoon (`/bm/{id}`, PUT)
//! - Removes a breezemoon (`/bm/{id}`, DELETE)
//! - Shows a breezemoon (`/bm/{id}`, GET)
//!
//! Mutating requests take a JSON body `{"breezemoonContent": "..."}` and
//! answer with the `sc` status envelope. Collaborators are passed to
//! [`BreezemoonProcessor::new`]; advices are composed in [`BreezemoonProcessor::register`].

use crate::advice::{
    AdviceChain, AnonymousViewCheck, CsrfCheck, Handler, LoginCheck, PermissionCheck,
    PermissionGrant, StopwatchEnd, StopwatchStart,
};
use crate::config::ServerConfig;
use crate::context::{RequestContext, USER_AGENT_HEADER};
use crate::response::Response;
use crate::router::Router;
use bm_model::{
    keys, BreezemoonDraft, BreezemoonId, BreezemoonUpdate, BreezemoonView, DataModel, Permission,
    BREEZEMOON_CONTENT,
};
use bm_service::{
    BreezemoonMgmtService, BreezemoonQueryService, DataModelService, RequestMeta, ServiceResult,
};
use futures::FutureExt;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use warp::http::{Method, StatusCode};

/// Template rendered by the watch page
pub const WATCH_TEMPLATE: &str = "breezemoon.ftl";

/// Page number from the `p` query parameter; anything but digits means 1
#[must_use]
pub fn parse_page_num(raw: Option<&str>) -> usize {
    match raw {
        Some(p) if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) => p
            .parse::<u32>()
            .ok()
            .and_then(|n| usize::try_from(n).ok())
            .map_or(1, |n| n.max(1)),
        _ => 1,
    }
}

/// Part of `path` after the first `/watch`, or empty
fn substring_after_watch(path: &str) -> &str {
    path.split_once("/watch").map_or("", |(_, rest)| rest)
}

/// Breezemoon request handlers
pub struct BreezemoonProcessor {
    query: Arc<dyn BreezemoonQueryService>,
    mgmt: Arc<dyn BreezemoonMgmtService>,
    data_model: Arc<dyn DataModelService>,
    config: ServerConfig,
}

impl BreezemoonProcessor {
    #[must_use]
    pub fn new(
        query: Arc<dyn BreezemoonQueryService>,
        mgmt: Arc<dyn BreezemoonMgmtService>,
        data_model: Arc<dyn DataModelService>,
        config: ServerConfig,
    ) -> Self {
        Self {
            query,
            mgmt,
            data_model,
            config,
        }
    }

    /// Register every breezemoon route with its advice chain
    pub fn register(self: Arc<Self>, router: &mut Router) {
        let stopwatch_start = Arc::new(StopwatchStart);
        let stopwatch_end = Arc::new(StopwatchEnd);
        let anonymous_view = Arc::new(AnonymousViewCheck::new(
            self.config.allow_anonymous_view,
            self.config.serve_path(),
        ));

        let write_chain = |permission: Permission| {
            AdviceChain::new()
                .before(stopwatch_start.clone())
                .before(Arc::new(LoginCheck))
                .before(Arc::new(CsrfCheck))
                .before(Arc::new(PermissionCheck::new(permission)))
                .after(stopwatch_end.clone())
        };

        let watch_chain = AdviceChain::new()
            .before(stopwatch_start.clone())
            .before(anonymous_view.clone())
            .after(Arc::new(PermissionGrant))
            .after(stopwatch_end.clone());

        let show_chain = AdviceChain::new()
            .before(stopwatch_start.clone())
            .before(anonymous_view)
            .after(stopwatch_end.clone());

        router.route(
            Method::GET,
            "/watch/bm",
            "showWatchBreezemoon",
            watch_chain,
            handler(&self, |p, ctx| async move { p.show_watch_breezemoon(ctx).await }),
        );
        router.route(
            Method::POST,
            "/bm",
            "addBreezemoon",
            write_chain(Permission::AddBreezemoon),
            handler(&self, |p, ctx| async move { p.add_breezemoon(ctx).await }),
        );
        router.route(
            Method::PUT,
            "/bm/{id}",
            "updateBreezemoon",
            write_chain(Permission::UpdateBreezemoon),
            handler(&self, |p, ctx| async move { p.update_breezemoon(ctx).await }),
        );
        router.route(
            Method::DELETE,
            "/bm/{id}",
            "removeBreezemoon",
            write_chain(Permission::RemoveBreezemoon),
            handler(&self, |p, ctx| async move { p.remove_breezemoon(ctx).await }),
        );
        router.route(
            Method::GET,
            "/bm/{id}",
            "showBreezemoon",
            show_chain,
            handler(&self, |p, ctx| async move { p.show_breezemoon(ctx).await }),
        );
    }

    /// Shows the watch page: followed users' breezemoons, or everyone's
    pub async fn show_watch_breezemoon(&self, ctx: RequestContext) -> RequestContext {
        let page_num = parse_page_num(ctx.request.query_param("p"));
        let mode = ctx.avatar_view_mode;
        let mut page_size = self.config.index_articles_cnt;
        let mut breezemoons: Vec<BreezemoonView> = Vec::new();

        if let Some(user) = ctx.user.clone() {
            if user.list_page_size > 0 {
                page_size = user.list_page_size;
            }

            if !user.finished_guide() {
                let location = format!("{}/guide", self.config.serve_path());
                return ctx.respond(Response::redirect(location));
            }

            match self
                .query
                .get_following_user_breezemoons(mode, user.id, page_num, page_size)
                .await
            {
                Ok(found) => breezemoons = found,
                Err(e) => tracing::warn!(user_id = %user.id, error = %e, "Following feed failed"),
            }
        }

        let mut data_model = DataModel::new();
        if breezemoons.is_empty() {
            match self.query.get_breezemoons(mode, None, page_num, page_size).await {
                Ok(page) => {
                    breezemoons = page.breezemoons;
                    data_model.put(keys::PAGINATION, page.pagination);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Listing breezemoons failed");
                    return ctx.respond(Response::err_status(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        e.to_string(),
                    ));
                }
            }
        }
        data_model.put(keys::WATCHING_BREEZEMOONS, &breezemoons);

        let meta = RequestMeta {
            path: ctx.request.path.clone(),
            user: ctx.user.clone(),
            csrf_token: ctx.session.as_ref().map(|s| s.csrf_token.clone()),
        };
        if let Err(e) = self.fill_common(&meta, &mut data_model).await {
            tracing::error!(error = %e, "Filling page data model failed");
            return ctx.respond(Response::err_status(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ));
        }

        data_model.put(keys::SELECTED, keys::WATCH);
        data_model.put(keys::CURRENT, substring_after_watch(&ctx.request.path));

        ctx.respond(Response::page(WATCH_TEMPLATE, data_model))
    }

    async fn fill_common(&self, meta: &RequestMeta, data_model: &mut DataModel) -> ServiceResult<()> {
        self.data_model.fill_header_and_footer(meta, data_model).await?;
        self.data_model.fill_random_articles(data_model).await?;
        self.data_model.fill_side_hot_articles(data_model).await?;
        self.data_model.fill_side_tags(data_model).await?;
        self.data_model.fill_latest_cmts(data_model).await
    }

    /// Adds a breezemoon for the current user
    pub async fn add_breezemoon(&self, ctx: RequestContext) -> RequestContext {
        let Some(author_id) = ctx.user.as_ref().map(|u| u.id) else {
            return ctx.respond(Response::err_status(StatusCode::UNAUTHORIZED, "Unauthenticated"));
        };

        let draft = BreezemoonDraft::new(
            ctx.request.json_str(BREEZEMOON_CONTENT).unwrap_or_default(),
            author_id,
            ctx.request.header(USER_AGENT_HEADER).unwrap_or_default(),
        );

        let response = match self.mgmt.add_breezemoon(draft).await {
            Ok(_) => Response::succ(),
            Err(e) => Response::err(e.to_string()),
        };
        ctx.respond(response)
    }

    /// Updates the `{id}` breezemoon's content
    pub async fn update_breezemoon(&self, ctx: RequestContext) -> RequestContext {
        let Some(author_id) = ctx.user.as_ref().map(|u| u.id) else {
            return ctx.respond(Response::err_status(StatusCode::UNAUTHORIZED, "Unauthenticated"));
        };
        let id = match path_id(&ctx) {
            Ok(id) => id,
            Err(msg) => return ctx.respond(Response::err(msg)),
        };

        let update = BreezemoonUpdate {
            id,
            content: ctx.request.json_str(BREEZEMOON_CONTENT).unwrap_or_default().to_string(),
            author_id,
            ua: ctx.request.header(USER_AGENT_HEADER).unwrap_or_default().to_string(),
        };

        let response = match self.mgmt.update_breezemoon(update).await {
            Ok(()) => Response::succ(),
            Err(e) => Response::err(e.to_string()),
        };
        ctx.respond(response)
    }

    /// Removes the `{id}` breezemoon
    pub async fn remove_breezemoon(&self, ctx: RequestContext) -> RequestContext {
        let id = match path_id(&ctx) {
            Ok(id) => id,
            Err(msg) => return ctx.respond(Response::err(msg)),
        };

        let response = match self.mgmt.remove_breezemoon(id).await {
            Ok(()) => Response::succ(),
            Err(e) => Response::err(e.to_string()),
        };
        ctx.respond(response)
    }

    /// Shows the `{id}` breezemoon as JSON
    pub async fn show_breezemoon(&self, ctx: RequestContext) -> RequestContext {
        let not_found = || Response::err_status(StatusCode::NOT_FOUND, "Not found");
        let Ok(id) = path_id(&ctx) else {
            return ctx.respond(not_found());
        };

        let response = match self.query.get_breezemoon_view(ctx.avatar_view_mode, id).await {
            Ok(Some(view)) => Response::succ_with(json!({ "breezemoon": view })),
            Ok(None) => not_found(),
            Err(e) => Response::err_status(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };
        ctx.respond(response)
    }
}

/// The `{id}` path parameter as a breezemoon id
fn path_id(ctx: &RequestContext) -> Result<BreezemoonId, String> {
    ctx.param("id")
        .unwrap_or_default()
        .parse::<BreezemoonId>()
        .map_err(|e| e.to_string())
}

/// Wrap a processor method as a route handler
fn handler<F, Fut>(processor: &Arc<BreezemoonProcessor>, f: F) -> Handler
where
    F: Fn(Arc<BreezemoonProcessor>, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RequestContext> + Send + 'static,
{
    let processor = Arc::clone(processor);
    Arc::new(move |ctx| f(Arc::clone(&processor), ctx).boxed())
}
