//! Login and anonymous-view gates

use super::{Advice, Rejection};
use crate::context::RequestContext;
use crate::response::Response;
use async_trait::async_trait;
use warp::http::StatusCode;

/// Requires a logged-in user; answers 401 otherwise
#[derive(Debug, Default)]
pub struct LoginCheck;

#[async_trait]
impl Advice for LoginCheck {
    fn name(&self) -> &'static str {
        "loginCheck"
    }

    async fn before(&self, ctx: RequestContext) -> Result<RequestContext, Rejection> {
        if ctx.user.is_none() {
            return Err(Rejection::respond(
                ctx,
                Response::err_status(StatusCode::UNAUTHORIZED, "Unauthenticated"),
            ));
        }
        Ok(ctx)
    }
}

/// Sends anonymous users to the login page when anonymous viewing is off
#[derive(Debug, Clone)]
pub struct AnonymousViewCheck {
    allow_anonymous_view: bool,
    serve_path: String,
}

impl AnonymousViewCheck {
    #[must_use]
    pub fn new(allow_anonymous_view: bool, serve_path: impl Into<String>) -> Self {
        Self {
            allow_anonymous_view,
            serve_path: serve_path.into(),
        }
    }
}

#[async_trait]
impl Advice for AnonymousViewCheck {
    fn name(&self) -> &'static str {
        "anonymousViewCheck"
    }

    async fn before(&self, ctx: RequestContext) -> Result<RequestContext, Rejection> {
        if self.allow_anonymous_view || ctx.user.is_some() {
            return Ok(ctx);
        }

        let location = format!("{}/login?goto={}", self.serve_path, ctx.request.path);
        Err(Rejection::respond(ctx, Response::redirect(location)))
    }
}
