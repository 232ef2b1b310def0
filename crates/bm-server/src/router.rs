//! Route table and dispatch
//!
//! Routes are matched on method plus a `/`-separated pattern whose `{name}`
//! segments capture path parameters. Dispatch resolves the session, runs the
//! route's [`AdviceChain`] around its handler and returns the response.
//! Unknown paths answer 404, known paths with another method 405.

use crate::advice::{AdviceChain, Handler};
use crate::context::{Request, RequestContext};
use crate::response::Response;
use bm_model::User;
use bm_service::{Session, SessionService, UserQueryService};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use warp::http::{Method, StatusCode};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    split_path(pattern)
        .map(|seg| match seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(seg.to_string()),
        })
        .collect()
}

/// Non-empty path segments; ignores leading, trailing and doubled slashes
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|seg| !seg.is_empty())
}

struct Route {
    method: Method,
    segments: Vec<Segment>,
    name: &'static str,
    chain: AdviceChain,
    handler: Handler,
}

impl Route {
    /// Captured params when `path` matches this route's pattern
    fn capture(&self, path: &[&str]) -> Option<HashMap<String, String>> {
        if path.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, actual) in self.segments.iter().zip(path) {
            match segment {
                Segment::Literal(expected) if expected.as_str() == *actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*actual).to_string());
                }
            }
        }
        Some(params)
    }
}

/// Turns a request's session token into a session and its user
#[derive(Clone)]
pub struct SessionResolver {
    sessions: Arc<dyn SessionService>,
    users: Arc<dyn UserQueryService>,
}

impl SessionResolver {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionService>, users: Arc<dyn UserQueryService>) -> Self {
        Self { sessions, users }
    }

    /// Session and user, or `None` for anonymous requests
    ///
    /// Lookup failures are logged and treated as anonymous.
    pub async fn resolve(&self, request: &Request) -> Option<(Session, User)> {
        let token = request.session_token()?;

        let session = match self.sessions.resolve(token).await {
            Ok(found) => found?,
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed");
                return None;
            }
        };

        match self.users.get_user(session.user_id).await {
            Ok(Some(user)) => Some((session, user)),
            Ok(None) => {
                tracing::debug!(user_id = %session.user_id, "Session user no longer exists");
                None
            }
            Err(e) => {
                tracing::warn!(user_id = %session.user_id, error = %e, "User lookup failed");
                None
            }
        }
    }
}

/// Method + path route table
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    sessions: Option<SessionResolver>,
}

impl Router {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With session resolution; without it every request is anonymous
    #[must_use]
    pub fn with_sessions(mut self, resolver: SessionResolver) -> Self {
        self.sessions = Some(resolver);
        self
    }

    /// Register a route; earlier registrations win on overlap
    pub fn route(
        &mut self,
        method: Method,
        pattern: &str,
        name: &'static str,
        chain: AdviceChain,
        handler: Handler,
    ) {
        tracing::debug!(%method, pattern, name, advices = ?chain.names(), "Route registered");
        self.routes.push(Route {
            method,
            segments: parse_pattern(pattern),
            name,
            chain,
            handler,
        });
    }

    /// Registered route names, in registration order
    #[must_use]
    pub fn route_names(&self) -> Vec<&'static str> {
        self.routes.iter().map(|r| r.name).collect()
    }

    /// Route, run and answer one request
    pub async fn dispatch(&self, request: Request) -> Response {
        let path: Vec<&str> = split_path(&request.path).collect();

        let mut path_known = false;
        let mut matched = None;
        for route in &self.routes {
            if let Some(params) = route.capture(&path) {
                path_known = true;
                if route.method == request.method {
                    matched = Some((route, params));
                    break;
                }
            }
        }

        let Some((route, params)) = matched else {
            return if path_known {
                Response::err_status(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
            } else {
                Response::err_status(StatusCode::NOT_FOUND, "Not found")
            };
        };

        let resolved = match &self.sessions {
            Some(resolver) => resolver.resolve(&request).await,
            None => None,
        };

        let mut ctx = RequestContext::new(request, route.name).with_params(params);
        if let Some((session, user)) = resolved {
            ctx = ctx.with_session(session, user);
        }

        let ctx = route.chain.run(ctx, &route.handler).await;
        match ctx.response {
            Some(response) => response,
            None => {
                tracing::error!(route = route.name, "Handler produced no response");
                Response::err_status(StatusCode::INTERNAL_SERVER_ERROR, "No response")
            }
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.route_names())
            .field("sessions", &self.sessions.is_some())
            .finish()
    }
}
