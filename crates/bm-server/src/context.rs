//! Request and request context
//!
//! A [`RequestContext`] is the one value every advice and handler receives
//! and returns. Nothing is attached to the request implicitly; whatever a
//! stage learns (session, user, start time, response) is a field here.

use crate::response::Response;
use bm_model::{AvatarViewMode, User};
use bm_service::Session;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use warp::http::Method;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "bm_session";
/// Header alternative to the session cookie
pub const SESSION_HEADER: &str = "x-session-token";
/// Header carrying the CSRF token
pub const CSRF_HEADER: &str = "csrftoken";
pub const USER_AGENT_HEADER: &str = "user-agent";

/// Framework-independent HTTP request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    /// Header names are lowercase
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            headers: HashMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Header value by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Cookie value from the `cookie` header
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie")?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Session token from cookie or header
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        self.cookie(SESSION_COOKIE)
            .or_else(|| self.header(SESSION_HEADER))
            .filter(|token| !token.is_empty())
    }

    /// String field of the JSON body
    #[must_use]
    pub fn json_str(&self, field: &str) -> Option<&str> {
        self.body.as_ref()?.get(field)?.as_str()
    }
}

/// Everything known about a request while it moves through the chain
#[derive(Debug)]
pub struct RequestContext {
    pub request: Request,
    /// Name of the matched route
    pub route: &'static str,
    /// `{name}` segments captured from the route pattern
    pub params: HashMap<String, String>,
    pub session: Option<Session>,
    pub user: Option<User>,
    pub avatar_view_mode: AvatarViewMode,
    /// Set by the stopwatch start advice
    pub started: Option<Instant>,
    pub response: Option<Response>,
}

impl RequestContext {
    #[must_use]
    pub fn new(request: Request, route: &'static str) -> Self {
        Self {
            request,
            route,
            params: HashMap::new(),
            session: None,
            user: None,
            avatar_view_mode: AvatarViewMode::default(),
            started: None,
            response: None,
        }
    }

    /// Attach a resolved session and its user
    #[must_use]
    pub fn with_session(mut self, session: Session, user: User) -> Self {
        self.avatar_view_mode = user.avatar_view_mode;
        self.session = Some(session);
        self.user = Some(user);
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Set the response and hand the context back
    #[must_use]
    pub fn respond(mut self, response: Response) -> Self {
        self.response = Some(response);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn headers_are_case_insensitive() {
        let req = Request::new(Method::GET, "/").with_header("User-Agent", "curl/8");
        assert_eq!(req.header("user-agent"), Some("curl/8"));
        assert_eq!(req.header("USER-AGENT"), Some("curl/8"));
    }

    #[test]
    fn session_token_prefers_cookie() {
        let req = Request::new(Method::GET, "/")
            .with_header("cookie", "theme=dark; bm_session=abc123; other=1")
            .with_header(SESSION_HEADER, "from-header");
        assert_eq!(req.session_token(), Some("abc123"));

        let req = Request::new(Method::GET, "/").with_header(SESSION_HEADER, "from-header");
        assert_eq!(req.session_token(), Some("from-header"));

        let req = Request::new(Method::GET, "/").with_header("cookie", "bm_session=");
        assert_eq!(req.session_token(), None);
    }

    #[test]
    fn json_str_reads_string_fields_only() {
        let req = Request::new(Method::POST, "/bm")
            .with_json(json!({ "breezemoonContent": "hi", "n": 1 }));
        assert_eq!(req.json_str("breezemoonContent"), Some("hi"));
        assert_eq!(req.json_str("n"), None);
        assert_eq!(req.json_str("missing"), None);
        assert_eq!(Request::new(Method::POST, "/bm").json_str("x"), None);
    }

    #[test]
    fn with_session_copies_view_mode() {
        let user = User::new("alice").with_avatar("", AvatarViewMode::Static);
        let session = Session::generate(user.id);
        let ctx = RequestContext::new(Request::new(Method::GET, "/"), "test")
            .with_session(session, user);
        assert_eq!(ctx.avatar_view_mode, AvatarViewMode::Static);
        assert!(ctx.user.is_some());
    }
}
