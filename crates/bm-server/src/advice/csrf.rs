//! CSRF token check

use super::{Advice, Rejection};
use crate::context::{RequestContext, CSRF_HEADER};
use crate::response::Response;
use async_trait::async_trait;
use warp::http::StatusCode;

/// Requires the `csrftoken` header to match the session's CSRF token
#[derive(Debug, Default)]
pub struct CsrfCheck;

#[async_trait]
impl Advice for CsrfCheck {
    fn name(&self) -> &'static str {
        "csrfCheck"
    }

    async fn before(&self, ctx: RequestContext) -> Result<RequestContext, Rejection> {
        let expected = ctx.session.as_ref().map(|s| s.csrf_token.as_str());
        let valid = match (expected, ctx.request.header(CSRF_HEADER)) {
            (Some(expected), Some(presented)) => tokens_match(expected, presented),
            _ => false,
        };

        if !valid {
            return Err(Rejection::respond(
                ctx,
                Response::err_status(StatusCode::FORBIDDEN, "Invalid request, please reload page"),
            ));
        }
        Ok(ctx)
    }
}

/// Length-checked comparison that does not short-circuit on content
fn tokens_match(expected: &str, presented: &str) -> bool {
    expected.len() == presented.len()
        && expected
            .bytes()
            .zip(presented.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
