//! Advice chain
//!
//! Cross-cutting request stages composed explicitly per route:
//! - before advices run in order and may reject the request
//! - the handler runs only if nothing rejected
//! - after advices always run, in order
//!
//! Every stage takes the [`RequestContext`] by value and hands it back.

mod csrf;
mod login;
mod permission;
mod stopwatch;

pub use csrf::CsrfCheck;
pub use login::{AnonymousViewCheck, LoginCheck};
pub use permission::{PermissionCheck, PermissionGrant};
pub use stopwatch::{StopwatchEnd, StopwatchStart, REQUEST_DURATION_METRIC};

use crate::context::RequestContext;
use crate::response::Response;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// A request that must not reach its handler
///
/// Carries the context with its response already set.
#[derive(Debug)]
pub struct Rejection(pub Box<RequestContext>);

impl Rejection {
    /// Reject with the given response
    #[must_use]
    pub fn respond(ctx: RequestContext, response: Response) -> Self {
        Self(Box::new(ctx.respond(response)))
    }
}

/// One before/after stage
#[async_trait]
pub trait Advice: Send + Sync {
    /// Name for logs
    fn name(&self) -> &'static str;

    /// Runs before the handler
    ///
    /// # Errors
    /// Returns `Rejection` to stop the request with a response
    async fn before(&self, ctx: RequestContext) -> Result<RequestContext, Rejection> {
        Ok(ctx)
    }

    /// Runs after the handler (or after a rejection)
    async fn after(&self, ctx: RequestContext) -> RequestContext {
        ctx
    }
}

/// Route handler
pub type Handler = Arc<dyn Fn(RequestContext) -> BoxFuture<'static, RequestContext> + Send + Sync>;

/// Ordered before/after advices for one route
#[derive(Clone, Default)]
pub struct AdviceChain {
    before: Vec<Arc<dyn Advice>>,
    after: Vec<Arc<dyn Advice>>,
}

impl AdviceChain {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a before advice
    #[must_use]
    pub fn before(mut self, advice: Arc<dyn Advice>) -> Self {
        self.before.push(advice);
        self
    }

    /// Append an after advice
    #[must_use]
    pub fn after(mut self, advice: Arc<dyn Advice>) -> Self {
        self.after.push(advice);
        self
    }

    /// Run the chain around `handler`
    pub async fn run(&self, ctx: RequestContext, handler: &Handler) -> RequestContext {
        let mut ctx = ctx;
        let mut rejected = false;

        for advice in &self.before {
            match advice.before(ctx).await {
                Ok(next) => ctx = next,
                Err(Rejection(halted)) => {
                    tracing::debug!(route = halted.route, advice = advice.name(), "Request rejected");
                    ctx = *halted;
                    rejected = true;
                    break;
                }
            }
        }

        if !rejected {
            ctx = handler(ctx).await;
        }

        for advice in &self.after {
            ctx = advice.after(ctx).await;
        }

        ctx
    }

    /// Names of the before and after advices, in order
    #[must_use]
    pub fn names(&self) -> (Vec<&'static str>, Vec<&'static str>) {
        (
            self.before.iter().map(|a| a.name()).collect(),
            self.after.iter().map(|a| a.name()).collect(),
        )
    }
}

impl fmt::Debug for AdviceChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (before, after) = self.names();
        f.debug_struct("AdviceChain")
            .field("before", &before)
            .field("after", &after)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Request;
    use futures::FutureExt;
    use std::sync::Mutex;
    use warp::http::{Method, StatusCode};

    /// Stage order seen by recorders and the handler
    #[derive(Default)]
    struct Trace {
        events: Mutex<Vec<String>>,
    }

    struct Recorder {
        label: &'static str,
        reject: bool,
        trace: Arc<Trace>,
    }

    #[async_trait]
    impl Advice for Recorder {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn before(&self, ctx: RequestContext) -> Result<RequestContext, Rejection> {
            self.trace.events.lock().unwrap().push(format!("before:{}", self.label));
            if self.reject {
                return Err(Rejection::respond(
                    ctx,
                    Response::err_status(StatusCode::FORBIDDEN, "no"),
                ));
            }
            Ok(ctx)
        }

        async fn after(&self, ctx: RequestContext) -> RequestContext {
            self.trace.events.lock().unwrap().push(format!("after:{}", self.label));
            ctx
        }
    }

    fn recorder(label: &'static str, reject: bool, trace: &Arc<Trace>) -> Arc<dyn Advice> {
        Arc::new(Recorder {
            label,
            reject,
            trace: Arc::clone(trace),
        })
    }

    fn handler(trace: &Arc<Trace>) -> Handler {
        let trace = Arc::clone(trace);
        Arc::new(move |ctx: RequestContext| {
            let trace = Arc::clone(&trace);
            async move {
                trace.events.lock().unwrap().push("handler".to_string());
                ctx.respond(Response::succ())
            }
            .boxed()
        })
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Request::new(Method::GET, "/"), "test")
    }

    #[tokio::test]
    async fn chain_runs_in_order() {
        let trace = Arc::new(Trace::default());
        let chain = AdviceChain::new()
            .before(recorder("a", false, &trace))
            .before(recorder("b", false, &trace))
            .after(recorder("c", false, &trace));

        let out = chain.run(ctx(), &handler(&trace)).await;

        assert_eq!(out.response, Some(Response::succ()));
        assert_eq!(
            *trace.events.lock().unwrap(),
            vec!["before:a", "before:b", "handler", "after:c"]
        );
    }

    #[tokio::test]
    async fn rejection_skips_rest_but_runs_after() {
        let trace = Arc::new(Trace::default());
        let chain = AdviceChain::new()
            .before(recorder("a", true, &trace))
            .before(recorder("b", false, &trace))
            .after(recorder("c", false, &trace));

        let out = chain.run(ctx(), &handler(&trace)).await;

        assert_eq!(out.response.unwrap().status(), StatusCode::FORBIDDEN);
        assert_eq!(*trace.events.lock().unwrap(), vec!["before:a", "after:c"]);
    }

    #[test]
    fn chain_debug_lists_names() {
        let trace = Arc::new(Trace::default());
        let chain = AdviceChain::new().before(recorder("x", false, &trace));
        assert_eq!(chain.names(), (vec!["x"], vec![]));
        assert!(format!("{chain:?}").contains("\"x\""));
    }
}
