//! Request timing

use super::{Advice, Rejection};
use crate::context::RequestContext;
use async_trait::async_trait;
use std::time::Instant;

/// Histogram of handled request durations, labelled by route
pub const REQUEST_DURATION_METRIC: &str = "bm_request_duration_seconds";

/// Starts the request stopwatch
#[derive(Debug, Default)]
pub struct StopwatchStart;

#[async_trait]
impl Advice for StopwatchStart {
    fn name(&self) -> &'static str {
        "stopwatchStart"
    }

    async fn before(&self, mut ctx: RequestContext) -> Result<RequestContext, Rejection> {
        ctx.started = Some(Instant::now());
        Ok(ctx)
    }
}

/// Stops the stopwatch, logs and records the elapsed time
#[derive(Debug, Default)]
pub struct StopwatchEnd;

#[async_trait]
impl Advice for StopwatchEnd {
    fn name(&self) -> &'static str {
        "stopwatchEnd"
    }

    async fn after(&self, ctx: RequestContext) -> RequestContext {
        let Some(started) = ctx.started else {
            return ctx;
        };

        let elapsed = started.elapsed();
        let status = ctx.response.as_ref().map(|r| r.status().as_u16());
        tracing::debug!(
            route = ctx.route,
            status,
            elapsed_ms = elapsed.as_secs_f64() * 1_000.0,
            "Request handled"
        );
        metrics::histogram!(REQUEST_DURATION_METRIC, "route" => ctx.route).record(elapsed.as_secs_f64());

        ctx
    }
}
