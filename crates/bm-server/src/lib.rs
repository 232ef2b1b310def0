//! Breezemoon Server - HTTP surface for breezemoons
//!
//! Request flow:
//! 1. [`http`] turns a warp request into a [`Request`]
//! 2. [`Router`] matches the route and resolves the session
//! 3. The route's [`AdviceChain`] runs its before advices, the
//!    [`BreezemoonProcessor`] handler, then its after advices
//! 4. The resulting [`Response`] goes back out as JSON or a redirect
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use bm_server::prelude::*;
//!
//! let config = ServerConfig::load("bm.toml")?.apply_env()?;
//! let app = App::new(config.clone(), SiteData::default());
//! bm_server::http::serve(&config, app.router).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod advice;
pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod logging;
pub mod processor;
pub mod response;
pub mod router;

pub use advice::{Advice, AdviceChain, Handler, Rejection};
pub use app::{demo_site_data, App};
pub use config::ServerConfig;
pub use context::{Request, RequestContext};
pub use error::ServerError;
pub use processor::BreezemoonProcessor;
pub use response::Response;
pub use router::{Router, SessionResolver};

/// Common server types
pub mod prelude {
    pub use crate::advice::{
        AnonymousViewCheck, CsrfCheck, LoginCheck, PermissionCheck, PermissionGrant,
        StopwatchEnd, StopwatchStart,
    };
    pub use crate::{
        App, BreezemoonProcessor, Request, RequestContext, Response, Router, ServerConfig,
        ServerError,
    };
    pub use bm_service::SiteData;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
