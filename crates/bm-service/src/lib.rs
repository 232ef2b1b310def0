//! Breezemoon Services - collaborators of the breezemoon processor
//!
//! Each concern is an `async_trait` seam so handlers receive their
//! collaborators explicitly:
//! - [`BreezemoonQueryService`] - listings and lookups
//! - [`BreezemoonMgmtService`] - add, update, remove
//! - [`DataModelService`] - page header/footer and side panels
//! - [`UserQueryService`], [`FollowQueryService`], [`SessionService`]
//!
//! The [`memory`] module provides in-process implementations of all of them.
//! With the `mocks` feature every trait also gets a `mockall` mock.
//!
//! # Example
//!
//! ```rust,ignore
//! use bm_service::memory::{MemoryBreezemoonService, MemoryStore};
//! use bm_service::BreezemoonMgmtService;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let service = MemoryBreezemoonService::new(store);
//! let id = service.add_breezemoon(draft).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod data_model;
pub mod error;
pub mod memory;
pub mod mgmt;
pub mod query;
pub mod user;

pub use data_model::{
    ArticleSummary, CommentSummary, DataModelService, RequestMeta, SiteData, SiteDataModelService,
};
pub use error::{ServiceError, ServiceResult};
pub use mgmt::{validate_content, BreezemoonMgmtService, DEFAULT_MAX_CONTENT_LEN};
pub use query::BreezemoonQueryService;
pub use user::{FollowQueryService, Session, SessionService, UserQueryService};

#[cfg(any(test, feature = "mocks"))]
pub use data_model::MockDataModelService;
#[cfg(any(test, feature = "mocks"))]
pub use mgmt::MockBreezemoonMgmtService;
#[cfg(any(test, feature = "mocks"))]
pub use query::MockBreezemoonQueryService;
#[cfg(any(test, feature = "mocks"))]
pub use user::{MockFollowQueryService, MockSessionService, MockUserQueryService};
