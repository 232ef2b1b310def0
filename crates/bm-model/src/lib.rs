//! Breezemoon Model - domain types shared by every crate in the workspace
//!
//! Provides:
//! - The point-to-color-code encoder ([`to_cc_string`])
//! - Users, roles, permissions and their display extensions
//! - Breezemoons and their listing projection
//! - Pagination windows
//! - The page data model handed to renderers
//!
//! # Example
//!
//! ```rust
//! use bm_model::to_cc_string;
//!
//! assert_eq!(to_cc_string(65_222), "fec6c6");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod breezemoon;
pub mod data_model;
pub mod error;
pub mod pagination;
pub mod role;
pub mod user_ext;

pub use breezemoon::{
    render_content, time_ago, Breezemoon, BreezemoonDraft, BreezemoonId, BreezemoonPage,
    BreezemoonStatus, BreezemoonUpdate, BreezemoonView, BREEZEMOON_CONTENT,
};
pub use data_model::{keys, DataModel};
pub use error::ModelError;
pub use pagination::Pagination;
pub use role::{Permission, Role};
pub use user_ext::{parse_point, to_cc_string, AvatarViewMode, GuideStep, User, UserId, CC_LEN};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
