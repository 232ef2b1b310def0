//! Breezemoons
//!
//! A breezemoon is a short status update. This module holds:
//! - The stored record ([`Breezemoon`])
//! - Add/update inputs ([`BreezemoonDraft`], [`BreezemoonUpdate`])
//! - The listing projection ([`BreezemoonView`])
//! - Content rendering and relative time helpers

use crate::error::ModelError;
use crate::pagination::Pagination;
use crate::user_ext::{AvatarViewMode, User, UserId};
use chrono::{DateTime, Utc};
use pulldown_cmark::{html, Event, Options, Parser};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Request JSON field carrying breezemoon content
pub const BREEZEMOON_CONTENT: &str = "breezemoonContent";

/// Unique breezemoon identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BreezemoonId(pub Ulid);

impl BreezemoonId {
    /// Generate new breezemoon ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for BreezemoonId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BreezemoonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BreezemoonId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|_| ModelError::InvalidId(s.to_string()))
    }
}

/// Visibility of a stored breezemoon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BreezemoonStatus {
    #[default]
    Valid,
    /// Hidden from every listing
    Invalid,
}

/// A stored breezemoon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breezemoon {
    pub id: BreezemoonId,
    pub content: String,
    pub author_id: UserId,
    /// User agent of the posting client
    pub ua: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub status: BreezemoonStatus,
}

impl Breezemoon {
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == BreezemoonStatus::Valid
    }
}

/// Input for adding a breezemoon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreezemoonDraft {
    pub content: String,
    pub author_id: UserId,
    pub ua: String,
}

impl BreezemoonDraft {
    #[must_use]
    pub fn new(content: impl Into<String>, author_id: UserId, ua: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author_id,
            ua: ua.into(),
        }
    }
}

/// Input for updating a breezemoon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreezemoonUpdate {
    pub id: BreezemoonId,
    pub content: String,
    /// Acting user; must be the original author
    pub author_id: UserId,
    pub ua: String,
}

/// A breezemoon as shown in lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreezemoonView {
    pub id: BreezemoonId,
    pub content: String,
    pub content_html: String,
    pub author_id: UserId,
    pub author_name: String,
    pub author_avatar_url: String,
    /// Color code from the author's points
    pub author_color: String,
    pub created: DateTime<Utc>,
    pub time_ago: String,
    pub ua: String,
}

impl BreezemoonView {
    /// Project a breezemoon for a viewer using `mode` avatars
    #[must_use]
    pub fn new(
        breezemoon: &Breezemoon,
        author: &User,
        mode: AvatarViewMode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: breezemoon.id,
            content: breezemoon.content.clone(),
            content_html: render_content(&breezemoon.content),
            author_id: author.id,
            author_name: author.name.clone(),
            author_avatar_url: mode.apply(&author.avatar_url),
            author_color: author.color(),
            created: breezemoon.created,
            time_ago: time_ago(breezemoon.created, now),
            ua: breezemoon.ua.clone(),
        }
    }
}

/// One page of breezemoons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreezemoonPage {
    pub pagination: Pagination,
    pub breezemoons: Vec<BreezemoonView>,
}

/// Render breezemoon Markdown to HTML
///
/// Raw HTML in the source is escaped, not passed through.
#[must_use]
pub fn render_content(content: &str) -> String {
    let parser = Parser::new_ext(content, Options::ENABLE_STRIKETHROUGH).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// English relative time between `then` and `now`
///
/// Older than 30 days falls back to the calendar date.
#[must_use]
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);

    let unit = |n: i64, name: &str| {
        if n == 1 {
            format!("1 {name} ago")
        } else {
            format!("{n} {name}s ago")
        }
    };

    match secs {
        0..=59 => "just now".to_string(),
        60..=3_599 => unit(secs / 60, "minute"),
        3_600..=86_399 => unit(secs / 3_600, "hour"),
        86_400..=2_591_999 => unit(secs / 86_400, "day"),
        _ => then.format("%Y-%m-%d").to_string(),
    }
}
