//! User extensions
//!
//! Users as the breezemoon pages see them, plus the display helpers derived
//! from a user's attributes:
//! - Color code from reputation points
//! - Guide completion
//! - Avatar view mode

use crate::error::ModelError;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Length of every color code
pub const CC_LEN: usize = 6;

/// Query appended to avatar URLs in static view mode
const STATIC_AVATAR_QUERY: &str = "imageView2/1/format/jpg";

/// Encode a point value as a 6-character color code.
///
/// The point is rendered as 32-bit lowercase hex, then stretched or cut to
/// six characters:
///
/// | hex digits | code |
/// |---|---|
/// | `a` | `aaaaaa` |
/// | `ab` | `aaabbb` |
/// | `abc` | `aabbcc` |
/// | `abcd` | `abcdcd` |
/// | `abcde` | `abcdee` |
/// | six or more | first six digits |
///
/// Anything above `0xffffff` keeps only its leading digits, so distinct points
/// may share a code. Negative points use their two's-complement rendering.
#[must_use]
pub fn to_cc_string(point: i32) -> String {
    let hex = format!("{point:x}");
    let digits: Vec<char> = hex.chars().collect();

    match digits.as_slice() {
        [a] => [a, a, a, a, a, a].into_iter().collect(),
        [a, b] => [a, a, a, b, b, b].into_iter().collect(),
        [a, b, c] => [a, a, b, b, c, c].into_iter().collect(),
        [a, b, c, d] => [a, b, c, d, c, d].into_iter().collect(),
        [a, b, c, d, e] => [a, b, c, d, e, e].into_iter().collect(),
        longer => longer[..CC_LEN].iter().collect(),
    }
}

/// Parse a decimal point value
///
/// # Errors
/// Returns `ModelError::InvalidPoint` if the input is not a 32-bit integer
pub fn parse_point(s: &str) -> Result<i32, ModelError> {
    s.trim()
        .parse::<i32>()
        .map_err(|_| ModelError::InvalidPoint(s.to_string()))
}

/// Unique user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub Ulid);

impl UserId {
    /// Generate new user ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|_| ModelError::InvalidId(s.to_string()))
    }
}

/// Newcomer guide progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GuideStep {
    /// Guide completed or skipped
    #[default]
    Finished,
    UploadAvatar,
    FollowTags,
    FollowUsers,
    StarProject,
}

/// How avatars are shown to the viewing user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AvatarViewMode {
    /// Avatar URL untouched (animations play)
    #[default]
    Original,
    /// First frame only
    Static,
}

impl AvatarViewMode {
    /// Apply this view mode to an avatar URL
    #[must_use]
    pub fn apply(self, avatar_url: &str) -> String {
        match self {
            Self::Original => avatar_url.to_string(),
            Self::Static if avatar_url.is_empty() => String::new(),
            Self::Static => {
                let sep = if avatar_url.contains('?') { '&' } else { '?' };
                format!("{avatar_url}{sep}{STATIC_AVATAR_QUERY}")
            }
        }
    }
}

/// A platform user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub avatar_url: String,
    /// Reputation points
    pub points: i32,
    pub role: Role,
    /// Preferred list page size (0 means site default)
    pub list_page_size: usize,
    pub guide_step: GuideStep,
    pub avatar_view_mode: AvatarViewMode,
}

impl User {
    /// Create a default-role user who has finished the guide
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            avatar_url: String::new(),
            points: 0,
            role: Role::Default,
            list_page_size: 0,
            guide_step: GuideStep::Finished,
            avatar_view_mode: AvatarViewMode::Original,
        }
    }

    /// With reputation points
    #[inline]
    #[must_use]
    pub fn with_points(mut self, points: i32) -> Self {
        self.points = points;
        self
    }

    /// With role
    #[inline]
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// With list page size
    #[inline]
    #[must_use]
    pub fn with_list_page_size(mut self, size: usize) -> Self {
        self.list_page_size = size;
        self
    }

    /// With guide step
    #[inline]
    #[must_use]
    pub fn with_guide_step(mut self, step: GuideStep) -> Self {
        self.guide_step = step;
        self
    }

    /// With avatar
    #[inline]
    #[must_use]
    pub fn with_avatar(mut self, url: impl Into<String>, mode: AvatarViewMode) -> Self {
        self.avatar_url = url.into();
        self.avatar_view_mode = mode;
        self
    }

    /// Whether the newcomer guide is done
    #[inline]
    #[must_use]
    pub fn finished_guide(&self) -> bool {
        self.guide_step == GuideStep::Finished
    }

    /// Display color derived from points
    #[inline]
    #[must_use]
    pub fn color(&self) -> String {
        to_cc_string(self.points)
    }
}
