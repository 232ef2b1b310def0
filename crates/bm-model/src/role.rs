//! Roles and the permissions they grant

use serde::{Deserialize, Serialize};
use std::fmt;

/// Breezemoon permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "commonAddBreezemoon")]
    AddBreezemoon,
    #[serde(rename = "commonUpdateBreezemoon")]
    UpdateBreezemoon,
    #[serde(rename = "commonRemoveBreezemoon")]
    RemoveBreezemoon,
    #[serde(rename = "commonViewBreezemoon")]
    ViewBreezemoon,
}

impl Permission {
    /// Every breezemoon permission
    pub const ALL: [Permission; 4] = [
        Self::AddBreezemoon,
        Self::UpdateBreezemoon,
        Self::RemoveBreezemoon,
        Self::ViewBreezemoon,
    ];

    /// Wire name of the permission
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddBreezemoon => "commonAddBreezemoon",
            Self::UpdateBreezemoon => "commonUpdateBreezemoon",
            Self::RemoveBreezemoon => "commonRemoveBreezemoon",
            Self::ViewBreezemoon => "commonViewBreezemoon",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    #[default]
    Default,
    /// Anonymous or restricted viewers
    Visitor,
}

impl Role {
    /// Permissions granted to this role
    #[must_use]
    pub const fn permissions(self) -> &'static [Permission] {
        match self {
            Self::Admin | Self::Default => &[
                Permission::AddBreezemoon,
                Permission::UpdateBreezemoon,
                Permission::RemoveBreezemoon,
                Permission::ViewBreezemoon,
            ],
            Self::Visitor => &[Permission::ViewBreezemoon],
        }
    }

    /// Check a single permission
    #[inline]
    #[must_use]
    pub fn grants(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}
