// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Who may view a node.
///
/// Tiers are ordered by openness, such that "higher" tiers reveal a node to strictly more
/// principals than lower ones.
///
/// Private < Internal < Public
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Visibility {
    /// Viewable by the owner, the system owner and explicitly granted principals only.
    Private,

    /// Viewable by any authenticated principal.
    Internal,

    /// Viewable by anyone, including anonymous visitors.
    #[default]
    Public,
}

impl Visibility {
    /// Returns `true` when this tier reveals a node to strictly more principals than `other`.
    pub fn is_more_open_than(&self, other: Visibility) -> bool {
        *self > other
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Visibility::Private => "private",
            Visibility::Internal => "internal",
            Visibility::Public => "public",
        };

        write!(f, "{}", s)
    }
}

/// Who may edit a node irrespective of grants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Editability {
    /// Editable by the owner, the system owner and principals holding an edit or owner grant.
    #[default]
    Restricted,

    /// Editable by any authenticated principal, independent of visibility and grants.
    Internal,
}

impl Display for Editability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Editability::Restricted => "restricted",
            Editability::Internal => "internal",
        };

        write!(f, "{}", s)
    }
}

/// The three permission levels a grant can carry. Greater levels are assumed to also contain all
/// lower ones.
///
/// View < Edit < Owner
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Permission {
    /// Permission to view a node.
    View,

    /// Permission to modify a node's content and settings.
    Edit,

    /// Full control over a node, including managing its grants.
    Owner,
}

impl Permission {
    /// Permission level is View.
    pub fn is_view(&self) -> bool {
        matches!(self, Permission::View)
    }

    /// Permission level is Edit.
    pub fn is_edit(&self) -> bool {
        matches!(self, Permission::Edit)
    }

    /// Permission level is Owner.
    pub fn is_owner(&self) -> bool {
        matches!(self, Permission::Owner)
    }

    /// Returns `true` when this level allows editing the target (Edit or Owner).
    pub fn grants_edit(&self) -> bool {
        matches!(self, Permission::Edit | Permission::Owner)
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Permission::View => "view",
            Permission::Edit => "edit",
            Permission::Owner => "owner",
        };

        write!(f, "{}", s)
    }
}
