// SPDX-License-Identifier: MIT OR Apache-2.0

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::access::{Editability, Visibility};
use crate::traits::{IdentityHandle, NodeId};

/// A node in the content hierarchy which may hold pages and sub-spaces.
///
/// Spaces form a tree with exactly one root, the space without a parent. The root is always
/// viewable.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Space<NID, ID> {
    pub id: NID,

    /// Parent space, `None` only for the root.
    pub parent: Option<NID>,

    pub owner: Option<ID>,

    pub visibility: Visibility,

    pub editability: Editability,
}

impl<NID, ID> Space<NID, ID>
where
    NID: NodeId,
    ID: IdentityHandle,
{
    /// A space nested under the given parent, with default policy settings.
    pub fn new(id: NID, parent: NID) -> Self {
        Self {
            id,
            parent: Some(parent),
            owner: None,
            visibility: Visibility::default(),
            editability: Editability::default(),
        }
    }

    /// The root space of a hierarchy.
    pub fn root(id: NID) -> Self {
        Self {
            id,
            parent: None,
            owner: None,
            visibility: Visibility::default(),
            editability: Editability::default(),
        }
    }

    pub fn with_owner(mut self, owner: ID) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_editability(mut self, editability: Editability) -> Self {
        self.editability = editability;
        self
    }

    /// Returns `true` when this space is the root of the hierarchy.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A leaf content unit attached to at most one space.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Page<NID, ID> {
    pub id: NID,

    /// Containing space, `None` when the page sits directly at the root.
    pub space: Option<NID>,

    pub owner: Option<ID>,

    pub visibility: Visibility,

    pub editability: Editability,
}

impl<NID, ID> Page<NID, ID>
where
    NID: NodeId,
    ID: IdentityHandle,
{
    /// A page attached directly to the root, with default policy settings.
    pub fn new(id: NID) -> Self {
        Self {
            id,
            space: None,
            owner: None,
            visibility: Visibility::default(),
            editability: Editability::default(),
        }
    }

    /// A page inside the given space, defaulting its visibility to the space's own so that the
    /// openness invariant holds without further adjustment.
    pub fn new_in(id: NID, space: &Space<NID, ID>) -> Self {
        Self {
            id,
            space: Some(space.id),
            owner: None,
            visibility: space.visibility,
            editability: Editability::default(),
        }
    }

    pub fn with_owner(mut self, owner: ID) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_editability(mut self, editability: Editability) -> Self {
        self.editability = editability;
        self
    }
}
