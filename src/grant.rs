// SPDX-License-Identifier: MIT OR Apache-2.0

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::access::Permission;
use crate::traits::{IdentityHandle, NodeId};

/// A principal a grant can be issued to: a single user or a whole group.
///
/// In both cases the identifier is the same generic ID. Grants never bind to "user and group" at
/// once; matching a group grant against a concrete user goes through the user's resolved group
/// memberships.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Principal<ID> {
    Individual(ID),
    Group(ID),
}

impl<ID> Principal<ID>
where
    ID: IdentityHandle,
{
    /// Return the ID of the principal.
    pub fn id(&self) -> ID {
        match self {
            Principal::Individual(id) => *id,
            Principal::Group(id) => *id,
        }
    }

    /// Return `true` if this principal is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Principal::Group(_))
    }

    /// Return `true` if this principal is a single user.
    pub fn is_individual(&self) -> bool {
        !self.is_group()
    }
}

/// The node a grant is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GrantTarget<NID> {
    Space(NID),
    Page(NID),
}

impl<NID> GrantTarget<NID>
where
    NID: NodeId,
{
    /// Return the ID of the target node.
    pub fn id(&self) -> NID {
        match self {
            GrantTarget::Space(id) => *id,
            GrantTarget::Page(id) => *id,
        }
    }
}

/// An explicit permission record binding a principal to a target node.
///
/// At most one grant exists per (target, principal, permission) tuple; stores enforce this on
/// insert. Grants are owned by their target: deleting the node deletes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grant<NID, ID> {
    pub target: GrantTarget<NID>,
    pub principal: Principal<ID>,
    pub permission: Permission,
}

impl<NID, ID> Grant<NID, ID>
where
    NID: NodeId,
    ID: IdentityHandle,
{
    /// A grant attached to a space.
    pub fn for_space(space: NID, principal: Principal<ID>, permission: Permission) -> Self {
        Self {
            target: GrantTarget::Space(space),
            principal,
            permission,
        }
    }

    /// A grant attached to a page.
    pub fn for_page(page: NID, principal: Principal<ID>, permission: Permission) -> Self {
        Self {
            target: GrantTarget::Page(page),
            principal,
            permission,
        }
    }

    /// The same principal and permission attached to another target. Used when propagating a
    /// space's grants onto its contents.
    pub fn retarget(&self, target: GrantTarget<NID>) -> Self {
        Self {
            target,
            principal: self.principal,
            permission: self.permission,
        }
    }
}
