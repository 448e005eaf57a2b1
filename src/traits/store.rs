// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;
use std::error::Error;

use crate::access::{Editability, Visibility};
use crate::grant::{Grant, GrantTarget};
use crate::node::{Page, Space};
use crate::traits::{IdentityHandle, NodeId};

/// Read access to the space tree, grants and identity data.
///
/// The policy evaluator only ever reads: a single evaluation is a handful of key and parent
/// lookups against this interface. Implementations are expected to answer from a consistent
/// snapshot for the duration of one evaluation.
pub trait AuthStore<NID, ID>
where
    NID: NodeId,
    ID: IdentityHandle,
{
    type Error: Error;

    /// Get a space by id.
    fn space(&self, id: &NID) -> Result<Option<Space<NID, ID>>, Self::Error>;

    /// Get a page by id.
    fn page(&self, id: &NID) -> Result<Option<Page<NID, ID>>, Self::Error>;

    /// All spaces whose parent is the given space.
    fn child_spaces(&self, id: &NID) -> Result<Vec<Space<NID, ID>>, Self::Error>;

    /// All pages directly inside the given space.
    fn child_pages(&self, id: &NID) -> Result<Vec<Page<NID, ID>>, Self::Error>;

    /// All grants attached to the given target, any principal and any permission level. Callers
    /// do the filtering.
    fn grants(&self, target: &GrantTarget<NID>) -> Result<Vec<Grant<NID, ID>>, Self::Error>;

    /// Ids of all groups the given user is a member of.
    fn group_ids(&self, user: &ID) -> Result<HashSet<ID>, Self::Error>;

    /// The system owner, if one has been configured.
    fn system_owner(&self) -> Result<Option<ID>, Self::Error>;
}

/// Write access needed by the propagation engine.
///
/// Writes are kept on a separate interface so that read-only consumers can hold a plain
/// [`AuthStore`] bound. A single [`apply_permissions`](crate::apply_permissions) call issues many
/// of these writes; implementations backed by a database should group them into one atomic
/// transaction, as a partially propagated subtree is invalid state.
pub trait AuthStoreMut<NID, ID>: AuthStore<NID, ID>
where
    NID: NodeId,
    ID: IdentityHandle,
{
    /// Overwrite the visibility and editability of a space.
    fn set_space_policy(
        &mut self,
        id: &NID,
        visibility: Visibility,
        editability: Editability,
    ) -> Result<(), Self::Error>;

    /// Overwrite the visibility and editability of a page.
    fn set_page_policy(
        &mut self,
        id: &NID,
        visibility: Visibility,
        editability: Editability,
    ) -> Result<(), Self::Error>;

    /// Insert a grant.
    ///
    /// Returns `true` when the insert occurred, or `false` when an equal grant already existed
    /// and no insertion occurred. At most one grant exists per (target, principal, permission)
    /// tuple.
    fn insert_grant(&mut self, grant: Grant<NID, ID>) -> Result<bool, Self::Error>;

    /// Remove a grant.
    ///
    /// Returns `true` when the removal occurred and `false` when the grant was not found.
    fn remove_grant(&mut self, grant: &Grant<NID, ID>) -> Result<bool, Self::Error>;
}
