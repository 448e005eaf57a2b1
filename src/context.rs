// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::grant::Principal;
use crate::node::Space;
use crate::traits::{AuthStore, IdentityHandle, NodeId};

/// The resolved identity of one principal for the lifetime of one logical request.
///
/// Group membership and the system owner are read once when the context is constructed and
/// memoized for every decision made against it. Policy decisions based on stale membership are a
/// correctness bug, so a context must never outlive the request it was built for; after mutating
/// a user's memberships, build a new context.
///
/// The context also carries a small cache of spaces fetched during ancestor walks, so repeated
/// decisions over the same subtree (a listing, say) hit the store once per ancestor.
#[derive(Debug)]
pub struct EvaluationContext<NID, ID> {
    user: Option<ID>,
    groups: HashSet<ID>,
    system_owner: Option<ID>,
    spaces: RefCell<HashMap<NID, Option<Space<NID, ID>>>>,
}

impl<NID, ID> EvaluationContext<NID, ID>
where
    NID: NodeId,
    ID: IdentityHandle,
{
    /// Context for an unauthenticated visitor.
    ///
    /// Anonymous principals belong to no groups and never match an owner or the system owner.
    pub fn anonymous() -> Self {
        Self {
            user: None,
            groups: HashSet::new(),
            system_owner: None,
            spaces: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve an authenticated user against the store, memoizing their group memberships and
    /// the configured system owner.
    pub fn for_user<S>(store: &S, user: ID) -> Result<Self, S::Error>
    where
        S: AuthStore<NID, ID>,
    {
        let groups = store.group_ids(&user)?;
        let system_owner = store.system_owner()?;

        Ok(Self {
            user: Some(user),
            groups,
            system_owner,
            spaces: RefCell::new(HashMap::new()),
        })
    }

    /// The authenticated user this context was built for, `None` for anonymous visitors.
    pub fn user(&self) -> Option<ID> {
        self.user
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Return `true` when this context's user is the system owner.
    pub fn is_system_owner(&self) -> bool {
        match (self.user, self.system_owner) {
            (Some(user), Some(owner)) => user == owner,
            _ => false,
        }
    }

    /// Return `true` when this context's user owns the given node owner field.
    pub fn is_owner(&self, owner: &Option<ID>) -> bool {
        match (self.user, owner) {
            (Some(user), Some(owner)) => user == *owner,
            _ => false,
        }
    }

    /// Return `true` when a grant issued to the given principal applies to this context's user,
    /// either directly or through one of their memoized group memberships.
    pub fn matches(&self, principal: &Principal<ID>) -> bool {
        match principal {
            Principal::Individual(id) => self.user == Some(*id),
            Principal::Group(id) => self.groups.contains(id),
        }
    }

    /// Fetch a space through the per-context cache.
    ///
    /// Negative results are cached too: a dangling reference stays dangling for the lifetime of
    /// the context.
    pub fn space<S>(&self, store: &S, id: &NID) -> Result<Option<Space<NID, ID>>, S::Error>
    where
        S: AuthStore<NID, ID>,
    {
        if let Some(cached) = self.spaces.borrow().get(id) {
            return Ok(cached.clone());
        }

        let space = store.space(id)?;
        self.spaces.borrow_mut().insert(*id, space.clone());
        Ok(space)
    }
}
