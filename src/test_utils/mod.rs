// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory store and fixtures for testing policy decisions without a database.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::access::{Editability, Visibility};
use crate::context::EvaluationContext;
use crate::grant::{Grant, GrantTarget};
use crate::node::{Page, Space};
use crate::traits::{AuthStore, AuthStoreMut, IdentityHandle, NodeId};

pub type UserId = char;
pub type SpaceId = u64;

pub type TestSpace = Space<SpaceId, UserId>;
pub type TestPage = Page<SpaceId, UserId>;
pub type TestStore = MemoryStore<SpaceId, UserId>;
pub type TestContext = EvaluationContext<SpaceId, UserId>;

impl IdentityHandle for char {}
impl NodeId for u64 {}

#[derive(Debug, Error)]
pub enum MemoryStoreError {}

/// HashMap-backed store holding the tree, grants and identity data in one place.
///
/// Grants live in a set, so the per-(target, principal, permission) uniqueness invariant holds
/// structurally. Group memberships and the system owner are plain fields with direct mutators;
/// tests change them between evaluation contexts to model identity changes.
#[derive(Clone, Debug)]
pub struct MemoryStore<NID, ID> {
    spaces: HashMap<NID, Space<NID, ID>>,
    pages: HashMap<NID, Page<NID, ID>>,
    grants: HashSet<Grant<NID, ID>>,
    memberships: HashMap<ID, HashSet<ID>>,
    system_owner: Option<ID>,
}

impl<NID, ID> MemoryStore<NID, ID> {
    pub fn new() -> Self {
        Self {
            spaces: HashMap::new(),
            pages: HashMap::new(),
            grants: HashSet::new(),
            memberships: HashMap::new(),
            system_owner: None,
        }
    }
}

impl<NID, ID> Default for MemoryStore<NID, ID> {
    fn default() -> Self {
        Self::new()
    }
}

impl<NID, ID> MemoryStore<NID, ID>
where
    NID: NodeId,
    ID: IdentityHandle,
{
    pub fn insert_space(&mut self, space: Space<NID, ID>) {
        self.spaces.insert(space.id, space);
    }

    pub fn insert_page(&mut self, page: Page<NID, ID>) {
        self.pages.insert(page.id, page);
    }

    /// Remove a space, cascading to the grants attached to it. Child nodes are left in place;
    /// callers decide whether to re-parent or remove them.
    pub fn remove_space(&mut self, id: &NID) -> Option<Space<NID, ID>> {
        let space = self.spaces.remove(id)?;
        self.grants
            .retain(|grant| grant.target != GrantTarget::Space(*id));
        Some(space)
    }

    /// Remove a page, cascading to the grants attached to it.
    pub fn remove_page(&mut self, id: &NID) -> Option<Page<NID, ID>> {
        let page = self.pages.remove(id)?;
        self.grants
            .retain(|grant| grant.target != GrantTarget::Page(*id));
        Some(page)
    }

    pub fn add_group_member(&mut self, group: ID, user: ID) {
        self.memberships.entry(user).or_default().insert(group);
    }

    pub fn remove_group_member(&mut self, group: ID, user: ID) {
        if let Some(groups) = self.memberships.get_mut(&user) {
            groups.remove(&group);
        }
    }

    pub fn set_system_owner(&mut self, user: ID) {
        self.system_owner = Some(user);
    }
}

impl<NID, ID> AuthStore<NID, ID> for MemoryStore<NID, ID>
where
    NID: NodeId,
    ID: IdentityHandle,
{
    type Error = MemoryStoreError;

    fn space(&self, id: &NID) -> Result<Option<Space<NID, ID>>, Self::Error> {
        Ok(self.spaces.get(id).cloned())
    }

    fn page(&self, id: &NID) -> Result<Option<Page<NID, ID>>, Self::Error> {
        Ok(self.pages.get(id).cloned())
    }

    fn child_spaces(&self, id: &NID) -> Result<Vec<Space<NID, ID>>, Self::Error> {
        Ok(self
            .spaces
            .values()
            .filter(|space| space.parent == Some(*id))
            .cloned()
            .collect())
    }

    fn child_pages(&self, id: &NID) -> Result<Vec<Page<NID, ID>>, Self::Error> {
        Ok(self
            .pages
            .values()
            .filter(|page| page.space == Some(*id))
            .cloned()
            .collect())
    }

    fn grants(&self, target: &GrantTarget<NID>) -> Result<Vec<Grant<NID, ID>>, Self::Error> {
        Ok(self
            .grants
            .iter()
            .filter(|grant| grant.target == *target)
            .cloned()
            .collect())
    }

    fn group_ids(&self, user: &ID) -> Result<HashSet<ID>, Self::Error> {
        Ok(self.memberships.get(user).cloned().unwrap_or_default())
    }

    fn system_owner(&self) -> Result<Option<ID>, Self::Error> {
        Ok(self.system_owner)
    }
}

impl<NID, ID> AuthStoreMut<NID, ID> for MemoryStore<NID, ID>
where
    NID: NodeId,
    ID: IdentityHandle,
{
    fn set_space_policy(
        &mut self,
        id: &NID,
        visibility: Visibility,
        editability: Editability,
    ) -> Result<(), Self::Error> {
        if let Some(space) = self.spaces.get_mut(id) {
            space.visibility = visibility;
            space.editability = editability;
        }
        Ok(())
    }

    fn set_page_policy(
        &mut self,
        id: &NID,
        visibility: Visibility,
        editability: Editability,
    ) -> Result<(), Self::Error> {
        if let Some(page) = self.pages.get_mut(id) {
            page.visibility = visibility;
            page.editability = editability;
        }
        Ok(())
    }

    fn insert_grant(&mut self, grant: Grant<NID, ID>) -> Result<bool, Self::Error> {
        Ok(self.grants.insert(grant))
    }

    fn remove_grant(&mut self, grant: &Grant<NID, ID>) -> Result<bool, Self::Error> {
        Ok(self.grants.remove(grant))
    }
}

/// Initialise a tracing subscriber reading `RUST_LOG`, for inspecting walk and propagation
/// traces in test output.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
