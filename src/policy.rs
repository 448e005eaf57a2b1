// SPDX-License-Identifier: MIT OR Apache-2.0

//! Total, side-effect-free view and edit decisions for spaces and pages.
//!
//! The permission hierarchy, strongest first:
//!
//! - system owner: unconditional access to everything
//! - node owner: unconditional access to their node
//! - grants: per-user or per-group records on the node or any ancestor space
//! - visibility tiers: `Public` is viewable by anyone, `Internal` by any authenticated
//!   principal, `Private` by owner or grant only
//!
//! Grants on a space are inherited: every walk climbs the parent chain, so access given at a
//! parent carries down to all pages and sub-spaces inside it. Absence of permission is `Ok(false)`
//! rather than an error; only store failures propagate.

use std::collections::HashSet;

use tracing::trace;

use crate::access::{Editability, Visibility};
use crate::context::EvaluationContext;
use crate::grant::GrantTarget;
use crate::node::{Page, Space};
use crate::traits::{AuthStore, IdentityHandle, NodeId};

/// Check if the principal can view a space.
///
/// Permission is checked on the space itself and then up the ancestor chain: a grant (any
/// permission level) or ownership of an ancestor is enough to see everything nested inside it.
/// Ancestor visibility is deliberately not rechecked during the walk: holding an explicit grant
/// on an ancestor implies access regardless of the tiers in between.
pub fn can_view_space<NID, ID, S>(
    store: &S,
    ctx: &EvaluationContext<NID, ID>,
    space: &Space<NID, ID>,
) -> Result<bool, S::Error>
where
    NID: NodeId,
    ID: IdentityHandle,
    S: AuthStore<NID, ID>,
{
    // The root space is always accessible.
    if space.is_root() {
        return Ok(true);
    }

    if space.visibility == Visibility::Public {
        return Ok(true);
    }

    if !ctx.is_authenticated() {
        return Ok(false);
    }

    if space.visibility == Visibility::Internal {
        return Ok(true);
    }

    if ctx.is_system_owner() {
        return Ok(true);
    }

    if ctx.is_owner(&space.owner) {
        return Ok(true);
    }

    // Grants on this space, any permission level.
    if has_matching_grant(store, ctx, &GrantTarget::Space(space.id), false)? {
        return Ok(true);
    }

    // Walk up the ancestor chain. Access to a parent grants access to its children. The visited
    // set terminates the walk should the tree ever contain a cycle.
    let mut visited = HashSet::from([space.id]);
    let mut parent = space.parent;
    while let Some(id) = parent {
        if !visited.insert(id) {
            break;
        }
        let Some(ancestor) = ctx.space(store, &id)? else {
            break;
        };
        if has_matching_grant(store, ctx, &GrantTarget::Space(id), false)? {
            trace!(?id, "view granted via ancestor space grant");
            return Ok(true);
        }
        if ctx.is_owner(&ancestor.owner) {
            trace!(?id, "view granted via ancestor space ownership");
            return Ok(true);
        }
        parent = ancestor.parent;
    }

    Ok(false)
}

/// Check if the principal can view a page.
///
/// A `Public` page is viewable unconditionally, even when its space is not: page visibility, once
/// granted, is authoritative. The write-time openness invariant
/// ([`validate_page_policy`](crate::validate_page_policy)) is what keeps a public page from being
/// created under a private space in the first place.
///
/// Any other page is gated by its space. Whoever cannot view the space cannot view its contents.
pub fn can_view_page<NID, ID, S>(
    store: &S,
    ctx: &EvaluationContext<NID, ID>,
    page: &Page<NID, ID>,
) -> Result<bool, S::Error>
where
    NID: NodeId,
    ID: IdentityHandle,
    S: AuthStore<NID, ID>,
{
    if page.visibility == Visibility::Public {
        return Ok(true);
    }

    if !ctx.is_authenticated() {
        return Ok(false);
    }

    // Space gate: a non-public page is hidden from anyone who cannot see its space. A dangling
    // space reference fails closed.
    if let Some(space_id) = page.space {
        let Some(space) = ctx.space(store, &space_id)? else {
            return Ok(false);
        };
        if !can_view_space(store, ctx, &space)? {
            return Ok(false);
        }
    }

    if page.visibility == Visibility::Internal {
        return Ok(true);
    }

    if ctx.is_system_owner() {
        return Ok(true);
    }

    if ctx.is_owner(&page.owner) {
        return Ok(true);
    }

    if has_matching_grant(store, ctx, &GrantTarget::Page(page.id), false)? {
        return Ok(true);
    }

    // Walk up the space chain; a grant at any level carries down to the page.
    let mut visited = HashSet::new();
    let mut current = page.space;
    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        if has_matching_grant(store, ctx, &GrantTarget::Space(id), false)? {
            trace!(?id, "view granted via space grant");
            return Ok(true);
        }
        let Some(space) = ctx.space(store, &id)? else {
            break;
        };
        current = space.parent;
    }

    Ok(false)
}

/// Check if the principal can edit a space.
pub fn can_edit_space<NID, ID, S>(
    store: &S,
    ctx: &EvaluationContext<NID, ID>,
    space: &Space<NID, ID>,
) -> Result<bool, S::Error>
where
    NID: NodeId,
    ID: IdentityHandle,
    S: AuthStore<NID, ID>,
{
    if !ctx.is_authenticated() {
        return Ok(false);
    }

    // Broadly editable, independent of visibility and grants.
    if space.editability == Editability::Internal {
        return Ok(true);
    }

    if ctx.is_system_owner() {
        return Ok(true);
    }

    if ctx.is_owner(&space.owner) {
        return Ok(true);
    }

    if has_matching_grant(store, ctx, &GrantTarget::Space(space.id), true)? {
        return Ok(true);
    }

    edit_grant_on_chain(store, ctx, space.parent, HashSet::from([space.id]))
}

/// Check if the principal can edit a page.
///
/// An Edit or Owner grant on any ancestor space grants edit on the page: space permissions
/// cascade down to everything inside.
pub fn can_edit_page<NID, ID, S>(
    store: &S,
    ctx: &EvaluationContext<NID, ID>,
    page: &Page<NID, ID>,
) -> Result<bool, S::Error>
where
    NID: NodeId,
    ID: IdentityHandle,
    S: AuthStore<NID, ID>,
{
    if !ctx.is_authenticated() {
        return Ok(false);
    }

    if page.editability == Editability::Internal {
        return Ok(true);
    }

    if ctx.is_system_owner() {
        return Ok(true);
    }

    if ctx.is_owner(&page.owner) {
        return Ok(true);
    }

    if has_matching_grant(store, ctx, &GrantTarget::Page(page.id), true)? {
        return Ok(true);
    }

    edit_grant_on_chain(store, ctx, page.space, HashSet::new())
}

/// Return `true` when a grant on the target applies to the context's principal, either issued to
/// them directly or to one of their groups. With `edit_only` set, only Edit and Owner grants
/// qualify.
fn has_matching_grant<NID, ID, S>(
    store: &S,
    ctx: &EvaluationContext<NID, ID>,
    target: &GrantTarget<NID>,
    edit_only: bool,
) -> Result<bool, S::Error>
where
    NID: NodeId,
    ID: IdentityHandle,
    S: AuthStore<NID, ID>,
{
    let grants = store.grants(target)?;
    Ok(grants
        .iter()
        .filter(|grant| !edit_only || grant.permission.grants_edit())
        .any(|grant| ctx.matches(&grant.principal)))
}

/// Walk the space chain starting at `start`, looking for an Edit or Owner grant matching the
/// context's principal.
fn edit_grant_on_chain<NID, ID, S>(
    store: &S,
    ctx: &EvaluationContext<NID, ID>,
    start: Option<NID>,
    mut visited: HashSet<NID>,
) -> Result<bool, S::Error>
where
    NID: NodeId,
    ID: IdentityHandle,
    S: AuthStore<NID, ID>,
{
    let mut current = start;
    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        if has_matching_grant(store, ctx, &GrantTarget::Space(id), true)? {
            trace!(?id, "edit granted via space grant");
            return Ok(true);
        }
        let Some(space) = ctx.space(store, &id)? else {
            break;
        };
        current = space.parent;
    }

    Ok(false)
}
