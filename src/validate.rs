// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write-time consistency checks for visibility, editability and tree placement.
//!
//! These predicates gate every write that changes a node's policy settings or its position in
//! the tree. They are checked before the write: a rejected write must not be attempted at all,
//! and the returned violation names the invariant so callers can render an actionable message.
//! Reads never re-validate; see [`can_view_page`](crate::can_view_page) for the one read-time
//! shortcut that relies on these gates.

use std::collections::HashSet;

use thiserror::Error;

use crate::access::{Editability, Visibility};
use crate::node::Space;
use crate::traits::{AuthStore, IdentityHandle, NodeId};

/// A policy write rejected by the consistency validator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A page may not be more open than the space containing it.
    #[error("page visibility ({page}) is more open than its space ({space})")]
    Openness { page: Visibility, space: Visibility },

    /// Broad editability combined with private visibility would let principals edit content
    /// they cannot view.
    #[error("internal editability cannot be combined with private visibility")]
    EditabilityVisibility,
}

/// A move rejected by the placement validator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MoveViolation {
    /// Moving a space under itself or one of its own descendants would disconnect the subtree
    /// from the root and form a cycle.
    #[error("a space cannot be moved into itself or one of its descendants")]
    Cycle,

    /// The page being moved is more open than the destination space.
    #[error(transparent)]
    Openness(InvariantViolation),
}

/// Validate a page's proposed visibility and editability against the visibility of its space.
///
/// Pass `None` for pages attached directly to the root, which has no tier of its own to violate.
/// The openness invariant is checked first, then the editability/visibility pairing.
pub fn validate_page_policy(
    visibility: Visibility,
    editability: Editability,
    space_visibility: Option<Visibility>,
) -> Result<(), InvariantViolation> {
    if let Some(space_visibility) = space_visibility {
        if visibility.is_more_open_than(space_visibility) {
            return Err(InvariantViolation::Openness {
                page: visibility,
                space: space_visibility,
            });
        }
    }

    validate_space_policy(visibility, editability)
}

/// Validate a space's proposed visibility and editability.
///
/// Only the editability/visibility pairing is checked here. Lowering a space's visibility below
/// that of a page already inside it is deliberately not rejected: the page-side gates
/// ([`validate_page_policy`], [`validate_page_move`]) are the only enforcement points for the
/// openness invariant, so such a write leaves now-more-open children in place and readable
/// through their own visibility.
pub fn validate_space_policy(
    visibility: Visibility,
    editability: Editability,
) -> Result<(), InvariantViolation> {
    if editability == Editability::Internal && visibility == Visibility::Private {
        return Err(InvariantViolation::EditabilityVisibility);
    }

    Ok(())
}

/// Validate moving a page into another space.
pub fn validate_page_move(
    page_visibility: Visibility,
    destination_visibility: Visibility,
) -> Result<(), MoveViolation> {
    if page_visibility.is_more_open_than(destination_visibility) {
        return Err(MoveViolation::Openness(InvariantViolation::Openness {
            page: page_visibility,
            space: destination_visibility,
        }));
    }

    Ok(())
}

/// A space move that could not be validated or was rejected.
#[derive(Debug, Error)]
pub enum MoveError<E: std::error::Error> {
    #[error(transparent)]
    Violation(#[from] MoveViolation),

    #[error("store error: {0}")]
    Store(E),
}

/// Validate moving a space under a new parent.
///
/// Rejects the move when the destination is the space itself or any of its descendants, the only
/// writes which could introduce a cycle into the tree.
pub fn validate_space_move<NID, ID, S>(
    store: &S,
    space: &Space<NID, ID>,
    new_parent: &NID,
) -> Result<(), MoveError<S::Error>>
where
    NID: NodeId,
    ID: IdentityHandle,
    S: AuthStore<NID, ID>,
{
    if *new_parent == space.id {
        return Err(MoveViolation::Cycle.into());
    }

    let mut descendants = HashSet::from([space.id]);
    let mut frontier = vec![space.id];
    while let Some(id) = frontier.pop() {
        let children = store.child_spaces(&id).map_err(MoveError::Store)?;
        for child in children {
            if child.id == *new_parent {
                return Err(MoveViolation::Cycle.into());
            }
            if descendants.insert(child.id) {
                frontier.push(child.id);
            }
        }
    }

    Ok(())
}
