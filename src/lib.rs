// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hierarchical access control for collaborative wikis.
//!
//! Content lives in a tree of [`Space`]s (directories) holding [`Page`]s (leaf documents). Every
//! read and write is guarded by a small set of total decision functions answering "can this
//! principal see or modify this node?":
//!
//! - [`can_view_space`] / [`can_view_page`] and [`can_edit_space`] / [`can_edit_page`] evaluate
//!   visibility tiers ([`Visibility`]), the broad-edit escape hatch ([`Editability`]), ownership,
//!   the system owner override and explicit [`Grant`]s, walking up the space hierarchy so that
//!   access granted on an ancestor carries down to everything inside it.
//! - [`validate_page_policy`] and friends are the write-time gate keeping page and space settings
//!   consistent (a page must never be more open than the space containing it).
//! - [`apply_permissions`] copies a space's current settings and grants onto its contents,
//!   directly or across the whole subtree, without ever removing existing grants.
//!
//! Evaluation is read-only and stateless across calls. Group membership and the system owner are
//! resolved once into an [`EvaluationContext`] which is scoped to a single logical request; build
//! a fresh context after membership changes.
//!
//! Persistence is left to the caller behind the [`AuthStore`] and [`AuthStoreMut`] traits. An
//! in-memory implementation is provided for tests behind the `test_utils` feature.

mod access;
mod context;
mod grant;
mod node;
pub mod policy;
pub mod propagate;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
#[cfg(test)]
mod tests;
pub mod traits;
pub mod validate;

pub use access::{Editability, Permission, Visibility};
pub use context::EvaluationContext;
pub use grant::{Grant, GrantTarget, Principal};
pub use node::{Page, Space};
pub use policy::{can_edit_page, can_edit_space, can_view_page, can_view_space};
pub use propagate::{ApplyReport, ApplyScope, apply_permissions};
pub use traits::{AuthStore, AuthStoreMut, IdentityHandle, NodeId};
pub use validate::{
    InvariantViolation, MoveError, MoveViolation, validate_page_move, validate_page_policy,
    validate_space_move, validate_space_policy,
};
