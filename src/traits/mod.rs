// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces onto the identity and persistence layers backing the policy engine.

mod store;

use std::fmt::Debug;
use std::hash::Hash as StdHash;

pub use store::{AuthStore, AuthStoreMut};

/// Identifier of a user or group.
pub trait IdentityHandle: Copy + Clone + Debug + PartialEq + Eq + StdHash {}

/// Identifier of a space or page.
pub trait NodeId: Copy + Clone + Debug + PartialEq + Eq + StdHash {}
