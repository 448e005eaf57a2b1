// SPDX-License-Identifier: MIT OR Apache-2.0

//! Copying a space's policy settings and grants onto its contents.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::grant::{Grant, GrantTarget};
use crate::node::Space;
use crate::traits::{AuthStoreMut, IdentityHandle, NodeId};

/// How far [`apply_permissions`] reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyScope {
    /// Only the pages directly inside the source space.
    Direct,

    /// The whole subtree: every descendant space and all pages within.
    Recursive,
}

/// Counts of the nodes touched by one [`apply_permissions`] call, for caller reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub pages_updated: usize,
    pub spaces_updated: usize,
}

/// Copy the source space's current visibility, editability and grants onto its contents.
///
/// Every touched page and descendant space gets its visibility and editability overwritten with
/// the *source* space's values, in recursive mode always the values of the space the operation
/// started from, never the already-overwritten values of an intermediate level. Each grant on the
/// source is ensured to exist on the target (inserted if absent); grants already present on a
/// target are never removed, so propagation is strictly additive and running it twice is the same
/// as running it once.
///
/// The source space's own state is assumed valid and is not re-validated here. Implementations
/// of [`AuthStoreMut`] backed by a database should run the whole call inside one transaction:
/// a partially propagated subtree is invalid state and must not be observable.
pub fn apply_permissions<NID, ID, S>(
    store: &mut S,
    space: &Space<NID, ID>,
    scope: ApplyScope,
) -> Result<ApplyReport, S::Error>
where
    NID: NodeId,
    ID: IdentityHandle,
    S: AuthStoreMut<NID, ID>,
{
    let source_grants = store.grants(&GrantTarget::Space(space.id))?;
    let mut report = ApplyReport::default();

    // Pages directly inside the source are always covered.
    apply_to_pages(store, space, &space.id, &source_grants, &mut report)?;

    if scope == ApplyScope::Recursive {
        // Iterative walk over the subtree. The visited set keeps a malformed tree from being
        // walked forever; each node is touched exactly once.
        let mut visited = HashSet::from([space.id]);
        let mut frontier = vec![space.id];
        while let Some(id) = frontier.pop() {
            for child in store.child_spaces(&id)? {
                if !visited.insert(child.id) {
                    continue;
                }
                store.set_space_policy(&child.id, space.visibility, space.editability)?;
                for grant in &source_grants {
                    store.insert_grant(grant.retarget(GrantTarget::Space(child.id)))?;
                }
                report.spaces_updated += 1;
                trace!(space = ?child.id, "applied permissions to space");

                apply_to_pages(store, space, &child.id, &source_grants, &mut report)?;
                frontier.push(child.id);
            }
        }
    }

    debug!(
        source = ?space.id,
        ?scope,
        pages = report.pages_updated,
        spaces = report.spaces_updated,
        "applied permissions"
    );

    Ok(report)
}

/// Overwrite the policy of every page directly inside `space_id` with the source space's values
/// and ensure each source grant exists on the page.
fn apply_to_pages<NID, ID, S>(
    store: &mut S,
    source: &Space<NID, ID>,
    space_id: &NID,
    source_grants: &[Grant<NID, ID>],
    report: &mut ApplyReport,
) -> Result<(), S::Error>
where
    NID: NodeId,
    ID: IdentityHandle,
    S: AuthStoreMut<NID, ID>,
{
    for page in store.child_pages(space_id)? {
        store.set_page_policy(&page.id, source.visibility, source.editability)?;
        for grant in source_grants {
            store.insert_grant(grant.retarget(GrantTarget::Page(page.id)))?;
        }
        report.pages_updated += 1;
        trace!(page = ?page.id, "applied permissions to page");
    }

    Ok(())
}
