use crate::access::{Editability, Permission, Visibility};
use crate::context::EvaluationContext;
use crate::grant::{Grant, GrantTarget, Principal};
use crate::node::{Page, Space};
use crate::policy::{can_edit_page, can_edit_space, can_view_page, can_view_space};
use crate::propagate::{ApplyScope, apply_permissions};
use crate::test_utils::{TestContext, TestPage, TestSpace, TestStore};
use crate::traits::{AuthStore, AuthStoreMut};

fn ctx(store: &TestStore, user: char) -> TestContext {
    EvaluationContext::for_user(store, user).unwrap()
}

#[test]
fn root_is_always_viewable() {
    let mut store = TestStore::default();
    let root: TestSpace = Space::root(0).with_visibility(Visibility::Private);
    store.insert_space(root.clone());

    let anon = EvaluationContext::anonymous();
    assert!(can_view_space(&store, &anon, &root).unwrap());

    let alice = ctx(&store, 'A');
    assert!(can_view_space(&store, &alice, &root).unwrap());
}

#[test]
fn space_visibility_tiers() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let public = Space::new(1, 0);
    let internal = Space::new(2, 0).with_visibility(Visibility::Internal);
    let private = Space::new(3, 0).with_visibility(Visibility::Private);
    store.insert_space(public.clone());
    store.insert_space(internal.clone());
    store.insert_space(private.clone());

    let anon = EvaluationContext::anonymous();
    assert!(can_view_space(&store, &anon, &public).unwrap());
    assert!(!can_view_space(&store, &anon, &internal).unwrap());
    assert!(!can_view_space(&store, &anon, &private).unwrap());

    // Any authenticated principal sees internal spaces, but not private ones.
    let alice = ctx(&store, 'A');
    assert!(can_view_space(&store, &alice, &public).unwrap());
    assert!(can_view_space(&store, &alice, &internal).unwrap());
    assert!(!can_view_space(&store, &alice, &private).unwrap());
}

#[test]
fn owner_supremacy() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let space = Space::new(1, 0)
        .with_visibility(Visibility::Private)
        .with_owner('A');
    let page = Page::new_in(10, &space).with_owner('A');
    store.insert_space(space.clone());
    store.insert_page(page.clone());

    let alice = ctx(&store, 'A');
    assert!(can_view_space(&store, &alice, &space).unwrap());
    assert!(can_edit_space(&store, &alice, &space).unwrap());
    assert!(can_view_page(&store, &alice, &page).unwrap());
    assert!(can_edit_page(&store, &alice, &page).unwrap());

    let bob = ctx(&store, 'B');
    assert!(!can_view_space(&store, &bob, &space).unwrap());
    assert!(!can_edit_space(&store, &bob, &space).unwrap());
    assert!(!can_edit_page(&store, &bob, &page).unwrap());
}

#[test]
fn system_owner_supremacy() {
    let mut store = TestStore::default();
    store.set_system_owner('S');
    store.insert_space(Space::root(0));
    let space = Space::new(1, 0)
        .with_visibility(Visibility::Private)
        .with_owner('A');
    let page = Page::new_in(10, &space).with_owner('A');
    store.insert_space(space.clone());
    store.insert_page(page.clone());

    let system = ctx(&store, 'S');
    assert!(can_view_space(&store, &system, &space).unwrap());
    assert!(can_edit_space(&store, &system, &space).unwrap());
    assert!(can_view_page(&store, &system, &page).unwrap());
    assert!(can_edit_page(&store, &system, &page).unwrap());
}

#[test]
fn grant_on_space_grants_view() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let space = Space::new(1, 0).with_visibility(Visibility::Private);
    store.insert_space(space.clone());
    store
        .insert_grant(Grant::for_space(1, Principal::Individual('B'), Permission::View))
        .unwrap();

    let bob = ctx(&store, 'B');
    assert!(can_view_space(&store, &bob, &space).unwrap());
    // A view grant does not allow editing.
    assert!(!can_edit_space(&store, &bob, &space).unwrap());

    let carol = ctx(&store, 'C');
    assert!(!can_view_space(&store, &carol, &space).unwrap());

    // Revoking the grant closes access again.
    store
        .remove_grant(&Grant::for_space(1, Principal::Individual('B'), Permission::View))
        .unwrap();
    let bob = ctx(&store, 'B');
    assert!(!can_view_space(&store, &bob, &space).unwrap());
}

#[test]
fn root_attached_pages_carry_their_own_policy() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let private: TestPage = Page::new(10)
        .with_visibility(Visibility::Private)
        .with_owner('A');
    let internal: TestPage = Page::new(11).with_visibility(Visibility::Internal);
    store.insert_page(private.clone());
    store.insert_page(internal.clone());

    // No space gate applies to pages sitting directly at the root.
    assert!(can_view_page(&store, &ctx(&store, 'A'), &private).unwrap());
    assert!(!can_view_page(&store, &ctx(&store, 'B'), &private).unwrap());
    assert!(can_view_page(&store, &ctx(&store, 'B'), &internal).unwrap());
    assert!(!can_view_page(&store, &EvaluationContext::anonymous(), &internal).unwrap());
}

#[test]
fn ancestor_grant_carries_down() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let top = Space::new(1, 0).with_visibility(Visibility::Private);
    let mid = Space::new(2, 1).with_visibility(Visibility::Private);
    let leaf = Space::new(3, 2).with_visibility(Visibility::Private);
    let page = Page::new_in(10, &leaf);
    store.insert_space(top);
    store.insert_space(mid.clone());
    store.insert_space(leaf.clone());
    store.insert_page(page.clone());
    store
        .insert_grant(Grant::for_space(1, Principal::Individual('B'), Permission::Edit))
        .unwrap();

    // An edit grant at the top carries down to every nested space and page.
    let bob = ctx(&store, 'B');
    assert!(can_view_space(&store, &bob, &mid).unwrap());
    assert!(can_view_space(&store, &bob, &leaf).unwrap());
    assert!(can_edit_space(&store, &bob, &leaf).unwrap());
    assert!(can_view_page(&store, &bob, &page).unwrap());
    assert!(can_edit_page(&store, &bob, &page).unwrap());
}

#[test]
fn ancestor_owner_sees_spaces_but_not_private_pages() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let top = Space::new(1, 0)
        .with_visibility(Visibility::Private)
        .with_owner('A');
    let nested = Space::new(2, 1).with_visibility(Visibility::Private);
    let page = Page::new_in(10, &nested).with_owner('B');
    store.insert_space(top);
    store.insert_space(nested.clone());
    store.insert_page(page.clone());

    // Owning an ancestor opens the nested space itself, but a private page inside it still
    // requires a grant or page ownership, as the page walk honours grants only.
    let alice = ctx(&store, 'A');
    assert!(can_view_space(&store, &alice, &nested).unwrap());
    assert!(!can_view_page(&store, &alice, &page).unwrap());
}

#[test]
fn space_gate_hides_non_public_pages() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let private = Space::new(1, 0).with_visibility(Visibility::Private);
    let page = Page::new_in(10, &private).with_visibility(Visibility::Internal);
    store.insert_space(private);
    store.insert_page(page.clone());

    // Internal visibility would admit any authenticated user, but the private space gates it.
    let carol = ctx(&store, 'C');
    assert!(!can_view_page(&store, &carol, &page).unwrap());
}

#[test]
fn public_page_overrides_private_space() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let private = Space::new(1, 0).with_visibility(Visibility::Private);
    store.insert_space(private.clone());
    // Constructed directly: the write-time validator would reject creating this pair, the
    // read-time shortcut must still honour the page's own visibility.
    let page: TestPage = Page::new_in(10, &private)
        .with_visibility(Visibility::Public)
        .with_owner('A');
    store.insert_page(page.clone());

    let anon = EvaluationContext::anonymous();
    assert!(can_view_page(&store, &anon, &page).unwrap());

    let carol = ctx(&store, 'C');
    assert!(can_view_page(&store, &carol, &page).unwrap());
}

#[test]
fn internal_editability_escape_hatch() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let space = Space::new(1, 0)
        .with_visibility(Visibility::Internal)
        .with_editability(Editability::Internal);
    let page = Page::new_in(10, &space).with_editability(Editability::Internal);
    store.insert_space(space.clone());
    store.insert_page(page.clone());

    // Any authenticated principal may edit, no grant needed.
    let carol = ctx(&store, 'C');
    assert!(can_edit_space(&store, &carol, &space).unwrap());
    assert!(can_edit_page(&store, &carol, &page).unwrap());

    // Anonymous visitors still may not.
    let anon = EvaluationContext::anonymous();
    assert!(!can_edit_space(&store, &anon, &space).unwrap());
    assert!(!can_edit_page(&store, &anon, &page).unwrap());
}

#[test]
fn group_grant_expands_to_members() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let space = Space::new(1, 0).with_visibility(Visibility::Private);
    let page = Page::new_in(10, &space);
    store.insert_space(space);
    store.insert_page(page.clone());
    store
        .insert_grant(Grant::for_page(10, Principal::Group('g'), Permission::View))
        .unwrap();
    store.add_group_member('g', 'B');

    let bob = ctx(&store, 'B');
    assert!(can_view_page(&store, &bob, &page).unwrap());

    // Revoking membership takes effect with the next evaluation context.
    store.remove_group_member('g', 'B');
    let bob = ctx(&store, 'B');
    assert!(!can_view_page(&store, &bob, &page).unwrap());
}

#[test]
fn edit_requires_edit_or_owner_grant() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let space = Space::new(1, 0).with_visibility(Visibility::Private);
    let page = Page::new_in(10, &space);
    store.insert_space(space);
    store.insert_page(page.clone());
    store
        .insert_grant(Grant::for_page(10, Principal::Individual('B'), Permission::View))
        .unwrap();
    store
        .insert_grant(Grant::for_page(10, Principal::Individual('C'), Permission::Edit))
        .unwrap();
    store
        .insert_grant(Grant::for_page(10, Principal::Individual('D'), Permission::Owner))
        .unwrap();

    assert!(!can_edit_page(&store, &ctx(&store, 'B'), &page).unwrap());
    assert!(can_edit_page(&store, &ctx(&store, 'C'), &page).unwrap());
    assert!(can_edit_page(&store, &ctx(&store, 'D'), &page).unwrap());
}

#[test]
fn apply_permissions_direct() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let space = Space::new(1, 0)
        .with_visibility(Visibility::Private)
        .with_editability(Editability::Restricted);
    let page = Page::new_in(10, &space).with_visibility(Visibility::Private);
    let nested = Space::new(2, 1);
    let nested_page = Page::new_in(20, &nested);
    store.insert_space(space.clone());
    store.insert_page(page);
    store.insert_space(nested.clone());
    store.insert_page(nested_page);
    store
        .insert_grant(Grant::for_space(1, Principal::Individual('B'), Permission::Edit))
        .unwrap();
    // A page-level grant which propagation must never remove.
    store
        .insert_grant(Grant::for_page(10, Principal::Individual('E'), Permission::View))
        .unwrap();

    let report = apply_permissions(&mut store, &space, ApplyScope::Direct).unwrap();
    assert_eq!(report.pages_updated, 1);
    assert_eq!(report.spaces_updated, 0);

    // The direct page took over the space's settings and grants.
    let page = store.page(&10).unwrap().unwrap();
    assert_eq!(page.visibility, Visibility::Private);
    assert_eq!(page.editability, Editability::Restricted);
    let mut grants = store.grants(&GrantTarget::Page(10)).unwrap();
    grants.sort_by_key(|grant| grant.principal.id());
    assert_eq!(
        grants,
        vec![
            Grant::for_page(10, Principal::Individual('B'), Permission::Edit),
            Grant::for_page(10, Principal::Individual('E'), Permission::View),
        ]
    );

    // Direct scope leaves the nested space and its contents alone.
    assert_eq!(store.space(&2).unwrap().unwrap().visibility, Visibility::Public);
    assert!(store.grants(&GrantTarget::Page(20)).unwrap().is_empty());
}

#[test]
fn apply_permissions_recursive() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let top = Space::new(1, 0)
        .with_visibility(Visibility::Internal)
        .with_editability(Editability::Internal);
    let mid = Space::new(2, 1).with_visibility(Visibility::Public);
    let leaf = Space::new(3, 2).with_visibility(Visibility::Public);
    let top_page = Page::new_in(10, &top);
    let leaf_page = Page::new_in(30, &leaf);
    store.insert_space(top.clone());
    store.insert_space(mid);
    store.insert_space(leaf);
    store.insert_page(top_page);
    store.insert_page(leaf_page);
    store
        .insert_grant(Grant::for_space(1, Principal::Group('g'), Permission::View))
        .unwrap();

    let report = apply_permissions(&mut store, &top, ApplyScope::Recursive).unwrap();
    assert_eq!(report.pages_updated, 2);
    assert_eq!(report.spaces_updated, 2);

    // Every descendant takes the top-level source's values, not its intermediate parent's.
    for id in [2, 3] {
        let space = store.space(&id).unwrap().unwrap();
        assert_eq!(space.visibility, Visibility::Internal);
        assert_eq!(space.editability, Editability::Internal);
        assert_eq!(
            store.grants(&GrantTarget::Space(id)).unwrap(),
            vec![Grant::for_space(id, Principal::Group('g'), Permission::View)]
        );
    }
    for id in [10, 30] {
        let page = store.page(&id).unwrap().unwrap();
        assert_eq!(page.visibility, Visibility::Internal);
        assert_eq!(
            store.grants(&GrantTarget::Page(id)).unwrap(),
            vec![Grant::for_page(id, Principal::Group('g'), Permission::View)]
        );
    }
}

#[test]
fn apply_permissions_is_idempotent() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let top = Space::new(1, 0).with_visibility(Visibility::Private);
    let nested = Space::new(2, 1);
    let page = Page::new_in(20, &nested);
    store.insert_space(top.clone());
    store.insert_space(nested);
    store.insert_page(page);
    store
        .insert_grant(Grant::for_space(1, Principal::Individual('B'), Permission::Edit))
        .unwrap();
    store
        .insert_grant(Grant::for_page(20, Principal::Individual('E'), Permission::View))
        .unwrap();

    let first = apply_permissions(&mut store, &top, ApplyScope::Recursive).unwrap();
    let after_first = store.clone();

    let second = apply_permissions(&mut store, &top, ApplyScope::Recursive).unwrap();
    assert_eq!(first, second);

    // Same grants, same policies: the second run changed nothing and removed nothing.
    assert_eq!(
        store.grants(&GrantTarget::Page(20)).unwrap().len(),
        after_first.grants(&GrantTarget::Page(20)).unwrap().len()
    );
    assert_eq!(
        store.grants(&GrantTarget::Space(2)).unwrap(),
        after_first.grants(&GrantTarget::Space(2)).unwrap()
    );
    let unrelated = Grant::for_page(20, Principal::Individual('E'), Permission::View);
    assert!(store.grants(&GrantTarget::Page(20)).unwrap().contains(&unrelated));
}

#[test]
fn removing_a_node_cascades_to_its_grants() {
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let space = Space::new(1, 0);
    store.insert_space(space);
    store
        .insert_grant(Grant::for_space(1, Principal::Individual('B'), Permission::View))
        .unwrap();

    store.remove_space(&1);
    assert!(store.grants(&GrantTarget::Space(1)).unwrap().is_empty());

    let page: TestPage = Page::new(10);
    store.insert_page(page);
    store
        .insert_grant(Grant::for_page(10, Principal::Group('g'), Permission::Edit))
        .unwrap();
    store.remove_page(&10);
    assert!(store.grants(&GrantTarget::Page(10)).unwrap().is_empty());
}

#[test]
fn engineering_runbook_scenario() {
    crate::test_utils::init_tracing();

    // Space `Eng` is private with an edit grant for bob; `Eng/DevOps` is public with no grants;
    // page `Eng/DevOps/Runbook` is public.
    let mut store = TestStore::default();
    store.insert_space(Space::root(0));
    let eng = Space::new(1, 0).with_visibility(Visibility::Private);
    let devops = Space::new(2, 1);
    let runbook = Page::new_in(10, &devops);
    store.insert_space(eng.clone());
    store.insert_space(devops.clone());
    store.insert_page(runbook.clone());
    store
        .insert_grant(Grant::for_space(1, Principal::Individual('B'), Permission::Edit))
        .unwrap();

    assert_eq!(runbook.visibility, Visibility::Public);

    // Bob sees the runbook, and everything above it, through his grant, and can edit it.
    let bob = ctx(&store, 'B');
    assert!(can_view_space(&store, &bob, &eng).unwrap());
    assert!(can_view_space(&store, &bob, &devops).unwrap());
    assert!(can_view_page(&store, &bob, &runbook).unwrap());
    assert!(can_edit_page(&store, &bob, &runbook).unwrap());

    // Carol holds no grant and cannot see `Eng`, yet the public runbook is still visible to
    // her: space gating applies to non-public pages only.
    let carol = ctx(&store, 'C');
    assert!(!can_view_space(&store, &carol, &eng).unwrap());
    assert!(can_view_page(&store, &carol, &runbook).unwrap());
    assert!(!can_edit_page(&store, &carol, &runbook).unwrap());

    // An internal page in the public `DevOps` is reachable for carol too: the gate checks the
    // page's own space, and a public space is viewable no matter what sits above it.
    let checklist = Page::new_in(11, &devops).with_visibility(Visibility::Internal);
    store.insert_page(checklist.clone());
    assert!(can_view_page(&store, &carol, &checklist).unwrap());

    // Directly inside the private `Eng` the same visibility is gated away from her.
    let notes = Page::new_in(12, &eng).with_visibility(Visibility::Internal);
    store.insert_page(notes.clone());
    let carol = ctx(&store, 'C');
    assert!(!can_view_page(&store, &carol, &notes).unwrap());
    assert!(can_view_page(&store, &bob, &notes).unwrap());
}
