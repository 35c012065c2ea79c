use super::*;
use crate::store::memory::MemoryPermissionStore;

fn resolver() -> (Arc<MemoryPermissionStore>, PermissionResolver) {
    let store = Arc::new(MemoryPermissionStore::new());
    let resolver = PermissionResolver::new(store.clone(), 10);
    (store, resolver)
}

#[test]
fn test_seed_table_grants_covers_creator_and_admins() {
    let (store, resolver) = resolver();
    resolver.seed_table_grants(1, 5).unwrap();

    // Creator holds all four actions directly
    let perms = store.check_perms(5, 1).unwrap();
    assert_eq!(perms.len(), 4);
    for action in PermissionAction::ALL {
        assert!(perms.contains(&action));
    }

    // Admin-group members inherit the same four
    store.add_member(6, 10);
    let perms = store.check_perms(6, 1).unwrap();
    assert_eq!(perms.len(), 4);
}

#[test]
fn test_effective_permission_priority_order() {
    let (store, resolver) = resolver();

    store
        .assign(PermissionAction::ViewTable, Principal::User(5), 1)
        .unwrap();
    assert_eq!(
        resolver.effective_permission(Some(5), 1).unwrap(),
        PermissionLevel::View
    );

    store
        .assign(PermissionAction::UpdateContent, Principal::User(5), 1)
        .unwrap();
    assert_eq!(
        resolver.effective_permission(Some(5), 1).unwrap(),
        PermissionLevel::UpdateContent
    );

    store
        .assign(PermissionAction::ChangeTable, Principal::User(5), 1)
        .unwrap();
    assert_eq!(
        resolver.effective_permission(Some(5), 1).unwrap(),
        PermissionLevel::Change
    );
}

#[test]
fn test_effective_permission_without_viewer_or_grants() {
    let (store, resolver) = resolver();

    assert_eq!(
        resolver.effective_permission(None, 1).unwrap(),
        PermissionLevel::None
    );
    assert_eq!(
        resolver.effective_permission(Some(5), 1).unwrap(),
        PermissionLevel::None
    );

    // delete_table alone carries no read-side label
    store
        .assign(PermissionAction::DeleteTable, Principal::User(5), 1)
        .unwrap();
    assert_eq!(
        resolver.effective_permission(Some(5), 1).unwrap(),
        PermissionLevel::None
    );
}

#[test]
fn test_permission_labels_shape() {
    let (store, resolver) = resolver();

    assert_eq!(resolver.permission_labels(None, 1).unwrap(), vec![""]);

    store
        .assign(PermissionAction::UpdateContent, Principal::User(5), 1)
        .unwrap();
    store
        .assign(PermissionAction::ViewTable, Principal::User(5), 1)
        .unwrap();
    assert_eq!(
        resolver.permission_labels(Some(5), 1).unwrap(),
        vec!["update_content"]
    );
}
