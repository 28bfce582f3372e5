use tentroster_core::{ContainerListing, ContainerStore, StoreError};

fn listing(rows: &[(&str, &[&str])]) -> Vec<ContainerListing> {
    rows.iter()
        .map(|(id, members)| ContainerListing {
            container_id: id.to_string(),
            member_ids: members.iter().map(|member| member.to_string()).collect(),
            is_locked: false,
        })
        .collect()
}

fn setup() -> ContainerStore {
    ContainerStore::from_listing(listing(&[
        ("A", &["1", "2"]),
        ("B", &["3"]),
        ("C", &[]),
    ]))
    .unwrap()
}

#[test]
fn container_of_follows_moves() {
    let mut store = setup();
    assert_eq!(store.container_of("1"), Some("A"));

    let index = store.move_item("1", "B", 1).unwrap();
    assert_eq!(index, 1);
    assert_eq!(store.container_of("1"), Some("B"));
    assert_eq!(store.items_of("A"), ["2"]);
    assert_eq!(store.items_of("B"), ["3", "1"]);
    assert!(store.is_consistent());
}

#[test]
fn move_into_empty_container_at_zero() {
    let mut store = setup();
    store.move_item("3", "C", 0).unwrap();
    assert!(store.items_of("B").is_empty());
    assert_eq!(store.items_of("C"), ["3"]);
    assert_eq!(store.locate("3"), Some(("C", 0)));
}

#[test]
fn reorder_container_is_an_array_move() {
    let mut store =
        ContainerStore::from_listing(listing(&[("A", &["1", "2", "3", "4"])])).unwrap();
    store.reorder_container("A", 0, 2).unwrap();
    assert_eq!(store.items_of("A"), ["2", "3", "1", "4"]);
    store.reorder_container("A", 3, 0).unwrap();
    assert_eq!(store.items_of("A"), ["4", "2", "3", "1"]);
    assert_eq!(store.container_of("4"), Some("A"));
}

#[test]
fn reorder_containers_keeps_membership() {
    let mut store = setup();
    store.reorder_containers(1, 0).unwrap();
    assert_eq!(store.container_order(), ["B", "A", "C"]);
    assert_eq!(store.items_of("A"), ["1", "2"]);

    let ids: Vec<&str> = store.containers().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["B", "A", "C"]);
}

#[test]
fn create_container_rejects_duplicates_blank_and_sentinels() {
    let mut store = setup();
    store.create_container("D").unwrap();
    assert_eq!(store.container_order(), ["A", "B", "C", "D"]);

    assert_eq!(
        store.create_container("A").unwrap_err(),
        StoreError::DuplicateContainer("A".to_string())
    );
    assert_eq!(
        store.create_container("placeholder").unwrap_err(),
        StoreError::ReservedContainerId("placeholder".to_string())
    );
    assert_eq!(
        store.create_container("  ").unwrap_err(),
        StoreError::InvalidContainerId("  ".to_string())
    );
    assert_eq!(store.len(), 4);
}

#[test]
fn delete_container_requires_empty() {
    let mut store = setup();
    assert_eq!(
        store.delete_container("A").unwrap_err(),
        StoreError::ContainerNotEmpty("A".to_string())
    );
    store.delete_container("C").unwrap();
    assert_eq!(store.container_order(), ["A", "B"]);
    assert_eq!(
        store.delete_container("C").unwrap_err(),
        StoreError::ContainerNotFound("C".to_string())
    );
}

#[test]
fn remove_and_insert_item_roundtrip_through_unassigned() {
    let mut store = setup();
    let (container, index) = store.remove_item("1").unwrap();
    assert_eq!((container.as_str(), index), ("A", 0));
    assert!(!store.is_assigned("1"));
    assert_eq!(store.item_count(), 2);

    store.insert_item("1", "C", 0).unwrap();
    assert_eq!(store.container_of("1"), Some("C"));
    assert_eq!(
        store.insert_item("1", "A", 0).unwrap_err(),
        StoreError::DuplicateItem("1".to_string())
    );
    assert!(store.is_consistent());
}

#[test]
fn lock_flags_toggle_per_container_and_globally() {
    let mut store = setup();
    store.set_locked("B", true).unwrap();
    assert!(store.is_locked("B"));
    assert!(!store.is_locked("A"));

    store.set_all_locked(true);
    assert!(store.containers().all(|container| container.is_locked));
    store.set_all_locked(false);
    assert!(!store.is_locked("B"));

    assert_eq!(
        store.set_locked("Z", true).unwrap_err(),
        StoreError::ContainerNotFound("Z".to_string())
    );
}

#[test]
fn assignments_follow_display_order() {
    let mut store = setup();
    store.reorder_containers(2, 0).unwrap();
    let assignments = store.assignments();
    let ids: Vec<&str> = assignments
        .iter()
        .map(|assignment| assignment.container_id.as_str())
        .collect();
    assert_eq!(ids, vec!["C", "A", "B"]);
    assert_eq!(assignments[1].member_ids, vec!["1", "2"]);
}
