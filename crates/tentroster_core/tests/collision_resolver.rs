use tentroster_core::{
    CollisionResolver, ContainerListing, ContainerStore, DragGeometry, DragId, DropTarget, Point,
    Rect, RegionSet,
};

const COLUMN_STRIDE: f64 = 220.0;
const COLUMN_WIDTH: f64 = 200.0;
const ROW_HEIGHT: f64 = 40.0;

fn store(rows: &[(&str, &[&str])]) -> ContainerStore {
    ContainerStore::from_listing(rows.iter().map(|(id, members)| ContainerListing {
        container_id: id.to_string(),
        member_ids: members.iter().map(|member| member.to_string()).collect(),
        is_locked: false,
    }))
    .unwrap()
}

/// One column per container, header row, then one row per item; containers
/// register before their items.
fn layout(store: &ContainerStore) -> RegionSet {
    let mut regions = RegionSet::new();
    for (position, container) in store.containers().enumerate() {
        let x = position as f64 * COLUMN_STRIDE;
        regions.register(
            DropTarget::Container(container.id.clone()),
            Rect::new(x, 0.0, COLUMN_WIDTH, 400.0),
        );
    }
    for (position, container) in store.containers().enumerate() {
        let x = position as f64 * COLUMN_STRIDE;
        for (row, item) in container.items.iter().enumerate() {
            regions.register(
                DropTarget::Item(item.clone()),
                Rect::new(x, ROW_HEIGHT + row as f64 * ROW_HEIGHT, COLUMN_WIDTH, ROW_HEIGHT),
            );
        }
    }
    regions
}

fn drag_at(x: f64, y: f64) -> DragGeometry {
    DragGeometry::new(
        Point::new(x, y),
        Rect::new(x - COLUMN_WIDTH / 2.0, y - 5.0, COLUMN_WIDTH, ROW_HEIGHT),
    )
}

fn item(id: &str) -> DragId {
    DragId::Item(id.to_string())
}

fn item_target(id: &str) -> DropTarget {
    DropTarget::Item(id.to_string())
}

#[test]
fn pointer_over_non_empty_container_refines_to_item_slot() {
    let roster = store(&[("A", &["1", "2"]), ("B", &["3", "4"])]);
    let regions = layout(&roster);
    let mut resolver = CollisionResolver::new();

    let target = resolver.resolve(&item("1"), &drag_at(300.0, 90.0), &regions, &roster);
    assert_eq!(target, Some(item_target("4")));
}

#[test]
fn pointer_below_last_item_falls_back_to_nearest_item() {
    let roster = store(&[("A", &["1"]), ("B", &["3", "4"])]);
    let regions = layout(&roster);
    let mut resolver = CollisionResolver::new();

    let geometry = DragGeometry::new(Point::new(300.0, 350.0), Rect::new(200.0, 345.0, 200.0, 40.0));
    let target = resolver.resolve(&item("1"), &geometry, &regions, &roster);
    assert_eq!(target, Some(item_target("4")));
}

#[test]
fn pointer_over_empty_container_targets_container() {
    let roster = store(&[("A", &["1"]), ("B", &[])]);
    let regions = layout(&roster);
    let mut resolver = CollisionResolver::new();

    let target = resolver.resolve(&item("1"), &drag_at(300.0, 200.0), &regions, &roster);
    assert_eq!(target, Some(DropTarget::Container("B".to_string())));
}

#[test]
fn pointer_matches_resolve_to_first_registered_region() {
    let roster = store(&[("A", &["1"]), ("B", &["3"])]);
    let overlap = Rect::new(0.0, 0.0, 100.0, 100.0);
    let geometry = drag_at(50.0, 50.0);
    let mut resolver = CollisionResolver::new();

    let mut regions = RegionSet::new();
    regions.register(item_target("3"), overlap);
    regions.register(item_target("1"), overlap);
    assert_eq!(
        resolver.resolve(&item("2"), &geometry, &regions, &roster),
        Some(item_target("3"))
    );

    let mut reversed = RegionSet::new();
    reversed.register(item_target("1"), overlap);
    reversed.register(item_target("3"), overlap);
    assert_eq!(
        resolver.resolve(&item("2"), &geometry, &reversed, &roster),
        Some(item_target("1"))
    );
}

#[test]
fn without_pointer_the_largest_overlap_wins() {
    let roster = store(&[("A", &["1", "2"])]);
    let regions = layout(&roster);
    let mut resolver = CollisionResolver::new();

    // Rect sits in the gap to the right of column A; overlaps item 2 more than item 1.
    let geometry = DragGeometry::rect_only(Rect::new(150.0, 70.0, 200.0, 40.0));
    let target = resolver.resolve(&item("9"), &geometry, &regions, &roster);
    assert_eq!(target, Some(item_target("2")));
}

#[test]
fn trash_is_returned_verbatim() {
    let roster = store(&[("A", &["1"]), ("B", &["3"])]);
    let mut regions = RegionSet::new();
    regions.register(DropTarget::Trash, Rect::new(220.0, 0.0, 200.0, 400.0));
    for region in layout(&roster).iter() {
        regions.register(region.target.clone(), region.rect);
    }
    let mut resolver = CollisionResolver::new();

    let target = resolver.resolve(&item("1"), &drag_at(300.0, 60.0), &regions, &roster);
    assert_eq!(target, Some(DropTarget::Trash));
}

#[test]
fn container_drag_only_considers_containers() {
    let roster = store(&[("A", &["1"]), ("B", &["3"]), ("C", &[])]);
    let mut regions = layout(&roster);
    regions.register(DropTarget::Placeholder, Rect::new(660.0, 0.0, 200.0, 400.0));
    let mut resolver = CollisionResolver::new();

    let geometry = DragGeometry::new(Point::new(250.0, 60.0), Rect::new(230.0, 10.0, 200.0, 400.0));
    let target = resolver.resolve(&DragId::Container("A".to_string()), &geometry, &regions, &roster);
    assert_eq!(target, Some(DropTarget::Container("B".to_string())));

    let far_right = DragGeometry::rect_only(Rect::new(700.0, 0.0, 200.0, 400.0));
    let target = resolver.resolve(&DragId::Container("A".to_string()), &far_right, &regions, &roster);
    assert_eq!(target, Some(DropTarget::Container("C".to_string())));
}

#[test]
fn miss_returns_cached_target_or_nothing() {
    let roster = store(&[("A", &["1"]), ("B", &["3"])]);
    let regions = layout(&roster);
    let mut resolver = CollisionResolver::new();
    let nowhere = drag_at(5000.0, 5000.0);

    assert_eq!(resolver.resolve(&item("1"), &nowhere, &regions, &roster), None);

    let hit = resolver.resolve(&item("1"), &drag_at(300.0, 60.0), &regions, &roster);
    assert_eq!(hit, Some(item_target("3")));
    assert_eq!(
        resolver.resolve(&item("1"), &nowhere, &regions, &roster),
        Some(item_target("3"))
    );

    resolver.reset();
    assert_eq!(resolver.resolve(&item("1"), &nowhere, &regions, &roster), None);
}

#[test]
fn miss_right_after_a_move_targets_the_active_item_once() {
    let roster = store(&[("A", &["1"]), ("B", &["3"])]);
    let regions = layout(&roster);
    let mut resolver = CollisionResolver::new();
    let nowhere = drag_at(5000.0, 5000.0);

    resolver.resolve(&item("1"), &drag_at(300.0, 60.0), &regions, &roster);
    resolver.mark_recently_moved();
    assert!(resolver.recently_moved());

    assert_eq!(
        resolver.resolve(&item("1"), &nowhere, &regions, &roster),
        Some(item_target("1"))
    );
    assert!(!resolver.recently_moved());
    assert_eq!(resolver.last_resolved(), Some(&item_target("1")));
}

#[test]
fn identical_geometry_resolves_identically() {
    let roster = store(&[("A", &["1", "2"]), ("B", &["3"])]);
    let regions = layout(&roster);
    let mut resolver = CollisionResolver::new();

    for geometry in [drag_at(300.0, 60.0), drag_at(5000.0, 0.0), drag_at(100.0, 100.0)] {
        let first = resolver.resolve(&item("1"), &geometry, &regions, &roster);
        let second = resolver.resolve(&item("1"), &geometry, &regions, &roster);
        assert_eq!(first, second);
    }
}

#[test]
fn stale_regions_are_ignored() {
    let mut roster = store(&[("A", &["1", "2"])]);
    let regions = layout(&roster);
    roster.remove_item("2").unwrap();
    let mut resolver = CollisionResolver::new();

    // Pointer over the region left behind by item 2: refinement skips it.
    let target = resolver.resolve(&item("1"), &drag_at(100.0, 100.0), &regions, &roster);
    assert_eq!(target, Some(item_target("1")));
}
