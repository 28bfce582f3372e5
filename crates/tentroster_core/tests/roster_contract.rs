use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;
use tentroster_core::{
    BoardConfig, ConfigError, ContainerDeleteMode, ContainerListing, Item, RosterBoard, StoreError,
    TransferError,
};
use uuid::Uuid;

#[test]
fn listing_rows_accept_camel_case_and_defaults() {
    let rows: Vec<ContainerListing> = serde_json::from_value(json!([
        { "containerId": "Tent 01", "memberIds": ["p1", "p2"], "isLocked": true },
        { "containerId": "Tent 02" }
    ]))
    .unwrap();

    assert_eq!(rows[0].container_id, "Tent 01");
    assert_eq!(rows[0].member_ids, vec!["p1", "p2"]);
    assert!(rows[0].is_locked);
    assert!(rows[1].member_ids.is_empty());
    assert!(!rows[1].is_locked);
}

#[test]
fn commit_payload_serializes_in_display_order() {
    let rows: Vec<ContainerListing> = serde_json::from_value(json!([
        { "containerId": "Tent 02", "memberIds": ["p3"] },
        { "containerId": "Tent 01", "memberIds": ["p1", "p2"] }
    ]))
    .unwrap();
    let board = RosterBoard::from_listing(rows, Vec::new(), &BoardConfig::default()).unwrap();

    let session_id = Uuid::new_v4();
    let text = board.commit_payload(session_id).to_json().unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(
        value,
        json!({
            "sessionId": session_id.to_string(),
            "assignments": [
                { "containerId": "Tent 02", "memberIds": ["p3"] },
                { "containerId": "Tent 01", "memberIds": ["p1", "p2"] }
            ]
        })
    );
}

#[test]
fn malformed_listing_is_rejected_at_ingest() {
    let duplicate_member = vec![
        ContainerListing {
            container_id: "A".to_string(),
            member_ids: vec!["1".to_string()],
            is_locked: false,
        },
        ContainerListing {
            container_id: "B".to_string(),
            member_ids: vec!["1".to_string()],
            is_locked: false,
        },
    ];
    let err = RosterBoard::from_listing(duplicate_member, Vec::<Item>::new(), &BoardConfig::default())
        .err()
        .unwrap();
    assert_eq!(err, TransferError::Store(StoreError::DuplicateItem("1".to_string())));

    let sentinel = vec![ContainerListing {
        container_id: "trash".to_string(),
        member_ids: Vec::new(),
        is_locked: false,
    }];
    let err = RosterBoard::from_listing(sentinel, Vec::<Item>::new(), &BoardConfig::default())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        TransferError::Store(StoreError::ReservedContainerId(_))
    ));
}

#[test]
fn config_file_drives_delete_mode_and_seed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.json");
    fs::write(
        &path,
        r#"{ "delete_mode": "unassign", "first_container_id": "Tent 01" }"#,
    )
    .unwrap();
    let config = BoardConfig::load(&path).unwrap();
    assert_eq!(config.delete_mode, ContainerDeleteMode::Unassign);

    let rows = vec![ContainerListing {
        container_id: "Tent 01".to_string(),
        member_ids: vec!["p1".to_string()],
        is_locked: false,
    }];
    let items = vec![Item::new("p1", "Ada"), Item::new("p9", "Grace")];
    let mut board = RosterBoard::from_listing(rows, items, &config).unwrap();

    let released = board.delete_container("Tent 01").unwrap();
    assert_eq!(released, vec!["p1"]);
    assert!(board.store().is_empty());
    assert_eq!(board.unassigned_items().len(), 2);

    assert_eq!(board.create_next_container().unwrap(), "Tent 01");
    assert_eq!(board.create_next_container().unwrap(), "Tent 02");
}

#[test]
fn missing_or_invalid_config_files_fail() {
    let dir = tempdir().unwrap();
    let err = BoardConfig::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));

    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        BoardConfig::load(&path).unwrap_err(),
        ConfigError::Parse(_)
    ));

    fs::write(&path, r#"{ "first_container_id": "   " }"#).unwrap();
    assert!(matches!(
        BoardConfig::load(&path).unwrap_err(),
        ConfigError::Invalid(_)
    ));
}

#[test]
fn locked_container_cannot_be_deleted() {
    let rows = vec![ContainerListing {
        container_id: "A".to_string(),
        member_ids: Vec::new(),
        is_locked: true,
    }];
    let mut board = RosterBoard::from_listing(rows, Vec::<Item>::new(), &BoardConfig::default()).unwrap();
    assert_eq!(
        board.delete_container("A").unwrap_err(),
        TransferError::InvalidTransfer {
            container: "A".to_string()
        }
    );
    board.set_locked("A", false).unwrap();
    board.delete_container("A").unwrap();
    assert!(board.store().is_empty());
}
