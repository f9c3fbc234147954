//! Integration tests for parsing account event data.
//!
//! These tests validate that the linode-account models can deserialize a
//! realistic event listing, including the loosely encoded fields.

use chrono::{TimeZone, Utc};
use linode_account::models::{EntityType, Event, EventAction, EventStatus};
use linode_core::ids::{EntityId, EventId};
use linode_core::pagination::PageEnvelope;
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load and decode the event page fixture.
fn load_events() -> Vec<Event> {
    let fixture_path = fixtures_dir().join("events_page.json");
    let json_data = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read event fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });

    let page: PageEnvelope<Event> = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize event page: {e}"));
    assert_eq!(page.results, 4);
    page.data
}

#[test]
fn test_deserialize_event_page() {
    let events = load_events();
    assert_eq!(events.len(), 4, "Expected 4 events in test data");
}

#[test]
fn test_in_progress_migration() {
    let events = load_events();
    let migration = &events[0];

    assert_eq!(migration.id, EventId::new(883_451_207));
    assert_eq!(migration.action, EventAction::LinodeMigrateDatacenter);
    assert_eq!(migration.status, EventStatus::Started);
    assert_eq!(migration.percent_complete, 37);
    assert_eq!(migration.rate.as_deref(), Some("112 MB/s"));
    assert_eq!(migration.time_remaining, Some(14 * 60 + 12));
    assert_eq!(
        migration.created,
        Some(Utc.with_ymd_and_hms(2024, 3, 18, 13, 45, 9).unwrap())
    );

    let entity = migration.entity.as_ref().expect("entity present");
    assert_eq!(entity.id, Some(EntityId::Int(51_902_345)));
    assert_eq!(entity.entity_type, Some(EntityType::Linode));
    assert!(migration.secondary_entity.is_none());
}

#[test]
fn test_string_entity_id_and_unknown_entity_type() {
    let events = load_events();
    let dns = &events[1];

    assert_eq!(dns.action, EventAction::DnsRecordCreate);
    assert_eq!(dns.status, EventStatus::Notification);
    assert_eq!(dns.percent_complete, 0);
    assert_eq!(dns.time_remaining, None);

    let entity = dns.entity.as_ref().unwrap();
    assert_eq!(entity.id, Some(EntityId::Str("example.com".to_string())));
    assert_eq!(entity.status, "");

    let secondary = dns.secondary_entity.as_ref().unwrap();
    assert_eq!(
        secondary.entity_type,
        Some(EntityType::Unknown("domain_record".to_string()))
    );
}

#[test]
fn test_unparseable_time_remaining_keeps_record_intact() {
    let events = load_events();
    let resize = &events[2];

    assert_eq!(resize.time_remaining, None);
    assert_eq!(resize.action, EventAction::DiskResize);
    assert_eq!(resize.percent_complete, 62);
    assert_eq!(resize.username, "");
    assert_eq!(
        resize.created,
        Some(Utc.with_ymd_and_hms(2024, 3, 18, 11, 59, 59).unwrap() + chrono::Duration::milliseconds(123))
    );
    assert_eq!(
        resize.secondary_entity.as_ref().and_then(|e| e.entity_type.clone()),
        Some(EntityType::Disk)
    );
}

#[test]
fn test_unknown_action_and_null_entity() {
    let events = load_events();
    let recycle = &events[3];

    assert_eq!(
        recycle.action,
        EventAction::Unknown("lke_pool_recycle".to_string())
    );
    assert!(recycle.is_complete());
    assert_eq!(recycle.time_remaining, Some(0));
    assert!(recycle.entity.is_none());
}
