//! Account event records.
//!
//! Events are the account's audit and progress log: every asynchronous
//! operation (boots, migrations, disk resizes) emits one, and long-running
//! ones report `percent_complete` and an advisory `time_remaining`.

use chrono::{DateTime, Utc};
use linode_core::decode::{self, null_as_default};
use linode_core::ids::{EntityId, EventId};
use serde::{Deserialize, Serialize};

linode_core::api_enum! {
    /// Progress state of an event.
    pub enum EventStatus {
        Failed => "failed",
        Finished => "finished",
        Notification => "notification",
        Scheduled => "scheduled",
        Started => "started",
    }
}

linode_core::api_enum! {
    /// What happened.
    pub enum EventAction {
        AccountUpdate => "account_update",
        AccountSettingsUpdate => "account_settings_update",
        BackupsEnable => "backups_enable",
        BackupsCancel => "backups_cancel",
        BackupsRestore => "backups_restore",
        CommunityQuestionReply => "community_question_reply",
        CommunityLike => "community_like",
        CreditCardUpdated => "credit_card_updated",
        DatabaseCreate => "database_create",
        DatabaseDegraded => "database_degraded",
        DatabaseDelete => "database_delete",
        DatabaseFailed => "database_failed",
        DatabaseUpdate => "database_update",
        DatabaseCreateFailed => "database_create_failed",
        DatabaseUpdateFailed => "database_update_failed",
        DatabaseBackupCreate => "database_backup_create",
        DatabaseBackupRestore => "database_backup_restore",
        DatabaseCredentialsReset => "database_credentials_reset",
        DiskCreate => "disk_create",
        DiskDelete => "disk_delete",
        DiskUpdate => "disk_update",
        DiskDuplicate => "disk_duplicate",
        DiskImagize => "disk_imagize",
        DiskResize => "disk_resize",
        DnsRecordCreate => "dns_record_create",
        DnsRecordDelete => "dns_record_delete",
        DnsRecordUpdate => "dns_record_update",
        DnsZoneCreate => "dns_zone_create",
        DnsZoneDelete => "dns_zone_delete",
        DnsZoneUpdate => "dns_zone_update",
        DnsZoneImport => "dns_zone_import",
        EntityTransferAccept => "entity_transfer_accept",
        EntityTransferCancel => "entity_transfer_cancel",
        EntityTransferCreate => "entity_transfer_create",
        EntityTransferFail => "entity_transfer_fail",
        EntityTransferStale => "entity_transfer_stale",
        FirewallCreate => "firewall_create",
        FirewallDelete => "firewall_delete",
        FirewallDisable => "firewall_disable",
        FirewallEnable => "firewall_enable",
        FirewallUpdate => "firewall_update",
        FirewallDeviceAdd => "firewall_device_add",
        FirewallDeviceRemove => "firewall_device_remove",
        HostReboot => "host_reboot",
        ImageDelete => "image_delete",
        ImageUpdate => "image_update",
        ImageUpload => "image_upload",
        IpAddressUpdate => "ipaddress_update",
        LassieReboot => "lassie_reboot",
        LinodeAddIp => "linode_addip",
        LinodeBoot => "linode_boot",
        LinodeClone => "linode_clone",
        LinodeCreate => "linode_create",
        LinodeDelete => "linode_delete",
        LinodeUpdate => "linode_update",
        LinodeDeleteIp => "linode_deleteip",
        LinodeMigrate => "linode_migrate",
        LinodeMigrateDatacenter => "linode_migrate_datacenter",
        LinodeMigrateDatacenterCreate => "linode_migrate_datacenter_create",
        LinodeMutate => "linode_mutate",
        LinodeMutateCreate => "linode_mutate_create",
        LinodeReboot => "linode_reboot",
        LinodeRebuild => "linode_rebuild",
        LinodeResize => "linode_resize",
        LinodeResizeCreate => "linode_resize_create",
        LinodeShutdown => "linode_shutdown",
        LinodeSnapshot => "linode_snapshot",
        LinodeConfigCreate => "linode_config_create",
        LinodeConfigDelete => "linode_config_delete",
        LinodeConfigUpdate => "linode_config_update",
        LishBoot => "lish_boot",
        LkeNodeCreate => "lke_node_create",
        LongviewClientCreate => "longviewclient_create",
        LongviewClientDelete => "longviewclient_delete",
        LongviewClientUpdate => "longviewclient_update",
        ManagedDisabled => "managed_disabled",
        ManagedEnabled => "managed_enabled",
        ManagedServiceCreate => "managed_service_create",
        ManagedServiceDelete => "managed_service_delete",
        NodebalancerCreate => "nodebalancer_create",
        NodebalancerDelete => "nodebalancer_delete",
        NodebalancerUpdate => "nodebalancer_update",
        NodebalancerConfigCreate => "nodebalancer_config_create",
        NodebalancerConfigDelete => "nodebalancer_config_delete",
        NodebalancerConfigUpdate => "nodebalancer_config_update",
        NodebalancerNodeCreate => "nodebalancer_node_create",
        NodebalancerNodeDelete => "nodebalancer_node_delete",
        NodebalancerNodeUpdate => "nodebalancer_node_update",
        OAuthClientCreate => "oauth_client_create",
        OAuthClientDelete => "oauth_client_delete",
        OAuthClientSecretReset => "oauth_client_secret_reset",
        OAuthClientUpdate => "oauth_client_update",
        PaymentMethodAdd => "payment_method_add",
        PaymentSubmitted => "payment_submitted",
        PlacementGroupCreate => "placement_group_create",
        PlacementGroupUpdate => "placement_group_update",
        PlacementGroupDelete => "placement_group_delete",
        PlacementGroupAssign => "placement_group_assign",
        PlacementGroupUnassign => "placement_group_unassign",
        PasswordReset => "password_reset",
        ProfileUpdate => "profile_update",
        StackScriptCreate => "stackscript_create",
        StackScriptDelete => "stackscript_delete",
        StackScriptUpdate => "stackscript_update",
        StackScriptPublicize => "stackscript_publicize",
        StackScriptRevise => "stackscript_revise",
        TagCreate => "tag_create",
        TagDelete => "tag_delete",
        TfaDisabled => "tfa_disabled",
        TfaEnabled => "tfa_enabled",
        TicketAttachmentUpload => "ticket_attachment_upload",
        TicketCreate => "ticket_create",
        TicketUpdate => "ticket_update",
        TokenCreate => "token_create",
        TokenDelete => "token_delete",
        TokenUpdate => "token_update",
        UserCreate => "user_create",
        UserDelete => "user_delete",
        UserUpdate => "user_update",
        UserSshKeyAdd => "user_ssh_key_add",
        UserSshKeyDelete => "user_ssh_key_delete",
        UserSshKeyUpdate => "user_ssh_key_update",
        VlanAttach => "vlan_attach",
        VlanDetach => "vlan_detach",
        VolumeAttach => "volume_attach",
        VolumeClone => "volume_clone",
        VolumeCreate => "volume_create",
        VolumeDelete => "volume_delete",
        VolumeUpdate => "volume_update",
        VolumeDetach => "volume_detach",
        VolumeResize => "volume_resize",
    }
}

linode_core::api_enum! {
    /// Kind of entity an event refers to.
    pub enum EntityType {
        Linode => "linode",
        Disk => "disk",
        Database => "database",
        Domain => "domain",
        Firewall => "firewall",
        Nodebalancer => "nodebalancer",
    }
}

/// An account event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event ID.
    pub id: EventId,
    /// Progress state.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: EventStatus,
    /// What happened.
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: EventAction,
    /// Completion percentage of the underlying operation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub percent_complete: i64,
    /// Transfer rate, for migrations and disk operations.
    #[serde(default)]
    pub rate: Option<String>,
    /// Whether the event was marked read.
    #[serde(default, deserialize_with = "null_as_default")]
    pub read: bool,
    /// Whether the event was marked seen.
    #[serde(default, deserialize_with = "null_as_default")]
    pub seen: bool,
    /// Estimated seconds until the operation completes.
    ///
    /// Advisory only: the API sends seconds or `H:MM:SS`, and anything it
    /// sends that cannot be read as either is reported as `None`.
    #[serde(default, with = "decode::time_remaining")]
    pub time_remaining: Option<i64>,
    /// User who triggered the event; empty for system events.
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    /// Primary entity.
    #[serde(default)]
    pub entity: Option<EventEntity>,
    /// Secondary entity, such as the source of a clone.
    #[serde(default)]
    pub secondary_entity: Option<EventEntity>,
    /// When the event was created.
    #[serde(default, with = "decode::timestamp")]
    pub created: Option<DateTime<Utc>>,
}

impl Event {
    /// Returns true once the operation has finished or failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.status, EventStatus::Finished | EventStatus::Failed)
    }

    /// Returns true if the primary entity is `id` of the given type.
    #[must_use]
    pub fn concerns(&self, entity_type: &EntityType, id: &EntityId) -> bool {
        self.entity.as_ref().is_some_and(|entity| {
            entity.entity_type.as_ref() == Some(entity_type) && entity.id.as_ref() == Some(id)
        })
    }
}

/// An entity referenced by an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntity {
    /// Numeric or string identifier, depending on the entity type.
    #[serde(default)]
    pub id: Option<EntityId>,
    /// Display label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// Entity type.
    #[serde(default, rename = "type")]
    pub entity_type: Option<EntityType>,
    /// Entity status at the time of the event.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// API path of the entity.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn event_json(time_remaining: serde_json::Value) -> serde_json::Value {
        json!({
            "id": 123,
            "action": "linode_migrate",
            "status": "started",
            "percent_complete": 40,
            "rate": null,
            "read": false,
            "seen": true,
            "time_remaining": time_remaining,
            "username": "ops",
            "created": "2024-05-01T08:30:00",
            "entity": {
                "id": 11,
                "label": "web-1",
                "type": "linode",
                "status": "migrating",
                "url": "/v4/linode/instances/11"
            },
            "secondary_entity": null
        })
    }

    #[test]
    fn decodes_event_with_duration_string() {
        let event: Event = serde_json::from_value(event_json(json!("0:05:00"))).unwrap();

        assert_eq!(event.id, EventId::new(123));
        assert_eq!(event.action, EventAction::LinodeMigrate);
        assert_eq!(event.status, EventStatus::Started);
        assert_eq!(event.time_remaining, Some(300));
        assert_eq!(
            event.created,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap())
        );
        assert!(!event.is_complete());
        assert!(event.concerns(&EntityType::Linode, &EntityId::Int(11)));
        assert!(!event.concerns(&EntityType::Disk, &EntityId::Int(11)));
    }

    #[test]
    fn decodes_every_time_remaining_shape() {
        let cases = [
            (json!(null), None),
            (json!(42), Some(42)),
            (json!("1:00:00"), Some(3600)),
            (json!("bogus"), None),
            (json!({"minutes": 3}), None),
        ];
        for (raw, expected) in cases {
            let event: Event = serde_json::from_value(event_json(raw.clone())).unwrap();
            assert_eq!(event.time_remaining, expected, "time_remaining {raw}");
            assert_eq!(event.username, "ops");
            assert!(event.entity.is_some());
        }
    }

    #[test]
    fn absent_time_remaining_is_none() {
        let mut raw = event_json(json!(null));
        raw.as_object_mut().unwrap().remove("time_remaining");
        let event: Event = serde_json::from_value(raw).unwrap();
        assert_eq!(event.time_remaining, None);
    }

    #[test]
    fn unknown_action_round_trips() {
        let mut raw = event_json(json!(null));
        raw["action"] = json!("quantum_entangle");
        let event: Event = serde_json::from_value(raw).unwrap();
        assert_eq!(event.action, EventAction::Unknown("quantum_entangle".to_string()));
        assert_eq!(serde_json::to_value(&event).unwrap()["action"], "quantum_entangle");
    }

    #[test]
    fn string_entity_ids_stay_strings() {
        let entity: EventEntity = serde_json::from_value(json!({
            "id": "example.com",
            "label": "example.com",
            "type": "domain",
            "status": null,
            "url": "/v4/domains/1"
        }))
        .unwrap();
        assert_eq!(entity.id, Some(EntityId::Str("example.com".to_string())));
        assert_eq!(entity.entity_type, Some(EntityType::Domain));
        assert_eq!(entity.status, "");
    }

    #[test]
    fn system_event_with_null_username() {
        let mut raw = event_json(json!(null));
        raw["username"] = json!(null);
        raw["status"] = json!("finished");
        let event: Event = serde_json::from_value(raw).unwrap();
        assert_eq!(event.username, "");
        assert!(event.is_complete());
    }

    #[test]
    fn null_or_missing_status_and_action_still_decode() {
        let event: Event =
            serde_json::from_value(json!({"id": 1, "action": "linode_boot", "status": null}))
                .unwrap();
        assert_eq!(event.action, EventAction::LinodeBoot);
        assert_eq!(event.status, EventStatus::Unknown(String::new()));
        assert!(!event.is_complete());

        let event: Event = serde_json::from_value(json!({"id": 2, "action": null})).unwrap();
        assert_eq!(event.action, EventAction::Unknown(String::new()));
        assert_eq!(event.status, EventStatus::Unknown(String::new()));
    }

    #[test]
    fn bad_created_timestamp_fails() {
        let mut raw = event_json(json!(null));
        raw["created"] = json!("");
        assert!(serde_json::from_value::<Event>(raw).is_err());
    }

    #[test]
    fn action_registry_is_complete() {
        assert!(EventAction::KNOWN.len() > 100);
        assert_eq!(EventAction::from("volume_delete"), EventAction::VolumeDelete);
        assert_eq!(EventAction::LinodeAddIp.as_str(), "linode_addip");
    }
}
