//! Instance records and the option payloads accepted by instance endpoints.

use chrono::{DateTime, Utc};
use linode_core::decode::{self, null_as_default};
use linode_core::ids::{
    BackupId, ConfigId, DiskId, FirewallId, InstanceId, PlacementGroupId, StackScriptId, SubnetId,
    VolumeId,
};
use linode_core::types::PlacementGroupAffinityType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

linode_core::api_enum! {
    /// Lifecycle status of an instance.
    pub enum InstanceStatus {
        Booting => "booting",
        Running => "running",
        Offline => "offline",
        ShuttingDown => "shutting_down",
        Rebooting => "rebooting",
        Provisioning => "provisioning",
        Deleting => "deleting",
        Migrating => "migrating",
        Rebuilding => "rebuilding",
        Cloning => "cloning",
        Restoring => "restoring",
        Resizing => "resizing",
    }
}

linode_core::api_enum! {
    /// How an instance is moved during a resize or migration.
    pub enum InstanceMigrationType {
        Warm => "warm",
        Cold => "cold",
    }
}

linode_core::api_enum! {
    /// Network a configuration interface attaches to.
    pub enum ConfigInterfacePurpose {
        Public => "public",
        Vlan => "vlan",
        Vpc => "vpc",
    }
}

/// A compute instance (Linode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Instance ID.
    pub id: InstanceId,
    /// When the instance was created.
    #[serde(default, with = "decode::timestamp")]
    pub created: Option<DateTime<Utc>>,
    /// When the instance was last updated.
    #[serde(default, with = "decode::timestamp")]
    pub updated: Option<DateTime<Utc>>,
    /// Region slug, e.g. `us-east`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
    /// Alert thresholds.
    #[serde(default)]
    pub alerts: Option<InstanceAlert>,
    /// Backup service state.
    #[serde(default)]
    pub backups: Option<InstanceBackup>,
    /// Image the instance was deployed from; `None` for custom disk layouts.
    #[serde(default)]
    pub image: Option<String>,
    /// Deprecated display group.
    #[serde(default, deserialize_with = "null_as_default")]
    pub group: String,
    /// Public and private IPv4 addresses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ipv4: Vec<IpAddr>,
    /// SLAAC IPv6 address with prefix length.
    #[serde(default)]
    pub ipv6: Option<String>,
    /// Display label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// Plan type slug, e.g. `g6-standard-1`.
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub instance_type: String,
    /// Current status.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: InstanceStatus,
    /// Whether user data was supplied at creation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_user_data: bool,
    /// Hypervisor, e.g. `kvm`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hypervisor: String,
    /// Opaque identifier of the host machine.
    #[serde(default, deserialize_with = "null_as_default")]
    pub host_uuid: String,
    /// Allocated resources.
    #[serde(default)]
    pub specs: Option<InstanceSpec>,
    /// Whether Lassie restarts the instance when it powers off unexpectedly.
    #[serde(default, deserialize_with = "null_as_default")]
    pub watchdog_enabled: bool,
    /// Tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Placement group membership.
    #[serde(default)]
    pub placement_group: Option<InstancePlacementGroup>,
}

impl Instance {
    /// Build update options that reproduce this instance's mutable settings.
    #[must_use]
    pub fn update_options(&self) -> InstanceUpdateOptions {
        InstanceUpdateOptions {
            label: (!self.label.is_empty()).then(|| self.label.clone()),
            backups: self.backups.clone(),
            alerts: self.alerts.clone(),
            watchdog_enabled: Some(self.watchdog_enabled),
            tags: Some(self.tags.clone()),
            group: Some(self.group.clone()),
        }
    }

    /// Returns true if the instance is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == InstanceStatus::Running
    }
}

/// Resources allocated to an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// Disk space in MB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub disk: i64,
    /// Memory in MB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory: i64,
    /// Virtual CPUs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub vcpus: i64,
    /// Monthly network transfer in GB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub transfer: i64,
    /// GPUs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpus: i64,
}

/// Alert thresholds for an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceAlert {
    /// CPU usage percentage.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu: i64,
    /// Disk IO operations per second.
    #[serde(default, deserialize_with = "null_as_default")]
    pub io: i64,
    /// Incoming traffic in Mb/s.
    #[serde(default, deserialize_with = "null_as_default")]
    pub network_in: i64,
    /// Outgoing traffic in Mb/s.
    #[serde(default, deserialize_with = "null_as_default")]
    pub network_out: i64,
    /// Percentage of the transfer quota.
    #[serde(default, deserialize_with = "null_as_default")]
    pub transfer_quota: i64,
}

/// Backup service state for an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceBackup {
    /// Whether a backup is available to restore.
    #[serde(default, deserialize_with = "null_as_default")]
    pub available: bool,
    /// Whether the backup service is enabled.
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    /// When automatic backups run.
    #[serde(default, deserialize_with = "null_as_default")]
    pub schedule: BackupSchedule,
}

/// Automatic backup window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSchedule {
    /// Day of the week, e.g. `Sunday`, or `Scheduling`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    /// Two-hour window, e.g. `W10`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
}

/// Network transfer used by an instance in the current billing month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceTransfer {
    /// Bytes consumed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub used: i64,
    /// Billable GB consumed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub billable: i64,
    /// GB this instance contributes to the transfer pool.
    #[serde(default, deserialize_with = "null_as_default")]
    pub quota: i64,
}

/// Placement group an instance belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstancePlacementGroup {
    /// Placement group ID.
    pub id: PlacementGroupId,
    /// Placement group label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// Affinity policy.
    #[serde(default, deserialize_with = "null_as_default")]
    pub affinity_type: PlacementGroupAffinityType,
    /// Whether the policy is enforced strictly.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_strict: bool,
}

/// Metadata service options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMetadataOptions {
    /// Base64-encoded user data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

/// Placement group to put a new or moved instance into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstancePlacementGroupOptions {
    /// Placement group ID.
    pub id: PlacementGroupId,
    /// Refuse placement that would make the group non-compliant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliant_only: Option<bool>,
}

impl InstancePlacementGroupOptions {
    /// Place into the given group.
    #[must_use]
    pub const fn new(id: PlacementGroupId) -> Self {
        Self {
            id,
            compliant_only: None,
        }
    }
}

/// IPv4 addressing of a VPC interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcIpv4Options {
    /// Address inside the subnet; assigned automatically when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<String>,
    /// Public NAT address, or `any`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat_1_1: Option<String>,
}

/// Network interface attached at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInterfaceOptions {
    /// Network the interface attaches to.
    pub purpose: ConfigInterfacePurpose,
    /// VLAN label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// VLAN IPAM address in CIDR notation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipam_address: Option<String>,
    /// Whether this is the primary interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    /// VPC subnet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<SubnetId>,
    /// VPC IPv4 addressing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<VpcIpv4Options>,
    /// Additional VPC ranges routed to this interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_ranges: Option<Vec<String>>,
}

impl InstanceInterfaceOptions {
    /// An interface of the given purpose with nothing else set.
    #[must_use]
    pub const fn new(purpose: ConfigInterfacePurpose) -> Self {
        Self {
            purpose,
            label: None,
            ipam_address: None,
            primary: None,
            subnet_id: None,
            ipv4: None,
            ip_ranges: None,
        }
    }
}

/// Options for creating an instance. Only region and type are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceCreateOptions {
    /// Region slug.
    pub region: String,
    /// Plan type slug.
    #[serde(rename = "type")]
    pub instance_type: String,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Root password for the deployed image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_pass: Option<String>,
    /// SSH public keys installed for root.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorized_keys: Vec<String>,
    /// Users whose profile keys are installed for root.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorized_users: Vec<String>,
    /// StackScript to run on first boot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stackscript_id: Option<StackScriptId>,
    /// StackScript user-defined fields.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub stackscript_data: HashMap<String, String>,
    /// Backup to restore from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_id: Option<BackupId>,
    /// Image to deploy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Network interfaces for the default configuration profile.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<InstanceInterfaceOptions>,
    /// Enroll in the backup service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backups_enabled: Option<bool>,
    /// Allocate a private IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip: Option<bool>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Metadata service options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InstanceMetadataOptions>,
    /// Firewall to attach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firewall_id: Option<FirewallId>,
    /// Placement group to join.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_group: Option<InstancePlacementGroupOptions>,
    /// Swap disk size in MB; `Some(0)` creates no swap disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_size: Option<i64>,
    /// Boot after creation; `Some(false)` leaves the instance offline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booted: Option<bool>,
    /// Deprecated display group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl InstanceCreateOptions {
    /// Options for an instance of `instance_type` in `region`.
    #[must_use]
    pub fn new(region: impl Into<String>, instance_type: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            instance_type: instance_type.into(),
            ..Self::default()
        }
    }
}

/// Options for updating an instance.
///
/// `watchdog_enabled`, `tags` and `group` are sent whenever they are `Some`,
/// so they can be set to `false`, an empty list or an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceUpdateOptions {
    /// New label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Backup settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backups: Option<InstanceBackup>,
    /// Alert thresholds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<InstanceAlert>,
    /// Watchdog toggle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watchdog_enabled: Option<bool>,
    /// Replacement tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Deprecated display group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Options for cloning an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceCloneOptions {
    /// Region for a new target instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Plan type for a new target instance.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Existing instance to clone into.
    #[serde(default, rename = "linode_id", skip_serializing_if = "Option::is_none")]
    pub target: Option<InstanceId>,
    /// Label for a new target instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Enroll the target in the backup service. Always sent.
    #[serde(default)]
    pub backups_enabled: bool,
    /// Disks to clone; all when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disks: Vec<DiskId>,
    /// Configuration profiles to clone; all when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<ConfigId>,
    /// Allocate a private IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip: Option<bool>,
    /// Metadata service options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InstanceMetadataOptions>,
    /// Placement group for the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_group: Option<InstancePlacementGroupOptions>,
    /// Deprecated display group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Options for resizing an instance to another plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceResizeOptions {
    /// Target plan type slug.
    #[serde(rename = "type")]
    pub instance_type: String,
    /// Warm or cold resize.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_type: Option<InstanceMigrationType>,
    /// Also grow a single data disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_auto_disk_resize: Option<bool>,
}

impl InstanceResizeOptions {
    /// Resize to `instance_type` with the server's defaults.
    #[must_use]
    pub fn new(instance_type: impl Into<String>) -> Self {
        Self {
            instance_type: instance_type.into(),
            migration_type: None,
            allow_auto_disk_resize: None,
        }
    }
}

/// Options for migrating an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMigrateOptions {
    /// Warm or cold migration.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub migration_type: Option<InstanceMigrationType>,
    /// Destination region for cross-region migrations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Placement group in the destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_group: Option<InstancePlacementGroupOptions>,
}

/// Options for rebuilding an instance from an image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRebuildOptions {
    /// Image to deploy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Root password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_pass: Option<String>,
    /// SSH public keys installed for root.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorized_keys: Vec<String>,
    /// Users whose profile keys are installed for root.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorized_users: Vec<String>,
    /// StackScript to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stackscript_id: Option<StackScriptId>,
    /// StackScript user-defined fields.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub stackscript_data: HashMap<String, String>,
    /// Boot after rebuilding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booted: Option<bool>,
    /// Metadata service options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InstanceMetadataOptions>,
    /// Plan type to switch to while rebuilding.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

/// Disk or volume attached to a device slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfigDevice {
    /// Disk in this slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_id: Option<DiskId>,
    /// Volume in this slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<VolumeId>,
}

impl InstanceConfigDevice {
    /// A slot holding a disk.
    #[must_use]
    pub const fn disk(id: DiskId) -> Self {
        Self {
            disk_id: Some(id),
            volume_id: None,
        }
    }

    /// A slot holding a volume.
    #[must_use]
    pub const fn volume(id: VolumeId) -> Self {
        Self {
            disk_id: None,
            volume_id: Some(id),
        }
    }
}

/// Device slots `sda` through `sdh`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct InstanceConfigDeviceMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sda: Option<InstanceConfigDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdb: Option<InstanceConfigDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdc: Option<InstanceConfigDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdd: Option<InstanceConfigDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sde: Option<InstanceConfigDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdf: Option<InstanceConfigDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdg: Option<InstanceConfigDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdh: Option<InstanceConfigDevice>,
}

/// Options for booting into rescue mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRescueOptions {
    /// Devices to attach. Always sent, even when empty.
    #[serde(default)]
    pub devices: InstanceConfigDeviceMap,
}
