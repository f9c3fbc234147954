//! Placement group records and options.

use linode_core::decode::null_as_default;
use linode_core::ids::{InstanceId, PlacementGroupId};
use linode_core::types::PlacementGroupAffinityType;
use serde::{Deserialize, Serialize};

/// An instance's membership in a placement group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementGroupMember {
    /// Member instance.
    pub linode_id: InstanceId,
    /// Whether this member satisfies the group's affinity policy.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_compliant: bool,
}

/// A placement group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementGroup {
    /// Placement group ID.
    pub id: PlacementGroupId,
    /// Display label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// Region slug.
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
    /// Affinity policy.
    #[serde(default, deserialize_with = "null_as_default")]
    pub affinity_type: PlacementGroupAffinityType,
    /// Whether every member satisfies the policy.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_compliant: bool,
    /// Whether non-compliant assignments are refused.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_strict: bool,
    /// Member instances.
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Vec<PlacementGroupMember>,
}

impl PlacementGroup {
    /// IDs of the member instances.
    #[must_use]
    pub fn member_ids(&self) -> Vec<InstanceId> {
        self.members.iter().map(|member| member.linode_id).collect()
    }

    /// Members violating the affinity policy.
    pub fn non_compliant_members(&self) -> impl Iterator<Item = &PlacementGroupMember> {
        self.members.iter().filter(|member| !member.is_compliant)
    }
}

/// Options for creating a placement group. Every field is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementGroupCreateOptions {
    /// Display label.
    pub label: String,
    /// Region slug.
    pub region: String,
    /// Affinity policy.
    pub affinity_type: PlacementGroupAffinityType,
    /// Refuse non-compliant assignments.
    pub is_strict: bool,
}

/// Options for updating a placement group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementGroupUpdateOptions {
    /// New label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Options for assigning instances to a placement group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementGroupAssignOptions {
    /// Instances to add.
    pub linodes: Vec<InstanceId>,
    /// Fail instead of making the group non-compliant. Sent whenever set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliant_only: Option<bool>,
}

impl PlacementGroupAssignOptions {
    /// Assign the given instances.
    #[must_use]
    pub fn new(linodes: impl IntoIterator<Item = InstanceId>) -> Self {
        Self {
            linodes: linodes.into_iter().collect(),
            compliant_only: None,
        }
    }
}

/// Options for removing instances from a placement group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementGroupUnassignOptions {
    /// Instances to remove.
    pub linodes: Vec<InstanceId>,
}

impl PlacementGroupUnassignOptions {
    /// Unassign the given instances.
    #[must_use]
    pub fn new(linodes: impl IntoIterator<Item = InstanceId>) -> Self {
        Self {
            linodes: linodes.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_group_with_members() {
        let group: PlacementGroup = serde_json::from_value(json!({
            "id": 528,
            "label": "web-spread",
            "region": "us-east",
            "affinity_type": "anti_affinity:local",
            "is_compliant": false,
            "is_strict": false,
            "members": [
                {"linode_id": 1, "is_compliant": true},
                {"linode_id": 2, "is_compliant": false}
            ]
        }))
        .unwrap();

        assert_eq!(group.member_ids(), vec![InstanceId::new(1), InstanceId::new(2)]);
        let bad: Vec<_> = group.non_compliant_members().collect();
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].linode_id, InstanceId::new(2));
    }

    #[test]
    fn null_members_decode_empty() {
        let group: PlacementGroup = serde_json::from_value(json!({
            "id": 1,
            "label": "g",
            "region": "us-east",
            "affinity_type": "affinity:local",
            "members": null
        }))
        .unwrap();
        assert!(group.members.is_empty());
        assert_eq!(group.affinity_type, PlacementGroupAffinityType::AffinityLocal);
    }

    #[test]
    fn missing_or_null_affinity_type_decodes() {
        let absent: PlacementGroup =
            serde_json::from_value(json!({"id": 3, "label": "g", "region": "us-east"})).unwrap();
        assert_eq!(absent.affinity_type, PlacementGroupAffinityType::Unknown(String::new()));

        let null: PlacementGroup = serde_json::from_value(json!({
            "id": 4,
            "label": "g",
            "region": "us-east",
            "affinity_type": null
        }))
        .unwrap();
        assert_eq!(null.affinity_type, PlacementGroupAffinityType::default());
    }

    #[test]
    fn create_options_send_every_field() {
        let options = PlacementGroupCreateOptions {
            label: "pg".to_string(),
            region: "us-east".to_string(),
            affinity_type: PlacementGroupAffinityType::AntiAffinityLocal,
            is_strict: false,
        };
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "label": "pg",
                "region": "us-east",
                "affinity_type": "anti_affinity:local",
                "is_strict": false
            })
        );
    }

    #[test]
    fn assign_options_compliant_only_presence() {
        let plain = PlacementGroupAssignOptions::new([InstanceId::new(4)]);
        assert_eq!(serde_json::to_value(&plain).unwrap(), json!({"linodes": [4]}));

        let explicit = PlacementGroupAssignOptions {
            compliant_only: Some(false),
            ..plain
        };
        assert_eq!(
            serde_json::to_value(&explicit).unwrap(),
            json!({"linodes": [4], "compliant_only": false})
        );
    }

    #[test]
    fn update_options_omit_unset_label() {
        let body = serde_json::to_value(PlacementGroupUpdateOptions::default()).unwrap();
        assert_eq!(body, json!({}));
    }
}
