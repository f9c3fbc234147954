//! Asynchronous placement groups client implementation.

use crate::models::{
    PlacementGroup, PlacementGroupAssignOptions, PlacementGroupCreateOptions,
    PlacementGroupUnassignOptions, PlacementGroupUpdateOptions,
};
use crate::Result;
use linode_core::client::{ClientConfig, RetryPolicy, ServiceClient, ServiceClientBuilder};
use linode_core::ids::PlacementGroupId;
use linode_core::pagination::{ListOptions, PagedList};
use linode_core::CancellationToken;
use reqwest::Method;
use tracing::debug;
use url::Url;

const GROUPS_PATH: &str = "placement/groups";

/// Builder for [`PlacementGroupsClient`].
#[derive(Debug, Clone)]
pub struct PlacementGroupsClientBuilder {
    inner: ServiceClientBuilder,
}

impl PlacementGroupsClientBuilder {
    /// Create a builder for the specified API host.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            inner: ServiceClientBuilder::new(base_url)?,
        })
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.inner = self.inner.with_retry_policy(retry);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Configure the personal access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.with_token(token);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PlacementGroupsClient> {
        let inner = self.inner.build()?;
        Ok(PlacementGroupsClient { inner })
    }
}

/// Asynchronous client for `placement/groups`.
#[derive(Clone)]
pub struct PlacementGroupsClient {
    inner: ServiceClient,
}

impl PlacementGroupsClient {
    /// Construct a client directly from the API host.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        PlacementGroupsClientBuilder::new(base_url)?.build()
    }

    /// Wrap an existing transport.
    #[must_use]
    pub const fn from_service_client(inner: ServiceClient) -> Self {
        Self { inner }
    }

    /// Return a client whose requests observe `token`.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            inner: self.inner.with_cancellation(token),
        }
    }

    /// Return the versioned API root.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// List placement groups.
    pub async fn list_placement_groups(
        &self,
        options: &ListOptions,
    ) -> Result<PagedList<PlacementGroup>> {
        self.inner.list(GROUPS_PATH, options).await
    }

    /// Fetch a single placement group.
    pub async fn get_placement_group(&self, id: PlacementGroupId) -> Result<PlacementGroup> {
        let path = group_path(id);
        self.inner
            .send_json::<(), PlacementGroup>(Method::GET, &path, None, &[])
            .await
    }

    /// Create a placement group.
    pub async fn create_placement_group(
        &self,
        options: &PlacementGroupCreateOptions,
    ) -> Result<PlacementGroup> {
        self.inner
            .send_json(Method::POST, GROUPS_PATH, Some(options), &[])
            .await
    }

    /// Update a placement group.
    pub async fn update_placement_group(
        &self,
        id: PlacementGroupId,
        options: &PlacementGroupUpdateOptions,
    ) -> Result<PlacementGroup> {
        let path = group_path(id);
        self.inner
            .send_json(Method::PUT, &path, Some(options), &[])
            .await
    }

    /// Add instances to a placement group.
    pub async fn assign_placement_group_linodes(
        &self,
        id: PlacementGroupId,
        options: &PlacementGroupAssignOptions,
    ) -> Result<PlacementGroup> {
        debug!(group = %id, count = options.linodes.len(), "Assigning instances");
        let path = format!("{}/assign", group_path(id));
        self.inner
            .send_json(Method::POST, &path, Some(options), &[])
            .await
    }

    /// Remove instances from a placement group.
    pub async fn unassign_placement_group_linodes(
        &self,
        id: PlacementGroupId,
        options: &PlacementGroupUnassignOptions,
    ) -> Result<PlacementGroup> {
        debug!(group = %id, count = options.linodes.len(), "Unassigning instances");
        let path = format!("{}/unassign", group_path(id));
        self.inner
            .send_json(Method::POST, &path, Some(options), &[])
            .await
    }

    /// Delete a placement group.
    pub async fn delete_placement_group(&self, id: PlacementGroupId) -> Result<()> {
        let path = group_path(id);
        self.inner
            .send_empty::<()>(Method::DELETE, &path, None)
            .await
    }
}

fn group_path(id: PlacementGroupId) -> String {
    format!("{GROUPS_PATH}/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use linode_core::ids::InstanceId;
    use linode_core::types::PlacementGroupAffinityType;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> PlacementGroupsClient {
        PlacementGroupsClientBuilder::new(server.uri())
            .unwrap()
            .with_token("token")
            .with_retry_policy(RetryPolicy::no_retry())
            .build()
            .unwrap()
    }

    fn group_json(id: u64, members: &[u64]) -> serde_json::Value {
        let members: Vec<_> = members
            .iter()
            .map(|m| json!({"linode_id": m, "is_compliant": true}))
            .collect();
        json!({
            "id": id,
            "label": "web-spread",
            "region": "us-east",
            "affinity_type": "anti_affinity:local",
            "is_compliant": true,
            "is_strict": true,
            "members": members
        })
    }

    #[tokio::test]
    async fn list_placement_groups_single_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/placement/groups"))
            .and(query_param("page", "1"))
            .and(query_param("page_size", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [group_json(1, &[10]), group_json(2, &[])],
                "page": 1, "pages": 1, "results": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let groups = client
            .list_placement_groups(&ListOptions::new().with_page_size(25))
            .await
            .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.pages_fetched, 1);
    }

    #[tokio::test]
    async fn get_placement_group() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/placement/groups/528"))
            .respond_with(ResponseTemplate::new(200).set_body_json(group_json(528, &[1, 2])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let group = client
            .get_placement_group(PlacementGroupId::new(528))
            .await
            .unwrap();
        assert_eq!(group.member_ids(), vec![InstanceId::new(1), InstanceId::new(2)]);
    }

    #[tokio::test]
    async fn create_and_update_placement_group() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/placement/groups"))
            .and(body_json(json!({
                "label": "web-spread",
                "region": "us-east",
                "affinity_type": "anti_affinity:local",
                "is_strict": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(group_json(9, &[])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/v4/placement/groups/9"))
            .and(body_json(json!({"label": "renamed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(group_json(9, &[])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let created = client
            .create_placement_group(&PlacementGroupCreateOptions {
                label: "web-spread".to_string(),
                region: "us-east".to_string(),
                affinity_type: PlacementGroupAffinityType::AntiAffinityLocal,
                is_strict: true,
            })
            .await
            .unwrap();
        assert_eq!(created.id, PlacementGroupId::new(9));

        client
            .update_placement_group(
                created.id,
                &PlacementGroupUpdateOptions {
                    label: Some("renamed".to_string()),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn assign_and_unassign() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/placement/groups/9/assign"))
            .and(body_json(json!({"linodes": [1, 2], "compliant_only": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(group_json(9, &[1, 2])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v4/placement/groups/9/unassign"))
            .and(body_json(json!({"linodes": [2]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(group_json(9, &[1])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let id = PlacementGroupId::new(9);

        let assign = PlacementGroupAssignOptions {
            compliant_only: Some(false),
            ..PlacementGroupAssignOptions::new([InstanceId::new(1), InstanceId::new(2)])
        };
        let group = client
            .assign_placement_group_linodes(id, &assign)
            .await
            .unwrap();
        assert_eq!(group.members.len(), 2);

        let group = client
            .unassign_placement_group_linodes(
                id,
                &PlacementGroupUnassignOptions::new([InstanceId::new(2)]),
            )
            .await
            .unwrap();
        assert_eq!(group.member_ids(), vec![InstanceId::new(1)]);
    }

    #[tokio::test]
    async fn delete_placement_group() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v4/placement/groups/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client
            .delete_placement_group(PlacementGroupId::new(9))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn strict_group_rejection_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/placement/groups/9/assign"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errors": [{"reason": "Assignment would violate strict placement group", "field": "linodes"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .assign_placement_group_linodes(
                PlacementGroupId::new(9),
                &PlacementGroupAssignOptions::new([InstanceId::new(3)]),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.as_api_error().map(|api| api.message.as_str()),
            Some("[linodes] Assignment would violate strict placement group")
        );
    }
}
