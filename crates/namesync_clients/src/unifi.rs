//! UniFi Network integration API client, the platform whose names are
//! corrected.

use crate::config::UnifiConfig;
use crate::error::ClientResult;
use crate::http::ApiClient;
use async_trait::async_trait;
use namesync_engine::{FieldChanges, FollowerRecord, FollowerTarget, SyncResult};
use reqwest::header::HeaderName;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Platform name used in errors and reports.
pub const UNIFI: &str = "UniFi";

const API_KEY_HEADER: &str = "x-api-key";

/// How a client is attached to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionType {
    /// Ethernet.
    Wired,
    /// Wi-Fi.
    Wireless,
    /// Remote VPN client.
    Vpn,
    /// Anything newer controllers report.
    #[serde(other)]
    Unknown,
}

impl ConnectionType {
    /// Reads the connection type a UniFi record carries in its extensions.
    pub fn of(record: &FollowerRecord) -> Option<Self> {
        record
            .extensions
            .get("type")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

/// Client for the UniFi Network integration API.
#[derive(Debug, Clone)]
pub struct UnifiClient {
    api: ApiClient,
    site_id: String,
    page_size: u32,
}

impl UnifiClient {
    /// Creates a client after validating `config`.
    pub fn new(config: &UnifiConfig) -> ClientResult<Self> {
        config.validate()?;
        let api = ApiClient::new(
            UNIFI,
            &config.host,
            HeaderName::from_static(API_KEY_HEADER),
            &config.api_key,
            &config.http,
        )?;
        Ok(Self {
            api,
            site_id: config.site_id.clone(),
            page_size: config.page_size,
        })
    }

    fn clients_path(&self) -> String {
        format!("/v1/sites/{}/clients", self.site_id)
    }

    /// Lists every client on the site, following pagination.
    pub async fn fetch_clients(&self) -> ClientResult<Vec<FollowerRecord>> {
        let path = self.clients_path();
        let mut clients = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let query = [
                ("offset", offset.to_string()),
                ("limit", self.page_size.to_string()),
            ];
            let page: Page = self.api.get_json(&path, &query).await?;
            if page.data.is_empty() {
                break;
            }

            offset += page.data.len() as u64;
            clients.extend(page.data.into_iter().map(UnifiClientRecord::into_record));
            debug!(
                count = page.count,
                fetched = clients.len(),
                total = page.total_count,
                "Fetched page of UniFi clients"
            );

            if offset >= page.total_count {
                break;
            }
        }

        Ok(clients)
    }

    /// Fetches a single client by id.
    pub async fn get_client(&self, client_id: &str) -> ClientResult<FollowerRecord> {
        debug!(client_id, "Fetching client details from UniFi");
        let client: UnifiClientRecord = self
            .api
            .get_json(&format!("{}/{client_id}", self.clients_path()), &[])
            .await?;
        Ok(client.into_record())
    }

    /// Sends `changes` for one client and returns the updated record.
    pub async fn update_client(
        &self,
        client_id: &str,
        changes: &FieldChanges,
    ) -> ClientResult<FollowerRecord> {
        debug!(client_id, changes = ?changes.as_map(), "Updating UniFi client");
        let client: UnifiClientRecord = self
            .api
            .patch_json(&format!("{}/{client_id}", self.clients_path()), changes)
            .await?;
        Ok(client.into_record())
    }
}

#[async_trait]
impl FollowerTarget for UnifiClient {
    fn platform(&self) -> &str {
        self.api.platform()
    }

    async fn fetch_inventory(&self) -> SyncResult<Vec<FollowerRecord>> {
        self.fetch_clients()
            .await
            .map_err(|e| e.into_fetch_error())
    }

    async fn apply_update(
        &self,
        follower_id: &str,
        changes: &FieldChanges,
    ) -> SyncResult<FollowerRecord> {
        self.update_client(follower_id, changes)
            .await
            .map_err(|e| {
                warn!(
                    client_id = follower_id,
                    error = %e,
                    "The UniFi API may not support direct client name updates. \
                     Consider fixed client assignments or DHCP reservations instead."
                );
                e.into_update_error(follower_id)
            })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    #[serde(default)]
    count: u64,
    total_count: u64,
    #[serde(default)]
    data: Vec<UnifiClientRecord>,
}

/// `type` and `uplinkDeviceId` land in `extra` and stay with the record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnifiClientRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    mac_address: String,
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    connected_at: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl UnifiClientRecord {
    fn into_record(self) -> FollowerRecord {
        FollowerRecord {
            id: self.id,
            name: self.name,
            mac_address: self.mac_address,
            ip_address: self.ip_address,
            connected_at: self.connected_at,
            extensions: self.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_client_record() {
        let record = serde_json::from_value::<UnifiClientRecord>(json!({
            "id": "c0ffee00-0000-0000-0000-000000000001",
            "name": "Old TV Name",
            "macAddress": "aa:bb:cc:dd:ee:01",
            "ipAddress": "192.168.1.20",
            "connectedAt": "2024-05-01T10:00:00Z",
            "type": "WIRELESS",
            "uplinkDeviceId": "ap-1"
        }))
        .unwrap()
        .into_record();

        assert_eq!(record.name.as_deref(), Some("Old TV Name"));
        assert_eq!(record.mac_address, "aa:bb:cc:dd:ee:01");
        assert_eq!(record.extensions.get("uplinkDeviceId"), Some(&json!("ap-1")));
        assert_eq!(ConnectionType::of(&record), Some(ConnectionType::Wireless));
    }

    #[test]
    fn unknown_connection_types_are_tolerated() {
        let record = FollowerRecord::new("u1", "aa:bb:cc:dd:ee:01").with_extension("type", "TELEPATHY");
        assert_eq!(ConnectionType::of(&record), Some(ConnectionType::Unknown));

        let record = FollowerRecord::new("u2", "aa:bb:cc:dd:ee:02");
        assert_eq!(ConnectionType::of(&record), None);
    }

    #[test]
    fn page_defaults() {
        let page: Page = serde_json::from_value(json!({ "totalCount": 0 })).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.count, 0);
    }
}
