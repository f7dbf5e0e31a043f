//! Firewalla MSP API client, the authoritative name source.

use crate::config::FirewallaConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;
use async_trait::async_trait;
use namesync_engine::{MasterRecord, MasterSource, SyncResult};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Platform name used in errors and reports.
pub const FIREWALLA: &str = "Firewalla";

/// Client for the Firewalla MSP API.
#[derive(Debug, Clone)]
pub struct FirewallaClient {
    api: ApiClient,
    box_id: Option<String>,
}

impl FirewallaClient {
    /// Creates a client after validating `config`.
    pub fn new(config: &FirewallaConfig) -> ClientResult<Self> {
        config.validate()?;
        let api = ApiClient::new(
            FIREWALLA,
            &config.host,
            AUTHORIZATION,
            &format!("Token {}", config.api_token),
            &config.http,
        )?;
        Ok(Self {
            api,
            box_id: config.box_id.clone(),
        })
    }

    fn scope(&self) -> Vec<(&'static str, String)> {
        self.box_id
            .iter()
            .map(|box_id| ("box", box_id.clone()))
            .collect()
    }

    /// Lists every device, restricted to the configured box if any.
    ///
    /// Records that cannot be read are logged and left out; the rest of
    /// the listing is still returned.
    pub async fn fetch_devices(&self) -> ClientResult<Vec<MasterRecord>> {
        debug!(box_id = ?self.box_id, "Fetching devices from Firewalla");
        let body: DeviceList = self.api.get_json("/v2/devices", &self.scope()).await?;
        let devices: Vec<MasterRecord> = body
            .into_devices()
            .into_iter()
            .filter_map(read_device)
            .collect();
        debug!(count = devices.len(), "Fetched devices from Firewalla");
        Ok(devices)
    }

    /// Fetches a single device by hardware address.
    pub async fn get_device(&self, mac: &str) -> ClientResult<MasterRecord> {
        debug!(mac, "Fetching device details from Firewalla");
        let device: FirewallaDevice = self
            .api
            .get_json(&format!("/v2/devices/{mac}"), &self.scope())
            .await?;
        device.into_record().ok_or_else(|| ClientError::Decode {
            platform: FIREWALLA,
            message: format!("device {mac} has no usable id"),
        })
    }
}

#[async_trait]
impl MasterSource for FirewallaClient {
    fn platform(&self) -> &str {
        self.api.platform()
    }

    async fn fetch_inventory(&self) -> SyncResult<Vec<MasterRecord>> {
        self.fetch_devices()
            .await
            .map_err(|e| e.into_fetch_error())
    }
}

/// Device listing body: a bare array, or wrapped in `results`. Entries
/// stay raw so one odd record cannot fail the whole listing.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeviceList {
    Bare(Vec<Value>),
    Wrapped { results: Vec<Value> },
}

impl DeviceList {
    fn into_devices(self) -> Vec<Value> {
        match self {
            DeviceList::Bare(devices) | DeviceList::Wrapped { results: devices } => devices,
        }
    }
}

fn read_device(value: Value) -> Option<MasterRecord> {
    let record = serde_json::from_value::<FirewallaDevice>(value)
        .map_err(|e| e.to_string())
        .and_then(|device| device.into_record().ok_or_else(|| "no usable id".to_string()));
    match record {
        Ok(record) => Some(record),
        Err(reason) => {
            warn!(%reason, "Skipping unreadable Firewalla device");
            None
        }
    }
}

/// Scalar fields are kept as raw JSON and read as text, whether they
/// arrive as strings or numbers. Both spellings of a field may be present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirewallaDevice {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    mac: Option<Value>,
    #[serde(default)]
    mac_address: Option<Value>,
    #[serde(default)]
    ip: Option<Value>,
    #[serde(default)]
    ip_address: Option<Value>,
    #[serde(default)]
    last_seen: Option<Value>,
    #[serde(default)]
    connected_at: Option<Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl FirewallaDevice {
    fn into_record(self) -> Option<MasterRecord> {
        let id = self.id.and_then(scalar_text).filter(|id| !id.is_empty())?;
        // Firewalla keys devices by MAC, so `id` stands in when no address is sent.
        let mac_address = self
            .mac
            .and_then(scalar_text)
            .or_else(|| self.mac_address.and_then(scalar_text))
            .unwrap_or_else(|| id.clone());
        Some(MasterRecord {
            id,
            name: self.name.and_then(scalar_text),
            mac_address,
            ip_address: self
                .ip
                .and_then(scalar_text)
                .or_else(|| self.ip_address.and_then(scalar_text)),
            connected_at: self
                .last_seen
                .and_then(scalar_text)
                .or_else(|| self.connected_at.and_then(scalar_text)),
            extensions: self.extra,
        })
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> MasterRecord {
        read_device(value).unwrap()
    }

    #[test]
    fn maps_full_device() {
        let record = parse(json!({
            "id": "AA:BB:CC:DD:EE:01",
            "name": "Living Room TV",
            "mac": "AA:BB:CC:DD:EE:01",
            "ip": "192.168.1.20",
            "lastSeen": 1700000000.5,
            "gid": "box-1",
            "online": true
        }));

        assert_eq!(record.id, "AA:BB:CC:DD:EE:01");
        assert_eq!(record.name.as_deref(), Some("Living Room TV"));
        assert_eq!(record.ip_address.as_deref(), Some("192.168.1.20"));
        assert_eq!(record.connected_at.as_deref(), Some("1700000000.5"));
        assert_eq!(record.extensions.get("gid"), Some(&json!("box-1")));
        assert_eq!(record.extensions.get("online"), Some(&json!(true)));
        assert!(!record.extensions.contains_key("lastSeen"));
    }

    #[test]
    fn accepts_camel_case_aliases() {
        let record = parse(json!({
            "id": "fw1",
            "macAddress": "aa-bb-cc-dd-ee-02",
            "ipAddress": "10.0.0.2",
            "connectedAt": "2024-01-01T00:00:00Z"
        }));

        assert_eq!(record.mac_address, "aa-bb-cc-dd-ee-02");
        assert_eq!(record.ip_address.as_deref(), Some("10.0.0.2"));
        assert_eq!(record.connected_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert!(record.name.is_none());
        assert!(record.extensions.is_empty());
    }

    #[test]
    fn mac_falls_back_to_id() {
        let record = parse(json!({ "id": "aa:bb:cc:dd:ee:03", "name": "Printer" }));
        assert_eq!(record.mac_address, "aa:bb:cc:dd:ee:03");
    }

    #[test]
    fn listing_accepts_both_shapes() {
        let bare: DeviceList = serde_json::from_value(json!([{ "id": "a" }])).unwrap();
        let wrapped: DeviceList =
            serde_json::from_value(json!({ "results": [{ "id": "a" }, { "id": "b" }] })).unwrap();

        assert_eq!(bare.into_devices().len(), 1);
        assert_eq!(wrapped.into_devices().len(), 2);
    }

    #[test]
    fn tolerates_odd_field_types() {
        let record = parse(json!({
            "id": 42,
            "name": "Camera",
            "ip": 3232235796_u64,
            "mac": "aa:bb:cc:dd:ee:05",
            "macAddress": "AA-BB-CC-DD-EE-05",
            "lastSeen": null
        }));

        assert_eq!(record.id, "42");
        assert_eq!(record.ip_address.as_deref(), Some("3232235796"));
        assert_eq!(record.mac_address, "aa:bb:cc:dd:ee:05");
        assert!(record.connected_at.is_none());
    }

    #[test]
    fn devices_without_an_id_are_skipped() {
        assert!(read_device(json!({ "name": "Ghost" })).is_none());
        assert!(read_device(json!({ "id": "", "mac": "aa:bb:cc:dd:ee:06" })).is_none());
        assert!(read_device(json!({ "id": { "nested": true } })).is_none());
        assert!(read_device(json!("not a device")).is_none());
    }
}
