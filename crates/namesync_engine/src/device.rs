//! Device records as reported by the two platforms.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A device as seen by one platform.
///
/// Both platforms are mapped onto this shape by their clients. Fields the
/// engine does not look at are carried in `extensions` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    /// Platform-specific primary key. May be the MAC address itself.
    pub id: String,
    /// Display name. `None` means unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Hardware address in whatever format the platform reports.
    pub mac_address: String,
    /// Network address, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// When the device last connected, as reported by the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<String>,
    /// Platform-specific fields not used by the engine.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, Value>,
}

/// A record from the authoritative platform.
pub type MasterRecord = DeviceRecord;

/// A record from the platform being corrected.
pub type FollowerRecord = DeviceRecord;

impl DeviceRecord {
    /// Creates a record with only the identifying fields set.
    pub fn new(id: impl Into<String>, mac_address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mac_address: mac_address.into(),
            ..Default::default()
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the network address.
    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Sets the connection timestamp.
    pub fn with_connected_at(mut self, at: impl Into<String>) -> Self {
        self.connected_at = Some(at.into());
        self
    }

    /// Adds a platform-specific field.
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Returns the display name if it is set and non-empty.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// Returns the display name or a placeholder for logging.
    pub fn name_or_placeholder(&self) -> &str {
        self.display_name().unwrap_or("(none)")
    }
}
