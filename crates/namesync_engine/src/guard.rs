//! Safety guard applied to every change before it reaches the follower.
//!
//! The engine may only ever rename devices. Addressing, VLAN and uplink
//! attributes on the follower platform must never be touched, whatever
//! the planner computed.

use crate::device::FollowerRecord;
use crate::error::{SyncError, SyncResult};
use serde::Serialize;
use serde_json::{Map, Value};

/// Fields the engine is allowed to modify on a follower record.
pub const ALLOWED_FIELDS: &[&str] = &["name"];

/// A set of field changes destined for the follower platform.
///
/// Serializes to the JSON object sent as the update body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldChanges(Map<String, Value>);

impl FieldChanges {
    /// Creates an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a change set that only renames the device.
    pub fn rename(name: impl Into<String>) -> Self {
        Self::new().with_field("name", Value::String(name.into()))
    }

    /// Adds or replaces a field.
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Returns the proposed name, if one is present and is text.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Iterates over field names.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns true if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Checks that `proposed` only renames `current`.
///
/// Fails with [`SyncError::PolicyViolation`] listing every field outside
/// [`ALLOWED_FIELDS`], and with [`SyncError::InvalidValue`] when `name` is
/// present but not a string. An empty change set passes.
pub fn check_changes(current: &FollowerRecord, proposed: &FieldChanges) -> SyncResult<()> {
    let disallowed: Vec<String> = proposed
        .fields()
        .filter(|field| !ALLOWED_FIELDS.iter().any(|allowed| allowed == field))
        .map(str::to_string)
        .collect();

    if !disallowed.is_empty() {
        tracing::warn!(
            follower = %current.id,
            fields = ?disallowed,
            "rejected change to protected fields"
        );
        return Err(SyncError::PolicyViolation { fields: disallowed });
    }

    match proposed.as_map().get("name") {
        None | Some(Value::String(_)) => Ok(()),
        Some(other) => Err(SyncError::InvalidValue {
            field: "name".into(),
            reason: format!("must be a string, got {}", json_type(other)),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceRecord;
    use serde_json::json;

    fn follower() -> DeviceRecord {
        DeviceRecord::new("unifi1", "aa:bb:cc:dd:ee:ff")
            .with_name("Old Name")
            .with_extension("type", "WIRED")
    }

    #[test]
    fn allows_name_changes() {
        assert!(check_changes(&follower(), &FieldChanges::rename("New Name")).is_ok());
    }

    #[test]
    fn allows_empty_changes() {
        assert!(check_changes(&follower(), &FieldChanges::new()).is_ok());
    }

    #[test]
    fn rejects_other_fields() {
        let changes = FieldChanges::rename("X").with_field("type", "WIRELESS");

        let err = check_changes(&follower(), &changes).unwrap_err();

        assert_eq!(
            err,
            SyncError::PolicyViolation {
                fields: vec!["type".into()]
            }
        );
        assert!(err.to_string().contains("disallowed fields: type"));
    }

    #[test]
    fn lists_every_disallowed_field() {
        let changes = FieldChanges::new()
            .with_field("ipAddress", "10.0.0.9")
            .with_field("uplinkDeviceId", "sw-1");

        match check_changes(&follower(), &changes) {
            Err(SyncError::PolicyViolation { fields }) => {
                assert_eq!(fields.len(), 2);
                assert!(fields.contains(&"ipAddress".to_string()));
                assert!(fields.contains(&"uplinkDeviceId".to_string()));
            }
            other => panic!("expected policy violation, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_string_name() {
        let changes = FieldChanges::new().with_field("name", 42);

        let err = check_changes(&follower(), &changes).unwrap_err();

        assert!(matches!(err, SyncError::InvalidValue { ref field, .. } if field == "name"));
        assert!(err.to_string().contains("number"));
    }

    #[test]
    fn serializes_as_plain_object() {
        let body = serde_json::to_value(FieldChanges::rename("Living Room TV")).unwrap();
        assert_eq!(body, json!({ "name": "Living Room TV" }));
        assert_eq!(FieldChanges::rename("A").name(), Some("A"));
    }
}
