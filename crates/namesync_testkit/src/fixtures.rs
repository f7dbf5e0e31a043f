//! Test fixtures and platform helpers.
//!
//! Provides record builders and the canned inventories used across the
//! engine and CLI tests.

use namesync_engine::{DeviceRecord, MockFollowerTarget, MockMasterSource};
use serde_json::Value;

/// Builds a master record.
pub fn master(id: &str, mac: &str, name: Option<&str>) -> DeviceRecord {
    let record = DeviceRecord::new(id, mac);
    match name {
        Some(name) => record.with_name(name),
        None => record,
    }
}

/// Builds a follower record with a UniFi-style connection type.
pub fn follower(id: &str, mac: &str, name: Option<&str>) -> DeviceRecord {
    let record = DeviceRecord::new(id, mac).with_extension("type", Value::from("WIRED"));
    match name {
        Some(name) => record.with_name(name),
        None => record,
    }
}

/// One named master and two followers, one of which has no master.
///
/// Expected outcome: 1 match, 1 planned update (`u1` → "Living Room TV"),
/// 1 skipped follower.
pub fn living_room_inventories() -> (Vec<DeviceRecord>, Vec<DeviceRecord>) {
    (
        vec![master("fw1", "aa:bb:cc:dd:ee:ff", Some("Living Room TV"))],
        vec![
            follower("u1", "AA:BB:CC:DD:EE:FF", Some("Old TV Name")),
            follower("u2", "99:88:77:66:55:44", Some("Unknown")),
        ],
    )
}

/// Mock platforms serving [`living_room_inventories`].
pub fn living_room_scenario() -> (MockMasterSource, MockFollowerTarget) {
    let (masters, followers) = living_room_inventories();
    (
        MockMasterSource::new(masters),
        MockFollowerTarget::new(followers),
    )
}

/// A household where several followers need renaming.
///
/// - `u1`, `u2`, `u3` need new names
/// - `u4` already matches
/// - `u5` has a master without a name
/// - `u6` has no master
pub fn household_inventories() -> (Vec<DeviceRecord>, Vec<DeviceRecord>) {
    (
        vec![
            master("fw1", "aa:bb:cc:dd:ee:01", Some("Living Room TV")),
            master("fw2", "aa-bb-cc-dd-ee-02", Some("Kitchen Speaker")),
            master("fw3", "AABBCCDDEE03", Some("Office Printer")),
            master("fw4", "aa:bb:cc:dd:ee:04", Some("Thermostat")),
            master("fw5", "aa:bb:cc:dd:ee:05", None),
        ],
        vec![
            follower("u1", "AA:BB:CC:DD:EE:01", Some("Old TV Name")),
            follower("u2", "aa:bb:cc:dd:ee:02", None),
            follower("u3", "aa:bb:cc:dd:ee:03", Some("HP-1234")),
            follower("u4", "aa:bb:cc:dd:ee:04", Some("Thermostat")),
            follower("u5", "aa:bb:cc:dd:ee:05", Some("Mystery Box")),
            follower("u6", "11:22:33:44:55:66", Some("Guest Phone")),
        ],
    )
}

/// Mock platforms serving [`household_inventories`].
pub fn household_scenario() -> (MockMasterSource, MockFollowerTarget) {
    let (masters, followers) = household_inventories();
    (
        MockMasterSource::new(masters),
        MockFollowerTarget::new(followers),
    )
}
