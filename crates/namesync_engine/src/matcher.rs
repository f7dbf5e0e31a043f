//! Cross-platform device matching by normalized MAC address.

use crate::device::{FollowerRecord, MasterRecord};
use crate::mac::{is_canonical_mac, normalize_mac};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A master and a follower record describing the same physical device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedPair<'a> {
    /// The authoritative record.
    pub master: &'a MasterRecord,
    /// The record to be corrected.
    pub follower: &'a FollowerRecord,
}

/// Matched pairs keyed by normalized MAC address.
pub type MatchSet<'a> = BTreeMap<String, MatchedPair<'a>>;

/// Joins the two inventories on normalized MAC address.
///
/// Masters sharing a normalized MAC resolve to the one listed last.
/// Followers without a master are left out of the result; the caller
/// counts them as skipped.
pub fn match_devices<'a>(
    masters: &'a [MasterRecord],
    followers: &'a [FollowerRecord],
) -> MatchSet<'a> {
    let mut masters_by_mac: HashMap<String, &'a MasterRecord> =
        HashMap::with_capacity(masters.len());
    for master in masters {
        let mac = normalize_mac(&master.mac_address);
        if !is_canonical_mac(&mac) {
            debug!(mac = %master.mac_address, id = %master.id, "master record has a malformed MAC address");
        }
        if let Some(previous) = masters_by_mac.insert(mac.clone(), master) {
            debug!(
                mac = %mac,
                replaced = %previous.id,
                kept = %master.id,
                "duplicate MAC address in master inventory"
            );
        }
    }

    let mut matches = MatchSet::new();
    for follower in followers {
        let mac = normalize_mac(&follower.mac_address);
        if let Some(&master) = masters_by_mac.get(&mac) {
            let pair = MatchedPair { master, follower };
            if let Some(previous) = matches.insert(mac.clone(), pair) {
                debug!(
                    mac = %mac,
                    replaced = %previous.follower.id,
                    kept = %follower.id,
                    "duplicate MAC address in follower inventory"
                );
            }
        }
    }

    matches
}
