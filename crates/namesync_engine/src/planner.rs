//! Change planning for matched device pairs.

use crate::device::FollowerRecord;
use crate::matcher::{MatchSet, MatchedPair};

/// A name correction to push to the follower platform.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate<'a> {
    /// Normalized MAC address the pair was matched on.
    pub mac: String,
    /// The follower record to correct.
    pub follower: &'a FollowerRecord,
    /// The name the follower should carry.
    pub proposed_name: String,
}

/// Returns the master's name if the follower should be renamed to it.
///
/// The master only has an opinion when its name is non-empty. The
/// comparison is an exact string comparison.
pub fn proposed_name<'a>(pair: &MatchedPair<'a>) -> Option<&'a str> {
    let master_name = pair.master.display_name()?;
    (pair.follower.name.as_deref() != Some(master_name)).then_some(master_name)
}

/// Computes the updates needed to bring followers in line with masters.
///
/// Output follows the iteration order of `matches`.
pub fn plan_updates<'a>(matches: &MatchSet<'a>) -> Vec<PlannedUpdate<'a>> {
    matches
        .iter()
        .filter_map(|(mac, pair)| {
            proposed_name(pair).map(|name| PlannedUpdate {
                mac: mac.clone(),
                follower: pair.follower,
                proposed_name: name.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceRecord;
    use crate::matcher::match_devices;

    #[test]
    fn identifies_names_that_differ() {
        let masters = vec![
            DeviceRecord::new("fw1", "aa:bb:cc:dd:ee:ff").with_name("New Name"),
            DeviceRecord::new("fw2", "11:22:33:44:55:66").with_name("Same Name"),
        ];
        let followers = vec![
            DeviceRecord::new("unifi1", "aa:bb:cc:dd:ee:ff").with_name("Old Name"),
            DeviceRecord::new("unifi2", "11:22:33:44:55:66").with_name("Same Name"),
        ];
        let matches = match_devices(&masters, &followers);

        let planned = plan_updates(&matches);

        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].follower.id, "unifi1");
        assert_eq!(planned[0].proposed_name, "New Name");
        assert_eq!(planned[0].mac, "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn skips_masters_without_names() {
        let masters = vec![
            DeviceRecord::new("fw1", "aa:bb:cc:dd:ee:ff"),
            DeviceRecord::new("fw2", "11:22:33:44:55:66").with_name(""),
        ];
        let followers = vec![
            DeviceRecord::new("unifi1", "aa:bb:cc:dd:ee:ff").with_name("X"),
            DeviceRecord::new("unifi2", "11:22:33:44:55:66").with_name("Y"),
        ];
        let matches = match_devices(&masters, &followers);

        assert!(plan_updates(&matches).is_empty());
    }

    #[test]
    fn names_unnamed_followers() {
        let masters = vec![DeviceRecord::new("fw1", "aa:bb:cc:dd:ee:ff").with_name("Printer")];
        let followers = vec![DeviceRecord::new("unifi1", "aa:bb:cc:dd:ee:ff")];
        let matches = match_devices(&masters, &followers);

        let planned = plan_updates(&matches);

        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].proposed_name, "Printer");
    }

    #[test]
    fn comparison_is_exact() {
        let masters = vec![DeviceRecord::new("fw1", "aa:bb:cc:dd:ee:ff").with_name("living room tv")];
        let followers =
            vec![DeviceRecord::new("unifi1", "aa:bb:cc:dd:ee:ff").with_name("Living Room TV")];
        let matches = match_devices(&masters, &followers);

        assert_eq!(plan_updates(&matches).len(), 1);
    }

    #[test]
    fn output_follows_match_order() {
        let masters = vec![
            DeviceRecord::new("fw1", "cc:cc:cc:cc:cc:cc").with_name("C"),
            DeviceRecord::new("fw2", "aa:aa:aa:aa:aa:aa").with_name("A"),
        ];
        let followers = vec![
            DeviceRecord::new("u1", "cc:cc:cc:cc:cc:cc"),
            DeviceRecord::new("u2", "aa:aa:aa:aa:aa:aa"),
        ];
        let matches = match_devices(&masters, &followers);

        let planned = plan_updates(&matches);
        let macs: Vec<&str> = planned.iter().map(|p| p.mac.as_str()).collect();
        let keys: Vec<&str> = matches.keys().map(String::as_str).collect();

        assert_eq!(macs, keys);
    }
}
