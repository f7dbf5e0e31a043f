//! Property tests for normalization, matching and planning.

use namesync_engine::{
    is_canonical_mac, match_devices, normalize_mac, plan_updates, DeviceRecord, RunSummary,
};
use namesync_testkit::{mac_string_strategy, messy_mac_strategy, MacStyle};
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalization_is_idempotent(mac in messy_mac_strategy()) {
        let once = normalize_mac(&mac);
        prop_assert_eq!(normalize_mac(&once), once);
    }

    #[test]
    fn normalization_ignores_style_and_case((octets, rendered) in mac_string_strategy()) {
        let canonical = MacStyle::Colon.render(&octets, false);
        let normalized = normalize_mac(&rendered);
        prop_assert!(is_canonical_mac(&normalized));
        prop_assert_eq!(normalized, canonical);
    }

    #[test]
    fn matched_plus_skipped_is_total(
        master_macs in prop::collection::vec(mac_string_strategy(), 0..12),
        follower_macs in prop::collection::vec(mac_string_strategy(), 0..12),
    ) {
        let masters: Vec<DeviceRecord> = master_macs
            .iter()
            .enumerate()
            .map(|(i, (_, mac))| DeviceRecord::new(format!("fw{i}"), mac.clone()).with_name(format!("Device {i}")))
            .collect();
        let followers: Vec<DeviceRecord> = follower_macs
            .iter()
            .enumerate()
            .map(|(i, (_, mac))| DeviceRecord::new(format!("u{i}"), mac.clone()))
            .collect();

        let matches = match_devices(&masters, &followers);

        // A follower is matched when a master shares its address and no
        // later follower claims the same address; everything else is skipped.
        let master_keys: Vec<String> = masters.iter().map(|m| normalize_mac(&m.mac_address)).collect();
        let follower_keys: Vec<String> = followers.iter().map(|f| normalize_mac(&f.mac_address)).collect();
        let mut expected_matched = Vec::new();
        let mut expected_skipped = 0;
        for (i, key) in follower_keys.iter().enumerate() {
            let superseded = follower_keys[i + 1..].contains(key);
            if master_keys.contains(key) && !superseded {
                expected_matched.push((key.clone(), followers[i].id.clone()));
            } else {
                expected_skipped += 1;
            }
        }

        prop_assert_eq!(matches.len(), expected_matched.len());
        for (key, follower_id) in &expected_matched {
            prop_assert_eq!(
                matches.get(key).map(|p| p.follower.id.as_str()),
                Some(follower_id.as_str())
            );
        }

        let summary = RunSummary::summarize(followers.len(), &matches, &[]);
        prop_assert_eq!(summary.matched_count, expected_matched.len());
        prop_assert_eq!(summary.skipped_count, expected_skipped);

        // Every matched follower is unnamed and every master is named.
        prop_assert_eq!(plan_updates(&matches).len(), matches.len());
    }

    #[test]
    fn unnamed_masters_never_plan((_, mac) in mac_string_strategy(), name in "[A-Za-z ]{1,16}") {
        let masters = vec![DeviceRecord::new("fw1", mac.clone())];
        let followers = vec![DeviceRecord::new("u1", mac).with_name(name)];

        let matches = match_devices(&masters, &followers);

        prop_assert_eq!(matches.len(), 1);
        prop_assert!(plan_updates(&matches).is_empty());
    }
}
