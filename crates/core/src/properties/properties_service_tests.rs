//! Tests for the property snapshot resolver.

#[cfg(test)]
mod tests {
    use crate::properties::{PropertyChange, PropertySnapshotResolver};
    use chrono::{TimeZone, Utc};

    fn change(item_id: i64, name: &str, millis: i64, value: &str) -> PropertyChange {
        PropertyChange {
            item_id,
            property_name: name.to_string(),
            change_time: Utc.timestamp_millis_opt(millis).unwrap(),
            raw_value: value.to_string(),
        }
    }

    #[test]
    fn test_latest_change_wins_per_key() {
        let changes = vec![
            change(1, "price", 1_000, "n10.000"),
            change(1, "price", 3_000, "n30.000"),
            change(1, "price", 2_000, "n20.000"),
            change(2, "price", 1_000, "n5.000"),
        ];

        let latest = PropertySnapshotResolver::new().resolve_latest(changes);

        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].item_id, 1);
        assert_eq!(latest[0].value, "n30.000");
        assert_eq!(latest[0].numeric_value, Some(30.0));
        assert_eq!(latest[1].item_id, 2);
        assert_eq!(latest[1].value, "n5.000");
    }

    #[test]
    fn test_one_entry_per_key_sorted() {
        let changes = vec![
            change(2, "available", 1_000, "1"),
            change(1, "price", 1_000, "n1.000"),
            change(1, "categoryid", 1_000, "1338"),
            change(2, "available", 2_000, "0"),
        ];

        let latest = PropertySnapshotResolver::new().resolve_latest(changes);
        let keys: Vec<(i64, &str)> = latest
            .iter()
            .map(|p| (p.item_id, p.property_name.as_str()))
            .collect();

        assert_eq!(
            keys,
            vec![(1, "categoryid"), (1, "price"), (2, "available")]
        );
        assert_eq!(latest[2].value, "0");
    }

    #[test]
    fn test_tie_is_deterministic_regardless_of_order() {
        let forward = vec![
            change(7, "888", 5_000, "alpha"),
            change(7, "888", 5_000, "omega"),
            change(7, "888", 4_000, "zzz"),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let resolver = PropertySnapshotResolver::new();
        let a = resolver.resolve_latest(forward);
        let b = resolver.resolve_latest(backward);

        assert_eq!(a, b);
        assert_eq!(a[0].value, "omega");
    }

    #[test]
    fn test_empty_change_log() {
        let snapshot = PropertySnapshotResolver::new().resolve(Vec::new());
        assert!(snapshot.latest.is_empty());
        assert!(snapshot.attributes.is_empty());
        assert_eq!(snapshot.malformed_numeric_values, 0);
    }

    #[test]
    fn test_projection_selects_three_attributes() {
        let changes = vec![
            change(1, "categoryid", 1_000, "1016"),
            change(1, "available", 1_000, "1"),
            change(1, "price", 1_000, "n120.000"),
            change(1, "790", 1_000, "n24.000"),
            change(2, "available", 1_000, "0"),
            change(3, "888", 1_000, "1116713 960601"),
        ];

        let snapshot = PropertySnapshotResolver::new().resolve(changes);

        assert_eq!(snapshot.latest.len(), 6);
        assert_eq!(snapshot.attributes.len(), 2);

        let first = &snapshot.attributes[&1];
        assert_eq!(first.category_id.as_deref(), Some("1016"));
        assert_eq!(first.available.as_deref(), Some("1"));
        assert_eq!(first.price.as_deref(), Some("n120.000"));

        let second = &snapshot.attributes[&2];
        assert_eq!(second.category_id, None);
        assert_eq!(second.available.as_deref(), Some("0"));
        assert_eq!(second.price, None);

        assert!(!snapshot.attributes.contains_key(&3));
    }

    #[test]
    fn test_projection_uses_resolved_value() {
        let changes = vec![
            change(1, "categoryid", 1_000, "1016"),
            change(1, "categoryid", 9_000, "491"),
        ];

        let snapshot = PropertySnapshotResolver::new().resolve(changes);

        assert_eq!(snapshot.attributes[&1].category_id.as_deref(), Some("491"));
        assert_eq!(snapshot.attributes[&1].category_key(), Some(491));
    }

    #[test]
    fn test_counts_malformed_numeric_winners_only() {
        let changes = vec![
            change(1, "price", 1_000, "nabc"),
            change(1, "price", 2_000, "n10.000"),
            change(2, "price", 1_000, "nxyz"),
        ];

        let snapshot = PropertySnapshotResolver::new().resolve(changes);

        assert_eq!(snapshot.malformed_numeric_values, 1);
        assert_eq!(snapshot.latest[1].numeric_value, None);
        assert_eq!(snapshot.latest[1].value, "nxyz");
    }
}
