//! Tests for enriched event partition keys.

#[cfg(test)]
mod tests {
    use crate::events::{
        partition_events, EnrichedEvent, EventPartition, EventType, NormalizedEvent,
        NULL_PARTITION_VALUE,
    };
    use chrono::NaiveDate;

    fn event(event_type: EventType, date: Option<(i32, u32, u32)>, epoch_ms: i64) -> EnrichedEvent {
        EnrichedEvent::unmatched(NormalizedEvent {
            epoch_ms: Some(epoch_ms),
            event_time: None,
            event_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            visitor_id: Some(1),
            event_type,
            item_id: Some(1),
            transaction_id: None,
        })
    }

    #[test]
    fn test_relative_dir() {
        let partition = EventPartition::of(&event(EventType::AddToCart, Some((2015, 6, 2)), 0));
        assert_eq!(partition.relative_dir(), "event_type=addtocart/event_date=2015-06-02");
        assert_eq!(partition.to_string(), partition.relative_dir());
    }

    #[test]
    fn test_null_date_uses_default_partition() {
        let partition = EventPartition::of(&event(EventType::View, None, 0));
        assert_eq!(
            partition.relative_dir(),
            format!("event_type=view/event_date={}", NULL_PARTITION_VALUE)
        );
    }

    #[test]
    fn test_partition_events_groups_and_keeps_order() {
        let events = vec![
            event(EventType::View, Some((2015, 6, 3)), 1),
            event(EventType::Transaction, Some((2015, 6, 2)), 2),
            event(EventType::View, Some((2015, 6, 2)), 3),
            event(EventType::View, Some((2015, 6, 3)), 4),
        ];

        let partitions = partition_events(&events);
        let keys: Vec<String> = partitions.keys().map(|p| p.relative_dir()).collect();
        assert_eq!(
            keys,
            vec![
                "event_type=view/event_date=2015-06-02",
                "event_type=view/event_date=2015-06-03",
                "event_type=transaction/event_date=2015-06-02",
            ]
        );

        let june_third: Vec<Option<i64>> = partitions
            .values()
            .nth(1)
            .unwrap()
            .iter()
            .map(|e| e.epoch_ms)
            .collect();
        assert_eq!(june_third, vec![Some(1), Some(4)]);
        assert_eq!(partitions.values().map(Vec::len).sum::<usize>(), events.len());
    }
}
