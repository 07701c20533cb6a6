//! Tests for the staged file sink.

#[cfg(test)]
mod tests {
    use crate::sink::{PartitionedFileSink, PART_FILE_NAME, STAGING_DIR_PREFIX};
    use chrono::{TimeZone, Utc};
    use clickstream_core::categories::CategoryPath;
    use clickstream_core::constants::{
        CATEGORY_HIERARCHY_DATASET, ENRICHED_EVENTS_DATASET, LATEST_PROPERTIES_DATASET,
    };
    use clickstream_core::errors::{Error, SinkError};
    use clickstream_core::events::{partition_events, EnrichedEvent, EventType, NormalizedEvent};
    use clickstream_core::pipeline::DatasetSinkTrait;
    use clickstream_core::properties::{PropertyChange, ResolvedProperty};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn event(event_type: EventType, epoch_ms: i64) -> EnrichedEvent {
        let event_time = Utc.timestamp_millis_opt(epoch_ms).unwrap();
        EnrichedEvent::unmatched(NormalizedEvent {
            epoch_ms: Some(epoch_ms),
            event_time: Some(event_time),
            event_date: Some(event_time.date_naive()),
            visitor_id: Some(1),
            event_type,
            item_id: Some(10),
            transaction_id: None,
        })
    }

    fn property() -> ResolvedProperty {
        ResolvedProperty::from(PropertyChange {
            item_id: 10,
            property_name: "price".to_string(),
            change_time: Utc.timestamp_millis_opt(1_000).unwrap(),
            raw_value: "n5.000".to_string(),
        })
    }

    fn lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn staging_dirs(root: &Path) -> usize {
        fs::read_dir(root)
            .unwrap()
            .filter(|entry| {
                entry
                    .as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .starts_with(STAGING_DIR_PREFIX)
            })
            .count()
    }

    fn write_all(sink: &PartitionedFileSink, events: &[EnrichedEvent]) {
        sink.write_enriched_events(&partition_events(events)).unwrap();
        sink.write_latest_properties(&[property()]).unwrap();
        sink.write_category_hierarchy(&[CategoryPath { category_id: 3, path: vec![3, 1] }])
            .unwrap();
    }

    #[test]
    fn test_commit_publishes_partitioned_datasets() {
        let dir = TempDir::new().unwrap();
        let sink = PartitionedFileSink::open(dir.path()).unwrap();
        let events = vec![
            event(EventType::View, 1_433_221_332_117),
            event(EventType::View, 1_433_221_333_000),
            event(EventType::Transaction, 1_433_307_732_117),
        ];

        write_all(&sink, &events);
        assert!(!dir.path().join(ENRICHED_EVENTS_DATASET).exists());
        sink.commit().unwrap();

        let views = lines(
            &dir.path()
                .join(ENRICHED_EVENTS_DATASET)
                .join("event_type=view/event_date=2015-06-02")
                .join(PART_FILE_NAME),
        );
        assert_eq!(views.len(), 2);
        assert_eq!(views[0]["event_type"], "view");
        assert_eq!(views[0]["event_date"], "2015-06-02");
        assert_eq!(views[0]["price"], serde_json::Value::Null);
        assert_eq!(views[1]["epoch_ms"], 1_433_221_333_000i64);

        let transactions = lines(
            &dir.path()
                .join(ENRICHED_EVENTS_DATASET)
                .join("event_type=transaction/event_date=2015-06-03")
                .join(PART_FILE_NAME),
        );
        assert_eq!(transactions.len(), 1);

        let properties = lines(&dir.path().join(LATEST_PROPERTIES_DATASET).join(PART_FILE_NAME));
        assert_eq!(properties[0]["numeric_value"], 5.0);
        let paths = lines(&dir.path().join(CATEGORY_HIERARCHY_DATASET).join(PART_FILE_NAME));
        assert_eq!(paths[0]["path"], serde_json::json!([3, 1]));

        assert_eq!(staging_dirs(dir.path()), 0);
    }

    #[test]
    fn test_commit_replaces_previous_output() {
        let dir = TempDir::new().unwrap();
        let first = PartitionedFileSink::open(dir.path()).unwrap();
        write_all(&first, &[event(EventType::View, 1_433_221_332_117)]);
        first.commit().unwrap();

        let second = PartitionedFileSink::open(dir.path()).unwrap();
        write_all(&second, &[event(EventType::AddToCart, 1_433_221_332_117)]);
        second.commit().unwrap();

        let enriched = dir.path().join(ENRICHED_EVENTS_DATASET);
        assert!(!enriched.join("event_type=view").exists());
        assert!(enriched.join("event_type=addtocart").exists());
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 3);
    }

    #[test]
    fn test_abort_leaves_nothing_visible() {
        let dir = TempDir::new().unwrap();
        let sink = PartitionedFileSink::open(dir.path()).unwrap();
        sink.write_latest_properties(&[property()]).unwrap();

        sink.abort().unwrap();

        assert!(!sink.staging_dir().exists());
        assert!(!dir.path().join(LATEST_PROPERTIES_DATASET).exists());
        let err = sink.commit().unwrap_err();
        assert!(matches!(err, Error::Sink(SinkError::AlreadyFinished)));
    }

    #[test]
    fn test_commit_requires_every_dataset() {
        let dir = TempDir::new().unwrap();
        let sink = PartitionedFileSink::open(dir.path()).unwrap();
        sink.write_latest_properties(&[property()]).unwrap();

        let err = sink.commit().unwrap_err();

        assert!(matches!(err, Error::Sink(SinkError::CommitFailed(_))));
        assert!(!dir.path().join(LATEST_PROPERTIES_DATASET).exists());
    }

    #[test]
    fn test_empty_batch_publishes_empty_datasets() {
        let dir = TempDir::new().unwrap();
        let sink = PartitionedFileSink::open(dir.path()).unwrap();

        sink.write_enriched_events(&partition_events(&[])).unwrap();
        sink.write_latest_properties(&[]).unwrap();
        sink.write_category_hierarchy(&[]).unwrap();
        sink.commit().unwrap();

        assert!(dir.path().join(ENRICHED_EVENTS_DATASET).is_dir());
        let properties =
            fs::read_to_string(dir.path().join(LATEST_PROPERTIES_DATASET).join(PART_FILE_NAME))
                .unwrap();
        assert!(properties.is_empty());
    }

    #[test]
    fn test_dropping_unfinished_sink_removes_staging() {
        let dir = TempDir::new().unwrap();
        let staging = {
            let sink = PartitionedFileSink::open(dir.path()).unwrap();
            sink.write_latest_properties(&[property()]).unwrap();
            sink.staging_dir().to_path_buf()
        };

        assert!(!staging.exists());
    }

    #[test]
    fn test_open_sweeps_staging_of_killed_runs() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join(format!("{}killed-run", STAGING_DIR_PREFIX));
        fs::create_dir_all(stale.join(LATEST_PROPERTIES_DATASET)).unwrap();

        let sink = PartitionedFileSink::open(dir.path()).unwrap();

        assert!(!stale.exists());
        assert_eq!(staging_dirs(dir.path()), 1);
        assert!(sink.staging_dir().exists());
    }

    #[test]
    fn test_open_restores_dataset_parked_by_killed_commit() {
        let dir = TempDir::new().unwrap();
        let parked = dir.path().join("_previous-killed-run").join(CATEGORY_HIERARCHY_DATASET);
        fs::create_dir_all(&parked).unwrap();
        fs::write(parked.join(PART_FILE_NAME), "{}\n").unwrap();

        let _sink = PartitionedFileSink::open(dir.path()).unwrap();

        let restored = dir.path().join(CATEGORY_HIERARCHY_DATASET).join(PART_FILE_NAME);
        assert_eq!(fs::read_to_string(restored).unwrap(), "{}\n");
        assert!(!dir.path().join("_previous-killed-run").exists());
    }
}
