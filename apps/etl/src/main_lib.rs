use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use clickstream_core::pipeline::{BatchPipeline, BatchSummary};
use clickstream_storage_files::{CsvBatchSource, PartitionedFileSink};

use crate::config::{Config, LogFormat};

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

/// Sizes the global rayon pool used by every stage of the transform.
pub fn init_worker_pool(config: &Config) -> anyhow::Result<()> {
    if let Some(threads) = config.worker_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("clickstream-worker-{}", index))
            .build_global()
            .context("Failed to configure worker pool")?;
    }
    tracing::debug!("Worker pool has {} threads", rayon::current_num_threads());
    Ok(())
}

pub fn build_pipeline(config: &Config) -> anyhow::Result<BatchPipeline> {
    let source = CsvBatchSource::new(config.sources.clone());
    let sink = PartitionedFileSink::open(&config.output_dir).with_context(|| {
        format!(
            "Failed to prepare output directory {}",
            config.output_dir.display()
        )
    })?;
    tracing::info!(
        run_id = %sink.run_id(),
        staging_dir = %sink.staging_dir().display(),
        "Prepared batch"
    );
    Ok(BatchPipeline::new(Arc::new(source), Arc::new(sink)))
}

pub fn log_summary(summary: &BatchSummary) {
    let enrichment = &summary.enrichment;
    tracing::info!(
        events_read = enrichment.events_read,
        events_retained = enrichment.events_retained,
        events_dropped = enrichment.events_dropped,
        events_with_attributes = enrichment.events_with_attributes,
        events_with_category_path = enrichment.events_with_category_path,
        "Enriched events"
    );
    tracing::info!(
        property_changes_read = summary.property_changes_read,
        latest_properties = summary.latest_properties,
        items_with_attributes = summary.items_with_attributes,
        category_edges_read = summary.category_edges_read,
        category_paths = summary.category_paths,
        "Resolved item properties and category hierarchy"
    );
    let malformed = &enrichment.malformed;
    if malformed.total() > 0
        || summary.malformed_numeric_values > 0
        || summary.duplicate_categories > 0
    {
        tracing::warn!(
            timestamps = malformed.timestamp,
            visitor_ids = malformed.visitor_id,
            item_ids = malformed.item_id,
            transaction_ids = malformed.transaction_id,
            category_ids = malformed.category_id,
            numeric_values = summary.malformed_numeric_values,
            duplicate_categories = summary.duplicate_categories,
            "Recovered malformed input values"
        );
    }
    for partition in &summary.partitions {
        tracing::debug!("Wrote partition {}", partition);
    }
}
