mod config;
mod main_lib;

use config::Config;
use main_lib::{build_pipeline, init_tracing, init_worker_pool, log_summary};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);
    init_worker_pool(&config)?;

    tracing::info!(
        events = %config.sources.events.display(),
        category_tree = %config.sources.category_tree.display(),
        item_properties_files = config.sources.item_properties.len(),
        "Starting batch"
    );
    let pipeline = build_pipeline(&config)?;
    let summary = pipeline.run()?;
    log_summary(&summary);
    tracing::info!(
        partitions = summary.partitions.len(),
        "Batch published to {}",
        config.output_dir.display()
    );
    Ok(())
}
