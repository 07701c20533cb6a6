use anyhow::{bail, Context};
use std::path::PathBuf;

use clickstream_storage_files::SourcePaths;

const DEFAULT_EVENTS_PATH: &str = "./data/raw/events.csv";
const DEFAULT_ITEM_PROPERTIES_PATHS: &str = "./data/raw/item_properties.csv";
const DEFAULT_CATEGORY_TREE_PATH: &str = "./data/raw/category_tree.csv";
const DEFAULT_OUTPUT_DIR: &str = "./data/processed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub sources: SourcePaths,
    pub output_dir: PathBuf,
    /// `None` keeps rayon's default of one worker per logical CPU.
    pub worker_threads: Option<usize>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so parsing can be tested without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let item_properties: Vec<PathBuf> = var(
            "CLICKSTREAM_ITEM_PROPERTIES_PATHS",
            DEFAULT_ITEM_PROPERTIES_PATHS,
        )
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect();
        if item_properties.is_empty() {
            bail!("CLICKSTREAM_ITEM_PROPERTIES_PATHS must list at least one file");
        }

        let worker_threads = match lookup("CLICKSTREAM_WORKER_THREADS") {
            Some(raw) if !raw.trim().is_empty() => {
                let threads: usize = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid CLICKSTREAM_WORKER_THREADS '{}'", raw))?;
                if threads == 0 {
                    bail!("CLICKSTREAM_WORKER_THREADS must be greater than zero");
                }
                Some(threads)
            }
            _ => None,
        };

        let log_format = match var("CLICKSTREAM_LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => bail!("Invalid CLICKSTREAM_LOG_FORMAT '{}', expected text or json", other),
        };

        Ok(Self {
            sources: SourcePaths {
                events: PathBuf::from(var("CLICKSTREAM_EVENTS_PATH", DEFAULT_EVENTS_PATH)),
                item_properties,
                category_tree: PathBuf::from(var(
                    "CLICKSTREAM_CATEGORY_TREE_PATH",
                    DEFAULT_CATEGORY_TREE_PATH,
                )),
            },
            output_dir: PathBuf::from(var("CLICKSTREAM_OUTPUT_DIR", DEFAULT_OUTPUT_DIR)),
            worker_threads,
            log_format,
        })
    }
}
