/// Number of parent hops the hierarchy walk performs.
pub const MAX_HIERARCHY_HOPS: usize = 5;

/// Prefix marking a numeric property value in the change log.
pub const NUMERIC_VALUE_PREFIX: &str = "n";

/// Change-log property names projected into `ItemAttributes`.
pub const CATEGORY_PROPERTY: &str = "categoryid";
pub const AVAILABLE_PROPERTY: &str = "available";
pub const PRICE_PROPERTY: &str = "price";

/// Output dataset names
pub const ENRICHED_EVENTS_DATASET: &str = "enriched_events";
pub const LATEST_PROPERTIES_DATASET: &str = "latest_properties";
pub const CATEGORY_HIERARCHY_DATASET: &str = "category_hierarchy";

/// Date format of the `event_date` partition column.
pub const EVENT_DATE_FORMAT: &str = "%Y-%m-%d";
