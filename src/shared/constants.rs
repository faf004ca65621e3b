/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Default number of reports returned by the recent-reports listing
pub const DEFAULT_RECENT_REPORTS_LIMIT: i64 = 50;

/// Default number of reports returned for a single user
pub const DEFAULT_USER_REPORTS_LIMIT: i64 = 20;

/// Default radius for nearby-report queries, in kilometers
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;

/// Default age, in days, after which a report counts as stale
pub const DEFAULT_STALE_REPORT_DAYS: u32 = 30;

/// Earth's mean radius in kilometers (for Haversine formula)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Actor recorded on entries the pipeline writes
pub const SYSTEM_ACTOR: &str = "system";

/// User id recorded when a submission carries none
pub const ANONYMOUS_USER: &str = "anonymous";

// =============================================================================
// NOTIFICATION TOPICS
// =============================================================================

/// Topic watched by the authorities for urgent reports
pub const TOPIC_AUTHORITIES: &str = "authorities";

/// Topic every subscribed device joins
pub const TOPIC_ALL_USERS: &str = "all_users";

pub const TOPIC_TRAFFIC_UPDATES: &str = "traffic_updates";

pub const TOPIC_WEATHER_UPDATES: &str = "weather_updates";

/// Prefix for per-category topics (`category_<name>`)
pub const TOPIC_CATEGORY_PREFIX: &str = "category_";

/// Prefix for geo-bucketed topics (`location_<lat>_<lon>`)
pub const TOPIC_LOCATION_PREFIX: &str = "location_";
