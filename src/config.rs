/// Snapshot file used when neither `--data-file` nor the env var is set.
pub const DEFAULT_DATA_FILE: &str = "data.json";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

pub const DATA_FILE_ENV: &str = "BLOG_DATA_FILE";
pub const BIND_ADDR_ENV: &str = "BLOG_BIND_ADDR";

/// Shown in place of an author that no longer exists.
pub const UNKNOWN_AUTHOR: &str = "Unknown";
