// manifestrs/src/constants.rs

/// Directory holding generator state inside a project
pub const MANIFESTRS_DIR: &str = ".manifestrs";

/// Persisted component hash cache
pub const HASH_CACHE_FILE_NAME: &str = "hash-cache.json";

/// Persisted set of hand-edited files
pub const USER_EDITS_FILE_NAME: &str = "user-edits.json";

/// Quarantine directory for files of removed components
pub const TRASH_DIR: &str = "trash";

/// Project configuration file
pub const DEFAULT_CONFIG_NAME: &str = "manifestrs.yml";

/// Manifest looked up when no path is given
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.json";

/// Schema version written into every sidecar
pub const SIDECAR_SCHEMA_VERSION: &str = "1";
