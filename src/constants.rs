//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default URL for new HTTP requests
pub const DEFAULT_URL: &str = "https://api.github.com";

/// Program invoked with the synthesized arguments
pub const DEFAULT_EXECUTOR: &str = "httpcli";

/// Data directory name under the home directory
pub const DATA_DIR_NAME: &str = ".ghostwire";

/// Log file written inside the data directory
pub const LOG_FILE_NAME: &str = "ghostwire.log";

/// Storage key of the history record
pub const HISTORY_KEY: &str = "http_cli_history";

/// Storage key of the collections record. The suffix is the schema version.
pub const COLLECTIONS_KEY: &str = "http_cli_collections_v3";

/// Number of history entries kept
pub const MAX_HISTORY: usize = 50;

/// Default name of the exported collections document
pub const EXPORT_FILE_NAME: &str = "collections.json";

/// Name given to a converted Postman document without `info.name`
pub const DEFAULT_IMPORT_NAME: &str = "Imported Postman Collection";

/// Application name
pub const APP_NAME: &str = "Ghostwire";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
