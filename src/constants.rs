//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Application name
pub const APP_NAME: &str = "Rester";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Placeholder shown in the URL bar while it is empty
pub const URL_PLACEHOLDER: &str = "https://httpbin.org/get";

/// Directory under the user's home where collections are stored
pub const CONFIG_DIR: &str = ".rester";

/// Log file written to the working directory
pub const LOG_FILE: &str = "rester.log";

/// Request timeout, in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Editor used for response export when $EDITOR is unset
pub const DEFAULT_EDITOR: &str = "vi";
