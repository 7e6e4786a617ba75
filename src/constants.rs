//! Application constants
//!
//! Centralized location for endpoint paths and configuration defaults.

/// Backend base URL used when neither the config file nor the environment sets one
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Environment variable overriding the backend base URL
pub const API_URL_ENV: &str = "PROJEXION_API_URL";

/// Environment variable overriding the UI language (`en` / `de`)
pub const LANG_ENV: &str = "PROJEXION_LANG";

/// Per-user directory holding config, the logout marker and downloads
pub const CONFIG_DIR_NAME: &str = ".projexion";
pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const LOGOUT_MARKER_FILE: &str = "logged_out";
/// Renewal cookie kept between runs (owner-only permissions)
pub const COOKIE_FILE_NAME: &str = "session_cookie";
pub const LOG_FILE_NAME: &str = "projexion.log";

// Auth endpoints
pub const LOGIN_PATH: &str = "/auth/login";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Rows per page for server-side paging
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Page sizes offered by the table footer
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [10, 20, 50, 100];

/// How long a logout stays visible to other running instances
pub const LOGOUT_MARKER_TTL_SECS: u64 = 300;

/// Application name
pub const APP_NAME: &str = "ProjeXion";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
