//! Application-wide constants

/// Remote placement API
pub mod api {
    /// Production API root
    pub const DEFAULT_BASE_URL: &str = "https://placement.iitm.ac.in/api";
    pub const LOGIN_PATH: &str = "/checkstudentlogin";
    pub const COMPANY_LIST_PATH: &str = "/getallcompanylist";
    /// Header carrying the session token on authenticated calls
    pub const TOKEN_HEADER: &str = "tokenizer";
    /// Success marker in the login response `status` field
    pub const LOGIN_SUCCESS: &str = "success";
    /// Marker for a logically failed company list despite HTTP 200
    pub const LIST_INVALID: &str = "invalid";
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const USER_AGENT: &str = concat!("placement-portal/", env!("CARGO_PKG_VERSION"));
}

/// Rate-limit backoff timing
pub mod backoff {
    pub const RETRY_INTERVAL_MS: u64 = 10_000;
    pub const TICK_MS: u64 = 1_000;
}

/// Login form rules and messages
pub mod validation {
    pub const ROLL_NUMBER_LEN: usize = 8;
    pub const REQUIRED: &str = "Required!";
    pub const INVALID_ROLL_NUMBER: &str = "Invalid Roll Number";
}

/// User-visible alert texts
pub mod messages {
    pub const SOMETHING_WENT_WRONG: &str = "Something went wrong!";
}

/// Presentation limits
pub mod ui {
    /// Longest display name shown before truncating with an ellipsis
    pub const GREETING_NAME_MAX: usize = 20;
    pub const CONFIG_DIR_NAME: &str = ".placement";
    pub const CONFIG_FILE_NAME: &str = "config.toml";
    pub const LOG_FILE_NAME: &str = "placement.log";
}
