//! Placement Core
//!
//! Student session logic for the placement portal: configuration, the
//! placement API client, and the session controller that logs a student in,
//! loads the company list, and backs off when the API rate-limits.

pub mod api;
pub mod backoff;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod models;
pub mod paths;
pub mod validation;

pub use api::{HttpPlacementApi, PlacementApi, SharedApi};
pub use config::PortalConfig;
pub use controller::{FetchOutcome, SessionController};
pub use error::{ApiError, ConfigError, SessionError};
pub use models::{BackoffState, CompanyRecord, ControllerState, Phase, Session};
pub use validation::{Credentials, LoginForm, ValidationErrors};

/// Session controller over a type-erased API, as used by the server and CLI
pub type StudentController = SessionController<dyn PlacementApi>;
