//! Placement API
//!
//! The remote service is opaque; the controller only sees the
//! `PlacementApi` trait so tests can script responses.

mod client;
mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::validation::Credentials;

pub use client::HttpPlacementApi;
pub use types::{CompanyListResponse, LoginRequest, LoginResponse};

/// Calls the session controller makes against the placement service
#[async_trait]
pub trait PlacementApi: Send + Sync {
    /// `POST /checkstudentlogin`
    async fn check_student_login(&self, credentials: &Credentials)
        -> Result<LoginResponse, ApiError>;

    /// `GET /getallcompanylist` with the session token
    async fn get_all_company_list(&self, token: &str) -> Result<CompanyListResponse, ApiError>;
}

/// Shared, type-erased API handle
pub type SharedApi = Arc<dyn PlacementApi>;
