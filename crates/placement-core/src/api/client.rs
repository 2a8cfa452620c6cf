//! reqwest-backed placement API client

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::types::{CompanyListResponse, LoginRequest, LoginResponse};
use super::PlacementApi;
use crate::config::PortalConfig;
use crate::constants::api::{COMPANY_LIST_PATH, LOGIN_PATH, TOKEN_HEADER, USER_AGENT};
use crate::error::ApiError;
use crate::validation::Credentials;

/// HTTP client for the placement service. Stateless apart from the
/// connection pool; the token is passed per call.
#[derive(Debug, Clone)]
pub struct HttpPlacementApi {
    http_client: Client,
    login_url: String,
    company_list_url: String,
}

impl HttpPlacementApi {
    pub fn new(config: &PortalConfig) -> Result<Self, ApiError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            login_url: config.endpoint(LOGIN_PATH),
            company_list_url: config.endpoint(COMPANY_LIST_PATH),
        })
    }
}

#[async_trait]
impl PlacementApi for HttpPlacementApi {
    async fn check_student_login(
        &self,
        credentials: &Credentials,
    ) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            roll_number: &credentials.roll_number,
            student_password: &credentials.password,
        };

        let response = self
            .http_client
            .post(&self.login_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "Login response received");
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get_all_company_list(&self, token: &str) -> Result<CompanyListResponse, ApiError> {
        let response = self
            .http_client
            .get(&self.company_list_url)
            .header(TOKEN_HEADER, token)
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "Company list response received");
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        CompanyListResponse::from_value(value)
    }
}
