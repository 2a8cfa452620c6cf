//! Placement Server
//!
//! Serves the portal pages (landing menu, student login/dashboard, admin
//! placeholder), a JSON view of the student session state, and the offline
//! assets. Each browser session owns one `StudentController`.
//! The server is started via `start_server()`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rust_embed::Embed;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::{Instant, MissedTickBehavior};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use placement_core::{HttpPlacementApi, PortalConfig, SharedApi, StudentController};

pub mod auth;
pub mod error;
pub mod render;
pub mod routes;

/// Offline assets: service worker, manifest, icon, stylesheet.
#[derive(Embed)]
#[folder = "assets"]
struct PortalAssets;

/// Browser sessions not seen for this long are logged out.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for starting the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on (default: 3000).
    pub port: u16,
    /// Placement API settings handed to every student controller.
    pub portal: PortalConfig,
    /// Idle time after which a browser session is logged out.
    pub session_idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            portal: PortalConfig::default(),
            session_idle_timeout: SESSION_IDLE_TIMEOUT,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub portal: Arc<PortalConfig>,
    /// Placement API shared by all student sessions.
    pub api: SharedApi,
    /// Live student sessions keyed by browser session id, with the time
    /// each was last seen.
    pub sessions: Arc<RwLock<HashMap<String, (Arc<StudentController>, Instant)>>>,
}

impl AppState {
    pub fn new(portal: PortalConfig, api: SharedApi) -> Self {
        Self {
            portal: Arc::new(portal),
            api,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Controller for a browser session, if it has one. Marks the session
    /// as seen.
    pub async fn controller(&self, session_id: Option<&str>) -> Option<Arc<StudentController>> {
        let session_id = session_id?;
        let mut sessions = self.sessions.write().await;
        let (controller, last_seen) = sessions.get_mut(session_id)?;
        *last_seen = Instant::now();
        Some(Arc::clone(controller))
    }

    pub async fn insert_session(&self, session_id: String, controller: Arc<StudentController>) {
        self.sessions
            .write()
            .await
            .insert(session_id, (controller, Instant::now()));
    }

    /// Drop a browser session and log its student out
    pub async fn end_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        match removed {
            Some((controller, _)) => {
                controller.logout();
                true
            }
            None => false,
        }
    }

    /// Log out and drop every session not seen within `max_idle`.
    /// Returns how many were evicted.
    pub async fn sweep_idle_sessions(&self, max_idle: Duration) -> usize {
        let mut evicted = Vec::new();
        self.sessions
            .write()
            .await
            .retain(|_, (controller, last_seen)| {
                if last_seen.elapsed() < max_idle {
                    return true;
                }
                evicted.push(Arc::clone(controller));
                false
            });

        for controller in &evicted {
            controller.logout();
        }
        evicted.len()
    }

    /// Fresh controller wired to the shared API
    pub fn new_controller(&self) -> Arc<StudentController> {
        Arc::new(StudentController::new(
            Arc::clone(&self.api),
            (*self.portal).clone(),
        ))
    }
}

/// Periodically log out browser sessions that have gone idle.
pub fn spawn_session_sweeper(state: AppState, max_idle: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = state.sweep_idle_sessions(max_idle).await;
            if evicted > 0 {
                tracing::info!(evicted, "Logged out idle browser sessions");
            }
        }
    })
}

/// Build the router for a prepared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .merge(routes::pages_router())
        .nest("/api", routes::api_router().layer(cors))
        .fallback(serve_asset)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the router against the real placement API.
pub fn build_router(config: &ServerConfig) -> anyhow::Result<(Router, AppState)> {
    config.portal.validate()?;
    let api: SharedApi = Arc::new(HttpPlacementApi::new(&config.portal)?);
    let state = AppState::new(config.portal.clone(), api);
    Ok((router(state.clone()), state))
}

/// Start the placement server and block until shutdown.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let (app, state) = build_router(&config)?;
    let sweeper = spawn_session_sweeper(state, config.session_idle_timeout);

    tracing::info!(
        base_url = %config.portal.base_url,
        "Placement server listening on http://{}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app).await;
    sweeper.abort();
    served?;

    Ok(())
}

/// Serve embedded assets; anything else is a 404.
async fn serve_asset(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    match PortalAssets::get(path) {
        Some(file) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [
                    (header::CONTENT_TYPE, mime.as_ref().to_string()),
                    (header::CACHE_CONTROL, cache_control(path).to_string()),
                ],
                file.data.into_owned(),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            render::not_found(uri.path()),
        )
            .into_response(),
    }
}

/// Cache-control header value based on file type.
fn cache_control(path: &str) -> &'static str {
    if path == "service-worker.js" || path == "manifest.json" {
        "no-cache"
    } else {
        "public, max-age=3600"
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use placement_core::api::{CompanyListResponse, LoginResponse};
    use placement_core::{ApiError, Credentials, Phase, PlacementApi};

    /// Accepts every login; the company list never answers
    struct StalledListApi;

    #[async_trait]
    impl PlacementApi for StalledListApi {
        async fn check_student_login(
            &self,
            credentials: &Credentials,
        ) -> Result<LoginResponse, ApiError> {
            Ok(LoginResponse::success("T", "Asha", &credentials.roll_number))
        }

        async fn get_all_company_list(&self, _token: &str) -> Result<CompanyListResponse, ApiError> {
            std::future::pending().await
        }
    }

    async fn logged_in_session(state: &AppState, session_id: &str) -> Arc<StudentController> {
        let controller = state.new_controller();
        controller.submit("ee19b001", "pw").await.unwrap();
        state
            .insert_session(session_id.to_string(), Arc::clone(&controller))
            .await;
        controller
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_are_logged_out() {
        let state = AppState::new(PortalConfig::default(), Arc::new(StalledListApi));
        let idle = logged_in_session(&state, "idle").await;

        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        let active = logged_in_session(&state, "active").await;
        tokio::time::advance(Duration::from_secs(15 * 60)).await;

        assert_eq!(state.sweep_idle_sessions(SESSION_IDLE_TIMEOUT).await, 1);
        assert!(state.controller(Some("idle")).await.is_none());
        assert!(state.controller(Some("active")).await.is_some());

        let evicted = idle.snapshot();
        assert_eq!(evicted.phase, Phase::LoggedOut);
        assert!(evicted.session.is_none());
        assert!(!evicted.loading);
        assert_eq!(active.snapshot().phase, Phase::FetchingCompanies);
    }

    #[tokio::test(start_paused = true)]
    async fn seen_sessions_stay_alive() {
        let state = AppState::new(PortalConfig::default(), Arc::new(StalledListApi));
        let controller = logged_in_session(&state, "sid").await;

        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(20 * 60)).await;
            assert!(state.controller(Some("sid")).await.is_some());
        }

        assert_eq!(state.sweep_idle_sessions(SESSION_IDLE_TIMEOUT).await, 0);
        assert!(controller.snapshot().is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_task_evicts_abandoned_sessions() {
        let state = AppState::new(PortalConfig::default(), Arc::new(StalledListApi));
        let controller = logged_in_session(&state, "abandoned").await;
        let sweeper = spawn_session_sweeper(state.clone(), SESSION_IDLE_TIMEOUT);

        tokio::time::sleep(SESSION_IDLE_TIMEOUT + SESSION_SWEEP_INTERVAL * 2).await;

        assert!(state.sessions.read().await.is_empty());
        assert_eq!(controller.snapshot().phase, Phase::LoggedOut);
        sweeper.abort();
    }

    #[test]
    fn worker_and_manifest_are_never_cached() {
        assert_eq!(cache_control("service-worker.js"), "no-cache");
        assert_eq!(cache_control("manifest.json"), "no-cache");
        assert_eq!(cache_control("icons/icon.svg"), "public, max-age=3600");
    }

    #[test]
    fn offline_assets_are_embedded() {
        for path in ["service-worker.js", "manifest.json", "icons/icon.svg", "styles.css"] {
            assert!(PortalAssets::get(path).is_some(), "missing {}", path);
        }
    }
}
