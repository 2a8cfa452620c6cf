//! HTTP routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

mod pages;
mod students;

/// Browser-facing pages
pub fn pages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::landing))
        .route("/admin", get(pages::admin))
        .route("/recruiters", get(pages::recruiters))
        .route("/students", get(students::students_page))
        .route("/students/login", post(students::login))
        .route("/students/logout", post(students::logout))
}

/// JSON endpoints, mounted under `/api`
pub fn api_router() -> Router<AppState> {
    Router::new().nest("/students", students::api_router())
}
