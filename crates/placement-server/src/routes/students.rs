//! Student login, dashboard and session state

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get},
    Form, Json, Router,
};
use uuid::Uuid;

use placement_core::{
    ControllerState, LoginForm, SessionError, StudentController, ValidationErrors,
};

use crate::auth::{clear_session_cookie, session_cookie, BrowserSession};
use crate::error::AppError;
use crate::render;
use crate::AppState;

pub(super) fn api_router() -> Router<AppState> {
    Router::new()
        .route("/state", get(session_state))
        .route("/alert", delete(dismiss_alert))
}

/// Dashboard for a live session, login form otherwise
pub(super) async fn students_page(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
) -> Html<String> {
    let snapshot = state
        .controller(session_id.as_deref())
        .await
        .map(|controller| controller.snapshot());

    match snapshot {
        Some(snapshot) if snapshot.is_authenticated() => render::dashboard(&snapshot),
        Some(snapshot) => render::login_page(
            &LoginForm::default(),
            &ValidationErrors::default(),
            snapshot.alert.as_deref(),
        ),
        None => render::login_page(&LoginForm::default(), &ValidationErrors::default(), None),
    }
}

pub(super) async fn login(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
    Form(form): Form<LoginForm>,
) -> Response {
    if let Err(errors) = form.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            render::login_page(&form, &errors, None),
        )
            .into_response();
    }

    // A new login always replaces whatever this browser had before
    if let Some(previous) = session_id {
        state.end_session(&previous).await;
    }

    let controller = state.new_controller();
    match controller
        .submit(&form.roll_number, &form.student_password)
        .await
    {
        Ok(session) => {
            let session_id = Uuid::new_v4().to_string();
            state.insert_session(session_id.clone(), controller).await;
            tracing::info!(roll_number = %session.roll_number, "Browser session started");

            (
                [(header::SET_COOKIE, session_cookie(&session_id))],
                Redirect::to("/students"),
            )
                .into_response()
        }
        Err(err) => {
            let (status, errors) = match &err {
                SessionError::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, errors.clone()),
                SessionError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, ValidationErrors::default())
                }
                SessionError::Transport(_) => (StatusCode::BAD_GATEWAY, ValidationErrors::default()),
                _ => (StatusCode::CONFLICT, ValidationErrors::default()),
            };
            let alert = err.to_string();
            (status, render::login_page(&form, &errors, Some(&alert))).into_response()
        }
    }
}

pub(super) async fn logout(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
) -> impl IntoResponse {
    if let Some(session_id) = session_id {
        if state.end_session(&session_id).await {
            tracing::debug!("Browser session ended");
        }
    }

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/"),
    )
}

async fn live_controller(
    state: &AppState,
    session_id: Option<&str>,
) -> Result<Arc<StudentController>, AppError> {
    state
        .controller(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(SessionError::NotAuthenticated.to_string()))
}

async fn session_state(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
) -> Result<Json<ControllerState>, AppError> {
    let controller = live_controller(&state, session_id.as_deref()).await?;
    Ok(Json(controller.snapshot()))
}

async fn dismiss_alert(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
) -> Result<StatusCode, AppError> {
    let controller = live_controller(&state, session_id.as_deref()).await?;
    controller.dismiss_alert();
    Ok(StatusCode::NO_CONTENT)
}
