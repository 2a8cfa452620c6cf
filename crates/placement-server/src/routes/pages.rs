//! Static pages: landing menu and the sections that are not built yet

use axum::response::Html;

use crate::render;

pub(super) async fn landing() -> Html<String> {
    render::landing()
}

pub(super) async fn admin() -> Html<String> {
    render::coming_soon("Admin")
}

pub(super) async fn recruiters() -> Html<String> {
    render::coming_soon("Recruiters")
}
