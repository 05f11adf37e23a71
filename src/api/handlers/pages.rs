use crate::AppState;
use crate::api::views;
use axum::{extract::State, response::Html};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(views::index_page(&state.operations, &[]))
}

pub async fn about() -> Html<String> {
    Html(views::about_page())
}
