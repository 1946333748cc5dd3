/// Static pages

use axum::{extract::State, response::Html};
use tera::Context;

use crate::{app::AppState, error::WebResult, session::Session};

/// `GET /about`
pub async fn about(State(state): State<AppState>, session: Session) -> WebResult<Html<String>> {
    state.views.render("about.html", &session, Context::new()).await
}
