/// Account endpoints
///
/// # Endpoints
///
/// - `GET  /register` - Registration form
/// - `POST /register` - Create an account, then go to the login page
/// - `GET  /login`    - Login form
/// - `POST /login`    - Check credentials and attach the user to the session
/// - `GET  /logout`   - Drop the session identity
///
/// Failures (`DuplicateUsername`, `InvalidCredentials`, blank fields) come
/// back as a flash message and a redirect to the form they came from.

use axum::{
    extract::State,
    response::{Html, Redirect},
    Form,
};
use taskpad_shared::auth::credentials;
use tera::Context;
use tracing::info;

use crate::{app::AppState, error::WebResult, forms::CredentialsForm, session::Session};

/// `GET /register`
pub async fn register_form(
    State(state): State<AppState>,
    session: Session,
) -> WebResult<Html<String>> {
    state.views.render("register.html", &session, Context::new()).await
}

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> WebResult<Redirect> {
    let input = form.into_input("/register")?;

    credentials::register(&state.db, &input.username, &input.password).await?;

    session.flash("Registration successful. Please log in.").await;
    Ok(Redirect::to("/login"))
}

/// `GET /login`
pub async fn login_form(
    State(state): State<AppState>,
    session: Session,
) -> WebResult<Html<String>> {
    state.views.render("login.html", &session, Context::new()).await
}

/// `POST /login`
///
/// A wrong password leaves the session's identity untouched.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> WebResult<Redirect> {
    let input = form.trimmed();

    let user = credentials::authenticate(&state.db, &input.username, &input.password).await?;

    session.login(user.id).await;
    info!(user_id = user.id, "User logged in");

    session.flash("Logged in successfully.").await;
    Ok(Redirect::to("/"))
}

/// `GET /logout`
///
/// Safe to call without being logged in.
pub async fn logout(session: Session) -> Redirect {
    if let Some(user_id) = session.user_id().await {
        info!(user_id, "User logged out");
    }
    session.logout().await;

    session.flash("You have been logged out.").await;
    Redirect::to("/login")
}
