/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskpad_web::{app::AppState, config::Config};
/// use taskpad_shared::db::{migrations::run_migrations, pool::create_pool};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// run_migrations(&pool).await?;
///
/// let state = AppState::new(pool, config)?;
/// let app = taskpad_web::app::build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::security::SecurityHeadersLayer,
    routes,
    session::{require_session, session_layer},
    views::Views,
};
use axum::{middleware, routing::get, Router};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Compiled page templates
    pub views: Arc<Views>,
}

impl AppState {
    /// Creates new application state, compiling the embedded templates
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to parse.
    pub fn new(db: SqlitePool, config: Config) -> Result<Self, tera::Error> {
        Ok(Self {
            db,
            config: Arc::new(config),
            views: Arc::new(Views::new()?),
        })
    }

    /// Key used to sign session cookies
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Builds the complete router
///
/// ```text
/// /                 GET list, POST create         (login required)
/// /update/:id       GET edit form, POST apply     (login required)
/// /delete/:id       GET confirm, POST delete      (login required)
/// /about            GET
/// /register         GET form, POST create account
/// /login            GET form, POST authenticate
/// /logout           GET
/// /health           GET JSON
/// ```
///
/// Layers, outermost first: security headers, request tracing, session.
pub fn build_router(state: AppState) -> Router {
    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/update/:id",
            get(routes::tasks::edit_task).post(routes::tasks::update_task),
        )
        .route(
            "/delete/:id",
            get(routes::tasks::confirm_delete).post(routes::tasks::delete_task),
        )
        .route_layer(middleware::from_fn(require_session));

    let public_routes = Router::new()
        .route("/about", get(routes::pages::about))
        .route(
            "/register",
            get(routes::auth::register_form).post(routes::auth::register),
        )
        .route(
            "/login",
            get(routes::auth::login_form).post(routes::auth::login),
        )
        .route("/logout", get(routes::auth::logout))
        .route("/health", get(routes::health::health_check));

    Router::new()
        .merge(task_routes)
        .merge(public_routes)
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(state.config.server.production))
        .with_state(state)
}
