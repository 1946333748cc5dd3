/// Session middleware and per-request identity
///
/// `session_layer` wraps every route. Before the handler runs it reads the
/// signed session cookie, loads the server-side row, and inserts a [`Session`]
/// handle into the request. After the handler returns it stores any [`Flash`]
/// attached to the response, writes changed state back to the `session`
/// table, and issues a new cookie when a new token was minted.
///
/// `require_session` guards task routes. It redirects anonymous visitors to
/// `/login` and otherwise inserts a [`CurrentUser`], the explicit identity that
/// handlers pass into store calls.
///
/// A row is only created once there is something to remember (a login or a
/// flash), so anonymous page views never touch the database. An anonymous row
/// is dropped again once its flashes have been shown.
///
/// Sessions expire a fixed time after creation (`SESSION_TTL_SECONDS`). The
/// cookie carries the same `Max-Age`, expired rows are ignored on load, and
/// every newly issued session prunes the expired ones.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use cookie::{Cookie, SameSite};
use taskpad_shared::{
    auth::session_token::{generate_token, hash_token, sign_token, verify_signed_token},
    models::session::SessionRecord,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    app::AppState,
    error::{Flash, WebError, WebResult},
};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "taskpad_session";

#[derive(Debug, Default)]
struct SessionState {
    /// Token of an existing server row, if the request carried a valid one
    token: Option<String>,
    user_id: Option<i64>,
    flashes: Vec<String>,
    dirty: bool,
    /// Replace the token on save (login)
    rotate: bool,
}

/// Handle to the current visitor's session
///
/// Cloning shares the same state. Changes are persisted by `session_layer`
/// once the handler has produced its response.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    fn from_state(state: SessionState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Authenticated user id, if any
    pub async fn user_id(&self) -> Option<i64> {
        self.inner.lock().await.user_id
    }

    /// Marks the session as belonging to `user_id`
    ///
    /// Calling this again overwrites the identity. The session token is
    /// replaced on save.
    pub async fn login(&self, user_id: i64) {
        let mut state = self.inner.lock().await;
        state.user_id = Some(user_id);
        state.rotate = true;
        state.dirty = true;
    }

    /// Clears the identity; a no-op for anonymous sessions
    pub async fn logout(&self) {
        let mut state = self.inner.lock().await;
        if state.user_id.take().is_some() {
            state.dirty = true;
        }
    }

    /// Queues a message for the next rendered page
    pub async fn flash(&self, message: impl Into<String>) {
        let mut state = self.inner.lock().await;
        state.flashes.push(message.into());
        state.dirty = true;
    }

    /// Drains pending flash messages
    pub async fn take_flashes(&self) -> Vec<String> {
        let mut state = self.inner.lock().await;
        if state.flashes.is_empty() {
            return Vec::new();
        }
        state.dirty = true;
        std::mem::take(&mut state.flashes)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| WebError::Internal("session layer is not installed".to_string()))
    }
}

/// Identity of the logged-in caller, inserted by `require_session`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or_else(|| Redirect::to("/login"))
    }
}

/// Loads the session, runs the handler, then persists the session
pub async fn session_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> WebResult<Response> {
    let session = load_session(&state, req.headers()).await?;
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    if let Some(Flash(message)) = response.extensions_mut().remove::<Flash>() {
        session.flash(message).await;
    }

    if let Some(cookie) = persist_session(&state, &session).await? {
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| WebError::Internal(format!("Invalid session cookie header: {}", e)))?;
        response.headers_mut().append(SET_COOKIE, value);
    }

    Ok(response)
}

/// Redirects to `/login` unless the session carries an identity
pub async fn require_session(session: Session, mut req: Request, next: Next) -> Response {
    match session.user_id().await {
        Some(user_id) => {
            req.extensions_mut().insert(CurrentUser { user_id });
            next.run(req).await
        }
        None => {
            debug!(path = %req.uri().path(), "Anonymous request to protected route");
            Redirect::to("/login").into_response()
        }
    }
}

/// Extracts the token from a validly signed session cookie
fn signed_token_from_headers(headers: &HeaderMap, secret: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .and_then(|cookie| verify_signed_token(cookie.value(), secret))
}

async fn load_session(state: &AppState, headers: &HeaderMap) -> WebResult<Session> {
    let Some(token) = signed_token_from_headers(headers, state.session_secret()) else {
        return Ok(Session::default());
    };

    let id = hash_token(&token);
    let Some(record) = SessionRecord::find(&state.db, &id).await? else {
        debug!("Session cookie refers to an unknown session");
        return Ok(Session::default());
    };

    if record.is_expired(Utc::now() - state.config.session.ttl()) {
        debug!(user_id = ?record.user_id, "Session expired");
        SessionRecord::delete(&state.db, &id).await?;
        return Ok(Session::default());
    }

    Ok(Session::from_state(SessionState {
        token: Some(token),
        user_id: record.user_id,
        flashes: record.flashes.0,
        dirty: false,
        rotate: false,
    }))
}

/// Writes changed session state; returns a `Set-Cookie` value when the
/// browser's cookie must change
async fn persist_session(state: &AppState, session: &Session) -> WebResult<Option<String>> {
    let mut guard = session.inner.lock().await;
    if !guard.dirty {
        return Ok(None);
    }

    if guard.rotate {
        if let Some(old) = guard.token.take() {
            SessionRecord::delete(&state.db, &hash_token(&old)).await?;
        }
    }

    if let Some(token) = guard.token.as_deref() {
        if guard.user_id.is_none() && guard.flashes.is_empty() {
            SessionRecord::delete(&state.db, &hash_token(token)).await?;
            guard.token = None;
            guard.dirty = false;
            return Ok(Some(removal_cookie(state.config.server.production)));
        }

        let saved =
            SessionRecord::save(&state.db, &hash_token(token), guard.user_id, &guard.flashes)
                .await?;
        if saved {
            guard.dirty = false;
            return Ok(None);
        }
        // Row vanished underneath us; fall through and mint a new one
    }

    if guard.user_id.is_none() && guard.flashes.is_empty() {
        guard.dirty = false;
        return Ok(None);
    }

    let cutoff = Utc::now() - state.config.session.ttl();
    let pruned = SessionRecord::delete_expired(&state.db, cutoff).await?;
    if pruned > 0 {
        debug!(pruned, "Pruned expired sessions");
    }

    let token = generate_token();
    SessionRecord::create(&state.db, &hash_token(&token), guard.user_id, &guard.flashes).await?;
    debug!(user_id = ?guard.user_id, "Issued new session");

    guard.token = Some(token.clone());
    guard.dirty = false;
    guard.rotate = false;

    Ok(Some(session_cookie(
        sign_token(&token, state.session_secret()),
        state.config.session.ttl_seconds,
        state.config.server.production,
    )))
}

fn session_cookie(value: String, ttl_seconds: i64, secure: bool) -> String {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::seconds(ttl_seconds))
        .build()
        .to_string()
}

/// Tells the browser to drop the session cookie
fn removal_cookie(secure: bool) -> String {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .removal()
        .build()
        .to_string()
}
