/// Error handling for the web server
///
/// Handlers return `WebResult<T>`. Domain errors never reach the browser as
/// an error status: they become a flash message plus a redirect to a safe
/// page. Only `Internal` produces a 500, and its details stay in the log.
///
/// The flash text rides on the response as a [`Flash`] extension; the session
/// middleware moves it into the visitor's session.
///
/// # Example
///
/// ```
/// use taskpad_web::error::{WebError, WebResult};
/// use axum::response::Redirect;
///
/// async fn handler(found: bool) -> WebResult<Redirect> {
///     if !found {
///         return Err(WebError::NotFound);
///     }
///     Ok(Redirect::to("/"))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::fmt;
use taskpad_shared::auth::{credentials::CredentialError, password::PasswordError};

/// Result type alias for handlers
pub type WebResult<T> = Result<T, WebError>;

/// Flash message attached to a response for the session layer to store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash(pub String);

/// Unified web error type
#[derive(Debug)]
pub enum WebError {
    /// Unknown username or wrong password
    InvalidCredentials,

    /// Registration with a taken username
    DuplicateUsername,

    /// No task with this id belongs to the caller
    NotFound,

    /// A required field was empty or too long
    ValidationFailure {
        message: String,
        redirect_to: String,
    },

    /// Anything the visitor cannot fix (database, templates, hashing)
    Internal(String),
}

impl WebError {
    /// Builds a validation failure that sends the visitor back to `redirect_to`
    pub fn validation(message: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        WebError::ValidationFailure {
            message: message.into(),
            redirect_to: redirect_to.into(),
        }
    }

    /// Flash text and redirect target for errors the visitor can act on
    fn flash_and_target(&self) -> Option<(String, String)> {
        match self {
            WebError::InvalidCredentials => Some((
                "Invalid username or password.".to_string(),
                "/login".to_string(),
            )),
            WebError::DuplicateUsername => Some((
                "Username already exists.".to_string(),
                "/register".to_string(),
            )),
            WebError::NotFound => Some(("Todo not found.".to_string(), "/".to_string())),
            WebError::ValidationFailure {
                message,
                redirect_to,
            } => Some((message.clone(), redirect_to.clone())),
            WebError::Internal(_) => None,
        }
    }
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::InvalidCredentials => write!(f, "Invalid credentials"),
            WebError::DuplicateUsername => write!(f, "Duplicate username"),
            WebError::NotFound => write!(f, "Not found"),
            WebError::ValidationFailure { message, .. } => {
                write!(f, "Validation failed: {}", message)
            }
            WebError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for WebError {}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self.flash_and_target() {
            Some((message, target)) => {
                tracing::debug!(error = %self, redirect_to = %target, "Redirecting with flash");
                let mut response = Redirect::to(&target).into_response();
                response.extensions_mut().insert(Flash(message));
                response
            }
            None => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<!doctype html><title>Error</title><h1>Something went wrong</h1>"),
                )
                    .into_response()
            }
        }
    }
}

impl From<sqlx::Error> for WebError {
    fn from(err: sqlx::Error) -> Self {
        WebError::Internal(format!("Database error: {}", err))
    }
}

impl From<PasswordError> for WebError {
    fn from(err: PasswordError) -> Self {
        WebError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<CredentialError> for WebError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::DuplicateUsername => WebError::DuplicateUsername,
            CredentialError::InvalidCredentials => WebError::InvalidCredentials,
            CredentialError::Password(e) => e.into(),
            CredentialError::Database(e) => e.into(),
        }
    }
}

impl From<tera::Error> for WebError {
    fn from(err: tera::Error) -> Self {
        WebError::Internal(format!("Template error: {:?}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_error_display() {
        assert_eq!(WebError::NotFound.to_string(), "Not found");
        assert_eq!(
            WebError::validation("Title is required.", "/").to_string(),
            "Validation failed: Title is required."
        );
    }

    #[test]
    fn test_not_found_redirects_home_with_flash() {
        let response = WebError::NotFound.into_response();

        assert!(response.status().is_redirection());
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
        assert_eq!(
            response.extensions().get::<Flash>(),
            Some(&Flash("Todo not found.".to_string()))
        );
    }

    #[test]
    fn test_credential_errors_map_to_their_pages() {
        let response = WebError::from(CredentialError::InvalidCredentials).into_response();
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");

        let response = WebError::from(CredentialError::DuplicateUsername).into_response();
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/register");
    }

    #[test]
    fn test_validation_failure_uses_given_target() {
        let response = WebError::validation("Title is required.", "/update/7").into_response();
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/update/7");
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response = WebError::Internal("disk on fire".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<Flash>().is_none());
    }
}
