/// Form inputs
///
/// Raw forms deserialize leniently (missing fields become empty strings) and
/// are then trimmed into validated input structs. Nothing reaches the store
/// layer without passing through one of the `into_*` conversions here.

use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::error::WebError;

/// Raw task form as posted by the browser
#[derive(Debug, Default, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub desc: String,
}

/// Trimmed, validated task fields
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters."))]
    pub title: String,

    #[validate(length(min = 1, max = 500, message = "Description must be 1-500 characters."))]
    pub description: String,
}

impl TaskForm {
    /// Whether either field is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() || self.desc.trim().is_empty()
    }

    /// Trims and validates; `redirect_to` is where a failure sends the visitor
    pub fn into_input(self, redirect_to: &str) -> Result<TaskInput, WebError> {
        let input = TaskInput {
            title: self.title.trim().to_string(),
            description: self.desc.trim().to_string(),
        };

        input
            .validate()
            .map_err(|e| WebError::validation(first_message(&e), redirect_to))?;

        Ok(input)
    }
}

/// Raw username/password form
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

/// Trimmed, validated credentials
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct CredentialsInput {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters."))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

impl CredentialsForm {
    /// Trims both fields without validating them
    ///
    /// Login uses this: an empty username simply matches no account.
    pub fn trimmed(self) -> CredentialsInput {
        CredentialsInput {
            username: self.username.trim().to_string(),
            password: self.password.trim().to_string(),
        }
    }

    /// Trims and validates for registration
    pub fn into_input(self, redirect_to: &str) -> Result<CredentialsInput, WebError> {
        let input = self.trimmed();

        input
            .validate()
            .map_err(|e| WebError::validation(first_message(&e), redirect_to))?;

        Ok(input)
    }
}

/// Picks one message from a set of field errors, stable across runs
fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Please fill in all fields.".to_string())
}
