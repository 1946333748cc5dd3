//! Common test utilities for integration tests
//!
//! - `TestContext`: fresh in-memory database, migrations applied, router built
//! - `Browser`: sends requests through the router and keeps the session cookie
//!   between them, like a real browser would

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use taskpad_shared::{
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    models::{task::Task, user::User},
};
use taskpad_web::{
    app::{build_router, AppState},
    config::Config,
};
use tower::Service as _;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context with a private database
    pub async fn new() -> anyhow::Result<Self> {
        let db = create_pool(DatabaseConfig::in_memory()).await?;
        run_migrations(&db).await?;

        let config = Config::from_lookup(|key| match key {
            "SESSION_SECRET" => Some(TEST_SECRET.to_string()),
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            _ => None,
        })?;

        let state = AppState::new(db.clone(), config.clone())?;
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    /// A browser with no cookies yet
    pub fn browser(&self) -> Browser<'_> {
        Browser {
            ctx: self,
            cookie: None,
        }
    }

    /// Looks up a user's id by name
    pub async fn user_id(&self, username: &str) -> i64 {
        User::find_by_username(&self.db, username)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("user {} should exist", username))
            .id
    }

    /// Number of stored session rows
    pub async fn session_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM session")
            .fetch_one(&self.db)
            .await
            .unwrap()
    }

    /// Moves every session's creation time `days` into the past
    pub async fn age_sessions(&self, days: i64) {
        sqlx::query("UPDATE session SET created_at = ?")
            .bind(Utc::now() - Duration::days(days))
            .execute(&self.db)
            .await
            .unwrap();
    }

    /// All tasks of a user, straight from the database
    pub async fn tasks_of(&self, username: &str) -> Vec<Task> {
        let user_id = self.user_id(username).await;
        Task::list_by_owner(&self.db, user_id).await.unwrap()
    }
}

/// What a test needs from a response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Asserts a redirect to `path`
    pub fn assert_redirect(&self, path: &str) {
        assert!(
            self.status.is_redirection(),
            "expected redirect to {}, got {}: {}",
            path,
            self.status,
            self.body
        );
        assert_eq!(self.location.as_deref(), Some(path));
    }

    /// Number of task rows on a rendered list page
    pub fn task_rows(&self) -> usize {
        self.body.matches("class=\"title\"").count()
    }
}

/// Cookie-keeping client for the router
pub struct Browser<'a> {
    ctx: &'a TestContext,
    pub cookie: Option<String>,
}

impl Browser<'_> {
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self
            .request("GET", path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Registers and logs in, asserting both succeed
    pub async fn sign_up_and_log_in(&mut self, username: &str, password: &str) {
        self.post_form("/register", &[("username", username), ("password", password)])
            .await
            .assert_redirect("/login");
        self.post_form("/login", &[("username", username), ("password", password)])
            .await
            .assert_redirect("/");
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie.as_str());
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.ctx.app.clone().call(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = if pair.ends_with('=') {
                None
            } else {
                Some(pair.to_string())
            };
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }
}

fn form_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            b' ' => "+".to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}
