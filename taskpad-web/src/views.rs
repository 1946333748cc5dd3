/// Page rendering
///
/// Templates are compiled into the binary with `include_str!` and loaded into
/// a single Tera instance at startup. Every page extends `base.html`, which
/// shows the navigation bar and drains pending flash messages.

use axum::response::Html;
use serde::Serialize;
use taskpad_shared::models::task::Task;
use tera::{Context, Tera};

use crate::{error::WebResult, session::Session};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("about.html", include_str!("../templates/about.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("update.html", include_str!("../templates/update.html")),
    ("delete.html", include_str!("../templates/delete.html")),
];

/// Task as shown in a template
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created: String,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            created: task.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Compiled templates
pub struct Views {
    tera: Tera,
}

impl Views {
    /// Parses all embedded templates
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    /// Renders `template` with the shared page context plus `context`
    ///
    /// Drains the session's flash messages, so call this once per response.
    pub async fn render(
        &self,
        template: &str,
        session: &Session,
        mut context: Context,
    ) -> WebResult<Html<String>> {
        context.insert("flashes", &session.take_flashes().await);
        context.insert("logged_in", &session.user_id().await.is_some());

        Ok(Html(self.tera.render(template, &context)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_all_templates_parse() {
        let views = Views::new().expect("templates should compile");
        for (name, _) in TEMPLATES {
            assert!(views.tera.get_template_names().any(|n| n == *name));
        }
    }

    #[tokio::test]
    async fn test_render_escapes_and_drains_flashes() {
        let views = Views::new().unwrap();
        let session = Session::default();
        session.flash("Logged in successfully.").await;

        let task = Task {
            id: 7,
            title: "<script>alert(1)</script>".to_string(),
            description: "2%".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            owner_id: 1,
        };
        let mut context = Context::new();
        context.insert("tasks", &vec![TaskView::from(&task)]);

        let Html(body) = views.render("index.html", &session, context).await.unwrap();

        assert!(body.contains("Logged in successfully."));
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>alert(1)</script>"));
        assert!(body.contains("2025-01-02 03:04"));
        assert!(session.take_flashes().await.is_empty());
    }
}
