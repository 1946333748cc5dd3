/// Task endpoints
///
/// Every handler here sits behind `require_session` and receives the caller
/// as a [`CurrentUser`]. Store calls always pass that id along, so a task id
/// belonging to someone else behaves exactly like a missing one.
///
/// # Endpoints
///
/// - `GET  /`            - List the caller's todos
/// - `POST /`            - Create a todo, then back to the list
/// - `GET  /update/:id`  - Edit form
/// - `POST /update/:id`  - Apply an edit
/// - `GET  /delete/:id`  - Confirmation page
/// - `POST /delete/:id`  - Delete

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    response::{Html, Redirect},
    Form,
};
use taskpad_shared::models::task::{CreateTask, Task, UpdateTask};
use tera::Context;
use tracing::{debug, info};

use crate::{
    app::AppState,
    error::{WebError, WebResult},
    forms::TaskForm,
    session::{CurrentUser, Session},
    views::TaskView,
};

/// `GET /`
pub async fn list_tasks(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
) -> WebResult<Html<String>> {
    let tasks: Vec<TaskView> = Task::list_by_owner(&state.db, user.user_id)
        .await?
        .iter()
        .map(TaskView::from)
        .collect();

    let mut context = Context::new();
    context.insert("tasks", &tasks);

    state.views.render("index.html", &session, context).await
}

/// `POST /`
///
/// A blank title or description is dropped without creating anything or
/// telling the user. Over-long fields are reported with a flash.
pub async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<TaskForm>,
) -> WebResult<Redirect> {
    if form.is_blank() {
        debug!(owner_id = user.user_id, "Ignoring incomplete task form");
        return Ok(Redirect::to("/"));
    }

    let input = form.into_input("/")?;

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: user.user_id,
            title: input.title,
            description: input.description,
        },
    )
    .await?;
    info!(task_id = task.id, owner_id = user.user_id, "Task created");

    Ok(Redirect::to("/"))
}

/// Task id from the path; anything that is not an integer is "not found"
#[derive(Debug, Clone, Copy)]
pub struct TaskId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for TaskId
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                debug!(path = %parts.uri.path(), error = %rejection, "Unusable task id");
                WebError::NotFound
            })?;
        Ok(TaskId(id))
    }
}

async fn owned_task(state: &AppState, id: i64, user: CurrentUser) -> WebResult<Task> {
    Task::find_by_id_and_owner(&state.db, id, user.user_id)
        .await?
        .ok_or(WebError::NotFound)
}

/// `GET /update/:id`
pub async fn edit_task(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
    TaskId(id): TaskId,
) -> WebResult<Html<String>> {
    let task = owned_task(&state, id, user).await?;

    let mut context = Context::new();
    context.insert("task", &TaskView::from(&task));

    state.views.render("update.html", &session, context).await
}

/// `POST /update/:id`
///
/// Ownership is checked before the form, so a foreign id reports "not found"
/// even when the submitted fields are blank.
pub async fn update_task(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
    TaskId(id): TaskId,
    Form(form): Form<TaskForm>,
) -> WebResult<Redirect> {
    owned_task(&state, id, user).await?;

    let input = form.into_input(&format!("/update/{}", id))?;

    Task::update_for_owner(
        &state.db,
        id,
        user.user_id,
        UpdateTask {
            title: input.title,
            description: input.description,
        },
    )
    .await?
    .ok_or(WebError::NotFound)?;

    info!(task_id = id, owner_id = user.user_id, "Task updated");
    session.flash("Todo updated successfully.").await;
    Ok(Redirect::to("/"))
}

/// `GET /delete/:id`
pub async fn confirm_delete(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
    TaskId(id): TaskId,
) -> WebResult<Html<String>> {
    let task = owned_task(&state, id, user).await?;

    let mut context = Context::new();
    context.insert("task", &TaskView::from(&task));

    state.views.render("delete.html", &session, context).await
}

/// `POST /delete/:id`
pub async fn delete_task(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
    TaskId(id): TaskId,
) -> WebResult<Redirect> {
    if !Task::delete_for_owner(&state.db, id, user.user_id).await? {
        return Err(WebError::NotFound);
    }

    info!(task_id = id, owner_id = user.user_id, "Task deleted");
    session.flash("Todo deleted.").await;
    Ok(Redirect::to("/"))
}
