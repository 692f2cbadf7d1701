//! Course viewer endpoints.
//!
//! Each open viewer owns a [`CourseNavigator`] over the course snapshot taken
//! when it was opened; later catalog edits do not reach it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use skillsnexus_shared::course::Lesson;
use skillsnexus_shared::navigation::{CourseNavigator, FlatLesson, Playback};
use skillsnexus_shared::types::{CourseId, LessonId, ModuleId};

use crate::error::ServerError;
use crate::quota::{ClientKey, Generation};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    viewer_id: Uuid,
    course_id: CourseId,
    course_title: String,
    lessons: Vec<FlatLesson>,
    current_index: Option<usize>,
    current_lesson: Lesson,
    expanded_module: Option<ModuleId>,
    autoplay: bool,
    can_go_next: bool,
    can_go_previous: bool,
    playback: Playback,
}

impl ViewerState {
    fn new(viewer_id: Uuid, nav: &CourseNavigator) -> Self {
        Self {
            viewer_id,
            course_id: nav.course().id.clone(),
            course_title: nav.course().title.clone(),
            lessons: nav.flattened().to_vec(),
            current_index: nav.current_index(),
            current_lesson: nav.current_lesson().clone(),
            expanded_module: nav.expanded_module().cloned(),
            autoplay: nav.autoplay(),
            can_go_next: nav.can_go_next(),
            can_go_previous: nav.can_go_previous(),
            playback: nav.playback(),
        }
    }
}

/// Result of a navigation request. Locked or unknown targets are not an
/// error; `moved` is simply `false`.
#[derive(Serialize)]
pub struct NavigationResponse {
    moved: bool,
    viewer: ViewerState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    lesson_id: LessonId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandRequest {
    module_id: ModuleId,
}

#[derive(Deserialize, Default)]
pub struct AutoplayRequest {
    /// Omitted means toggle.
    #[serde(default)]
    enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct AskRequest {
    query: String,
}

#[derive(Serialize)]
pub struct AskResponse {
    answer: String,
    context: String,
}

pub async fn open(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<(StatusCode, Json<ViewerState>), ServerError> {
    state.require_session().await?;

    let course = state.catalog.read().await.get(&course_id)?;
    let nav = CourseNavigator::new(course);
    let viewer_id = Uuid::new_v4();
    let view = ViewerState::new(viewer_id, &nav);
    state.viewers.write().await.insert(viewer_id, nav);

    info!(viewer = %viewer_id, course = %course_id, "Course viewer opened");
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(viewer_id): Path<Uuid>,
) -> Result<Json<ViewerState>, ServerError> {
    state.require_session().await?;
    let viewers = state.viewers.read().await;
    let nav = viewers
        .get(&viewer_id)
        .ok_or_else(|| viewer_not_found(viewer_id))?;
    Ok(Json(ViewerState::new(viewer_id, nav)))
}

pub async fn close(
    State(state): State<AppState>,
    Path(viewer_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.require_session().await?;
    match state.viewers.write().await.remove(&viewer_id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(viewer_not_found(viewer_id)),
    }
}

pub async fn select(
    State(state): State<AppState>,
    Path(viewer_id): Path<Uuid>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<NavigationResponse>, ServerError> {
    navigate(&state, viewer_id, |nav| nav.select(&req.lesson_id)).await
}

pub async fn next(
    State(state): State<AppState>,
    Path(viewer_id): Path<Uuid>,
) -> Result<Json<NavigationResponse>, ServerError> {
    navigate(&state, viewer_id, CourseNavigator::next).await
}

pub async fn previous(
    State(state): State<AppState>,
    Path(viewer_id): Path<Uuid>,
) -> Result<Json<NavigationResponse>, ServerError> {
    navigate(&state, viewer_id, CourseNavigator::previous).await
}

pub async fn media_ended(
    State(state): State<AppState>,
    Path(viewer_id): Path<Uuid>,
) -> Result<Json<NavigationResponse>, ServerError> {
    navigate(&state, viewer_id, CourseNavigator::media_ended).await
}

pub async fn expand(
    State(state): State<AppState>,
    Path(viewer_id): Path<Uuid>,
    Json(req): Json<ExpandRequest>,
) -> Result<Json<NavigationResponse>, ServerError> {
    navigate(&state, viewer_id, |nav| nav.expand_module(&req.module_id)).await
}

pub async fn autoplay(
    State(state): State<AppState>,
    Path(viewer_id): Path<Uuid>,
    body: Option<Json<AutoplayRequest>>,
) -> Result<Json<ViewerState>, ServerError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    navigate(&state, viewer_id, |nav| {
        match req.enabled {
            Some(enabled) => nav.set_autoplay(enabled),
            None => {
                nav.toggle_autoplay();
            }
        }
        true
    })
    .await
    .map(|Json(resp)| Json(resp.viewer))
}

/// Ask the AI tutor about the lesson on screen.
pub async fn ask(
    State(state): State<AppState>,
    client: ClientKey,
    Path(viewer_id): Path<Uuid>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ServerError> {
    state.require_session().await?;
    if req.query.trim().is_empty() {
        return Err(ServerError::BadRequest("Question is empty".into()));
    }

    // Read the context, then release the lock before calling out.
    let context = {
        let viewers = state.viewers.read().await;
        viewers
            .get(&viewer_id)
            .ok_or_else(|| viewer_not_found(viewer_id))?
            .tutor_context()
    };

    state.quota.acquire(&client, Generation::Tutor).await?;
    let answer = state.adapters.tutor.ask(&req.query, &context).await;
    Ok(Json(AskResponse { answer, context }))
}

async fn navigate<F>(
    state: &AppState,
    viewer_id: Uuid,
    op: F,
) -> Result<Json<NavigationResponse>, ServerError>
where
    F: FnOnce(&mut CourseNavigator) -> bool,
{
    state.require_session().await?;
    let mut viewers = state.viewers.write().await;
    let nav = viewers
        .get_mut(&viewer_id)
        .ok_or_else(|| viewer_not_found(viewer_id))?;

    let moved = op(nav);
    debug!(viewer = %viewer_id, moved, current = ?nav.current_index(), "Viewer navigation");

    Ok(Json(NavigationResponse {
        moved,
        viewer: ViewerState::new(viewer_id, nav),
    }))
}

fn viewer_not_found(viewer_id: Uuid) -> ServerError {
    ServerError::NotFound(format!("viewer {viewer_id}"))
}
