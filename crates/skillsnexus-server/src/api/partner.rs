//! Partner console: course editing, support webhook, video studio and the
//! referral-code tab. Everything except login requires a partner session.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use skillsnexus_shared::catalog::{CoursePatch, LessonPatch, ModulePatch};
use skillsnexus_shared::course::{Course, Lesson, Module};
use skillsnexus_shared::partner::authorize_partner;
use skillsnexus_shared::pricing::ReferralCode;
use skillsnexus_shared::types::{CourseId, LessonId, ModuleId};

use crate::adapters::video::VideoOutcome;
use crate::error::ServerError;
use crate::quota::{ClientKey, Generation};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
}

#[derive(Serialize)]
pub struct PartnerSession {
    email: Option<String>,
}

#[derive(Deserialize, Serialize)]
pub struct WebhookConfig {
    url: Option<String>,
}

#[derive(Deserialize)]
pub struct VideoRequest {
    prompt: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<PartnerSession>, ServerError> {
    let email = authorize_partner(&req.email, &state.config.partner_domains)?;
    *state.partner.write().await = Some(email.clone());
    info!(partner = %email, "Partner signed in");
    Ok(Json(PartnerSession { email: Some(email) }))
}

pub async fn logout(State(state): State<AppState>) -> Json<PartnerSession> {
    if let Some(email) = state.partner.write().await.take() {
        info!(partner = %email, "Partner signed out");
    }
    Json(PartnerSession { email: None })
}

pub async fn session(State(state): State<AppState>) -> Json<PartnerSession> {
    Json(PartnerSession {
        email: state.partner.read().await.clone(),
    })
}

pub async fn create_course(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Arc<Course>>), ServerError> {
    let partner = state.require_partner().await?;
    let course = state.catalog.write().await.create_course();
    info!(course = %course.id, partner = %partner, "Course created");
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update_course(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
    Json(patch): Json<CoursePatch>,
) -> Result<Json<Arc<Course>>, ServerError> {
    state.require_partner().await?;
    let course = state.catalog.write().await.update_course(&course_id, patch)?;
    Ok(Json(course))
}

/// Without a body, appends a blank module. With one, imports the prepared
/// module as-is; a clashing id is a conflict.
pub async fn add_module(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
    body: Option<Json<Module>>,
) -> Result<(StatusCode, Json<Arc<Course>>), ServerError> {
    state.require_partner().await?;
    let mut catalog = state.catalog.write().await;
    let course = match body {
        Some(Json(module)) => catalog.push_module(&course_id, module)?,
        None => catalog.add_module(&course_id)?,
    };
    info!(course = %course_id, modules = course.modules.len(), "Module added");
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update_module(
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(CourseId, ModuleId)>,
    Json(patch): Json<ModulePatch>,
) -> Result<Json<Arc<Course>>, ServerError> {
    state.require_partner().await?;
    let course = state
        .catalog
        .write()
        .await
        .update_module(&course_id, &module_id, patch)?;
    Ok(Json(course))
}

pub async fn add_lesson(
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(CourseId, ModuleId)>,
    body: Option<Json<Lesson>>,
) -> Result<(StatusCode, Json<Arc<Course>>), ServerError> {
    state.require_partner().await?;
    let mut catalog = state.catalog.write().await;
    let course = match body {
        Some(Json(lesson)) => catalog.push_lesson(&course_id, &module_id, lesson)?,
        None => catalog.add_lesson(&course_id, &module_id)?,
    };
    info!(course = %course_id, module = %module_id, "Lesson added");
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update_lesson(
    State(state): State<AppState>,
    Path((course_id, module_id, lesson_id)): Path<(CourseId, ModuleId, LessonId)>,
    Json(patch): Json<LessonPatch>,
) -> Result<Json<Arc<Course>>, ServerError> {
    state.require_partner().await?;
    let course = state
        .catalog
        .write()
        .await
        .update_lesson(&course_id, &module_id, &lesson_id, patch)?;
    Ok(Json(course))
}

pub async fn webhook(State(state): State<AppState>) -> Result<Json<WebhookConfig>, ServerError> {
    state.require_partner().await?;
    Ok(Json(WebhookConfig {
        url: state.webhook.url().await,
    }))
}

pub async fn set_webhook(
    State(state): State<AppState>,
    Json(req): Json<WebhookConfig>,
) -> Result<Json<WebhookConfig>, ServerError> {
    state.require_partner().await?;
    let url = state.webhook.set_url(req.url.as_deref().unwrap_or("")).await;
    info!(enabled = url.is_some(), "Support webhook updated");
    Ok(Json(WebhookConfig { url }))
}

/// Run the video studio. Failures come back inside the outcome, not as
/// HTTP errors.
pub async fn generate_video(
    State(state): State<AppState>,
    client: ClientKey,
    Json(req): Json<VideoRequest>,
) -> Result<Json<VideoOutcome>, ServerError> {
    state.require_partner().await?;
    if req.prompt.trim().is_empty() {
        return Err(ServerError::BadRequest("Prompt is empty".into()));
    }
    state.quota.acquire(&client, Generation::Video).await?;
    Ok(Json(state.adapters.video.generate(&req.prompt).await))
}

pub async fn referrals(State(state): State<AppState>) -> Result<Json<Vec<ReferralCode>>, ServerError> {
    state.require_partner().await?;
    Ok(Json(state.referrals.list().await))
}
