use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use skillsnexus_shared::course::Course;
use skillsnexus_shared::persona::{partition, DashboardView, Persona};
use skillsnexus_shared::types::CourseId;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPersonaRequest {
    /// `None` goes back to the persona picker.
    persona_id: Option<String>,
}

pub async fn list_courses(State(state): State<AppState>) -> Json<Vec<Arc<Course>>> {
    Json(state.catalog.read().await.list())
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Arc<Course>>, ServerError> {
    Ok(Json(state.catalog.read().await.get(&course_id)?))
}

pub async fn list_personas(State(state): State<AppState>) -> Json<Vec<Persona>> {
    Json(state.personas.as_ref().clone())
}

pub async fn select_persona(
    State(state): State<AppState>,
    Json(req): Json<SelectPersonaRequest>,
) -> Result<Json<DashboardView>, ServerError> {
    state.require_session().await?;

    if let Some(id) = &req.persona_id {
        if state.persona(id).is_none() {
            return Err(ServerError::NotFound(format!("persona {id}")));
        }
    }
    debug!(persona = ?req.persona_id, "Persona selected");
    *state.selected_persona.write().await = req.persona_id;

    Ok(Json(dashboard_view(&state).await))
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardView>, ServerError> {
    state.require_session().await?;
    Ok(Json(dashboard_view(&state).await))
}

async fn dashboard_view(state: &AppState) -> DashboardView {
    let selected = state.selected_persona.read().await.clone();
    let persona = selected.as_deref().and_then(|id| state.persona(id));
    let courses = state.catalog.read().await.list();
    partition(&courses, persona)
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_courses_are_public() {
        let router = build_router(test_state());
        let (status, body) = call(&router, "GET", "/courses", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);

        let (status, body) = call(&router, "GET", "/courses/c1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "c1");

        let (status, _) = call(&router, "GET", "/courses/zzz", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dashboard_requires_session() {
        let router = build_router(test_state());
        let (status, body) = call(&router, "GET", "/dashboard", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_persona_partitions_dashboard() {
        let router = build_router(test_state());
        sign_in(&router).await;

        let (_, body) = call(&router, "GET", "/dashboard", None).await;
        assert!(body["core"].as_array().unwrap().is_empty());
        assert!(body["electives"].as_array().unwrap().is_empty());

        let (status, body) = call(
            &router,
            "PUT",
            "/persona",
            Some(json!({ "personaId": "tech_visionary" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let core = body["core"].as_array().unwrap().len();
        let electives = body["electives"].as_array().unwrap().len();
        assert_eq!(core + electives, 5);
        for card in body["core"].as_array().unwrap() {
            assert_eq!(card["course"]["partnerName"], "JM Dev.co.za");
        }
        for card in body["electives"].as_array().unwrap() {
            assert_eq!(card["isLocked"], false);
        }
    }

    #[tokio::test]
    async fn test_unknown_persona() {
        let router = build_router(test_state());
        sign_in(&router).await;
        let (status, _) = call(&router, "PUT", "/persona", Some(json!({ "personaId": "astronaut" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
