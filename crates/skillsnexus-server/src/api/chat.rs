use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use skillsnexus_shared::chat::{
    route_support_message, ChatMessage, ChatRole, MessageKind, SupportRoute, TRENDY_GIFS,
};
use skillsnexus_shared::constants::{SUPPORT_AGENT_REPLY, SUPPORT_AI_CONTEXT, SUPPORT_HIGH_VOLUME};

use crate::error::ServerError;
use crate::quota::{ClientKey, Generation};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SupportRequest {
    text: String,
}

#[derive(Deserialize)]
pub struct BreakoutRequest {
    text: String,
    #[serde(rename = "type", default)]
    kind: MessageKind,
}

/// Messages added by one request, in order.
#[derive(Serialize)]
pub struct Posted {
    messages: Vec<ChatMessage>,
}

pub async fn support_history(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    Json(state.support.read().await.messages().to_vec())
}

pub async fn open_support(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    let mut support = state.support.write().await;
    support.open();
    Json(support.messages().to_vec())
}

/// Post a support message and produce the reply. Blank text adds nothing.
pub async fn send_support(
    State(state): State<AppState>,
    client: ClientKey,
    Json(req): Json<SupportRequest>,
) -> Json<Posted> {
    let Some(user_msg) = state.support.write().await.post_user(&req.text) else {
        return Json(Posted { messages: Vec::new() });
    };

    state.webhook.forward(&user_msg).await;

    let route = route_support_message(&user_msg.text);
    debug!(?route, "Support message routed");

    let reply = match route {
        SupportRoute::LiveAgent => {
            tokio::time::sleep(state.config.support_agent_delay).await;
            ChatMessage::new(ChatRole::Agent, SUPPORT_AGENT_REPLY)
        }
        SupportRoute::AiTutor => match state.quota.acquire(&client, Generation::Tutor).await {
            Err(_) => ChatMessage::new(ChatRole::System, SUPPORT_HIGH_VOLUME),
            Ok(()) => {
                let tutor = state.adapters.tutor.clone();
                let text = user_msg.text.clone();
                match tokio::spawn(async move { tutor.ask(&text, SUPPORT_AI_CONTEXT).await }).await {
                    Ok(answer) => ChatMessage::new(ChatRole::Ai, answer),
                    Err(e) => {
                        error!(error = %e, "Tutor task failed");
                        ChatMessage::new(ChatRole::System, SUPPORT_HIGH_VOLUME)
                    }
                }
            }
        },
    };

    state.support.write().await.push(reply.clone());
    Json(Posted {
        messages: vec![user_msg, reply],
    })
}

pub async fn breakout_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatMessage>>, ServerError> {
    state.require_session().await?;
    Ok(Json(state.breakout.read().await.messages().to_vec()))
}

pub async fn send_breakout(
    State(state): State<AppState>,
    Json(req): Json<BreakoutRequest>,
) -> Result<Json<Posted>, ServerError> {
    state.require_session().await?;
    let posted = state.breakout.write().await.send(&req.text, req.kind);
    Ok(Json(Posted {
        messages: posted.into_iter().collect(),
    }))
}

pub async fn gifs() -> Json<&'static [&'static str]> {
    Json(TRENDY_GIFS)
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_open_posts_greeting_once() {
        let router = build_router(test_state());
        call(&router, "POST", "/support/open", None).await;
        let (_, body) = call(&router, "POST", "/support/open", None).await;
        let messages = body.as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(
            messages[0]["text"],
            "Welcome to SkillsNexus Support. How can we help you today?"
        );
    }

    #[tokio::test]
    async fn test_pricing_question_goes_to_agent() {
        let router = build_router(test_state());
        let (_, body) = call(
            &router,
            "POST",
            "/support/messages",
            Some(json!({ "text": "How much does Premium COST?" })),
        )
        .await;
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "agent");
    }

    #[tokio::test]
    async fn test_general_question_goes_to_tutor() {
        let router = build_router(test_state());
        let (_, body) = call(
            &router,
            "POST",
            "/support/messages",
            Some(json!({ "text": "What is machine learning?" })),
        )
        .await;
        assert_eq!(body["messages"][1]["role"], "ai");

        let (_, history) = call(&router, "GET", "/support", None).await;
        assert_eq!(history.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_tutor_quota_falls_back_to_high_volume_notice() {
        let router = build_router(test_state_with(|c| c.tutor_quota_per_min = 1));
        let general = || Some(json!({ "text": "What is machine learning?" }));

        let (_, body) = call(&router, "POST", "/support/messages", general()).await;
        assert_eq!(body["messages"][1]["role"], "ai");

        let (status, body) = call(&router, "POST", "/support/messages", general()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"][1]["role"], "system");
        assert_eq!(
            body["messages"][1]["text"],
            skillsnexus_shared::constants::SUPPORT_HIGH_VOLUME
        );

        // Live agent replies cost nothing and stay available.
        let (_, body) = call(
            &router,
            "POST",
            "/support/messages",
            Some(json!({ "text": "I need a refund" })),
        )
        .await;
        assert_eq!(body["messages"][1]["role"], "agent");
    }

    #[tokio::test]
    async fn test_blank_support_message_ignored() {
        let router = build_router(test_state());
        let (status, body) = call(&router, "POST", "/support/messages", Some(json!({ "text": "   " }))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_breakout_requires_session() {
        let router = build_router(test_state());
        let (status, _) = call(&router, "GET", "/breakout", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        sign_in(&router).await;
        let (_, body) = call(&router, "GET", "/breakout", None).await;
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (_, body) = call(
            &router,
            "POST",
            "/breakout/messages",
            Some(json!({ "text": "https://media.giphy.com/x.gif", "type": "gif" })),
        )
        .await;
        assert_eq!(body["messages"][0]["senderName"], "You");
        assert_eq!(body["messages"][0]["type"], "gif");
    }

    #[tokio::test]
    async fn test_gif_list() {
        let router = build_router(test_state());
        let (_, body) = call(&router, "GET", "/breakout/gifs", None).await;
        assert_eq!(body.as_array().unwrap().len(), 4);
    }
}
