//! HTTP/JSON surface driven by the browser front end.

mod admin;
mod auth;
mod catalog;
mod chat;
mod checkout;
mod partner;
mod viewer;

use axum::{
    extract::State,
    http::Method,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use skillsnexus_shared::constants::APP_NAME;
use skillsnexus_shared::fixtures::{Testimonial, PARTNER_DESCRIPTIONS, SA_CHAPTERS, TESTIMONIALS};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/info", get(server_info))
        .route("/landing", get(landing))
        // Session
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/session", get(auth::session))
        .route("/session/currency", put(auth::set_currency))
        // Catalog and dashboard
        .route("/courses", get(catalog::list_courses))
        .route("/courses/:course_id", get(catalog::get_course))
        .route("/personas", get(catalog::list_personas))
        .route("/persona", put(catalog::select_persona))
        .route("/dashboard", get(catalog::dashboard))
        // Course viewer
        .route("/courses/:course_id/viewer", post(viewer::open))
        .route("/viewers/:viewer_id", get(viewer::show).delete(viewer::close))
        .route("/viewers/:viewer_id/select", post(viewer::select))
        .route("/viewers/:viewer_id/next", post(viewer::next))
        .route("/viewers/:viewer_id/previous", post(viewer::previous))
        .route("/viewers/:viewer_id/media-ended", post(viewer::media_ended))
        .route("/viewers/:viewer_id/autoplay", put(viewer::autoplay))
        .route("/viewers/:viewer_id/expand", post(viewer::expand))
        .route("/viewers/:viewer_id/ask", post(viewer::ask))
        // Pricing and checkout
        .route("/pricing", get(checkout::pricing))
        .route("/checkout", post(checkout::start))
        .route(
            "/checkouts/:checkout_id",
            get(checkout::show).delete(checkout::close),
        )
        .route(
            "/checkouts/:checkout_id/referral",
            post(checkout::apply_referral).delete(checkout::remove_referral),
        )
        .route("/checkouts/:checkout_id/card", put(checkout::set_card))
        .route("/checkouts/:checkout_id/pay", post(checkout::pay))
        // Partner console
        .route("/partner/login", post(partner::login))
        .route("/partner/logout", post(partner::logout))
        .route("/partner/session", get(partner::session))
        .route("/partner/courses", post(partner::create_course))
        .route("/partner/courses/:course_id", patch(partner::update_course))
        .route("/partner/courses/:course_id/modules", post(partner::add_module))
        .route(
            "/partner/courses/:course_id/modules/:module_id",
            patch(partner::update_module),
        )
        .route(
            "/partner/courses/:course_id/modules/:module_id/lessons",
            post(partner::add_lesson),
        )
        .route(
            "/partner/courses/:course_id/modules/:module_id/lessons/:lesson_id",
            patch(partner::update_lesson),
        )
        .route("/partner/webhook", get(partner::webhook).put(partner::set_webhook))
        .route("/partner/video", post(partner::generate_video))
        .route("/partner/referrals", get(partner::referrals))
        // Chat
        .route("/support", get(chat::support_history))
        .route("/support/open", post(chat::open_support))
        .route("/support/messages", post(chat::send_support))
        .route("/breakout", get(chat::breakout_history))
        .route("/breakout/messages", post(chat::send_breakout))
        .route("/breakout/gifs", get(chat::gifs))
        // Admin
        .route("/admin/status", get(admin::status))
        .route("/admin/referrals", post(admin::add_referral))
        .route("/admin/referrals/deactivate", post(admin::deactivate_referral))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdapterInfo {
    identity: &'static str,
    payment: &'static str,
    tutor: &'static str,
    video: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerInfoResponse {
    app: &'static str,
    name: String,
    version: &'static str,
    adapters: AdapterInfo,
    payment_public_key: Option<String>,
}

#[derive(Serialize)]
struct PartnerBlurb {
    name: &'static str,
    description: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LandingResponse {
    partners: Vec<PartnerBlurb>,
    chapters: &'static [&'static str],
    testimonials: &'static [Testimonial],
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn server_info(State(state): State<AppState>) -> Json<ServerInfoResponse> {
    let adapters = &state.adapters;
    Json(ServerInfoResponse {
        app: APP_NAME,
        name: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        adapters: AdapterInfo {
            identity: adapters.identity.name(),
            payment: adapters.payment.name(),
            tutor: adapters.tutor.name(),
            video: adapters.video.name(),
        },
        payment_public_key: adapters.payment.public_key().map(str::to_string),
    })
}

async fn landing() -> Json<LandingResponse> {
    Json(LandingResponse {
        partners: PARTNER_DESCRIPTIONS
            .iter()
            .map(|&(name, description)| PartnerBlurb { name, description })
            .collect(),
        chapters: SA_CHAPTERS,
        testimonials: TESTIMONIALS,
    })
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
