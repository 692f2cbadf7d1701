//! # skillsnexus-server
//!
//! HTTP backend for the SkillsNexus learning platform.
//!
//! This binary provides:
//! - **Catalog and course viewer** with lock-aware lesson navigation
//! - **Checkout** with referral discounts and a payment gateway adapter
//! - **Partner console** for course editing, video generation and the support
//!   webhook
//! - **Support and breakout chat**, routed to a live agent or the AI tutor
//! - **Generation quotas** on the tutor and video routes

mod adapters;
mod api;
mod checkouts;
mod config;
mod error;
mod quota;
mod referrals;
mod state;
mod webhook;

use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,skillsnexus_server=debug")),
        )
        .init();

    info!("Starting SkillsNexus server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    info!(
        instance = %config.instance_name,
        partner_domains = config.partner_domains.len(),
        admin_enabled = config.admin_token.is_some(),
        webhook_enabled = config.support_webhook_url.is_some(),
        "Instance settings"
    );

    let http_addr = config.http_addr;
    let app_state = AppState::new(config);

    // Fold identity provider transitions into the user context.
    let _session_sync = app_state.spawn_session_sync();

    // Every 5 minutes, forget idle quota clients and abandoned checkouts.
    let quota = app_state.quota.clone();
    let checkouts = app_state.checkouts.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            quota.purge_idle(Duration::from_secs(3600)).await;
            checkouts.purge_older_than(Duration::from_secs(3600)).await;
        }
    });

    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
