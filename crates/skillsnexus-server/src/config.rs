//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development. Every external adapter falls back to
//! its sandbox implementation when its credential is absent.

use std::net::SocketAddr;
use std::time::Duration;

use skillsnexus_shared::constants::{
    DEFAULT_HTTP_PORT, DEFAULT_PARTNER_DOMAINS, SANDBOX_CHARGE_DELAY, SUPPORT_AGENT_DELAY,
    VIDEO_POLL_INTERVAL, VIDEO_POLL_MAX_ATTEMPTS,
};

const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Marker left in unconfigured Firebase templates.
const FIREBASE_PLACEHOLDER: &str = "YOUR_API_KEY";

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Human-readable name for this instance.
    /// Env: `INSTANCE_NAME`
    pub instance_name: String,

    /// Generative AI key for the tutor and the video studio.
    /// Env: `GEMINI_API_KEY`, falling back to `API_KEY`.
    pub gemini_api_key: Option<String>,

    /// Env: `GEMINI_BASE_URL`
    pub gemini_base_url: String,

    /// Identity Toolkit key. Placeholder values count as absent.
    /// Env: `FIREBASE_API_KEY`
    pub firebase_api_key: Option<String>,

    /// Env: `YOCO_SECRET_KEY`
    pub yoco_secret_key: Option<String>,

    /// Public key handed to the browser's inline card form.
    /// Env: `YOCO_PUBLIC_KEY`
    pub yoco_public_key: Option<String>,

    /// Initial support webhook. Partners can change it at runtime.
    /// Env: `SUPPORT_WEBHOOK_URL`
    pub support_webhook_url: Option<String>,

    /// Admin API bearer token. Required to access /admin/* endpoints.
    /// Env: `ADMIN_TOKEN`
    /// Default: empty (admin API disabled).
    pub admin_token: Option<String>,

    /// Email suffixes allowed into the partner console.
    /// Env: `PARTNER_DOMAINS` (comma separated)
    pub partner_domains: Vec<String>,

    /// Env: `VIDEO_POLL_INTERVAL_SECS`
    pub video_poll_interval: Duration,

    /// Env: `VIDEO_POLL_MAX_ATTEMPTS`
    pub video_poll_max_attempts: u32,

    /// Simulated gateway latency for the sandbox payment adapter.
    /// Env: `PAYMENT_DELAY_MS`
    pub payment_delay: Duration,

    /// Typing delay before the canned live-agent reply. Not read from the
    /// environment.
    pub support_agent_delay: Duration,

    /// Tutor answers allowed per client per minute.
    /// Env: `TUTOR_QUOTA_PER_MIN`
    pub tutor_quota_per_min: u32,

    /// Generated videos allowed per client per hour.
    /// Env: `VIDEO_QUOTA_PER_HOUR`
    pub video_quota_per_hour: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            instance_name: "SkillsNexus".to_string(),
            gemini_api_key: None,
            gemini_base_url: GEMINI_DEFAULT_BASE_URL.to_string(),
            firebase_api_key: None,
            yoco_secret_key: None,
            yoco_public_key: None,
            support_webhook_url: None,
            admin_token: None,
            partner_domains: DEFAULT_PARTNER_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            video_poll_interval: VIDEO_POLL_INTERVAL,
            video_poll_max_attempts: VIDEO_POLL_MAX_ATTEMPTS,
            payment_delay: SANDBOX_CHARGE_DELAY,
            support_agent_delay: SUPPORT_AGENT_DELAY,
            tutor_quota_per_min: 20,
            video_quota_per_hour: 6,
        }
    }
}

// Secrets stay out of the startup log.
impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_addr", &self.http_addr)
            .field("instance_name", &self.instance_name)
            .field("gemini_configured", &self.gemini_api_key.is_some())
            .field("gemini_base_url", &self.gemini_base_url)
            .field("firebase_configured", &self.firebase_api_key.is_some())
            .field("yoco_configured", &self.yoco_secret_key.is_some())
            .field("support_webhook_url", &self.support_webhook_url)
            .field("admin_enabled", &self.admin_token.is_some())
            .field("partner_domains", &self.partner_domains)
            .field("video_poll_interval", &self.video_poll_interval)
            .field("video_poll_max_attempts", &self.video_poll_max_attempts)
            .field("payment_delay", &self.payment_delay)
            .field("tutor_quota_per_min", &self.tutor_quota_per_min)
            .field("video_quota_per_hour", &self.video_quota_per_hour)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(name) = non_empty("INSTANCE_NAME") {
            config.instance_name = name;
        }

        config.gemini_api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY"));

        if let Some(url) = non_empty("GEMINI_BASE_URL") {
            config.gemini_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(key) = non_empty("FIREBASE_API_KEY") {
            if key.contains(FIREBASE_PLACEHOLDER) {
                tracing::warn!("FIREBASE_API_KEY is a placeholder, using sandbox identity");
            } else {
                config.firebase_api_key = Some(key);
            }
        }

        config.yoco_secret_key = non_empty("YOCO_SECRET_KEY");
        config.yoco_public_key = non_empty("YOCO_PUBLIC_KEY");
        config.support_webhook_url = non_empty("SUPPORT_WEBHOOK_URL");
        config.admin_token = non_empty("ADMIN_TOKEN");

        if let Some(raw) = lookup("PARTNER_DOMAINS") {
            let domains: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(|d| {
                    if d.starts_with('@') {
                        d.to_lowercase()
                    } else {
                        format!("@{}", d.to_lowercase())
                    }
                })
                .collect();
            if domains.is_empty() {
                tracing::warn!(value = %raw, "Empty PARTNER_DOMAINS, using default");
            } else {
                config.partner_domains = domains;
            }
        }

        if let Some(val) = lookup("VIDEO_POLL_INTERVAL_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => config.video_poll_interval = Duration::from_secs(secs),
                Err(_) => tracing::warn!(value = %val, "Invalid VIDEO_POLL_INTERVAL_SECS, using default"),
            }
        }

        if let Some(val) = lookup("VIDEO_POLL_MAX_ATTEMPTS") {
            match val.parse::<u32>() {
                Ok(n) if n > 0 => config.video_poll_max_attempts = n,
                _ => tracing::warn!(value = %val, "Invalid VIDEO_POLL_MAX_ATTEMPTS, using default"),
            }
        }

        if let Some(val) = lookup("PAYMENT_DELAY_MS") {
            match val.parse::<u64>() {
                Ok(ms) => config.payment_delay = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %val, "Invalid PAYMENT_DELAY_MS, using default"),
            }
        }

        if let Some(val) = lookup("TUTOR_QUOTA_PER_MIN") {
            match val.parse::<u32>() {
                Ok(n) if n > 0 => config.tutor_quota_per_min = n,
                _ => tracing::warn!(value = %val, "Invalid TUTOR_QUOTA_PER_MIN, using default"),
            }
        }

        if let Some(val) = lookup("VIDEO_QUOTA_PER_HOUR") {
            match val.parse::<u32>() {
                Ok(n) if n > 0 => config.video_quota_per_hour = n,
                _ => tracing::warn!(value = %val, "Invalid VIDEO_QUOTA_PER_HOUR, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}
