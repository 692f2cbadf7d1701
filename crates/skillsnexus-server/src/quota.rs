//! Per-client quotas on the routes that spend model credits: tutor
//! answers and generated videos.

use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::error::ServerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    Tutor,
    Video,
}

#[derive(Debug, Clone, Copy)]
pub struct QuotaRule {
    pub limit: u32,
    pub window: Duration,
}

/// Sliding window log of recent generations per client and kind.
#[derive(Clone)]
pub struct GenerationQuota {
    log: Arc<Mutex<HashMap<(String, Generation), VecDeque<Instant>>>>,
    tutor: QuotaRule,
    video: QuotaRule,
}

impl GenerationQuota {
    pub fn new(tutor: QuotaRule, video: QuotaRule) -> Self {
        Self {
            log: Arc::new(Mutex::new(HashMap::new())),
            tutor,
            video,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            QuotaRule {
                limit: config.tutor_quota_per_min,
                window: Duration::from_secs(60),
            },
            QuotaRule {
                limit: config.video_quota_per_hour,
                window: Duration::from_secs(3600),
            },
        )
    }

    fn rule(&self, kind: Generation) -> QuotaRule {
        match kind {
            Generation::Tutor => self.tutor,
            Generation::Video => self.video,
        }
    }

    /// Record one generation for `client`, or refuse once the window is full.
    pub async fn acquire(&self, client: &ClientKey, kind: Generation) -> Result<(), ServerError> {
        let rule = self.rule(kind);
        let now = Instant::now();
        let mut log = self.log.lock().await;
        let stamps = log.entry((client.0.clone(), kind)).or_default();

        while stamps
            .front()
            .is_some_and(|t| now.duration_since(*t) >= rule.window)
        {
            stamps.pop_front();
        }

        if stamps.len() >= rule.limit as usize {
            warn!(client = %client.0, ?kind, limit = rule.limit, "Generation quota exceeded");
            return Err(ServerError::QuotaExceeded(kind));
        }
        stamps.push_back(now);
        Ok(())
    }

    /// Drop clients whose newest entry is older than `max_idle`.
    pub async fn purge_idle(&self, max_idle: Duration) -> usize {
        let mut log = self.log.lock().await;
        let before = log.len();
        log.retain(|_, stamps| stamps.back().is_some_and(|t| t.elapsed() < max_idle));
        let removed = before - log.len();
        if removed > 0 {
            debug!(removed, remaining = log.len(), "Purged idle quota entries");
        }
        removed
    }
}

/// Who a quota is charged to: the socket peer, else the first proxy hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientKey::from_parts(parts))
    }
}

impl ClientKey {
    fn from_parts(parts: &Parts) -> Self {
        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            return ClientKey(addr.ip().to_string());
        }

        let header_ip = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .and_then(|first| first.trim().parse::<IpAddr>().ok())
        };

        header_ip("x-forwarded-for")
            .or_else(|| header_ip("x-real-ip"))
            .map(|ip| ClientKey(ip.to_string()))
            .unwrap_or_else(|| ClientKey("unknown".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn key(s: &str) -> ClientKey {
        ClientKey(s.into())
    }

    fn quota(limit: u32) -> GenerationQuota {
        let rule = QuotaRule {
            limit,
            window: Duration::from_secs(60),
        };
        GenerationQuota::new(rule, rule)
    }

    #[tokio::test]
    async fn test_limit_then_refuse() {
        let quota = quota(2);
        let a = key("10.0.0.1");
        quota.acquire(&a, Generation::Tutor).await.unwrap();
        quota.acquire(&a, Generation::Tutor).await.unwrap();
        assert!(matches!(
            quota.acquire(&a, Generation::Tutor).await,
            Err(ServerError::QuotaExceeded(Generation::Tutor))
        ));
    }

    #[tokio::test]
    async fn test_kinds_and_clients_are_separate() {
        let quota = quota(1);
        let a = key("10.0.0.1");
        quota.acquire(&a, Generation::Tutor).await.unwrap();
        quota.acquire(&a, Generation::Video).await.unwrap();
        quota.acquire(&key("10.0.0.2"), Generation::Tutor).await.unwrap();
        assert!(quota.acquire(&a, Generation::Video).await.is_err());
    }

    #[tokio::test]
    async fn test_window_slides() {
        let rule = QuotaRule {
            limit: 1,
            window: Duration::from_millis(20),
        };
        let quota = GenerationQuota::new(rule, rule);
        let a = key("10.0.0.1");
        quota.acquire(&a, Generation::Tutor).await.unwrap();
        assert!(quota.acquire(&a, Generation::Tutor).await.is_err());

        tokio::time::sleep(Duration::from_millis(30)).await;
        quota.acquire(&a, Generation::Tutor).await.unwrap();
    }

    #[tokio::test]
    async fn test_purge_idle() {
        let quota = GenerationQuota::from_config(&ServerConfig::default());
        quota.acquire(&key("192.168.1.1"), Generation::Video).await.unwrap();
        assert_eq!(quota.purge_idle(Duration::from_secs(600)).await, 0);
        assert_eq!(quota.purge_idle(Duration::ZERO).await, 1);
    }

    #[test]
    fn test_client_key_from_proxy_headers() {
        let (parts, _) = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(ClientKey::from_parts(&parts), key("203.0.113.7"));

        let (parts, _) = Request::builder()
            .header("x-real-ip", "198.51.100.2")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(ClientKey::from_parts(&parts), key("198.51.100.2"));

        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert_eq!(ClientKey::from_parts(&parts), key("unknown"));
    }
}
