//! Rate Limiting Middleware using GCRA Algorithm
//!
//! Limit of N requests per minute for each client IP and request path,
//! using tower_governor. The quota replenishes one request every `60s / N`,
//! with a burst of N.

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::middleware::StateInformationMiddleware;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::KeyExtractor;
use tower_governor::GovernorError;

use crate::ServerError;

/// Keys requests by peer IP and path, so each endpoint has its own quota.
///
/// The peer address comes from `ConnectInfo<SocketAddr>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpEndpointKeyExtractor;

impl KeyExtractor for IpEndpointKeyExtractor {
    type Key = (IpAddr, String);

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)?;
        Ok((ip, req.uri().path().to_string()))
    }
}

/// Governor config keyed by IP and endpoint, with X-RateLimit-* headers
pub type DefaultGovernorConfig =
    tower_governor::governor::GovernorConfig<IpEndpointKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Milliseconds to replenish one request
    pub replenish_ms: u64,
    /// Burst size (max requests that can be made immediately)
    pub burst_size: u32,
}

impl RateLimitConfig {
    /// `requests` per minute; `None` when `requests` is 0 (disabled)
    pub fn per_minute(requests: u32) -> Option<Self> {
        if requests == 0 {
            return None;
        }
        Some(Self {
            replenish_ms: (60_000 / u64::from(requests)).max(1),
            burst_size: requests,
        })
    }
}

/// Create a rate limiting governor config
///
/// Keys on `ConnectInfo`, so the service must be run with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_governor_config(
    config: &RateLimitConfig,
) -> Result<Arc<DefaultGovernorConfig>, ServerError> {
    GovernorConfigBuilder::default()
        .per_millisecond(config.replenish_ms)
        .burst_size(config.burst_size)
        .key_extractor(IpEndpointKeyExtractor)
        .use_headers()
        .finish()
        .map(Arc::new)
        .ok_or_else(|| ServerError::RateLimit(format!("invalid quota {:?}", config)))
}
