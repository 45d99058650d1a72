//! Fixed-window rate limiting per client IP, applied to every route.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use serde_json::json;
use tracing::warn;

use crate::config::Environment;

pub const WINDOW: Duration = Duration::from_secs(15 * 60);
pub const PRODUCTION_LIMIT: u32 = 30;
pub const DEVELOPMENT_LIMIT: u32 = 1000;

const LIMITED_MESSAGE: &str = "Too many requests. Please try again in 15 minutes.";

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: DateTime<Utc>,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Limited { reset_at: DateTime<Utc> },
}

/// Per-IP request counters. Requests whose peer address is unknown share
/// one bucket.
pub struct RateLimiter {
    max_requests: u32,
    window: TimeDelta,
    clients: DashMap<Option<IpAddr>, Window>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window: TimeDelta::seconds(window.as_secs() as i64),
            clients: DashMap::new(),
        }
    }

    pub fn for_environment(environment: Environment) -> Self {
        let limit = if environment.is_production() {
            PRODUCTION_LIMIT
        } else {
            DEVELOPMENT_LIMIT
        };
        Self::new(limit, WINDOW)
    }

    pub fn check(&self, client: Option<IpAddr>) -> Decision {
        self.check_at(client, Utc::now())
    }

    pub fn check_at(&self, client: Option<IpAddr>, now: DateTime<Utc>) -> Decision {
        let mut window = self.clients.entry(client).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now >= window.started_at + self.window {
            *window = Window {
                started_at: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            return Decision::Limited {
                reset_at: window.started_at + self.window,
            };
        }

        window.count += 1;
        Decision::Allowed
    }

    /// Drops windows that have already ended.
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        self.clients
            .retain(|_, window| now < window.started_at + self.window);
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}

/// Middleware rejecting requests over the limit with 429.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match limiter.check(client) {
        Decision::Allowed => next.run(request).await,
        Decision::Limited { reset_at } => {
            warn!(client = ?client, path = %request.uri().path(), "rate limit exceeded");
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "success": false,
                    "error": LIMITED_MESSAGE,
                    "retryAfter": reset_at.timestamp_millis(),
                })),
            )
                .into_response()
        }
    }
}
