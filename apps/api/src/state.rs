use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::generation::generator::ResumeGenerator;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub generator: ResumeGenerator,
    pub rate_limiter: Arc<RateLimiter>,
    /// Process start, reported as uptime by `/health`.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, generator: ResumeGenerator) -> Self {
        let rate_limiter = Arc::new(RateLimiter::for_environment(config.environment));
        Self {
            config,
            generator,
            rate_limiter,
            started_at: Instant::now(),
        }
    }

    /// Whether internal error detail may reach clients.
    pub fn expose_internal(&self) -> bool {
        !self.config.environment.is_production()
    }
}
