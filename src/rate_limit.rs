use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{clock::Clock, DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;

use crate::config::RateLimitConfig;

pub const TOO_MANY_REQUESTS: &str = "Too many requests from this IP, please try again later";

/// Tracked clients above which idle entries are dropped.
const PRUNE_THRESHOLD: usize = 10_000;

/// Request budget keyed by client IP. The full budget is available as a burst
/// and refills evenly over the window.
pub struct IpRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
}

impl IpRateLimiter {
    pub fn new(cfg: &RateLimitConfig) -> anyhow::Result<Self> {
        let burst = NonZeroU32::new(cfg.max_requests).context("rate limit max is zero")?;
        let period = Duration::from_secs(cfg.window_secs) / cfg.max_requests;
        let quota = Quota::with_period(period)
            .context("rate limit window too short")?
            .allow_burst(burst);
        Ok(Self {
            limiter: RateLimiter::keyed(quota),
        })
    }
}

fn client_ip(req: &Request) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn limit_by_ip(
    State(limiter): State<Arc<IpRateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&req);
    let limiter = &limiter.limiter;
    if limiter.len() > PRUNE_THRESHOLD {
        limiter.retain_recent();
    }
    match limiter.check_key(&ip) {
        Ok(()) => next.run(req).await,
        Err(not_until) => {
            let wait = not_until.wait_time_from(limiter.clock().now());
            warn!(%ip, retry_after_secs = wait.as_secs(), "rate limit exceeded");
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, wait.as_secs().max(1).to_string())],
                TOO_MANY_REQUESTS,
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use tower::ServiceExt;

    use super::*;

    fn app(max_requests: u32) -> Router {
        let cfg = RateLimitConfig {
            max_requests,
            window_secs: 15 * 60,
        };
        let limiter = Arc::new(IpRateLimiter::new(&cfg).unwrap());
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(limiter, limit_by_ip))
    }

    fn from(ip: [u8; 4]) -> Request<Body> {
        let mut req = Request::builder().uri("/").body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((ip, 40_000))));
        req
    }

    #[tokio::test]
    async fn each_ip_has_its_own_budget() {
        let app = app(3);
        for _ in 0..3 {
            let res = app.clone().oneshot(from([10, 0, 0, 1])).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }
        let res = app.clone().oneshot(from([10, 0, 0, 1])).await.unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(res.headers().contains_key(header::RETRY_AFTER));

        let res = app.oneshot(from([10, 0, 0, 2])).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn zero_budget_is_rejected() {
        let cfg = RateLimitConfig {
            max_requests: 0,
            window_secs: 60,
        };
        assert!(IpRateLimiter::new(&cfg).is_err());
    }
}
