use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{http::StatusCode, middleware, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    cards,
    rate_limit::{limit_by_ip, IpRateLimiter},
    state::AppState,
    users,
};

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 - Not found")
}

/// 5xx at error, 4xx at warn (both land in the error log), the rest at info.
fn log_response(status: StatusCode, latency: Duration) {
    let latency_ms = latency.as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(%status, latency_ms, "response");
    } else if status.is_client_error() {
        tracing::warn!(%status, latency_ms, "response");
    } else {
        tracing::info!(%status, latency_ms, "response");
    }
}

pub fn build_app(state: AppState) -> anyhow::Result<Router> {
    let limiter = Arc::new(IpRateLimiter::new(&state.config.rate_limit)?);
    let app = Router::new()
        .nest("/api", Router::new().merge(users::router()).merge(cards::router()))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(limiter, limit_by_ip))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        log_response(status, latency);
                    },
                ),
        );
    Ok(app)
}

/// Serves with peer addresses attached, which the rate limiter keys on.
pub async fn serve(app: Router, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, time::Duration};

    use axum::http::StatusCode;
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::{fmt, layer::SubscriberExt, Layer};

    use super::log_response;
    use crate::{
        logging::error_log_appender,
        rate_limit::TOO_MANY_REQUESTS,
        test_support::{send, TestApp},
    };

    #[tokio::test]
    async fn unknown_route_falls_back_to_not_found() {
        let app = TestApp::new();
        let (status, body) = send(&app, "GET", "/api/nothing-here", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "404 - Not found");
    }

    #[tokio::test]
    async fn card_listing_is_public() {
        let app = TestApp::new();
        let (status, body) = send(&app, "GET", "/api/cards", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn hundred_and_first_request_is_rate_limited() {
        let app = TestApp::new();
        for _ in 0..100 {
            let (status, _) = send(&app, "GET", "/api/cards", None, None).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = send(&app, "GET", "/api/cards", None, None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, TOO_MANY_REQUESTS);
    }

    #[test]
    fn client_and_server_errors_reach_the_error_log() {
        let dir = std::env::temp_dir().join(format!("bizcards-app-{}", uuid::Uuid::new_v4()));
        let appender = error_log_appender(dir.to_str().unwrap()).unwrap();
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(appender)
                .with_filter(LevelFilter::WARN),
        );

        tracing::subscriber::with_default(subscriber, || {
            log_response(StatusCode::OK, Duration::from_millis(3));
            log_response(StatusCode::NOT_FOUND, Duration::from_millis(1));
            log_response(StatusCode::INTERNAL_SERVER_ERROR, Duration::from_millis(2));
        });

        let file = fs::read_dir(&dir).unwrap().next().unwrap().unwrap().path();
        let contents = fs::read_to_string(file).unwrap();
        assert!(contents.contains("404 Not Found"));
        assert!(contents.contains("500 Internal Server Error"));
        assert!(!contents.contains("200 OK"));
        fs::remove_dir_all(&dir).ok();
    }
}
