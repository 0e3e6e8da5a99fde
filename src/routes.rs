use crate::handlers::{self, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Builds the HTTP application.
///
/// `rate_limited` adds the per-IP governor. It needs the peer address, so the
/// server must be started with `into_make_service_with_connect_info`.
pub fn build_app(state: Arc<AppState>, rate_limited: bool) -> anyhow::Result<Router> {
    let body_limit = state.config.max_upload_bytes;

    let onboarding_routes = Router::new()
        .route("/api/v1/onboarding/sessions", post(handlers::create_session))
        .route(
            "/api/v1/onboarding/sessions/:id",
            get(handlers::get_session).delete(handlers::close_session),
        )
        .route(
            "/api/v1/onboarding/sessions/:id/customer",
            patch(handlers::update_customer),
        )
        .route(
            "/api/v1/onboarding/sessions/:id/advance",
            post(handlers::advance),
        )
        .route(
            "/api/v1/onboarding/sessions/:id/retreat",
            post(handlers::retreat),
        )
        .route(
            "/api/v1/onboarding/sessions/:id/documents",
            post(handlers::add_document),
        )
        .route(
            "/api/v1/onboarding/sessions/:id/documents/:slot",
            delete(handlers::remove_document),
        )
        .route(
            "/api/v1/onboarding/sessions/:id/documents/:slot/kind",
            put(handlers::set_content_kind),
        )
        .route(
            "/api/v1/onboarding/sessions/:id/documents/:slot/file",
            post(handlers::attach_file),
        )
        .route(
            "/api/v1/onboarding/sessions/:id/documents/:slot/text",
            put(handlers::attach_text),
        )
        .route(
            "/api/v1/onboarding/sessions/:id/documents/:slot/verify",
            post(handlers::verify_document),
        )
        .route(
            "/api/v1/onboarding/sessions/:id/submit",
            post(handlers::submit),
        )
        .layer(
            ServiceBuilder::new()
                // Multipart extractor has its own 2MB default; align it with the outer limit
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(RequestBodyLimitLayer::new(body_limit)),
        );

    let onboarding_routes = if rate_limited {
        // 10 requests/second per IP, burst of 20
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(10)
                .burst_size(20)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?,
        );
        onboarding_routes.layer(GovernorLayer {
            config: governor_conf,
        })
    } else {
        onboarding_routes
    };

    // Health check bypasses rate limiting
    Ok(Router::new()
        .route("/health", get(handlers::health))
        .merge(onboarding_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}
