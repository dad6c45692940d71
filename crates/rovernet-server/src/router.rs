use axum::http::{header, Method};
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all RoverNet endpoints.
///
/// Every `/api/*` route is also served with a `.php` suffix so existing game
/// clients keep working unchanged. Unsupported methods get `405` with the
/// usual failure envelope.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new().route("/v1/health", get(handler::health_handler));

    let router = api(
        router,
        "/api/player_load",
        get(handler::player_load_query)
            .post(handler::player_load_body)
            .fallback(handler::get_or_post_only),
    );
    let router = api(
        router,
        "/api/player_save",
        post(handler::player_save).fallback(handler::post_only),
    );
    let router = api(
        router,
        "/api/company_load",
        get(handler::company_load_query)
            .post(handler::company_load_body)
            .fallback(handler::get_or_post_only),
    );
    let router = api(
        router,
        "/api/company_save",
        post(handler::company_save).fallback(handler::post_only),
    );
    let router = api(
        router,
        "/api/admin_log",
        post(handler::admin_log_append).fallback(handler::post_only),
    );

    router
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api(
    router: Router<AppState>,
    path: &str,
    method_router: MethodRouter<AppState>,
) -> Router<AppState> {
    router
        .route(path, method_router.clone())
        .route(&format!("{path}.php"), method_router)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
