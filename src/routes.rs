// routes.rs - Route table and middleware chains
//
// Global:  secure_headers → trace → catch_panic → timeout → surface_error_detail
// Dynamic: session → csrf_protect → authenticate
// Protected: dynamic + require_authentication

use std::time::Duration;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tower_sessions::SessionStore;
use tracing::Level;

use crate::handlers::{self, protected, public};
use crate::middleware::{
    authenticate, csrf_protect, handle_panic, make_request_span, require_authentication,
    secure_headers, surface_error_detail,
};
use crate::session::session_layer;
use crate::state::AppState;

/// Build the application router over the given session store
pub fn routes<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let protected_routes = Router::new()
        .route(
            "/snippet/create",
            get(protected::snippet_create).post(protected::snippet_create_post),
        )
        .route("/user/logout", post(protected::user_logout_post))
        .route("/account/view", get(protected::account_view))
        .route(
            "/account/password/update",
            get(protected::account_password_update).post(protected::account_password_update_post),
        )
        .route_layer(from_fn(require_authentication));

    let dynamic_routes = Router::new()
        .route("/", get(public::home))
        .route("/about", get(public::about))
        .route("/snippet/view/:id", get(public::snippet_view))
        .route("/user/signup", get(public::user_signup).post(public::user_signup_post))
        .route("/user/login", get(public::user_login).post(public::user_login_post))
        .merge(protected_routes)
        .layer(from_fn_with_state(state.clone(), authenticate))
        .layer(from_fn_with_state(state.clone(), csrf_protect))
        .layer(session_layer(store, &state.config.session));

    let app = Router::new()
        .route("/ping", get(handlers::ping))
        .nest_service("/static", ServeDir::new(&state.config.server.static_dir))
        .merge(dynamic_routes)
        .fallback(handlers::not_found);

    with_global_layers(app, state)
}

/// Layers shared by every route. Security headers sit outside panic recovery
/// so recovered 500s carry them too.
pub fn with_global_layers(router: Router<AppState>, state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    router
        .layer(from_fn_with_state(state.clone(), surface_error_detail))
        .layer(TimeoutLayer::new(timeout))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(from_fn(secure_headers))
        .with_state(state)
}
