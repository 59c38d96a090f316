use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

use common::types::Health;

use crate::flash;
use crate::state::AppState;

pub mod admin_users;
pub mod service_updates;
pub mod services;
pub mod users;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Landing page; also the sink for flashed errors raised while looking up
/// services.
async fn index(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let (jar, flashes) = flash::take(jar);
    (jar, Json(serde_json::json!({"flashes": flashes})))
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/admin", get(index))
        .route("/admin/services", get(services::find_service))
        .route("/admin/services/:service_id", get(services::view_service))
        .route(
            "/admin/services/status/:service_id",
            post(services::update_service_status),
        )
        .route(
            "/admin/services/:service_id/edit/:section",
            get(services::edit_section).post(services::update_section),
        )
        .route(
            "/admin/services/:service_id/edit/:section/:question",
            get(services::edit_section_question).post(services::update_section_question),
        )
        .route(
            "/admin/services/:service_id/updates",
            get(service_updates::view_service_updates),
        )
        .route(
            "/admin/services/:service_id/updates/:event_id/approve",
            post(service_updates::approve_service_update),
        )
        .route("/admin/users", get(users::find_user_by_email))
        .route("/admin/suppliers/users/:user_id/unlock", post(users::unlock_user))
        .route(
            "/admin/suppliers/users/:user_id/deactivate",
            post(users::deactivate_user),
        )
        .route("/admin-users", get(admin_users::list_admin_users))
        .route(
            "/admin-users/invite",
            get(admin_users::invite_form).post(admin_users::invite_admin_user),
        )
        .route(
            "/admin-users/:user_id/edit",
            get(admin_users::edit_form).post(admin_users::edit_admin_user),
        )
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
