pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use casetrack_import::CASE_IMPORT_MAX_BYTES;

pub use state::AppState;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/cases/import",
            post(routes::import_cases).layer(DefaultBodyLimit::max(
                CASE_IMPORT_MAX_BYTES as usize + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route("/cases", get(routes::list_cases))
        .route("/cases/{id}", delete(routes::delete_case))
        .route(
            "/cases/{id}/events",
            get(routes::list_events).post(routes::add_event),
        )
        .route(
            "/cases/{id}/events/{event_id}",
            delete(routes::delete_event),
        )
        .with_state(state)
}
