//! Route definitions for the override server

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Override routes (public; there is no session or identity yet)
pub fn override_routes() -> Router<AppState> {
    Router::new().route(
        "/override",
        get(handlers::get_override)
            .post(handlers::create_override)
            .delete(handlers::delete_override),
    )
}
