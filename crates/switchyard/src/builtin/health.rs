//! Health check controller.
//!
//! Returns 200 OK with the number of registered controllers.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::controller::Controller;
use crate::discovery::ControllerManifest;
use crate::error::ControllerResult;
use crate::route::Route;
use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    controllers: usize,
}

/// Health check handler.
async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        controllers: state.controllers().len(),
    })
}

/// Build the health controller, mounted at `/health`.
pub(super) fn controller(manifest: &ControllerManifest) -> ControllerResult<Controller> {
    Controller::new(&manifest.name, "/health")?
        .with_description("Service health check")
        .with_route(Route::get("check", "/", check))
}
