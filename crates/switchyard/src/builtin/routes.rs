//! Route listing controller.

use axum::Json;
use axum::extract::State;

use crate::controller::Controller;
use crate::discovery::ControllerManifest;
use crate::error::ControllerResult;
use crate::route::{Route, RouteInfo};
use crate::state::AppState;

/// Every route of every registered controller.
async fn index(State(state): State<AppState>) -> Json<Vec<RouteInfo>> {
    Json(state.controllers().route_listing())
}

/// Build the route listing controller, mounted at `/_routes`.
pub(super) fn controller(manifest: &ControllerManifest) -> ControllerResult<Controller> {
    Controller::new(&manifest.name, "/_routes")?
        .with_description("Lists registered routes")
        .with_route(Route::get("index", "/", index))
}
