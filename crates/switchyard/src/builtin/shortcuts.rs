//! Shortcut listing controller.
//!
//! Serves the resolved menu shortcuts, grouped by category.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};

use crate::controller::Controller;
use crate::discovery::ControllerManifest;
use crate::error::{AppError, AppResult, ControllerResult};
use crate::route::Route;
use crate::shortcut::ShortcutEntry;
use crate::state::AppState;

/// All categories.
async fn index(State(state): State<AppState>) -> Json<BTreeMap<String, Vec<ShortcutEntry>>> {
    Json(state.shortcuts().resolve(state.controllers()))
}

/// A single category.
async fn category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<ShortcutEntry>>> {
    state
        .shortcuts()
        .resolve(state.controllers())
        .remove(&category)
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Build the shortcut listing controller, mounted at `/_shortcuts`.
pub(super) fn controller(manifest: &ControllerManifest) -> ControllerResult<Controller> {
    Controller::new(&manifest.name, "/_shortcuts")?
        .with_description("Lists menu shortcuts")
        .with_route(Route::get("index", "/", index))?
        .with_route(Route::get("category", "/{category}", category))
}
