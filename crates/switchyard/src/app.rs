//! Application router assembly.

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::controller::Controller;
use crate::error::ControllerResult;
use crate::state::AppState;

/// Merge the routers of every root controller and add request tracing.
///
/// Routes are checked for conflicts across all roots first. The caller
/// supplies state with `with_state`.
pub fn router(roots: &[Controller]) -> ControllerResult<Router<AppState>> {
    Controller::check_conflicts(roots)?;

    let app = roots
        .iter()
        .fold(Router::new(), |app, root| app.merge(root.build_router()));

    info!(roots = roots.len(), "application router built");
    Ok(app.layer(TraceLayer::new_for_http()))
}
