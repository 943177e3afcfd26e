//! Error types.
//!
//! [`ControllerError`] covers route tables, mount hierarchies and manifests.
//! [`AppError`] is what handlers return; it maps onto HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while declaring, mounting or resolving controllers.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Controller or route name is empty.
    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },

    /// Mount segment or route path is not a valid router pattern.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// A route with this name already exists on the controller.
    #[error("controller '{controller}': route '{route}' is already defined")]
    DuplicateRoute { controller: String, route: String },

    /// Two routes share a path and at least one method.
    #[error(
        "controller '{controller}': route '{route}' overlaps '{existing}' on {methods} {path}"
    )]
    ConflictingRoute {
        controller: String,
        route: String,
        existing: String,
        methods: String,
        path: String,
    },

    /// HTTP method has no axum filter (e.g. a custom extension method).
    #[error("unsupported HTTP method '{method}'")]
    UnsupportedMethod { method: String },

    /// Method list could not be parsed.
    #[error("invalid method list '{input}'")]
    InvalidMethods { input: String },

    /// Named route does not exist on the controller.
    #[error("controller '{controller}': no route named '{route}'")]
    RouteNotFound { controller: String, route: String },

    /// Named controller is not registered.
    #[error("no controller named '{name}'")]
    ControllerNotFound { name: String },

    /// A placeholder in the path pattern has no value.
    #[error("route '{route}': missing value for parameter '{param}'")]
    MissingParam { route: String, param: String },

    /// Child already has a parent.
    #[error("controller '{child}' is already mounted under '{parent}'")]
    AlreadyMounted { child: String, parent: String },

    /// Sibling with the same name already mounted.
    #[error("controller '{parent}' already has a child named '{child}'")]
    DuplicateChild { parent: String, child: String },

    /// Mounting would make the hierarchy cyclic.
    #[error("mount cycle detected involving: {cycle}")]
    MountCycle { cycle: String },

    /// Manifest names a parent that was not discovered.
    #[error("controller '{controller}': parent '{parent}' was not found")]
    MissingParent { controller: String, parent: String },

    /// Manifest references a factory nobody registered.
    #[error("controller '{controller}': unknown factory '{factory}'. Known factories: {known}")]
    UnknownFactory {
        controller: String,
        factory: String,
        known: String,
    },

    /// Manifest could not be read or parsed.
    #[error("manifest {path}: {details}")]
    InvalidManifest { path: String, details: String },

    /// No template matched any suggestion.
    #[error("no template found for view '{view}' (tried: {tried})")]
    TemplateNotFound { view: String, tried: String },

    /// Template engine failed while rendering.
    #[error("failed to render '{template}': {details}")]
    Render { template: String, details: String },
}

/// Result type alias using ControllerError.
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Application errors returned from request handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Controller(#[from] ControllerError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Controller(
                ControllerError::RouteNotFound { .. } | ControllerError::ControllerNotFound { .. },
            ) => StatusCode::NOT_FOUND,
            AppError::Controller(ControllerError::MissingParam { .. }) => StatusCode::BAD_REQUEST,
            AppError::Controller(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Server-side failures are logged and kept vague on the wire
        let body = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_map_to_404() {
        let err = AppError::from(ControllerError::RouteNotFound {
            controller: "users".to_string(),
            route: "show".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn missing_param_maps_to_400() {
        let err = AppError::from(ControllerError::MissingParam {
            route: "show".to_string(),
            param: "id".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn template_failures_are_500() {
        let err = AppError::from(ControllerError::TemplateNotFound {
            view: "index".to_string(),
            tried: "users/index, index".to_string(),
        });
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_name_the_controller() {
        let err = ControllerError::DuplicateRoute {
            controller: "users".to_string(),
            route: "index".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "controller 'users': route 'index' is already defined"
        );
    }
}
