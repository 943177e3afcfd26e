#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Each [`TestApp`] owns freshly leaked registries so tests never share the
//! process-wide ones and can run in parallel.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use switchyard::locale::LocaleService;
use switchyard::view::ViewEngine;
use switchyard::{AppState, Config, Controller, ControllerRegistry, ShortcutRegistry};

/// Fresh registries with `'static` lifetime, as `AppState` expects.
pub fn leak_registries() -> (&'static ControllerRegistry, &'static ShortcutRegistry) {
    (
        Box::leak(Box::new(ControllerRegistry::new())),
        Box::leak(Box::new(ShortcutRegistry::new())),
    )
}

/// Router plus the state and registries behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub controllers: &'static ControllerRegistry,
    pub shortcuts: &'static ShortcutRegistry,
}

impl TestApp {
    /// Serve `roots` with an empty view engine.
    pub fn new(
        roots: &[Controller],
        controllers: &'static ControllerRegistry,
        shortcuts: &'static ShortcutRegistry,
    ) -> Self {
        Self::with_views(roots, controllers, shortcuts, |_, _| {})
    }

    /// Serve `roots`, letting `setup` add templates and translations first.
    pub fn with_views(
        roots: &[Controller],
        controllers: &'static ControllerRegistry,
        shortcuts: &'static ShortcutRegistry,
        setup: impl FnOnce(&mut ViewEngine, &LocaleService),
    ) -> Self {
        let config = Config::default();
        let locale = Arc::new(LocaleService::new());
        let mut views =
            ViewEngine::empty(controllers, Arc::clone(&locale), &config.default_language);
        setup(&mut views, &locale);

        let state = AppState::from_parts(config, views, locale, controllers, shortcuts);
        let router = switchyard::app::router(roots)
            .expect("routes should not conflict")
            .with_state(state.clone());

        Self {
            router,
            state,
            controllers,
            shortcuts,
        }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a request with the given method and return status and body.
    pub async fn send(&self, method: &str, uri: &str) -> (StatusCode, String) {
        let response = self
            .request(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        let status = response.status();
        (status, body_string(response).await)
    }

    /// GET `uri` and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send("GET", uri).await
    }

    /// GET `uri`, assert 200 and parse the body as JSON.
    pub async fn get_json(&self, uri: &str) -> serde_json::Value {
        let (status, body) = self.get(uri).await;
        assert_eq!(status, StatusCode::OK, "GET {uri} returned {status}: {body}");
        serde_json::from_str(&body).expect("response is not JSON")
    }
}

/// Collect a response body into a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body is not UTF-8")
}

/// Temporary directory removed on drop.
pub struct TestDir {
    path: PathBuf,
}

impl TestDir {
    pub fn new(prefix: &str) -> Self {
        let path = std::env::temp_dir().join(format!("switchyard-{prefix}-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&path).expect("Failed to create test directory");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `content` to `file` inside the directory.
    pub fn write(&self, file: &str, content: &str) -> PathBuf {
        let path = self.path.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
