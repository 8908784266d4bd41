//! Local preview server for a curriculum tree, so lesson pages and the
//! navigator can be exercised against a real HTTP origin during authoring.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::info;

#[derive(Clone)]
pub struct ServeConfig {
    pub addr: SocketAddr,
    /// Site root; the `curriculum/<lang>/<lesson>.html` tree lives beneath it.
    pub dir: PathBuf,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug)]
pub enum ServeError {
    Io(std::io::Error),
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServeError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for ServeError {}

impl From<std::io::Error> for ServeError {
    fn from(value: std::io::Error) -> Self {
        ServeError::Io(value)
    }
}

pub async fn serve(config: ServeConfig) -> Result<(), ServeError> {
    let router = build_router(&config.dir);
    info!(
        addr = %config.addr,
        dir = %config.dir.display(),
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("preview server exited");
    Ok(())
}

fn build_router(dir: &Path) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .fallback_service(ServeDir::new(dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CompressionLayer::new())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "coursenav-preview" }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(all(test, feature = "serve"))]
mod tests {
    use super::*;
    use axum::{body, body::Body, http::Request};
    use std::fs;
    use tower::ServiceExt;

    #[tokio::test]
    async fn healthz_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(dir.path());
        let response = router
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_success());
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("coursenav-preview"));
    }

    #[tokio::test]
    async fn serves_lesson_pages_from_the_curriculum_tree() {
        let dir = tempfile::tempdir().unwrap();
        let lesson_dir = dir.path().join("curriculum/python");
        fs::create_dir_all(&lesson_dir).unwrap();
        fs::write(
            lesson_dir.join("intro.html"),
            r#"<html><body><div id="description">hello</div></body></html>"#,
        )
        .unwrap();

        let router = build_router(dir.path());
        let response = router
            .oneshot(
                Request::get("/curriculum/python/intro.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(r#"id="description""#));
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(dir.path());
        let response = router
            .oneshot(
                Request::get("/curriculum/rust/ownership.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
