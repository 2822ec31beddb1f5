//! Development server with live reload via Server-Sent Events.
//!
//! Every request goes through one dispatcher that matches URL prefixes in
//! order: the event stream, the API stub, then static files from the served
//! directory with a single-page fallback.

use crate::dev::{Broadcaster, ConnectionId, DevConfig, ServeConfig, SharedState, SseFrame};
use crate::error::{CliError, Result};
use axum::{
    body::Body,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use regex::Regex;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tower_http::trace::TraceLayer;

static CACHE_BUSTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?version=\d+").expect("cache buster pattern is valid"));

/// Where a request is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Live-reload event stream
    Events,
    /// Backend API, unavailable in development
    Api,
    /// Static file lookup with the cache buster removed
    Static(String),
}

/// Dispatch a request target (path plus query) by prefix.
///
/// Prefixes match at the start of the target with either `/` or `\` as the
/// leading separator, and without a segment boundary: `/esbuild-x` is still
/// the event stream.
pub fn route(target: &str, serve: &ServeConfig) -> Route {
    if has_prefix(target, &serve.events_prefix) {
        Route::Events
    } else if has_prefix(target, &serve.api_prefix) {
        Route::Api
    } else {
        Route::Static(strip_cache_buster(target))
    }
}

fn has_prefix(target: &str, prefix: &str) -> bool {
    let (Some(rest), Some(name)) = (
        target.strip_prefix(['/', '\\']),
        prefix.strip_prefix('/'),
    ) else {
        return false;
    };
    rest.starts_with(name)
}

/// Remove the first `?version=<digits>` from a request target.
pub fn strip_cache_buster(target: &str) -> String {
    CACHE_BUSTER.replace(target, "").into_owned()
}

/// Map a request path onto the served directory.
///
/// Anything that is not an existing regular file below the served directory
/// resolves to the entry document. Targets with `..` or other non-plain
/// components never leave the served directory.
pub async fn resolve_static(serve: &ServeConfig, request_path: &str) -> PathBuf {
    let relative = Path::new(request_path.trim_start_matches(['/', '\\']));
    let plain = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));

    if relative.as_os_str().is_empty() || !plain {
        return serve.index_path.clone();
    }

    let candidate = serve.serve_dir.join(relative);
    match tokio::fs::metadata(&candidate).await {
        Ok(meta) if meta.is_file() => candidate,
        _ => serve.index_path.clone(),
    }
}

/// Content type by (case-insensitive) file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "js" => "application/javascript",
        "css" => "text/css",
        "html" => "text/html",
        "png" => "image/png",
        "jpg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Development server bound to its listening socket.
pub struct DevServer {
    listener: TcpListener,
    state: SharedState,
}

impl DevServer {
    /// Bind the listener.
    ///
    /// # Errors
    ///
    /// Returns error if the address is in use or cannot be bound. There is
    /// no fallback port: open tabs reconnect to the configured one.
    pub async fn bind(addr: SocketAddr, state: SharedState) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        Ok(Self { listener, state })
    }

    /// Bind to the address from `config`.
    pub async fn start(config: &DevConfig, state: SharedState) -> Result<Self> {
        Self::bind(config.addr, state).await
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` flips to `true`.
    ///
    /// Open event streams are closed once the signal arrives so the graceful
    /// shutdown does not wait on them.
    pub async fn serve(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let broadcaster = self.state.broadcaster.clone();
        let app = router(self.state);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                // A dropped sender also means shut down
                let _ = shutdown.wait_for(|stop| *stop).await;
                broadcaster.close_all();
            })
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Build the router. Dispatch is prefix based, so everything is a fallback.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dispatch(State(state): State<SharedState>, method: Method, uri: Uri) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    tracing::debug!(%method, "requested {}", target);

    match route(target, &state.serve) {
        Route::Events => handle_events(&state).into_response(),
        Route::Api => handle_api(&state.serve.api_prefix).into_response(),
        Route::Static(path) => handle_static(&state.serve, &path).await.into_response(),
    }
}

/// Unregisters the connection when the response body is dropped.
struct ConnectionGuard {
    id: ConnectionId,
    broadcaster: Arc<Broadcaster>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.broadcaster.unsubscribe(self.id);
    }
}

/// Open an event stream: `retry` first, then every broadcast frame.
pub fn handle_events(state: &SharedState) -> impl IntoResponse {
    let (id, rx) = state.broadcaster.subscribe();
    let guard = ConnectionGuard {
        id,
        broadcaster: state.broadcaster.clone(),
    };
    let retry = SseFrame::Retry(state.serve.retry);

    // The guard lives as long as the body stream
    let frames = tokio_stream::once(retry)
        .chain(ReceiverStream::new(rx))
        .map(move |frame| {
            let _guard = &guard;
            Ok::<_, Infallible>(frame.to_bytes())
        });

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(frames),
    )
}

/// Fixed 501 for any method and sub-path of the API prefix.
pub fn handle_api(api_prefix: &str) -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(serde_json::json!({
            "detail": format!("{} is not available in local development mode", api_prefix),
        })),
    )
}

/// Serve a file from the served directory, or the entry document.
pub async fn handle_static(serve: &ServeConfig, request_path: &str) -> Response {
    let file = resolve_static(serve, request_path).await;

    match tokio::fs::read(&file).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type_for(&file))],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("failed to read {}: {}", file.display(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                format!("500 - Could not load {}", file.display()),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn serve_config(dir: &Path) -> ServeConfig {
        ServeConfig {
            serve_dir: dir.to_path_buf(),
            index_path: dir.join("index.html"),
            events_prefix: "/esbuild".to_string(),
            api_prefix: "/api".to_string(),
            retry: Duration::from_secs(10),
        }
    }

    #[test]
    fn test_route_prefixes() {
        let serve = serve_config(Path::new("/srv"));

        assert_eq!(route("/esbuild", &serve), Route::Events);
        assert_eq!(route("\\esbuild", &serve), Route::Events);
        assert_eq!(route("/esbuild?t=1", &serve), Route::Events);
        assert_eq!(route("/api/flows?page=2", &serve), Route::Api);
        assert_eq!(route("\\api", &serve), Route::Api);
        assert_eq!(
            route("/flows/esbuild", &serve),
            Route::Static("/flows/esbuild".to_string())
        );
    }

    #[test]
    fn test_cache_buster_pattern_compiles() {
        assert!(CACHE_BUSTER.is_match("?version=1"));
    }

    #[test]
    fn test_strip_cache_buster() {
        assert_eq!(strip_cache_buster("/a.js?version=1&version=2"), "/a.js&version=2");
        assert_eq!(strip_cache_buster("/index.js?version=1712"), "/index.js");
        assert_eq!(strip_cache_buster("/index.js?version=abc"), "/index.js?version=abc");
        assert_eq!(strip_cache_buster("/flows"), "/flows");
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("index.js")), "application/javascript");
        assert_eq!(content_type_for(Path::new("index.css")), "text/css");
        assert_eq!(content_type_for(Path::new("INDEX.HTML")), "text/html");
        assert_eq!(content_type_for(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(content_type_for(Path::new("photo.jpg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("photo.jpeg")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("index.js.map")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("LICENSE")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_resolve_static_fallbacks() {
        let temp = tempfile::TempDir::new().unwrap();
        let serve = serve_config(temp.path());
        std::fs::write(temp.path().join("index.js"), "export {}").unwrap();
        std::fs::create_dir(temp.path().join("assets")).unwrap();

        assert_eq!(
            resolve_static(&serve, "/index.js").await,
            temp.path().join("index.js")
        );
        assert_eq!(resolve_static(&serve, "/").await, serve.index_path);
        assert_eq!(resolve_static(&serve, "/flows/42").await, serve.index_path);
        // Directories are not files
        assert_eq!(resolve_static(&serve, "/assets").await, serve.index_path);
        assert_eq!(
            resolve_static(&serve, "/../index.js").await,
            serve.index_path
        );
    }

    #[tokio::test]
    async fn test_static_read_failure_is_500() {
        let temp = tempfile::TempDir::new().unwrap();
        let serve = serve_config(temp.path());

        // No index.html to fall back to
        let response = handle_static(&serve, "/missing").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("500 - Could not load"));
        assert!(text.contains("index.html"));
    }

    #[tokio::test]
    async fn test_api_stub() {
        let response = handle_api("/api").into_response();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["detail"],
            "/api is not available in local development mode"
        );
    }
}
