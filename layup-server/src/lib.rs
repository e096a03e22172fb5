use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use layup_core::{Layout, SitePaths, TemplateError};
use tower_http::services::ServeDir;

/// Configuration for the preview server
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Auto-open browser
    pub open: bool,
    /// Layout, source and static locations to serve from
    pub paths: SitePaths,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            open: false,
            paths: SitePaths::default(),
        }
    }
}

/// A preview server that renders the source tree live.
///
/// Each request gets two passes: a matching file under the static tree
/// is served verbatim with the usual file-serving headers, and anything
/// else is resolved against the source tree and rendered through the
/// root layout on the spot. The layout is re-parsed per request, so an
/// edit on disk shows up on the next refresh without any cache to
/// invalidate.
pub struct PreviewServer {
    config: PreviewConfig,
}

impl PreviewServer {
    /// Create a new preview server with the given configuration
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }

    /// Run the preview server until the process is terminated
    pub async fn run(self) -> Result<()> {
        if !self.config.paths.source.exists() {
            return Err(anyhow::anyhow!(
                "Source directory does not exist: {}",
                self.config.paths.source.display()
            ));
        }

        let app = router(Arc::new(self.config.paths));

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        println!("Serving at http://{}", addr);

        if self.config.open {
            if let Err(e) = open::that(format!("http://{}", addr)) {
                eprintln!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Build the request router: static files first, live rendering as the
/// fallback.
pub fn router(paths: Arc<SitePaths>) -> Router {
    let state = AppState {
        paths: paths.clone(),
    };

    // Directories must fall through to the template pass, where they
    // resolve to their index.html.
    let static_files = ServeDir::new(&paths.static_dir)
        .append_index_html_on_directories(false)
        .fallback(get(render_page).with_state(state));

    Router::new()
        .fallback_service(static_files)
        .layer(middleware::from_fn(log_request))
}

#[derive(Clone)]
struct AppState {
    paths: Arc<SitePaths>,
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;
    println!("{} {} -> {}", method, path, response.status());
    response
}

#[derive(Debug)]
enum RequestError {
    NotExist,
    Io(std::io::Error),
    Template(TemplateError),
}

impl From<TemplateError> for RequestError {
    fn from(err: TemplateError) -> Self {
        RequestError::Template(err)
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::NotExist => write!(f, "path does not exist"),
            RequestError::Io(e) => write!(f, "IO error: {}", e),
            RequestError::Template(e) => write!(f, "Template error: {}", e),
        }
    }
}

async fn render_page(State(state): State<AppState>, uri: Uri) -> Response {
    match serve_template(&state.paths, uri.path()).await {
        Ok(response) => response,
        Err(RequestError::NotExist) => (StatusCode::NOT_FOUND, "not exist").into_response(),
        Err(e) => {
            eprintln!("Error rendering {}: {}", uri.path(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}

async fn serve_template(paths: &SitePaths, url_path: &str) -> Result<Response, RequestError> {
    let rel = sanitize(url_path).ok_or(RequestError::NotExist)?;
    let content = resolve(paths.source.join(rel)).await?;

    // Fresh parse per request so layout edits show up on refresh
    let layout = Layout::load(&paths.layout)?;
    let body = layout.compose(&content)?.render()?;

    let mime = mime_guess::from_path(&content).first_or(mime_guess::mime::TEXT_HTML_UTF_8);
    Ok(([(header::CONTENT_TYPE, mime.as_ref())], body).into_response())
}

/// Map a URL path to a relative filesystem path. Traversal components
/// are rejected outright.
fn sanitize(url_path: &str) -> Option<PathBuf> {
    let mut rel = PathBuf::new();
    for part in url_path.split('/') {
        match part {
            "" | "." => {}
            ".." => return None,
            part => rel.push(part),
        }
    }
    Some(rel)
}

/// Resolve a candidate path to the content file it names. A directory
/// resolves to its `index.html`, exactly once, so resolution always
/// terminates even if that member is itself a directory.
async fn resolve(mut candidate: PathBuf) -> Result<PathBuf, RequestError> {
    for _ in 0..2 {
        let meta = match tokio::fs::metadata(&candidate).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RequestError::NotExist);
            }
            Err(e) => return Err(RequestError::Io(e)),
        };
        if meta.is_dir() {
            candidate.push("index.html");
            continue;
        }
        return Ok(candidate);
    }

    Err(RequestError::NotExist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::path::Path;
    use tower::ServiceExt;

    const BASE: &str = "<html>{% block body %}{% endblock body %}</html>";

    fn page(body: &str) -> String {
        format!(
            "{{% extends \"base.html\" %}}{{% block body %}}{}{{% endblock body %}}",
            body
        )
    }

    fn write_file(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn fixture(dir: &Path) -> Router {
        let paths = SitePaths {
            layout: dir.join("base.html"),
            source: dir.join("source"),
            static_dir: dir.join("static"),
            output: dir.join("docs"),
        };
        write_file(&paths.layout, BASE);
        write_file(&paths.source.join("index.html"), &page("home"));
        write_file(&paths.source.join("x.html"), &page("rendered x"));
        write_file(&paths.source.join("guide/index.html"), &page("guide"));
        write_file(&paths.static_dir.join("x.html"), "<b>raw static</b>");
        router(Arc::new(paths))
    }

    async fn get_path(app: &Router, path: &str) -> (StatusCode, String) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn root_renders_source_index_through_layout() {
        let dir = tempfile::tempdir().unwrap();
        let app = fixture(dir.path());

        let (status, body) = get_path(&app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html>home</html>");
    }

    #[tokio::test]
    async fn missing_path_is_404_not_exist() {
        let dir = tempfile::tempdir().unwrap();
        let app = fixture(dir.path());

        let (status, body) = get_path(&app, "/nope.html").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "not exist");
    }

    #[tokio::test]
    async fn static_file_wins_over_source_template() {
        let dir = tempfile::tempdir().unwrap();
        let app = fixture(dir.path());

        let (status, body) = get_path(&app, "/x.html").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<b>raw static</b>");
    }

    #[tokio::test]
    async fn directory_resolves_to_its_index() {
        let dir = tempfile::tempdir().unwrap();
        let app = fixture(dir.path());

        let (dir_status, dir_body) = get_path(&app, "/guide/").await;
        let (file_status, file_body) = get_path(&app, "/guide/index.html").await;

        assert_eq!(dir_status, StatusCode::OK);
        assert_eq!(file_status, StatusCode::OK);
        assert_eq!(dir_body, "<html>guide</html>");
        assert_eq!(dir_body, file_body);
    }

    #[tokio::test]
    async fn rendered_pages_get_an_html_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let app = fixture(dir.path());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn broken_content_file_is_a_500() {
        let dir = tempfile::tempdir().unwrap();
        let app = fixture(dir.path());
        write_file(&dir.path().join("source/broken.html"), "{% endblock body %}");

        let (status, _) = get_path(&app, "/broken.html").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn sanitize_rejects_traversal() {
        assert!(sanitize("/../etc/passwd").is_none());
        assert!(sanitize("/a/../../b").is_none());
        assert_eq!(sanitize("/a//b.html"), Some(PathBuf::from("a/b.html")));
        assert_eq!(sanitize("/"), Some(PathBuf::new()));
    }

    #[tokio::test]
    async fn index_that_is_a_directory_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = fixture(dir.path());
        std::fs::create_dir_all(dir.path().join("source/odd/index.html")).unwrap();

        let (status, body) = get_path(&app, "/odd/").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "not exist");
    }
}
