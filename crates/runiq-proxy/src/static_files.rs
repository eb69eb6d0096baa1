//! Static file handler for GET/HEAD requests.
//!
//! Paths are resolved against an explicit root directory; anything that
//! would escape it is treated as missing. File bodies are streamed by
//! [`ServeFile`], with the content type taken from an explicit
//! extension-to-MIME table.

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Files tried, in order, when a directory is requested.
const INDEX_FILES: &[&str] = &["index.html", "index.htm"];

/// Fallback MIME type for unknown extensions.
const DEFAULT_MIME: &str = "application/octet-stream";

/// MIME type for a file path, by extension (case-insensitive).
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "text/javascript",
        Some("json") | Some("map") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/vnd.microsoft.icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("wasm") => "application/wasm",
        Some("pdf") => "application/pdf",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => DEFAULT_MIME,
    }
}

/// Static file server rooted at one directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a decoded URL path onto the filesystem.
    ///
    /// Returns `None` for `..` segments or segments containing a backslash.
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let mut resolved = self.root.clone();
        for segment in url_path.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                s if s.contains('\\') || s.contains('\0') => return None,
                s => resolved.push(s),
            }
        }
        Some(resolved)
    }

    /// Serve a GET or HEAD request.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let raw_path = request.uri().path().to_string();

        let Ok(decoded) = urlencoding::decode(&raw_path) else {
            return not_found();
        };
        let Some(fs_path) = self.resolve(&decoded) else {
            tracing::debug!(path = %raw_path, "Rejected path outside static root");
            return not_found();
        };

        let Ok(metadata) = tokio::fs::metadata(&fs_path).await else {
            return not_found();
        };

        if !metadata.is_dir() {
            return serve_file(&fs_path, request).await;
        }

        if !raw_path.ends_with('/') {
            let location = match request.uri().query() {
                Some(q) => format!("{}/?{}", raw_path, q),
                None => format!("{}/", raw_path),
            };
            return redirect(&location);
        }

        for index in INDEX_FILES {
            let candidate = fs_path.join(index);
            if tokio::fs::metadata(&candidate)
                .await
                .is_ok_and(|m| m.is_file())
            {
                return serve_file(&candidate, request).await;
            }
        }

        let head = *request.method() == Method::HEAD;
        match directory_listing(&fs_path, &decoded).await {
            Ok(html) if head => {
                let mut response = Html(html).into_response();
                *response.body_mut() = Body::empty();
                response
            }
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::warn!(path = %fs_path.display(), error = %e, "Failed to list directory");
                not_found()
            }
        }
    }
}

/// Stream one file, then replace the guessed content type with ours.
async fn serve_file(path: &Path, request: Request<Body>) -> Response {
    let response = match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let mut response = response.map(Body::new);

    if response.status().is_success() {
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(mime_for(path)),
        );
    }
    if response.status() == StatusCode::NOT_FOUND {
        tracing::warn!(path = %path.display(), "File vanished before it could be served");
        return not_found();
    }

    response
}

/// HTML listing of a directory, directories marked with a trailing slash.
async fn directory_listing(dir: &Path, display_path: &str) -> std::io::Result<String> {
    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
        entries.push((name, is_dir));
    }
    entries.sort_by_key(|(name, _)| name.to_lowercase());

    let title = format!("Directory listing for {}", escape_html(display_path));
    let mut html = format!(
        "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );
    for (name, is_dir) in entries {
        let suffix = if is_dir { "/" } else { "" };
        html.push_str(&format!(
            "<li><a href=\"{}{suffix}\">{}{suffix}</a></li>\n",
            urlencoding::encode(&name),
            escape_html(&name),
        ));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(html)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}

fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response(),
        Err(_) => not_found(),
    }
}
