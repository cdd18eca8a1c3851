//! Development server.
//!
//! A `tiny_http` loop serving the rendered pages and the file trees they
//! reference:
//!
//! | Route        | Source                                  |
//! |--------------|-----------------------------------------|
//! | `/`          | home page, rendered per request         |
//! | `/admin`     | record listing with previews            |
//! | `/static/..` | `paths.static_dir` (Figma exports live here) |
//! | `/media/..`  | `paths.media` (uploaded images)         |
//!
//! Pages are rendered on every request, so edits made with `yoga admin set`
//! or a fresh `yoga export` show up on reload.

use crate::{admin, config::SiteConfig, log, store::SiteStore, view};
use anyhow::{Context, Result};
use std::{
    fs,
    io::Cursor,
    net::SocketAddr,
    path::{Component, Path, PathBuf},
    sync::Arc,
};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the development server. Blocks until Ctrl+C is received.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    let interface: std::net::IpAddr = config.serve.interface.parse()?;
    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                // Port 0 asks the OS for a free port; report the real one
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Routing
// ============================================================================

/// What a request path resolves to.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    Home,
    Admin,
    File(PathBuf),
    NotFound,
}

/// Map a raw request URL to a route.
///
/// The query string is split off before decoding, so an encoded `%3F` stays
/// part of the path. Paths with `..` or any other non-normal component never
/// resolve to a file.
fn route(url: &str, config: &SiteConfig) -> Route {
    let path_without_query = url.split('?').next().unwrap_or(url);
    let url_path = urlencoding::decode(path_without_query)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    let request_path = url_path.trim_matches('/');

    match request_path {
        "" => return Route::Home,
        "admin" => return Route::Admin,
        _ => {}
    }

    let (root, rest) = if let Some(rest) = request_path.strip_prefix("static/") {
        (&config.paths.static_dir, rest)
    } else if let Some(rest) = request_path.strip_prefix("media/") {
        (&config.paths.media, rest)
    } else {
        return Route::NotFound;
    };

    match safe_join(root, rest) {
        Some(path) if path.is_file() => Route::File(path),
        _ => Route::NotFound,
    }
}

/// Join `relative` under `root`, refusing anything that could escape it.
fn safe_join(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let is_plain = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    (is_plain && !relative.as_os_str().is_empty()).then(|| root.join(relative))
}

fn handle_request(request: Request, config: &SiteConfig) -> Result<()> {
    if !matches!(request.method(), Method::Get | Method::Head) {
        return serve_status(request, 405, "405 Method Not Allowed");
    }

    match route(request.url(), config) {
        Route::Home => {
            let mut store = SiteStore::open(&config.paths.store)?;
            let ctx = view::HomeContext::load(&mut store, config)?;
            serve_html(request, view::render_home(&ctx))
        }
        Route::Admin => {
            let mut store = SiteStore::open(&config.paths.store)?;
            serve_html(request, admin::render_admin_page(&mut store)?)
        }
        Route::File(path) => serve_file(request, &path),
        Route::NotFound => serve_status(request, 404, "404 Not Found"),
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = guess_content_type(path);

    let response = Response::from_data(content)
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());

    request.respond(response)?;
    Ok(())
}

/// Serve HTML content.
fn serve_html(request: Request, content: String) -> Result<()> {
    let response = Response::from_string(content)
        .with_header(Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap());
    request.respond(response)?;
    Ok(())
}

/// Serve a plain-text status response.
fn serve_status(request: Request, status: u16, body: &'static str) -> Result<()> {
    let response = Response::new(
        StatusCode(status),
        vec![Header::from_bytes("Content-Type", "text/plain").unwrap()],
        Cursor::new(body),
        Some(body.len()),
        None,
    );
    request.respond(response)?;
    Ok(())
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        _ => "application/octet-stream",
    }
}
