//! Saved page viewer command.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue},
    middleware,
    response::Response,
    Router,
};
use sitegen_core::SAVE_FILE_NAME;
use tower_http::services::ServeFile;

/// Serve a saved page on its own origin.
///
/// `path` is either the saved file or the directory it was saved into.
pub async fn run(port: u16, path: PathBuf, open: bool) -> Result<()> {
    let page = resolve_page(&path)?;

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Serving {} at http://{}", page.display(), addr);

    if open {
        let url = format!("http://{}", addr);
        if let Err(e) = open::that(&url) {
            tracing::debug!("Could not open browser: {}", e);
        }
    }

    axum::serve(listener, viewer(&page)).await?;

    Ok(())
}

fn resolve_page(path: &Path) -> Result<PathBuf> {
    let page = if path.is_dir() {
        path.join(SAVE_FILE_NAME)
    } else {
        path.to_path_buf()
    };

    if !page.is_file() {
        anyhow::bail!(
            "Saved page not found: {}. Run 'sitegen generate' or save from the editor first.",
            page.display()
        );
    }

    Ok(page)
}

/// Router that answers every path with the saved page.
fn viewer(page: &Path) -> Router {
    Router::new()
        .fallback_service(ServeFile::new(page))
        .layer(middleware::map_response(sandbox))
}

/// Generated markup gets the same isolation as the editor preview.
async fn sandbox(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("sandbox allow-scripts"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resolves_saved_file_inside_directory() {
        let temp = tempdir().unwrap();
        let page = temp.path().join(SAVE_FILE_NAME);
        fs::write(&page, "<html></html>").unwrap();

        assert_eq!(resolve_page(temp.path()).unwrap(), page);
        assert_eq!(resolve_page(&page).unwrap(), page);
    }

    #[test]
    fn missing_page_is_an_error() {
        let temp = tempdir().unwrap();

        let err = resolve_page(temp.path()).unwrap_err();

        assert!(err.to_string().contains("Saved page not found"));
    }

    #[tokio::test]
    async fn responses_are_sandboxed() {
        let response = sandbox(Response::new(Body::empty())).await;

        assert_eq!(
            response.headers()[header::CONTENT_SECURITY_POLICY],
            "sandbox allow-scripts"
        );
    }
}
