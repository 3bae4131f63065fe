//! Editor server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use sitegen_core::{BlockName, FormPatch, FormValues, SAVE_FILE_NAME, SAVE_MIME_TYPE};
use sitegen_editor::{Editor, EditorError, EditorEvent, NoticeLevel, Status};

use crate::live::{encode_event, live_client_script};
use crate::page::{PageContext, PageTemplates, SectionOption};
use crate::watcher::{FormEvent, FormWatcher};

/// Configuration for the editor server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Form values file to watch for external edits
    pub form_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 7878,
            host: "127.0.0.1".to_string(),
            open: true,
            form_path: None,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Shared server state.
pub struct ServerState {
    editor: Editor,
    templates: PageTemplates,
}

type AppState = Arc<ServerState>;

/// Editor server.
pub struct EditorServer {
    config: ServerConfig,
    editor: Editor,
}

impl EditorServer {
    /// Create a server for an existing editing session.
    pub fn new(config: ServerConfig, editor: Editor) -> Self {
        Self { config, editor }
    }

    /// Start the editor server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ServerError::InvalidAddress(e.to_string()))?;

        if let Some(form_path) = &self.config.form_path {
            let (watcher, mut rx) =
                FormWatcher::new(form_path).map_err(|e| ServerError::WatchError(e.to_string()))?;

            let editor = self.editor.clone();
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    handle_form_event(&editor, event).await;
                }
                // Keep watcher alive
                drop(watcher);
            });
        }

        let app = router(Arc::new(ServerState::new(self.editor.clone())));

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        tracing::info!("Editor running at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::debug!("Could not open browser: {}", e);
            }
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/preview", get(preview_handler))
        .route("/download", get(download_handler))
        .route("/__live", get(ws_handler))
        .route("/__live.js", get(live_script_handler))
        .route("/api/document", get(document_handler))
        .route("/api/code", get(code_handler))
        .route("/api/form", get(form_handler).put(update_form_handler))
        .route("/api/head", post(head_handler))
        .route("/api/blocks", post(add_block_handler))
        .route("/api/regenerate", post(regenerate_handler))
        .route("/api/undo", post(undo_handler))
        .route("/api/reorder", post(reorder_handler))
        .with_state(state)
}

impl ServerState {
    pub fn new(editor: Editor) -> Self {
        Self {
            editor,
            templates: PageTemplates::new(),
        }
    }
}

/// Reload form values after the watched file changes.
async fn handle_form_event(editor: &Editor, event: FormEvent) {
    match event {
        FormEvent::Changed(path) => match FormValues::load(&path) {
            Ok(form) => {
                tracing::info!("Reloaded form values from {}", path.display());
                editor.replace_form(form).await;
            }
            Err(e) => {
                tracing::warn!("{}", e);
                editor.events().send(EditorEvent::Notice {
                    level: NoticeLevel::Warning,
                    message: e.to_string(),
                });
            }
        },
        FormEvent::Removed(path) => {
            tracing::info!("Form file {} removed, keeping current values", path.display());
        }
    }
}

/// Action failure as an HTTP response.
struct ApiError(EditorError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EditorError::Busy => StatusCode::CONFLICT,
            EditorError::Gateway(_) => StatusCode::BAD_GATEWAY,
            EditorError::NotAddable(_) | EditorError::NotRegenerable(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            EditorError::NothingToRegenerate | EditorError::StaleTarget => StatusCode::CONFLICT,
            EditorError::Document(_) => StatusCode::BAD_REQUEST,
            EditorError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

impl From<EditorError> for ApiError {
    fn from(e: EditorError) -> Self {
        Self(e)
    }
}

/// Handler for the editor page.
async fn index_handler(State(state): State<AppState>) -> Response {
    let snapshot = state.editor.snapshot().await;
    let ctx = PageContext {
        form_summary: snapshot.form_summary,
        additional_info: snapshot.form.additional_info,
        code: snapshot.code,
        blocks: snapshot.blocks,
        sections: SectionOption::all(),
        fetching: snapshot.status == Status::Fetching,
    };

    match state.templates.render_editor(&ctx) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render editor page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render editor page").into_response()
        }
    }
}

/// Handler for the raw page, isolated from the editor origin.
async fn preview_handler(State(state): State<AppState>) -> impl IntoResponse {
    let code = state.editor.code().await;
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (
                header::CONTENT_SECURITY_POLICY,
                "sandbox allow-scripts allow-same-origin",
            ),
        ],
        code,
    )
}

/// Handler for saving the page as a file.
async fn download_handler(State(state): State<AppState>) -> impl IntoResponse {
    let code = state.editor.code().await;
    let disposition = format!("attachment; filename=\"{}\"", SAVE_FILE_NAME);
    (
        [
            (header::CONTENT_TYPE, SAVE_MIME_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        code,
    )
}

/// Handler for the text the Copy button puts on the clipboard.
async fn code_handler(State(state): State<AppState>) -> impl IntoResponse {
    let code = state.editor.code().await;
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], code)
}

async fn document_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.editor.snapshot().await)
}

async fn form_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.editor.form().await)
}

async fn update_form_handler(
    State(state): State<AppState>,
    Json(patch): Json<FormPatch>,
) -> impl IntoResponse {
    Json(state.editor.update_form(patch).await)
}

async fn head_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.editor.generate_head().await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBlockRequest {
    name: BlockName,
    #[serde(default)]
    additional_info: Option<String>,
}

async fn add_block_handler(
    State(state): State<AppState>,
    Json(req): Json<AddBlockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .editor
        .add_block(req.name, req.additional_info)
        .await?;
    Ok(Json(outcome))
}

async fn regenerate_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.editor.regenerate_last().await?;
    Ok(Json(outcome))
}

async fn undo_handler(State(state): State<AppState>) -> impl IntoResponse {
    let undone = state.editor.undo().await;
    Json(serde_json::json!({ "undone": undone }))
}

#[derive(Debug, Deserialize)]
struct ReorderRequest {
    from: usize,
    to: usize,
}

async fn reorder_handler(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.editor.reorder(req.from, req.to).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for the live update WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Forward editor events to one browser.
async fn handle_ws(mut socket: WebSocket, state: AppState) {
    let mut rx = state.editor.events().subscribe();
    tracing::debug!(
        "Live client connected ({} listening)",
        state.editor.events().subscriber_count()
    );

    // Start the client from the current document
    let initial = state.editor.document_event().await;
    if !send_event(&mut socket, &initial).await {
        return;
    }

    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!("Live client lagged by {} events, resyncing", skipped);
                state.editor.document_event().await
            }
            Err(RecvError::Closed) => break,
        };
        if !send_event(&mut socket, &event).await {
            break;
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &EditorEvent) -> bool {
    let Some(json) = encode_event(event) else {
        return true;
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

/// Handler for the live client script.
async fn live_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        live_client_script(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use sitegen_editor::EditorOptions;
    use sitegen_gateway::{FixtureGateway, Gateway, GatewayError, Generated};

    struct FailingGateway;

    #[async_trait]
    impl Gateway for FailingGateway {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn create_head_info(
            &self,
            _form: &FormValues,
            _body_html: &str,
        ) -> Result<Generated, GatewayError> {
            Err(GatewayError::Connect("refused".to_string()))
        }

        async fn create_html_block(
            &self,
            _name: BlockName,
            _form: &FormValues,
        ) -> Result<Generated, GatewayError> {
            Err(GatewayError::Connect("refused".to_string()))
        }
    }

    fn state_with(gateway: Arc<dyn Gateway>) -> AppState {
        Arc::new(ServerState::new(Editor::new(
            gateway,
            EditorOptions::default(),
        )))
    }

    fn fixture_state() -> AppState {
        state_with(Arc::new(FixtureGateway::new()))
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn creates_server_with_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7878);
        assert!(config.form_path.is_none());
    }

    #[tokio::test]
    async fn preview_copy_and_download_match() {
        let state = fixture_state();
        add_block_handler(
            State(Arc::clone(&state)),
            Json(AddBlockRequest {
                name: BlockName::Footer,
                additional_info: None,
            }),
        )
        .await
        .map_err(|e| e.0)
        .unwrap();

        let code = state.editor.code().await;
        let preview = body_text(preview_handler(State(Arc::clone(&state))).await.into_response()).await;
        let copied = body_text(code_handler(State(Arc::clone(&state))).await.into_response()).await;
        let saved = body_text(download_handler(State(Arc::clone(&state))).await.into_response()).await;

        assert!(code.contains("<footer"));
        assert_eq!(preview, code);
        assert_eq!(copied, code);
        assert_eq!(saved, code);
    }

    #[tokio::test]
    async fn download_is_named_html_attachment() {
        let response = download_handler(State(fixture_state())).await.into_response();

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/html");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"your-website.html\""
        );
    }

    #[tokio::test]
    async fn renders_editor_with_empty_form() {
        let response = index_handler(State(fixture_state())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("cssLibrary"));
        assert!(html.contains("Add Navigation"));
    }

    #[tokio::test]
    async fn gateway_failure_maps_to_bad_gateway() {
        let state = state_with(Arc::new(FailingGateway));
        let before = state.editor.document().await;

        let response = match head_handler(State(Arc::clone(&state))).await {
            Ok(_) => panic!("expected failure"),
            Err(e) => e.into_response(),
        };

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(response).await.contains("refused"));
        assert_eq!(state.editor.status(), Status::Idle);
        assert_eq!(state.editor.document().await, before);
    }

    #[tokio::test]
    async fn regenerate_without_block_is_conflict() {
        let response = match regenerate_handler(State(fixture_state())).await {
            Ok(_) => panic!("expected failure"),
            Err(e) => e.into_response(),
        };

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn undo_on_fresh_session_reports_nothing() {
        let response = undo_handler(State(fixture_state())).await.into_response();
        assert_eq!(body_text(response).await, r#"{"undone":false}"#);
    }

    #[tokio::test]
    async fn out_of_range_reorder_is_bad_request() {
        let result = reorder_handler(
            State(fixture_state()),
            Json(ReorderRequest { from: 0, to: 9 }),
        )
        .await;

        let response = match result {
            Ok(_) => panic!("expected failure"),
            Err(e) => e.into_response(),
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reloads_form_on_file_change() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("form.json");
        std::fs::write(&path, r#"{"mapCity":"Bergen"}"#).unwrap();
        let state = fixture_state();

        handle_form_event(&state.editor, FormEvent::Changed(path)).await;

        assert_eq!(state.editor.form().await.map_city, "Bergen");
    }
}
