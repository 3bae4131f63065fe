//! Editor server command.

use std::path::PathBuf;

use anyhow::Result;
use sitegen_core::{Document, FormValues};
use sitegen_editor::{Editor, EditorOptions};
use sitegen_server::{EditorServer, ServerConfig};

use crate::config::{self, ConfigFile};

/// Run the editor.
pub async fn run(
    config: &ConfigFile,
    port: Option<u16>,
    open: bool,
    form_path: PathBuf,
    offline: bool,
) -> Result<()> {
    let form = FormValues::load(&form_path)?;
    let gateway = config::gateway(&config.gateway, offline)?;

    let editor = Editor::new(
        gateway,
        EditorOptions {
            document: Document::scaffold(),
            form,
            history_limit: config.editor.history_limit,
        },
    );

    let port = port.unwrap_or(config.editor.port);
    tracing::info!("Starting editor on port {}", port);

    let server_config = ServerConfig {
        port,
        host: config.editor.host.clone(),
        open: open && config.editor.open,
        form_path: Some(form_path),
    };

    EditorServer::new(server_config, editor).start().await?;

    Ok(())
}
