//! Initialize a sitegen project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing sitegen...");

    write_if_missing(Path::new("sitegen.toml"), DEFAULT_CONFIG, yes)?;
    write_if_missing(Path::new("form.json"), DEFAULT_FORM, yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Set SITEGEN_API_KEY, then run 'sitegen edit' to start the editor.");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        tracing::warn!("{} already exists. Use --yes to overwrite.", path.display());
        return Ok(());
    }

    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Created {}", path.display());
    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# sitegen configuration

[gateway]
# OpenAI-compatible chat completions endpoint
api_url = "https://api.openai.com/v1/chat/completions"
model = "gpt-4o-mini"

# Environment variable holding the API key
api_key_env = "SITEGEN_API_KEY"

timeout_secs = 60
max_tokens = 2048
temperature = 0.7

[editor]
host = "127.0.0.1"
port = 7878
open = true

# Maximum undo depth
history_limit = 100

[output]
# Directory for your-website.html
dir = "out"
"#;

const DEFAULT_FORM: &str = r#"{
  "cssLibrary": "tailwind",
  "colors": "",
  "mapAddress": "",
  "mapCity": "",
  "additionalInfo": ""
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use sitegen_core::FormValues;
    use tempfile::tempdir;

    #[test]
    fn default_files_parse() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("sitegen.toml");
        let form_path = temp.path().join("form.json");

        write_if_missing(&config_path, DEFAULT_CONFIG, false).unwrap();
        write_if_missing(&form_path, DEFAULT_FORM, false).unwrap();

        assert_eq!(config::load(&config_path).unwrap().editor.port, 7878);
        assert_eq!(FormValues::load(&form_path).unwrap().css_library, "tailwind");
    }

    #[test]
    fn keeps_existing_files_without_overwrite() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("form.json");
        fs::write(&path, "{}").unwrap();

        write_if_missing(&path, DEFAULT_FORM, false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }
}
