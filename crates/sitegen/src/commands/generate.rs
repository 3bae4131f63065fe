//! Non-interactive page generation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use sitegen_core::{BlockName, Document, FormValues};
use sitegen_editor::{Editor, EditorOptions};

use crate::config::{self, ConfigFile};

/// Parse section arguments, rejecting anything that cannot be added.
fn parse_sections(sections: &[String]) -> Result<Vec<BlockName>> {
    sections
        .iter()
        .map(|s| {
            let name: BlockName = s.parse()?;
            if !name.is_addable() {
                anyhow::bail!("{} cannot be added as a section", s);
            }
            Ok(name)
        })
        .collect()
}

/// Run the generate command.
pub async fn run(
    config: &ConfigFile,
    sections: &[String],
    head: bool,
    out: Option<PathBuf>,
    form_path: PathBuf,
    offline: bool,
) -> Result<()> {
    let names = parse_sections(sections)?;
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

    for name in names {
        let outcome = editor
            .add_block(name, None)
            .await
            .with_context(|| format!("Failed to generate {}", name))?;
        if outcome.empty {
            tracing::warn!("{} came back empty", name);
        } else {
            tracing::info!("Added {} at position {}", name, outcome.index);
        }
    }

    // Head last, so it can describe the finished body
    if head {
        editor
            .generate_head()
            .await
            .context("Failed to generate head")?;
        tracing::info!("Generated head");
    }

    let out_dir = out.unwrap_or_else(|| PathBuf::from(&config.output.dir));
    let path = editor.save_to(&out_dir).await?;
    tracing::info!("Output: {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_short_and_wire_names() {
        let names = parse_sections(&["navigation".to_string(), "createFooter".to_string()]).unwrap();
        assert_eq!(names, vec![BlockName::Navigation, BlockName::Footer]);
    }

    #[test]
    fn rejects_head_and_unknown_sections() {
        assert!(parse_sections(&["head".to_string()]).is_err());
        assert!(parse_sections(&["sidebar".to_string()]).is_err());
    }

    #[tokio::test]
    async fn generates_offline_page() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("out");

        run(
            &ConfigFile::default(),
            &["welcome".to_string(), "footer".to_string()],
            true,
            Some(out.clone()),
            temp.path().join("missing-form.json"),
            true,
        )
        .await
        .unwrap();

        let html = std::fs::read_to_string(out.join("your-website.html")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Welcome</title>"));
        assert!(html.find("<footer").unwrap() < html.find("</body>").unwrap());
    }
}
