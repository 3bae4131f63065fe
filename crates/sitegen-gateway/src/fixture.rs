//! Offline gateway with deterministic markup.

use async_trait::async_trait;
use sitegen_core::{BlockName, FormValues};

use crate::traits::{Gateway, GatewayError, Generated};

/// Gateway that renders canned sections from the form values.
///
/// Useful without network access and for repeatable demos.
#[derive(Debug, Clone, Default)]
pub struct FixtureGateway;

impl FixtureGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Gateway for FixtureGateway {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn create_head_info(
        &self,
        form: &FormValues,
        body_html: &str,
    ) -> Result<Generated, GatewayError> {
        let title = first_heading(body_html).unwrap_or("Your Website");
        let stylesheet = match form.css_library.to_lowercase().as_str() {
            "tailwind" | "tailwindcss" => {
                "  <script src=\"https://cdn.tailwindcss.com\"></script>\n".to_string()
            }
            "bootstrap" => "  <link rel=\"stylesheet\" href=\"https://cdn.jsdelivr.net/npm/bootstrap@5/dist/css/bootstrap.min.css\">\n".to_string(),
            _ => String::new(),
        };

        Ok(Generated::from_html(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <meta name="description" content="{description}">
{stylesheet}</head>
<body>
"#,
            title = escape(title),
            description = escape(&form.additional_info),
            stylesheet = stylesheet,
        )))
    }

    async fn create_html_block(
        &self,
        name: BlockName,
        form: &FormValues,
    ) -> Result<Generated, GatewayError> {
        let color = if form.colors.is_empty() {
            "inherit".to_string()
        } else {
            escape(&form.colors)
        };
        let info = escape(&form.additional_info);

        let html = match name {
            BlockName::Navigation => format!(
                "<nav style=\"color: {color}\"><a href=\"#\">Home</a> <a href=\"#about\">About</a> <a href=\"#contact\">Contact</a></nav>\n"
            ),
            BlockName::WelcomeSection => format!(
                "<section><h1>Welcome</h1><p>{info}</p><img src=\"https://picsum.photos/400/300\" alt=\"\"></section>\n"
            ),
            BlockName::MainSection => format!(
                "<section id=\"about\"><h2>About us</h2><p>{info}</p></section>\n"
            ),
            BlockName::TableSection => "<section><table><thead><tr><th>Item</th><th>Price</th></tr></thead><tbody><tr><td>Coffee</td><td>3</td></tr></tbody></table></section>\n".to_string(),
            BlockName::Map => {
                let place = escape(format!("{} {}", form.map_address, form.map_city).trim());
                format!(
                    "<section id=\"contact\"><p>Find us at {place}</p><iframe src=\"https://maps.google.com/maps?q={query}&output=embed\" title=\"map\"></iframe></section>\n",
                    query = place.replace(' ', "+"),
                )
            }
            BlockName::Footer => format!(
                "<footer style=\"color: {color}\"><p>&copy; Your Website</p></footer>\n"
            ),
            BlockName::Head | BlockName::Anchor => return Err(GatewayError::Unsupported(name)),
        };

        Ok(Generated::from_html(html))
    }
}

fn first_heading(html: &str) -> Option<&str> {
    let start = html.find("<h1>")? + "<h1>".len();
    let end = html[start..].find("</h1>")? + start;
    Some(html[start..end].trim()).filter(|s| !s.is_empty())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn renders_every_addable_section() {
        let gateway = FixtureGateway::new();
        let form = FormValues::default();

        for name in BlockName::ADDABLE {
            let generated = gateway.create_html_block(name, &form).await.unwrap();
            assert!(!generated.is_empty(), "{} produced nothing", name);
        }
    }

    #[tokio::test]
    async fn head_uses_body_heading_and_library() {
        let form = FormValues {
            css_library: "tailwind".to_string(),
            ..Default::default()
        };

        let head = FixtureGateway::new()
            .create_head_info(&form, "<section><h1>Bakery</h1></section>")
            .await
            .unwrap()
            .into_content();

        assert!(head.contains("<title>Bakery</title>"));
        assert!(head.contains("cdn.tailwindcss.com"));
        assert!(head.trim_end().ends_with("<body>"));
    }

    #[tokio::test]
    async fn escapes_form_values() {
        let form = FormValues {
            additional_info: "<b>bold</b>".to_string(),
            ..Default::default()
        };

        let html = FixtureGateway::new()
            .create_html_block(BlockName::MainSection, &form)
            .await
            .unwrap()
            .into_content();

        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }
}
