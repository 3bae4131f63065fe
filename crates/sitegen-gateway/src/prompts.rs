//! Prompt templates for each section.

use minijinja::{context, Environment};
use sitegen_core::{BlockName, FormValues};

use crate::traits::GatewayError;

/// System prompt sent with every request.
pub const SYSTEM_PROMPT: &str = "You are a web developer who writes clean, accessible, \
responsive HTML. Reply with HTML only, without explanations.";

/// Prompt renderer backed by minijinja.
pub struct PromptSet {
    env: Environment<'static>,
}

impl PromptSet {
    /// Create a prompt set with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template("style.txt", STYLE_TEMPLATE)
            .expect("Failed to add style template");
        env.add_template("head.txt", HEAD_TEMPLATE)
            .expect("Failed to add head template");
        env.add_template("section.txt", SECTION_TEMPLATE)
            .expect("Failed to add section template");

        Self { env }
    }

    /// Render the head prompt.
    pub fn head(&self, form: &FormValues, body_html: &str) -> Result<String, GatewayError> {
        self.render(
            "head.txt",
            context! {
                form => form,
                body => body_html,
            },
        )
    }

    /// Render the prompt for an addable section.
    pub fn section(&self, name: BlockName, form: &FormValues) -> Result<String, GatewayError> {
        let Some(instructions) = section_instructions(name) else {
            return Err(GatewayError::Unsupported(name));
        };

        self.render(
            "section.txt",
            context! {
                form => form,
                details => name.details(),
                instructions => instructions,
            },
        )
    }

    fn render(&self, template: &str, ctx: minijinja::Value) -> Result<String, GatewayError> {
        self.env
            .get_template(template)
            .and_then(|tmpl| tmpl.render(ctx))
            .map_err(|e| GatewayError::Prompt(e.to_string()))
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::new()
    }
}

fn section_instructions(name: BlockName) -> Option<&'static str> {
    let text = match name {
        BlockName::Navigation => {
            "Create a <nav> bar with the site name on the left and links to Home, About, \
             Services and Contact. It must collapse into a menu button on small screens."
        }
        BlockName::WelcomeSection => {
            "Create a welcome <section> with a large headline, a short introductory \
             paragraph and an illustrative image from https://picsum.photos placed beside the text."
        }
        BlockName::MainSection => {
            "Create a main content <section> with a heading and two or three paragraphs \
             describing the business."
        }
        BlockName::TableSection => {
            "Create a <section> containing a styled <table> with a header row and at least \
             four data rows relevant to the business, such as prices or opening hours."
        }
        BlockName::Map => {
            "Create a <section> with a short paragraph on how to find us and an embedded \
             Google Maps <iframe> showing the address below."
        }
        BlockName::Footer => {
            "Create a <footer> with contact details, social media links and a copyright line."
        }
        BlockName::Head | BlockName::Anchor => return None,
    };
    Some(text)
}

const STYLE_TEMPLATE: &str = r#"{% if form.cssLibrary %}Style it with the {{ form.cssLibrary }} CSS library.{% else %}Style it with plain inline CSS.{% endif %}
{% if form.colors %}Use this color scheme: {{ form.colors }}.{% endif %}"#;

const HEAD_TEMPLATE: &str = r#"Write the opening of an HTML5 document for the page body below: the doctype, the <html lang="en"> tag, a complete <head> and the opening <body> tag. Do not close <body> or <html>.
The <head> needs a charset and viewport meta tag, a descriptive <title>, a meta description and meta keywords based on the body content.
{% if form.cssLibrary %}Load the {{ form.cssLibrary }} CSS library from its official CDN.{% endif %}
{% include "style.txt" %}

Page body:
{{ body }}"#;

const SECTION_TEMPLATE: &str = r#"Write only the HTML for one page section ({{ details }}), without <html>, <head> or <body> tags.
{{ instructions }}
{% include "style.txt" %}
{% if form.mapAddress or form.mapCity %}Address: {{ form.mapAddress }}{% if form.mapCity %}, {{ form.mapCity }}{% endif %}.{% endif %}
{% if form.additionalInfo %}Additional information: {{ form.additionalInfo }}{% endif %}"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormValues {
        FormValues {
            css_library: "tailwind".to_string(),
            colors: "green and white".to_string(),
            map_address: "Storgata 1".to_string(),
            map_city: "Oslo".to_string(),
            additional_info: "A small bakery".to_string(),
        }
    }

    #[test]
    fn renders_section_prompt_with_form_values() {
        let prompt = PromptSet::new().section(BlockName::Map, &form()).unwrap();

        assert!(prompt.contains("(Text | Map)"));
        assert!(prompt.contains("tailwind CSS library"));
        assert!(prompt.contains("Storgata 1, Oslo"));
        assert!(prompt.contains("A small bakery"));
    }

    #[test]
    fn omits_empty_form_values() {
        let prompt = PromptSet::new()
            .section(BlockName::Footer, &FormValues::default())
            .unwrap();

        assert!(prompt.contains("plain inline CSS"));
        assert!(!prompt.contains("Address:"));
        assert!(!prompt.contains("Additional information"));
    }

    #[test]
    fn head_prompt_includes_body() {
        let prompt = PromptSet::new()
            .head(&form(), "<main>Fresh bread</main>")
            .unwrap();

        assert!(prompt.contains("<main>Fresh bread</main>"));
        assert!(prompt.contains("official CDN"));
    }

    #[test]
    fn rejects_non_section_names() {
        let result = PromptSet::new().section(BlockName::Anchor, &form());
        assert_eq!(result, Err(GatewayError::Unsupported(BlockName::Anchor)));
    }
}
