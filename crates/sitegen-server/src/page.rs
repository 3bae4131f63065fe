//! Editor page rendering.

use minijinja::{context, Environment};
use sitegen_core::{Block, BlockName};

/// An entry of the section picker.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SectionOption {
    /// Wire identifier
    pub value: String,
    /// Menu label
    pub label: String,
    /// What the section contains
    pub details: String,
}

impl SectionOption {
    /// All addable sections, in menu order.
    pub fn all() -> Vec<SectionOption> {
        BlockName::ADDABLE
            .iter()
            .map(|name| SectionOption {
                value: name.as_str().to_string(),
                label: name.label().to_string(),
                details: name.details().to_string(),
            })
            .collect()
    }
}

/// Context for rendering the editor page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageContext {
    /// Summary of the form values the page was generated from
    pub form_summary: String,
    /// Current free-text notes
    pub additional_info: String,
    /// Concatenated page markup
    pub code: String,
    /// Blocks in order
    pub blocks: Vec<Block>,
    /// Section picker entries
    pub sections: Vec<SectionOption>,
    /// Whether a generation request is in flight
    pub fetching: bool,
}

/// Template engine for the editor page.
pub struct PageTemplates {
    env: Environment<'static>,
}

impl PageTemplates {
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template("editor.html", EDITOR_TEMPLATE)
            .expect("Failed to add editor template");
        env.add_template("blocks.html", BLOCKS_TEMPLATE)
            .expect("Failed to add blocks template");

        Self { env }
    }

    /// Render the editor page.
    pub fn render_editor(&self, ctx: &PageContext) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("editor.html")?;

        tmpl.render(context! {
            form_summary => &ctx.form_summary,
            additional_info => &ctx.additional_info,
            code => &ctx.code,
            blocks => &ctx.blocks,
            sections => &ctx.sections,
            fetching => ctx.fetching,
        })
    }
}

impl Default for PageTemplates {
    fn default() -> Self {
        Self::new()
    }
}

const EDITOR_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>sitegen editor</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 1100px; margin: 1.5rem auto; padding: 0 1rem; }
    h2 { background: #000; color: #fff; margin: 0; padding: 0.6rem; font-size: 1rem; text-transform: uppercase; cursor: pointer; }
    .panel { border: 1px solid #000; border-radius: 4px; margin-bottom: 1rem; }
    .prompt { background: #f1f5f9; padding: 0.75rem; border-radius: 4px; margin-bottom: 1rem; font-family: monospace; }
    textarea { width: 100%; box-sizing: border-box; font-family: monospace; }
    button, select { background: #000; color: #fff; border: 0; border-radius: 4px; padding: 0.5rem 1rem; margin: 0.25rem; cursor: pointer; }
    button:hover, select:hover { background: #22c55e; }
    .actions { display: flex; flex-wrap: wrap; justify-content: center; padding: 0.75rem; }
    .columns { display: flex; gap: 1rem; padding: 0.75rem; }
    .columns > * { flex: 1; }
    #blocks { list-style: none; padding: 0; }
    #blocks li { border: 1px solid #ccc; border-radius: 4px; padding: 0.4rem; margin: 0.25rem 0; cursor: grab; background: #fff; }
    #blocks li.last { border-color: #22c55e; }
    #busy { font-weight: bold; }
    #notices div { padding: 0.5rem; margin: 0.25rem 0; border-radius: 4px; background: #fef3c7; }
    #notices div.error { background: #fee2e2; }
    iframe { width: 100%; height: 500px; border: 0; background: #f1f5f9; resize: both; }
    .hidden { display: none; }
  </style>
</head>
<body>
  <div class="prompt" id="form-summary">{{ form_summary }}</div>
  <div id="notices"></div>

  <div class="panel">
    <h2 data-toggle="code-pane">Code</h2>
    <div id="code-pane" class="hidden">
      <textarea id="code" rows="15">{{ code }}</textarea>
    </div>
    <div class="actions">
      <button id="copy">Copy</button>
      <a id="save" href="/download" download="your-website.html"><button type="button">Save as HTML</button></a>
    </div>
    <div class="columns">
      <div>
        <div class="actions">
          <button data-action="/api/head">Generate Head Tag Information</button>
          <button data-action="/api/undo">Undo Fetch</button>
          <button data-action="/api/regenerate">Redo Fetch</button>
        </div>
        <form id="add-block">
          <select id="section">
          {% for section in sections %}
            <option value="{{ section.value }}" data-details="{{ section.details }}">{{ section.label }}</option>
          {% endfor %}
          </select>
          <span id="section-details">{{ sections[0].details }}</span>
          <textarea id="additional-info" rows="3" placeholder="Give additional information">{{ additional_info }}</textarea>
          <button type="submit">Submit</button>
          <span id="busy" class="{% if not fetching %}hidden{% endif %}">Building...</span>
        </form>
      </div>
      <ul id="blocks">{% include "blocks.html" %}</ul>
    </div>
  </div>

  <div class="panel">
    <h2 data-toggle="preview">Preview</h2>
    <iframe id="preview" title="Code preview" sandbox="allow-same-origin allow-scripts" srcdoc="{{ code }}"></iframe>
  </div>

  <script src="/__live.js"></script>
</body>
</html>"##;

const BLOCKS_TEMPLATE: &str = r##"{% for block in blocks %}<li draggable="true" data-index="{{ loop.index0 }}">{{ block.name }}</li>{% endfor %}"##;
