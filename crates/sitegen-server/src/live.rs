//! Browser side of the live update channel.

use sitegen_editor::EditorEvent;

/// Serialize an event for the WebSocket.
pub fn encode_event(event: &EditorEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!("Failed to encode editor event: {}", e);
            None
        }
    }
}

/// Generate the client script for the editor page.
///
/// Connects to `/__live` on the serving host, rewrites the code pane and the
/// preview on every document change, and wires the page buttons to the API.
/// The preview is replaced wholesale through `srcdoc` on each change. Copy and
/// Save take the code pane contents, so they always match the preview.
pub fn live_client_script() -> &'static str {
    LIVE_SCRIPT
}

const LIVE_SCRIPT: &str = r#"
(function() {
  'use strict';

  const code = document.getElementById('code');
  const preview = document.getElementById('preview');
  const blocks = document.getElementById('blocks');
  const busy = document.getElementById('busy');
  const notices = document.getElementById('notices');
  const summary = document.getElementById('form-summary');
  const section = document.getElementById('section');
  const details = document.getElementById('section-details');
  let reconnectAttempts = 0;

  function render(html) {
    code.value = html;
    preview.srcdoc = html;
  }

  function renderBlocks(list, lastInserted) {
    blocks.innerHTML = '';
    list.forEach(function(block, index) {
      const li = document.createElement('li');
      li.draggable = true;
      li.dataset.index = index;
      li.textContent = block.name;
      if (index === lastInserted) li.className = 'last';
      blocks.appendChild(li);
    });
  }

  function notice(level, message) {
    const div = document.createElement('div');
    div.className = level;
    div.textContent = message;
    notices.appendChild(div);
    setTimeout(function() { div.remove(); }, 6000);
  }

  async function post(url, body) {
    const res = await fetch(url, {
      method: 'POST',
      headers: { 'content-type': 'application/json' },
      body: JSON.stringify(body || {})
    });
    if (!res.ok) {
      const err = await res.json().catch(function() { return { error: res.statusText }; });
      notice('error', err.error);
    }
  }

  document.querySelectorAll('[data-action]').forEach(function(button) {
    button.addEventListener('click', function(e) {
      e.preventDefault();
      post(button.dataset.action);
    });
  });

  document.querySelectorAll('[data-toggle]').forEach(function(header) {
    header.addEventListener('click', function() {
      document.getElementById(header.dataset.toggle).classList.toggle('hidden');
    });
  });

  section.addEventListener('change', function() {
    details.textContent = section.selectedOptions[0].dataset.details;
  });

  document.getElementById('add-block').addEventListener('submit', function(e) {
    e.preventDefault();
    post('/api/blocks', {
      name: section.value,
      additionalInfo: document.getElementById('additional-info').value
    });
  });

  // Copy and Save read the code pane so hand edits match the preview
  document.getElementById('copy').addEventListener('click', async function() {
    try {
      await navigator.clipboard.writeText(code.value);
      console.log('Copied');
    } catch (error) {
      console.log('Error when copying to clipboard: ', error);
    }
  });

  document.getElementById('save').addEventListener('click', function(e) {
    e.preventDefault();
    const link = document.createElement('a');
    link.href = URL.createObjectURL(new Blob([code.value], { type: 'text/html' }));
    link.download = 'your-website.html';
    link.click();
    URL.revokeObjectURL(link.href);
  });

  code.addEventListener('input', function() {
    preview.srcdoc = code.value;
  });

  let dragFrom = null;
  blocks.addEventListener('dragstart', function(e) {
    dragFrom = Number(e.target.dataset.index);
  });
  blocks.addEventListener('dragover', function(e) { e.preventDefault(); });
  blocks.addEventListener('drop', function(e) {
    e.preventDefault();
    const target = e.target.closest('li');
    if (dragFrom === null || !target) return;
    const to = Number(target.dataset.index);
    if (to !== dragFrom) post('/api/reorder', { from: dragFrom, to: to });
    dragFrom = null;
  });

  function connect() {
    const scheme = location.protocol === 'https:' ? 'wss://' : 'ws://';
    const ws = new WebSocket(scheme + location.host + '/__live');

    ws.onopen = function() {
      reconnectAttempts = 0;
    };

    ws.onmessage = function(event) {
      const msg = JSON.parse(event.data);
      switch (msg.type) {
        case 'document_changed':
          render(msg.code);
          renderBlocks(msg.blocks, msg.last_inserted);
          break;
        case 'status':
          busy.classList.toggle('hidden', msg.status !== 'fetching');
          break;
        case 'notice':
          notice(msg.level, msg.message);
          break;
        case 'form_changed':
          summary.textContent = msg.summary;
          break;
      }
    };

    ws.onclose = function() {
      if (reconnectAttempts < 10) {
        reconnectAttempts++;
        setTimeout(connect, 1000 * reconnectAttempts);
      }
    };
  }

  connect();
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use sitegen_core::{SAVE_FILE_NAME, SAVE_MIME_TYPE};
    use sitegen_editor::Status;

    #[test]
    fn encodes_events_as_tagged_json() {
        let json = encode_event(&EditorEvent::Status {
            status: Status::Idle,
        })
        .unwrap();

        assert_eq!(json, r#"{"type":"status","status":"idle"}"#);
    }

    #[test]
    fn copy_and_save_use_the_code_pane() {
        let script = live_client_script();

        assert!(script.contains("navigator.clipboard.writeText(code.value)"));
        assert!(script.contains("new Blob([code.value], { type: 'text/html' })"));
        assert!(script.contains(&format!("link.download = '{}'", SAVE_FILE_NAME)));
        assert!(script.contains(SAVE_MIME_TYPE));
        assert!(!script.contains("fetch('/api/code')"));
    }

    #[test]
    fn live_socket_follows_page_scheme() {
        let script = live_client_script();

        assert!(script.contains("location.protocol === 'https:' ? 'wss://' : 'ws://'"));
    }

    #[test]
    fn script_handles_every_event_type() {
        let script = live_client_script();
        for kind in ["document_changed", "status", "notice", "form_changed"] {
            assert!(script.contains(&format!("'{}'", kind)), "missing {}", kind);
        }
    }
}
