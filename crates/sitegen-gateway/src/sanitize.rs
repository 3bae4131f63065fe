//! Cleanup of model output before it enters the document.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[a-zA-Z]*[^\n]*\n(.*?)```").expect("valid regex"));

static SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("valid regex")
});

static EXTERNAL_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bsrc\s*=\s*["']https://"#).expect("valid regex"));

/// An opening tag, with quoted attribute values allowed to contain `>`.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[a-zA-Z][^\s>/]*(?:"[^"]*"|'[^']*'|[^'">])*>"#).expect("valid regex")
});

static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid regex")
});

static JS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(href|src|action|formaction)\s*=\s*(?:"\s*javascript:[^"]*"|'\s*javascript:[^']*'|javascript:[^\s>]*)"#,
    )
    .expect("valid regex")
});

/// Sanitize raw model output into an HTML fragment.
///
/// Unwraps the first fenced code block if the output has one, drops inline
/// scripts (external `https` scripts such as CSS framework CDNs are kept), and
/// strips inline event handlers and `javascript:` URLs.
pub fn sanitize_html(raw: &str) -> String {
    let html = match FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw,
    };

    let html = SCRIPT.replace_all(html, |caps: &Captures| {
        let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let body = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        if EXTERNAL_SRC.is_match(attrs) && body.trim().is_empty() {
            caps[0].to_string()
        } else {
            String::new()
        }
    });
    let html = TAG.replace_all(&html, |caps: &Captures| scrub_tag(&caps[0]));

    html.trim().to_string()
}

/// Strip handlers and script URLs from the attributes of one tag.
fn scrub_tag(tag: &str) -> String {
    let tag = EVENT_HANDLER.replace_all(tag, "");
    JS_URL.replace_all(&tag, r##"${1}="#""##).into_owned()
}
