// src/index/markdown.rs
// =============================================================================
// Extracts module page links from the Markdown text in the docs index.
//
// The docs index stores its table of contents as Markdown snippets like
//   "[File system](fs.html)"
// We use `pulldown-cmark` to walk the Markdown events and keep the target
// of every link that points at a local .html page.
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};

// Returns the link targets that look like sibling doc pages, in document
// order, with any #fragment removed
//
// Example input:
//   "[Buffer](buffer.html) and [repo](https://github.com/nodejs/node)"
//
// Example output:
//   vec!["buffer.html"]
pub fn extract_page_links(markdown: &str) -> Vec<String> {
    let mut links = Vec::new();

    for event in Parser::new(markdown) {
        if let Event::Start(Tag::Link(_link_type, dest_url, _title)) = event {
            if let Some(page) = local_page(&dest_url) {
                links.push(page.to_string());
            }
        }
    }

    links
}

// Keeps relative links to .html pages, dropping the fragment
pub(super) fn local_page(dest: &str) -> Option<&str> {
    if dest.starts_with('#') || dest.contains("://") || dest.starts_with("mailto:") {
        return None;
    }

    let page = dest.split('#').next().unwrap_or(dest);
    if page.ends_with(".html") && page.len() > ".html".len() {
        Some(page)
    } else {
        None
    }
}
