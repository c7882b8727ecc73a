// src/index/mod.rs
// =============================================================================
// Turns the root document into the list of module tasks.
//
// Two root shapes are understood:
// - The Node.js docs index (index.json): an object whose `desc` links to
//   module pages (fs.html, net.html, ...). Older builds store `desc` as an
//   array of Markdown `text` entries, newer ones as one HTML string.
//   Each page link becomes the sibling JSON document (fs.json, net.json).
// - A plain JSON array of address strings, relative or absolute. Any other
//   entry is an error.
//
// Relative addresses are resolved against the root address: with URL
// joining for http(s)/file URLs, and against the parent directory for
// plain filesystem paths.
//
// Submodules:
// - markdown: pulls page links out of the Markdown snippets
// - html: pulls page links out of a rendered HTML `desc`
// =============================================================================

mod html;
mod markdown;

pub use html::extract_href_links;
pub use markdown::extract_page_links;

use crate::error::IndexError;
use crate::executor::Task;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Parses the root document and returns one Task per derived address, in
/// document order, without duplicates.
pub fn resolve_index(root_address: &str, content: &str) -> Result<Vec<Task>, IndexError> {
    let doc: Value = serde_json::from_str(content).map_err(|e| IndexError::NotJson(e.to_string()))?;

    let relative = match &doc {
        Value::Object(_) => docs_index_links(&doc)?,
        Value::Array(entries) => entries
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| IndexError::BadAddress(entry.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(IndexError::UnsupportedShape),
    };

    let mut seen = HashSet::new();
    let mut tasks = Vec::new();

    for link in relative {
        let address = resolve_address(root_address, &link)?;
        if address == root_address || !seen.insert(address.clone()) {
            continue;
        }
        tasks.push(Task {
            index: tasks.len(),
            name: module_name(&address),
            address,
        });
    }

    Ok(tasks)
}

// Collects page links from `desc` and swaps .html for .json
fn docs_index_links(doc: &Value) -> Result<Vec<String>, IndexError> {
    let pages = match doc.get("desc") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| entry.get("text").and_then(Value::as_str))
            .flat_map(extract_page_links)
            .collect::<Vec<_>>(),
        Some(Value::String(html)) => extract_href_links(html),
        _ => return Err(IndexError::UnsupportedShape),
    };

    Ok(pages
        .into_iter()
        .map(|page| format!("{}.json", page.trim_end_matches(".html")))
        .collect())
}

/// Resolves `link` relative to `root`. Absolute links are returned as-is.
pub fn resolve_address(root: &str, link: &str) -> Result<String, IndexError> {
    if Url::parse(link).is_ok() {
        return Ok(link.to_string());
    }

    if let Ok(base) = Url::parse(root) {
        return base
            .join(link)
            .map(String::from)
            .map_err(|_| IndexError::BadAddress(link.to_string()));
    }

    let parent = Path::new(root).parent().unwrap_or_else(|| Path::new(""));
    parent
        .join(link)
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| IndexError::BadAddress(link.to_string()))
}

/// File stem of the last path segment: `.../api/child_process.json` -> `child_process`
///
/// Only the last segment counts, so `a/fs.json` and `b/fs.json` are both
/// named `fs`. They stay separate tasks (distinct addresses) but share an
/// override and show up as two `fs` entries in the grouped output.
pub fn module_name(address: &str) -> String {
    let path = address.split(['?', '#']).next().unwrap_or(address);
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => file.to_string(),
    }
}
