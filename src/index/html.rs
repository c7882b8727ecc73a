// src/index/html.rs
// =============================================================================
// Extracts module page links from a docs index whose `desc` is rendered HTML.
//
// Newer docs builds ship the table of contents as one HTML string:
//   "<ul><li><a href=\"fs.html\">File system</a></li>...</ul>"
// We don't need a DOM for that. A scan for `href=` attribute values is
// enough, and the same local-page filter as the Markdown path decides which
// targets are module pages.
// =============================================================================

use super::markdown::local_page;

// Returns the href targets that look like sibling doc pages, in document
// order, with any #fragment removed
//
// Example input:
//   "<a href=\"buffer.html\">Buffer</a> <a href='https://github.com'>repo</a>"
//
// Example output:
//   vec!["buffer.html"]
pub fn extract_href_links(html: &str) -> Vec<String> {
    let mut links = Vec::new();

    for (pos, attr) in html.match_indices("href=") {
        // `data-href=` and friends are other attributes
        let preceded_by_name = html[..pos]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if preceded_by_name {
            continue;
        }

        if let Some(page) = attribute_value(&html[pos + attr.len()..]).and_then(local_page) {
            links.push(page.to_string());
        }
    }

    links
}

// The value right after `href=`: quoted with " or ', or bare up to
// whitespace or the end of the tag
fn attribute_value(rest: &str) -> Option<&str> {
    match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let body = &rest[1..];
            body.find(quote).map(|end| &body[..end])
        }
        _ => {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '>')
                .unwrap_or(rest.len());
            Some(&rest[..end])
        }
    }
}
