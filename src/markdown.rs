//! Markdown shaping for registry documentation content.
//!
//! Provider and module docs come back from the registry as markdown with a
//! YAML frontmatter block. These helpers pull fields out of the frontmatter,
//! strip it from the body, and cut excerpts on paragraph boundaries. Regexes
//! are compiled once per process.

use std::sync::OnceLock;

use regex::Regex;

fn frontmatter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---\r?\n").expect("valid frontmatter regex")
    })
}

/// Remove the leading YAML frontmatter block, if any.
pub fn strip_frontmatter(content: &str) -> &str {
    match frontmatter_re().find(content) {
        Some(m) => &content[m.end()..],
        None => content,
    }
}

/// Read a scalar field (e.g. `page_title`, `description`, `subcategory`) out
/// of the frontmatter block. Surrounding quotes are dropped.
pub fn frontmatter_field(content: &str, key: &str) -> Option<String> {
    let block = frontmatter_re().captures(content)?.get(1)?.as_str();
    for line in block.lines() {
        let Some((k, v)) = line.split_once(':') else {
            continue;
        };
        if k.trim() == key {
            let v = v.trim().trim_matches('"').trim_matches('\'');
            if v.is_empty() {
                return None;
            }
            return Some(v.to_string());
        }
    }
    None
}

/// Cut an excerpt of at most `max_len` characters from the doc body, with the
/// frontmatter removed, preferring to break at a blank line.
pub fn excerpt(content: &str, max_len: usize) -> String {
    let body = strip_frontmatter(content).trim_start();
    if body.chars().count() <= max_len {
        return body.trim_end().to_string();
    }
    let cut: String = body.chars().take(max_len).collect();
    match cut.rfind("\n\n") {
        Some(pos) if pos > 0 => format!("{}\n\n…", cut[..pos].trim_end()),
        _ => format!("{}…", cut.trim_end()),
    }
}

/// Render a markdown table with the given header and rows.
///
/// Pipe characters inside cells are escaped so rows cannot break the table.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(headers.len())));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}
