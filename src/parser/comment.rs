//! PHPDoc tag parser — line-by-line state machine over one comment block.
//!
//! A comment is scanned with a "current tag" cursor that starts at
//! `description`. Lines not introducing a tag append to the current tag's
//! value; `@param` and `@see` lines are parsed into structured entries;
//! any other `@tag` line moves the cursor. The `example` tag keeps raw
//! line content so code samples survive with their indentation.

use crate::model::DocBlock;
use crate::types;
use std::collections::HashMap;

// -- Parsed result ------------------------------------------------------------

/// One `@param` entry in declaration order.
#[derive(Debug, Clone)]
pub struct DocParam {
    /// With sigil, default-value notation stripped (`$x=5` becomes `$x`).
    pub name: String,
    /// Sanitized against the enclosing namespace.
    pub declared_type: String,
    pub description: String,
}

/// Everything extracted from one doc comment. Tag values are trimmed;
/// unknown tags are kept verbatim under their own name.
#[derive(Debug, Default)]
pub struct DocInfo {
    tags: HashMap<String, String>,
    params: Vec<DocParam>,
    see: Vec<String>,
}

impl DocInfo {
    pub fn description(&self) -> &str {
        self.tags.get("description").map(String::as_str).unwrap_or("")
    }

    /// Example block, `None` when absent or empty.
    pub fn example(&self) -> Option<&str> {
        self.tags.get("example").map(String::as_str).filter(|e| !e.is_empty())
    }

    /// First token of the `@return` value, `None` when undocumented.
    pub fn return_tag(&self) -> Option<&str> {
        self.tags
            .get("return")
            .and_then(|v| v.split_whitespace().next())
    }

    /// `Some(message)` when the comment carries `@deprecated`; the message
    /// may be empty (deprecated, no detail given).
    pub fn deprecated(&self) -> Option<&str> {
        self.tags.get("deprecated").map(String::as_str)
    }

    pub fn is_internal(&self) -> bool {
        self.tags.contains_key("internal")
    }

    pub fn has_ignore_tag(&self) -> bool {
        self.tags.contains_key("ignore")
    }

    /// The description delegates to an ancestor's documentation.
    pub fn should_inherit_doc(&self) -> bool {
        self.description().eq_ignore_ascii_case("{@inheritdoc}")
    }

    pub fn params(&self) -> &[DocParam] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&DocParam> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn see(&self) -> &[String] {
        &self.see
    }

    #[cfg(test)]
    fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// Copy the shared doc fields into an entity's doc block. The caller
    /// owns the name; documented types are display-only and never checked
    /// against the signature.
    pub fn apply_to(&self, doc: &mut DocBlock) {
        doc.description = self.description().to_string();
        doc.example = self.example().map(str::to_string);
        doc.see = self.see.clone();
        doc.deprecated = self.deprecated().map(str::to_string);
        doc.internal = self.is_internal();
        doc.ignore = self.has_ignore_tag();
    }
}

// -- Parsing ------------------------------------------------------------------

/// Parse one raw doc comment. `namespace` qualifies bare class names in
/// `@param` type declarations.
pub fn parse(raw_comment: &str, namespace: &str) -> DocInfo {
    let mut tags: HashMap<String, String> = HashMap::new();
    tags.insert("description".to_string(), String::new());
    let mut params: Vec<DocParam> = Vec::new();
    let mut see: Vec<String> = Vec::new();
    let mut current_tag = "description".to_string();

    for raw_line in raw_comment.lines() {
        let cleaned = clean_line(raw_line);
        let line = if current_tag == "example" {
            cleaned
        } else {
            cleaned.trim()
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(&first) = words.first() else {
            continue;
        };

        if !first.starts_with('@') {
            // Continuation of the current tag
            let entry = tags.entry(current_tag.clone()).or_default();
            if current_tag == "example" {
                if !entry.is_empty() {
                    entry.push('\n');
                }
                entry.push_str(line);
            } else {
                if !entry.is_empty() {
                    entry.push(' ');
                }
                entry.push_str(line);
            }
        } else if first == "@param" {
            if let Some(param) = parse_param(&words, namespace) {
                upsert_param(&mut params, param);
            }
        } else if first == "@see" {
            if let Some(entry) = parse_see(&words) {
                see.push(entry);
            }
        } else {
            // Start a new tag; the remainder of the line is its value
            current_tag = first[1..].to_string();
            let rest = words[1..].join(" ");
            let entry = tags.entry(current_tag.clone()).or_default();
            if !entry.is_empty() && !rest.is_empty() {
                entry.push(' ');
            }
            entry.push_str(&rest);
        }
    }

    for value in tags.values_mut() {
        *value = value.trim().to_string();
    }

    DocInfo { tags, params, see }
}

/// Strip the comment delimiters and the per-line leading marker
/// (`whitespace, *, at most one space`). Whatever follows the marker,
/// indentation included, is line content.
fn clean_line(line: &str) -> &str {
    let s = line.trim_start();
    let s = s.strip_prefix("/**").unwrap_or(s);
    let s = s.strip_suffix("*/").unwrap_or(s);
    match s.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => s,
    }
}

/// `@param $name desc` (type defaults to `mixed`) or `@param Type $name desc`.
/// Returns `None` when the line has too few tokens to carry a name.
fn parse_param(words: &[&str], namespace: &str) -> Option<DocParam> {
    let (name, declared, consumed) = if words.get(1).is_some_and(|w| w.starts_with('$')) {
        (words[1], "mixed", 2)
    } else if words.len() > 2 {
        (words[2], words[1], 3)
    } else {
        return None;
    };

    // Strip default-value notation from the name
    let name = name.split('=').next().unwrap_or(name);
    if name.is_empty() {
        return None;
    }

    let rest = &words[consumed..];
    let description = if rest.len() > 1 {
        rest.join(" ")
    } else {
        String::new()
    };

    Some(DocParam {
        name: name.to_string(),
        declared_type: types::sanitize_declaration(declared, namespace),
        description,
    })
}

/// A repeated parameter name replaces the earlier entry in place, keeping
/// the first declaration's position.
fn upsert_param(params: &mut Vec<DocParam>, param: DocParam) {
    match params.iter_mut().find(|p| p.name == param.name) {
        Some(existing) => *existing = param,
        None => params.push(param),
    }
}

/// `@see URL words…` becomes a labelled link, a bare URL an autolink, and
/// anything else is kept verbatim for the cross-link pass. A bare `@see`
/// with no value is dropped.
fn parse_see(words: &[&str]) -> Option<String> {
    let rest = &words[1..];
    let first = rest.first()?;
    if first.starts_with("http://") || first.starts_with("https://") {
        if rest.len() > 1 {
            Some(format!("[{}]({})", rest[1..].join(" "), first))
        } else {
            Some(format!("<{}>", first))
        }
    } else {
        Some(rest.join(" "))
    }
}
