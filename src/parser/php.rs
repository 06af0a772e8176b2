//! PHP source scanner — produces raw signature records for the resolver.
//!
//! A line-oriented state machine over one file: tracks the namespace,
//! `use` imports and pending doc comments, recognizes type and method
//! declarations, and skips bodies by brace depth. It understands the
//! declaration grammar only; statements are never interpreted.

use crate::types;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

static RE_NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*namespace\s+([\w\\]+)\s*;").unwrap());

static RE_USE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*use\s+([\w\\]+)(?:\s+as\s+(\w+))?\s*;").unwrap());

static RE_TYPE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*((?:abstract\s+|final\s+|readonly\s+)*)(class|interface|trait)\s+(\w+)")
        .unwrap()
});

static RE_EXTENDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bextends\s+([\w\\]+(?:\s*,\s*[\w\\]+)*)").unwrap());

static RE_IMPLEMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bimplements\s+([\w\\]+(?:\s*,\s*[\w\\]+)*)").unwrap());

static RE_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*((?:(?:public|protected|private|static|abstract|final)\s+)*)function\s+&?\s*(\w+)\s*\(")
        .unwrap()
});

// -- Raw signature records ----------------------------------------------------

/// Kind keyword of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    Class,
    Interface,
    Trait,
}

/// One type declaration with its members, names fully qualified.
#[derive(Debug)]
pub struct RawClass {
    /// `\Acme\Foo`
    pub name: String,
    /// `\Acme`, empty for the global namespace.
    pub namespace: String,
    pub kind: RawKind,
    pub is_abstract: bool,
    /// Doc comment verbatim, delimiters included; empty when absent.
    pub raw_comment: String,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    /// Declaration order.
    pub members: Vec<RawMethod>,
}

/// One method signature.
#[derive(Debug)]
pub struct RawMethod {
    pub name: String,
    pub raw_comment: String,
    pub visibility: String,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub params: Vec<RawParam>,
    /// Resolved declared return type, `None` when the signature has none.
    pub return_type: Option<String>,
}

/// One declared parameter.
#[derive(Debug)]
pub struct RawParam {
    /// With sigil; by-ref and variadic markers stripped.
    pub name: String,
    /// Resolved typehint, `None` when untyped.
    pub native_type: Option<String>,
    /// Default literal verbatim.
    pub default: Option<String>,
}

impl RawMethod {
    /// All modifier words, as matched by the visibility filter.
    pub fn modifiers(&self) -> Vec<&str> {
        let mut mods = vec![self.visibility.as_str()];
        if self.is_static {
            mods.push("static");
        }
        if self.is_abstract {
            mods.push("abstract");
        }
        if self.is_final {
            mods.push("final");
        }
        mods
    }
}

// -- Scanner ------------------------------------------------------------------

/// Parse one PHP source text into its declared types, in source order.
pub fn parse(source: &str) -> Vec<RawClass> {
    let mut scanner = Scanner::default();
    for line in source.lines() {
        scanner.process_line(line);
    }
    scanner.finish()
}

#[derive(Default)]
struct Scanner {
    namespace: String,
    imports: HashMap<String, String>,
    classes: Vec<RawClass>,
    current: Option<RawClass>,
    depth: i32,

    pending_comment: Option<String>,
    in_comment: bool,
    comment_is_doc: bool,
    comment_buf: String,

    // Declaration text accumulating across lines
    pending_header: Option<String>,
    pending_signature: Option<String>,
}

impl Scanner {
    fn process_line(&mut self, line: &str) {
        let trimmed = line.trim();

        // Comment block continuation
        if self.in_comment {
            if self.comment_is_doc {
                self.comment_buf.push('\n');
                self.comment_buf.push_str(line);
            }
            if trimmed.contains("*/") {
                self.in_comment = false;
                if self.comment_is_doc {
                    self.pending_comment = Some(std::mem::take(&mut self.comment_buf));
                }
            }
            return;
        }

        // Comment block start; a block closed on its own first line never
        // opens the continuation state
        if trimmed.starts_with("/**") || trimmed.starts_with("/*") {
            let is_doc = trimmed.starts_with("/**");
            if trimmed.len() > 3 && trimmed.contains("*/") {
                if is_doc {
                    self.pending_comment = Some(trimmed.to_string());
                }
            } else {
                self.in_comment = true;
                self.comment_is_doc = is_doc;
                if is_doc {
                    self.comment_buf = line.to_string();
                }
            }
            return;
        }

        let code = strip_line_comment(line);
        if code.trim().is_empty() {
            // Blank lines do not detach a pending comment
            return;
        }

        // Multi-line class header
        if let Some(mut header) = self.pending_header.take() {
            header.push(' ');
            header.push_str(code.trim());
            if header.contains('{') {
                self.open_class(&header);
            } else {
                self.pending_header = Some(header);
            }
            self.count_braces(&code);
            return;
        }

        // Multi-line method signature
        if let Some(mut sig) = self.pending_signature.take() {
            sig.push(' ');
            sig.push_str(code.trim());
            if parens_balanced(&sig) {
                self.push_method(&sig);
            } else {
                self.pending_signature = Some(sig);
            }
            self.count_braces(&code);
            return;
        }

        if self.depth == 0 {
            if let Some(caps) = RE_NAMESPACE.captures(&code) {
                self.namespace = types::sanitize_class_name(&caps[1]);
                self.imports.clear();
                return;
            }
            if let Some(caps) = RE_USE.captures(&code) {
                let target = types::sanitize_class_name(&caps[1]);
                let alias = caps
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| {
                        target.rsplit('\\').next().unwrap_or_default().to_string()
                    });
                self.imports.insert(alias, target);
                return;
            }
            if RE_TYPE_DECL.is_match(&code) {
                if code.contains('{') {
                    self.open_class(&code);
                } else {
                    self.pending_header = Some(code.trim().to_string());
                }
                self.count_braces(&code);
                return;
            }
        } else if self.depth == 1 && self.current.is_some() && RE_FUNCTION.is_match(&code) {
            if parens_balanced(&code) {
                self.push_method(&code);
            } else {
                self.pending_signature = Some(code.trim().to_string());
            }
            self.count_braces(&code);
            return;
        }

        // Unrelated code detaches a pending comment
        self.pending_comment = None;
        self.count_braces(&code);
    }

    fn finish(mut self) -> Vec<RawClass> {
        if let Some(class) = self.current.take() {
            self.classes.push(class);
        }
        self.classes
    }

    /// Walk the braces of one code line in order, so a class closed on the
    /// same line it opened still gets finalized.
    fn count_braces(&mut self, code: &str) {
        let mut chars = code.chars();
        let mut in_str: Option<char> = None;
        while let Some(c) = chars.next() {
            match in_str {
                Some(q) => {
                    if c == '\\' {
                        chars.next();
                    } else if c == q {
                        in_str = None;
                    }
                }
                None => match c {
                    '\'' | '"' => in_str = Some(c),
                    '{' => self.depth += 1,
                    '}' => {
                        self.depth -= 1;
                        if self.depth <= 0 {
                            self.depth = 0;
                            if let Some(class) = self.current.take() {
                                self.classes.push(class);
                            }
                        }
                    }
                    _ => {}
                },
            }
        }
    }

    fn open_class(&mut self, header: &str) {
        let Some(caps) = RE_TYPE_DECL.captures(header) else {
            return;
        };
        let modifiers = caps[1].to_string();
        let kind = match &caps[2] {
            "interface" => RawKind::Interface,
            "trait" => RawKind::Trait,
            _ => RawKind::Class,
        };
        let name = types::sanitize_class_name(&format!(
            "{}\\{}",
            self.namespace.trim_matches('\\'),
            &caps[3]
        ));

        let mut extends_list: Vec<String> = Vec::new();
        if let Some(ext) = RE_EXTENDS.captures(header) {
            extends_list = ext[1]
                .split(',')
                .map(|n| self.resolve_name(n.trim()))
                .collect();
        }
        let mut implements = Vec::new();
        if let Some(imp) = RE_IMPLEMENTS.captures(header) {
            implements = imp[1]
                .split(',')
                .map(|n| self.resolve_name(n.trim()))
                .collect();
        }
        // An interface may extend several interfaces; the first one acts as
        // the parent, the rest line up with the implements list.
        let extends = if extends_list.is_empty() {
            None
        } else {
            let first = extends_list.remove(0);
            implements.extend(extends_list);
            Some(first)
        };

        self.current = Some(RawClass {
            name,
            namespace: self.namespace.clone(),
            kind,
            is_abstract: modifiers.contains("abstract"),
            raw_comment: self.pending_comment.take().unwrap_or_default(),
            extends,
            implements,
            members: Vec::new(),
        });
    }

    fn push_method(&mut self, signature: &str) {
        let comment = self.pending_comment.take().unwrap_or_default();
        let Some(caps) = RE_FUNCTION.captures(signature) else {
            return;
        };
        let modifiers: Vec<&str> = caps[1].split_whitespace().collect();
        let name = caps[2].to_string();

        let after_paren = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let (params_text, rest) = split_at_closing_paren(&signature[after_paren..]);
        let params = split_params(params_text)
            .iter()
            .filter_map(|p| self.parse_param(p))
            .collect();

        let return_type = rest
            .trim_start()
            .strip_prefix(':')
            .map(|r| {
                let end = r.find(['{', ';']).unwrap_or(r.len());
                self.resolve_type(r[..end].trim())
            })
            .filter(|t| !t.is_empty());

        let visibility = modifiers
            .iter()
            .find(|m| matches!(**m, "public" | "protected" | "private"))
            .unwrap_or(&"public")
            .to_string();

        if let Some(class) = self.current.as_mut() {
            class.members.push(RawMethod {
                name,
                raw_comment: comment,
                visibility,
                is_static: modifiers.contains(&"static"),
                is_abstract: modifiers.contains(&"abstract"),
                is_final: modifiers.contains(&"final"),
                params,
                return_type,
            });
        }
    }

    /// `?Type &...$name = default`, with constructor-promotion modifiers
    /// dropped. Returns `None` for an empty or nameless fragment.
    fn parse_param(&self, decl: &str) -> Option<RawParam> {
        let (left, default) = split_default(decl);
        let tokens: Vec<&str> = left
            .split_whitespace()
            .filter(|t| !matches!(*t, "public" | "protected" | "private" | "readonly"))
            .collect();
        let name_pos = tokens.iter().rposition(|t| t.contains('$'))?;
        let name = tokens[name_pos]
            .trim_start_matches(|c| c == '&' || c == '.')
            .to_string();
        let native_type = if name_pos > 0 {
            Some(self.resolve_type(tokens[name_pos - 1])).filter(|t| !t.is_empty())
        } else {
            None
        };
        Some(RawParam {
            name,
            native_type,
            default,
        })
    }

    /// Resolve a possibly-union typehint: each class-like member goes
    /// through the imports then the namespace; `?` is dropped; native
    /// types pass through.
    fn resolve_type(&self, declaration: &str) -> String {
        declaration
            .split('|')
            .map(|part| self.resolve_name(part.trim().trim_start_matches('?')))
            .collect::<Vec<_>>()
            .join("|")
    }

    fn resolve_name(&self, name: &str) -> String {
        if name.is_empty() || !types::is_class_reference(name) {
            return name.to_string();
        }
        let core = name.trim_end_matches(|c| c == '[' || c == ']');
        let suffix = &name[core.len()..];
        if core.starts_with('\\') {
            return format!("{}{}", types::sanitize_class_name(core), suffix);
        }
        let mut segments = core.splitn(2, '\\');
        let first = segments.next().unwrap_or_default();
        let rest = segments.next();
        if let Some(target) = self.imports.get(first) {
            return match rest {
                Some(r) => format!("{}\\{}{}", target, r, suffix),
                None => format!("{}{}", target, suffix),
            };
        }
        format!(
            "{}{}",
            types::sanitize_class_name(&format!(
                "{}\\{}",
                self.namespace.trim_matches('\\'),
                core
            )),
            suffix
        )
    }
}

// -- Lexical helpers ----------------------------------------------------------

/// Drop a trailing `//` or `#` comment, respecting string literals.
fn strip_line_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    let mut in_str: Option<char> = None;
    while let Some(c) = chars.next() {
        match in_str {
            Some(q) => {
                out.push(c);
                if c == '\\' {
                    if let Some(n) = chars.next() {
                        out.push(n);
                    }
                } else if c == q {
                    in_str = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    in_str = Some(c);
                    out.push(c);
                }
                '#' => break,
                '/' if chars.peek() == Some(&'/') => break,
                _ => out.push(c),
            },
        }
    }
    out
}

/// True when every `(` in the text has its `)`.
fn parens_balanced(text: &str) -> bool {
    let mut depth = 0i32;
    let mut chars = text.chars();
    let mut in_str: Option<char> = None;
    while let Some(c) = chars.next() {
        match in_str {
            Some(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    in_str = None;
                }
            }
            None => match c {
                '\'' | '"' => in_str = Some(c),
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            },
        }
    }
    depth <= 0
}

/// Split `text` at the parenthesis closing an already-open one: returns
/// (inside, after).
fn split_at_closing_paren(text: &str) -> (&str, &str) {
    let mut depth = 1i32;
    let mut in_str: Option<char> = None;
    let mut iter = text.char_indices();
    while let Some((i, c)) = iter.next() {
        match in_str {
            Some(q) => {
                if c == '\\' {
                    iter.next();
                } else if c == q {
                    in_str = None;
                }
            }
            None => match c {
                '\'' | '"' => in_str = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return (&text[..i], &text[i + 1..]);
                    }
                }
                _ => {}
            },
        }
    }
    (text, "")
}

/// Split a parameter list on top-level commas, respecting nesting and
/// string literals (array defaults carry commas).
fn split_params(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut cur = String::new();
    let mut depth = 0i32;
    let mut in_str: Option<char> = None;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match in_str {
            Some(q) => {
                cur.push(c);
                if c == '\\' {
                    if let Some(n) = chars.next() {
                        cur.push(n);
                    }
                } else if c == q {
                    in_str = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    in_str = Some(c);
                    cur.push(c);
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    cur.push(c);
                }
                ')' | ']' | '}' => {
                    depth -= 1;
                    cur.push(c);
                }
                ',' if depth == 0 => {
                    parts.push(cur.trim().to_string());
                    cur.clear();
                }
                _ => cur.push(c),
            },
        }
    }
    if !cur.trim().is_empty() {
        parts.push(cur.trim().to_string());
    }
    parts.retain(|p| !p.is_empty());
    parts
}

/// Split a parameter fragment at its top-level `=`, yielding the
/// declaration and the default literal.
fn split_default(decl: &str) -> (String, Option<String>) {
    let mut depth = 0i32;
    let mut in_str: Option<char> = None;
    let mut iter = decl.char_indices();
    while let Some((i, c)) = iter.next() {
        match in_str {
            Some(q) => {
                if c == '\\' {
                    iter.next();
                } else if c == q {
                    in_str = None;
                }
            }
            None => match c {
                '\'' | '"' => in_str = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                '=' if depth == 0 => {
                    let default = decl[i + 1..].trim();
                    let left = decl[..i].trim().to_string();
                    return (
                        left,
                        if default.is_empty() {
                            None
                        } else {
                            Some(default.to_string())
                        },
                    );
                }
                _ => {}
            },
        }
    }
    (decl.trim().to_string(), None)
}
