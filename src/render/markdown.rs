//! Markdown table generator.
//!
//! One row per member: visibility badge, name, parameter list, return
//! type and description, plus an optional See column. Member examples are
//! collected while rows are added and emitted as fenced sections after
//! the table.

use crate::model::{FunctionEntity, ParamEntity};
use crate::render::TableGenerator;

#[derive(Debug)]
pub struct MarkdownTable {
    rows: Vec<String>,
    include_see: bool,
    abstraction: bool,
    examples: Vec<(String, String)>,
}

impl Default for MarkdownTable {
    fn default() -> Self {
        MarkdownTable {
            rows: Vec::new(),
            include_see: false,
            abstraction: true,
            examples: Vec::new(),
        }
    }
}

impl TableGenerator for MarkdownTable {
    fn open_table(&mut self, include_see: bool) {
        self.rows.clear();
        self.examples.clear();
        self.include_see = include_see;

        let mut header = String::from("| Visibility | Function | Parameters | Return | Description |");
        let mut align = String::from("|:-----------|:---------|:-----------|:-------|:------------|");
        if include_see {
            header.push_str(" See |");
            align.push_str(":----|");
        }
        self.rows.push(header);
        self.rows.push(align);
    }

    fn declare_abstraction(&mut self, on: bool) {
        self.abstraction = on;
    }

    fn add_func(&mut self, func: &FunctionEntity) {
        let mut visibility = func.visibility.clone();
        if func.is_static {
            visibility.push_str(" static");
        }

        let mut name = format!("{}()", func.name);
        if self.abstraction && func.is_abstract {
            name.insert_str(0, "abstract ");
        }
        let mut name_cell = format!("<strong>{}</strong>", name);
        if func.doc.is_deprecated() {
            name_cell = format!("<strike>{}</strike>", name_cell);
        }

        let params = func
            .params
            .iter()
            .map(render_param)
            .collect::<Vec<_>>()
            .join(", ");

        let description = if func.doc.is_deprecated() {
            deprecation_callout(func.doc.deprecation_message())
        } else {
            func.doc.description.clone()
        };

        let mut row = format!(
            "| {} | {} | {} | <em>{}</em> | {} |",
            visibility, name_cell, params, func.return_type, description
        );
        if self.include_see {
            row.push_str(&format!(" {} |", func.doc.see.join("<br />")));
        }
        self.rows.push(row);

        if let Some(example) = &func.doc.example {
            self.examples.push((func.name.clone(), example.clone()));
        }
    }

    fn table(&self) -> String {
        let mut out = self.rows.join("\n");
        for (name, example) in &self.examples {
            out.push_str(&format!(
                "\n###### Examples of {}()\n{}",
                name,
                format_example_comment(example)
            ));
        }
        out
    }
}

/// `<em>type</em> <strong>$name</strong>`, default value appended verbatim.
fn render_param(param: &ParamEntity) -> String {
    let mut out = format!(
        "<em>{}</em> <strong>{}</strong>",
        param.declared_type, param.name
    );
    if let Some(default) = &param.default {
        out.push('=');
        out.push_str(default);
    }
    out
}

pub fn deprecation_callout(message: &str) -> String {
    if message.is_empty() {
        String::from("**DEPRECATED**")
    } else {
        format!("**DEPRECATED** {}", message)
    }
}

/// Normalize an example block into a fenced code section: any `<code>`
/// tags are stripped and the text is wrapped in a ```php fence unless
/// the comment already carries its own fence.
pub fn format_example_comment(example: &str) -> String {
    let cleaned = example.replace("<code>", "").replace("</code>", "");
    let cleaned = cleaned.trim();
    if cleaned.starts_with("```") {
        cleaned.to_string()
    } else {
        format!("```php\n{}\n```", cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(name: &str) -> FunctionEntity {
        FunctionEntity {
            name: name.to_string(),
            visibility: "public".to_string(),
            return_type: "void".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn header_without_see() {
        let mut t = MarkdownTable::default();
        t.open_table(false);
        let table = t.table();
        assert!(table.starts_with(
            "| Visibility | Function | Parameters | Return | Description |\n"
        ));
        assert!(!table.contains("See"));
    }

    #[test]
    fn header_with_see_column() {
        let mut t = MarkdownTable::default();
        t.open_table(true);
        assert!(t.table().contains("| Description | See |"));
    }

    #[test]
    fn plain_member_row() {
        let mut t = MarkdownTable::default();
        t.open_table(false);
        let mut f = func("run");
        f.return_type = "bool".to_string();
        f.doc.description = "Runs it.".to_string();
        t.add_func(&f);
        assert!(t
            .table()
            .contains("| public | <strong>run()</strong> |  | <em>bool</em> | Runs it. |"));
    }

    #[test]
    fn static_modifier_in_visibility_cell() {
        let mut t = MarkdownTable::default();
        t.open_table(false);
        let mut f = func("create");
        f.is_static = true;
        t.add_func(&f);
        assert!(t.table().contains("| public static |"));
    }

    #[test]
    fn params_rendered_with_types_and_defaults() {
        let mut t = MarkdownTable::default();
        t.open_table(false);
        let mut f = func("add");
        f.params = vec![
            ParamEntity {
                name: "$a".to_string(),
                declared_type: "int".to_string(),
                ..Default::default()
            },
            ParamEntity {
                name: "$b".to_string(),
                declared_type: "int".to_string(),
                default: Some("0".to_string()),
                ..Default::default()
            },
        ];
        t.add_func(&f);
        assert!(t.table().contains(
            "<em>int</em> <strong>$a</strong>, <em>int</em> <strong>$b</strong>=0"
        ));
    }

    #[test]
    fn deprecated_member_struck_with_callout() {
        let mut t = MarkdownTable::default();
        t.open_table(false);
        let mut f = func("add");
        f.doc.deprecated = Some("use add2 instead".to_string());
        t.add_func(&f);
        let table = t.table();
        assert!(table.contains("<strike><strong>add()</strong></strike>"));
        assert!(table.contains("| **DEPRECATED** use add2 instead |"));
    }

    #[test]
    fn deprecated_without_message() {
        assert_eq!(deprecation_callout(""), "**DEPRECATED**");
    }

    #[test]
    fn abstract_prefix_follows_toggle() {
        let mut t = MarkdownTable::default();
        t.open_table(false);
        let mut f = func("load");
        f.is_abstract = true;
        t.add_func(&f);
        assert!(t.table().contains("<strong>abstract load()</strong>"));

        t.open_table(false);
        t.declare_abstraction(false);
        t.add_func(&f);
        assert!(!t.table().contains("abstract load()"));
    }

    #[test]
    fn see_entries_joined_in_cell() {
        let mut t = MarkdownTable::default();
        t.open_table(true);
        let mut f = func("run");
        f.doc.see = vec!["<https://example.com>".to_string(), "\\Acme\\Other".to_string()];
        t.add_func(&f);
        assert!(t
            .table()
            .contains("| <https://example.com><br />\\Acme\\Other |"));
    }

    #[test]
    fn example_section_after_table() {
        let mut t = MarkdownTable::default();
        t.open_table(false);
        let mut f = func("run");
        f.doc.example = Some("$p = new Parser();\n$p->run();".to_string());
        t.add_func(&f);
        let table = t.table();
        assert!(table.contains(
            "###### Examples of run()\n```php\n$p = new Parser();\n$p->run();\n```"
        ));
    }

    #[test]
    fn example_comment_keeps_existing_fence() {
        let fenced = "```php\necho 1;\n```";
        assert_eq!(format_example_comment(fenced), fenced);
    }

    #[test]
    fn example_comment_strips_code_tags() {
        assert_eq!(
            format_example_comment("<code>echo 1;</code>"),
            "```php\necho 1;\n```"
        );
    }

    #[test]
    fn open_table_resets_rows_and_examples() {
        let mut t = MarkdownTable::default();
        t.open_table(false);
        let mut f = func("run");
        f.doc.example = Some("echo 1;".to_string());
        t.add_func(&f);
        t.open_table(false);
        let table = t.table();
        assert!(!table.contains("run()"));
        assert!(!table.contains("Examples of"));
    }
}
