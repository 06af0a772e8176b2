//! Document assembly.
//!
//! Resolves the requested classes, renders one section per retained
//! class behind a table of contents, and finishes with the cross-link
//! substitution pass. Section order follows the requested order; the
//! caller decides that order (namespace-grouped for directory scans,
//! verbatim for explicit lists).

use crate::error::{Error, Result};
use crate::links::LinkIndex;
use crate::model::ClassEntity;
use crate::render::{markdown, TableGenerator};
use crate::resolve::ClassResolver;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Default)]
pub struct AssembleOptions {
    pub include_see: bool,
    pub exclude_internal: bool,
    /// A single explicitly named class renders without a table of
    /// contents or section anchors.
    pub single_class: bool,
}

/// Render the full document for the requested class names.
pub fn assemble(
    resolver: &mut ClassResolver,
    generator: &mut dyn TableGenerator,
    names: &[String],
    options: &AssembleOptions,
) -> Result<String> {
    // Resolve everything up front so footers and cross-links know the
    // final set of documented classes.
    let mut retained: Vec<Rc<ClassEntity>> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for name in names {
        let class = resolver.resolve(name)?;
        if !seen.insert(class.name.to_lowercase()) {
            continue;
        }
        if class.doc.ignore || (options.exclude_internal && class.doc.internal) {
            continue;
        }
        retained.push(class);
    }
    if retained.is_empty() {
        return Err(Error::NoMatchingTypes);
    }

    let mut anchors: HashMap<String, String> = HashMap::new();
    let mut links = LinkIndex::default();
    for class in &retained {
        anchors.insert(class.name.clone(), class.anchor());
        links.add_documented(class);
    }

    let mut toc: Vec<String> = Vec::new();
    let mut body: Vec<String> = Vec::new();
    for class in &retained {
        toc.push(format!("- [{}](#{})", class.title(), class.anchor()));
        body.push(render_section(class, generator, &anchors, &mut links, options));
    }

    let body = links.apply(&body.join("\n"));

    let mut out = String::new();
    if !options.single_class {
        out.push_str("## Table of contents\n\n");
        out.push_str(&toc.join("\n"));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&body);
    out.push('\n');
    Ok(out)
}

fn render_section(
    class: &ClassEntity,
    generator: &mut dyn TableGenerator,
    anchors: &HashMap<String, String>,
    links: &mut LinkIndex,
    options: &AssembleOptions,
) -> String {
    let mut out = String::new();

    if !options.single_class {
        out.push_str(&format!("<hr /><a id=\"{}\"></a>\n\n", class.anchor()));
    }

    if class.doc.is_deprecated() {
        out.push_str(&format!("### <del>{}</del>\n\n", class.title()));
        out.push_str(&format!(
            "> {}\n\n",
            markdown::deprecation_callout(class.doc.deprecation_message())
        ));
    } else {
        out.push_str(&format!("### {}\n\n", class.title()));
        if !class.doc.description.is_empty() {
            out.push_str(&format!("> {}\n\n", class.doc.description));
        }
    }

    if options.include_see && !class.doc.see.is_empty() {
        for see in &class.doc.see {
            out.push_str(&format!("See {}<br />\n", see));
        }
        out.push('\n');
    }

    if let Some(example) = &class.doc.example {
        out.push_str(&format!(
            "###### Example\n{}\n\n",
            markdown::format_example_comment(example)
        ));
    }

    generator.open_table(options.include_see);
    generator.declare_abstraction(!class.is_interface());
    for func in &class.functions {
        if options.exclude_internal && func.doc.internal {
            continue;
        }
        if let Some(native) = &func.return_native_class {
            links.add_native(native);
        }
        for param in &func.params {
            if let Some(native) = &param.native_class_type {
                links.add_native(native);
            }
        }
        generator.add_func(func);
    }
    out.push_str(&generator.table());
    out.push_str("\n\n");

    if let Some(extends) = &class.extends {
        out.push_str(&format!(
            "\n*This class extends {}*\n",
            footer_link(extends, anchors)
        ));
    }
    if !class.implements.is_empty() {
        let targets: Vec<String> = class
            .implements
            .iter()
            .map(|name| footer_link(name, anchors))
            .collect();
        out.push_str(&format!(
            "\n*This class implements {}*\n",
            targets.join(", ")
        ));
    }

    out
}

/// A footer target becomes a link when its class has a section of its
/// own, otherwise the bare name stands.
fn footer_link(name: &str, anchors: &HashMap<String, String>) -> String {
    match anchors.get(name) {
        Some(anchor) => format!("[{}](#{})", name, anchor),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::php;
    use crate::render::create_generator;
    use crate::resolve::{ClassResolver, ResolverOptions, TypeRegistry};

    fn doc_for(source: &str, names: &[&str], options: &AssembleOptions) -> Result<String> {
        let mut registry = TypeRegistry::default();
        for class in php::parse(source) {
            registry.add(class);
        }
        let mut resolver = ClassResolver::new(registry, ResolverOptions::default());
        let mut generator = create_generator("default").unwrap();
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        assemble(&mut resolver, generator.as_mut(), &names, options)
    }

    #[test]
    fn single_class_has_no_toc_or_anchor() {
        let src = "<?php\nclass Alone {\n    public function f() {}\n}\n";
        let options = AssembleOptions {
            single_class: true,
            ..Default::default()
        };
        let doc = doc_for(src, &["\\Alone"], &options).unwrap();
        assert!(!doc.contains("Table of contents"));
        assert!(!doc.contains("<hr />"));
        assert!(doc.contains("### Alone\n"));
    }

    #[test]
    fn multiple_classes_get_toc_and_anchors() {
        let src = "<?php\nclass A {\n    public function f() {}\n}\nclass B {\n    public function g() {}\n}\n";
        let doc = doc_for(src, &["\\A", "\\B"], &AssembleOptions::default()).unwrap();
        assert!(doc.starts_with("## Table of contents\n\n- [A](#a)\n- [B](#b)\n"));
        assert!(doc.contains("<hr /><a id=\"a\"></a>"));
        assert!(doc.contains("<hr /><a id=\"b\"></a>"));
    }

    #[test]
    fn extends_footer_links_to_documented_parent() {
        let src = "<?php\nclass B {\n    public function g() {}\n}\nclass A extends B {\n    public function f() {}\n}\n";
        let doc = doc_for(src, &["\\A", "\\B"], &AssembleOptions::default()).unwrap();
        assert!(doc.contains("*This class extends [\\B](#b)*"));
    }

    #[test]
    fn extends_footer_plain_for_unknown_parent() {
        let src = "<?php\nclass A extends B {\n    public function f() {}\n}\nclass B {}\n";
        let doc = doc_for(src, &["\\A"], &AssembleOptions::default()).unwrap();
        assert!(doc.contains("*This class extends \\B*"));
        assert!(!doc.contains("extends [\\B]"));
    }

    #[test]
    fn implements_footer_links_documented_targets_only() {
        let src = "<?php\ninterface Seen {\n    public function s();\n}\nclass A implements Seen, \\Countable {\n    public function f() {}\n}\n";
        let doc = doc_for(src, &["\\A", "\\Seen"], &AssembleOptions::default()).unwrap();
        assert!(doc.contains("*This class implements [\\Seen](#seen), \\Countable*"));
    }

    #[test]
    fn no_footer_without_parent_or_interfaces() {
        let src = "<?php\nclass A {\n    public function f() {}\n}\n";
        let options = AssembleOptions {
            single_class: true,
            ..Default::default()
        };
        let doc = doc_for(src, &["\\A"], &options).unwrap();
        assert!(!doc.contains("This class extends"));
        assert!(!doc.contains("This class implements"));
    }

    #[test]
    fn ignored_class_is_skipped() {
        let src = "<?php\n/** @ignore */\nclass Hidden {}\nclass Shown {\n    public function f() {}\n}\n";
        let doc = doc_for(src, &["\\Hidden", "\\Shown"], &AssembleOptions::default()).unwrap();
        assert!(!doc.contains("Hidden"));
        assert!(doc.contains("Shown"));
    }

    #[test]
    fn internal_class_skipped_only_when_excluded() {
        let src = "<?php\n/** @internal */\nclass Guts {\n    public function f() {}\n}\nclass Api {\n    public function g() {}\n}\n";
        let doc = doc_for(src, &["\\Guts", "\\Api"], &AssembleOptions::default()).unwrap();
        assert!(doc.contains("Guts"));

        let options = AssembleOptions {
            exclude_internal: true,
            ..Default::default()
        };
        let doc = doc_for(src, &["\\Guts", "\\Api"], &options).unwrap();
        assert!(!doc.contains("Guts"));
        assert!(doc.contains("Api"));
    }

    #[test]
    fn internal_member_dropped_when_excluded() {
        let src = "<?php\nclass A {\n    /** @internal */\n    public function hidden() {}\n    public function shown() {}\n}\n";
        let options = AssembleOptions {
            exclude_internal: true,
            single_class: true,
            ..Default::default()
        };
        let doc = doc_for(src, &["\\A"], &options).unwrap();
        assert!(!doc.contains("hidden()"));
        assert!(doc.contains("shown()"));
    }

    #[test]
    fn deprecated_class_banner() {
        let src = "<?php\n/**\n * Old thing.\n * @deprecated superseded\n */\nclass Old {\n    public function f() {}\n}\n";
        let options = AssembleOptions {
            single_class: true,
            ..Default::default()
        };
        let doc = doc_for(src, &["\\Old"], &options).unwrap();
        assert!(doc.contains("### <del>Old</del>\n\n> **DEPRECATED** superseded\n"));
        assert!(!doc.contains("> Old thing."));
    }

    #[test]
    fn description_rendered_as_blockquote() {
        let src = "<?php\n/**\n * Parses input.\n */\nclass P {\n    public function f() {}\n}\n";
        let options = AssembleOptions {
            single_class: true,
            ..Default::default()
        };
        let doc = doc_for(src, &["\\P"], &options).unwrap();
        assert!(doc.contains("### P\n\n> Parses input.\n\n"));
    }

    #[test]
    fn see_block_only_with_flag() {
        let src = "<?php\n/**\n * Thing.\n * @see https://example.com\n */\nclass A {\n    public function f() {}\n}\n";
        let options = AssembleOptions {
            single_class: true,
            ..Default::default()
        };
        let doc = doc_for(src, &["\\A"], &options).unwrap();
        assert!(!doc.contains("See <https://example.com>"));

        let options = AssembleOptions {
            include_see: true,
            single_class: true,
            ..Default::default()
        };
        let doc = doc_for(src, &["\\A"], &options).unwrap();
        assert!(doc.contains("See <https://example.com><br />\n"));
    }

    #[test]
    fn class_example_rendered_fenced() {
        let src = "<?php\n/**\n * Thing.\n * @example\n * $a = new A();\n */\nclass A {\n    public function f() {}\n}\n";
        let options = AssembleOptions {
            single_class: true,
            ..Default::default()
        };
        let doc = doc_for(src, &["\\A"], &options).unwrap();
        assert!(doc.contains("###### Example\n```php\n$a = new A();\n```\n\n"));
    }

    #[test]
    fn documented_param_type_becomes_anchor_link() {
        let src = "<?php\nclass Dep {\n    public function d() {}\n}\nclass A {\n    /**\n     * @param Dep $dep the dependency\n     */\n    public function f(Dep $dep) {}\n}\n";
        let doc = doc_for(src, &["\\A", "\\Dep"], &AssembleOptions::default()).unwrap();
        assert!(doc.contains("<em>[\\Dep](#dep)</em> <strong>$dep</strong>"));
    }

    #[test]
    fn native_return_type_links_to_manual() {
        let src = "<?php\nclass A {\n    /**\n     * @return \\Exception\n     */\n    public function f() {}\n}\n";
        let options = AssembleOptions {
            single_class: true,
            ..Default::default()
        };
        let doc = doc_for(src, &["\\A"], &options).unwrap();
        assert!(doc.contains(
            "<em>[\\Exception](https://php.net/manual/en/class.exception.php)</em>"
        ));
    }

    #[test]
    fn empty_retained_set_is_an_error() {
        let src = "<?php\n/** @ignore */\nclass Hidden {}\n";
        let err = doc_for(src, &["\\Hidden"], &AssembleOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NoMatchingTypes));
    }

    #[test]
    fn repeated_request_renders_once() {
        let src = "<?php\nclass A {\n    public function f() {}\n}\n";
        let doc = doc_for(src, &["\\A", "\\A"], &AssembleOptions::default()).unwrap();
        assert_eq!(doc.matches("<a id=\"a\"></a>").count(), 1);
    }

    #[test]
    fn interface_title_carries_marker() {
        let src = "<?php\ninterface Walker {\n    public function walk();\n}\n";
        let options = AssembleOptions {
            single_class: true,
            ..Default::default()
        };
        let doc = doc_for(src, &["\\Walker"], &options).unwrap();
        assert!(doc.contains("### Walker (interface)\n"));
    }
}
