//! Cross-reference link index and the final substitution pass.
//!
//! While sections render, every documented class contributes its anchor
//! and every native class type seen in a signature contributes an
//! external manual URL. One pass over the finished body then turns bare
//! type names into links. Names are only matched right after `<em>` or
//! `/`, the two positions the table renderer emits type names in, so
//! prose mentioning a class stays untouched.

use crate::model::ClassEntity;
use crate::types;
use std::collections::HashMap;

#[derive(Default)]
pub struct LinkIndex {
    targets: HashMap<String, String>,
}

impl LinkIndex {
    /// Link a class documented in this run to its section anchor.
    pub fn add_documented(&mut self, class: &ClassEntity) {
        self.targets
            .insert(class.name.clone(), format!("#{}", class.anchor()));
    }

    /// Link a runtime class with no section to its manual page.
    pub fn add_native(&mut self, type_name: &str) {
        self.targets
            .entry(type_name.to_string())
            .or_insert_with(|| types::php_net_url(type_name));
    }

    /// Substitute every indexed name in the rendered body. Longest name
    /// first, so a name that prefixes another is never linked inside the
    /// longer name's replacement.
    pub fn apply(&self, body: &str) -> String {
        let mut names: Vec<&String> = self.targets.keys().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let mut out = body.to_string();
        for name in names {
            let link = format!("[{}]({})", name, self.targets[name]);
            out = out.replace(
                &format!("<em>{}", name),
                &format!("<em>{}", link),
            );
            out = out.replace(&format!("/{}", name), &format!("/{}", link));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documented(name: &str) -> ClassEntity {
        ClassEntity {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn documented_class_links_to_anchor() {
        let mut index = LinkIndex::default();
        index.add_documented(&documented("\\Acme\\Parser"));
        assert_eq!(
            index.apply("| <em>\\Acme\\Parser</em> |"),
            "| <em>[\\Acme\\Parser](#acme-parser)</em> |"
        );
    }

    #[test]
    fn native_class_links_to_manual() {
        let mut index = LinkIndex::default();
        index.add_native("\\Exception");
        assert_eq!(
            index.apply("<em>\\Exception</em>"),
            "<em>[\\Exception](https://php.net/manual/en/class.exception.php)</em>"
        );
    }

    #[test]
    fn union_member_after_slash_is_linked() {
        let mut index = LinkIndex::default();
        index.add_native("\\Throwable");
        assert_eq!(
            index.apply("<em>null/\\Throwable</em>"),
            "<em>null/[\\Throwable](https://php.net/manual/en/class.throwable.php)</em>"
        );
    }

    #[test]
    fn longest_name_substituted_first() {
        let mut index = LinkIndex::default();
        index.add_documented(&documented("\\Acme\\Parser"));
        index.add_documented(&documented("\\Acme\\ParserCache"));
        let out = index.apply("<em>\\Acme\\ParserCache</em> <em>\\Acme\\Parser</em>");
        assert_eq!(
            out,
            "<em>[\\Acme\\ParserCache](#acme-parsercache)</em> <em>[\\Acme\\Parser](#acme-parser)</em>"
        );
    }

    #[test]
    fn prose_mentions_left_alone() {
        let mut index = LinkIndex::default();
        index.add_documented(&documented("\\Parser"));
        let text = "> Builds a \\Parser from source.";
        assert_eq!(index.apply(text), text);
    }

    #[test]
    fn documented_entry_not_overridden_by_native() {
        let mut index = LinkIndex::default();
        index.add_documented(&documented("\\Parser"));
        index.add_native("\\Parser");
        assert_eq!(
            index.apply("<em>\\Parser</em>"),
            "<em>[\\Parser](#parser)</em>"
        );
    }
}
