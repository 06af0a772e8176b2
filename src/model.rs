//! Entity model for parsed documentation — passive containers populated by
//! the resolver, consumed by the renderers.

/// Kind of a PHP type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Trait,
}

impl Default for TypeKind {
    fn default() -> Self {
        TypeKind::Class
    }
}

/// Doc-comment metadata shared by classes and functions.
#[derive(Debug, Default, Clone)]
pub struct DocBlock {
    pub description: String,
    /// Raw example text, whitespace preserved.
    pub example: Option<String>,
    /// @see entries in source order.
    pub see: Vec<String>,
    /// `Some("")` means deprecated with no detail given.
    pub deprecated: Option<String>,
    pub internal: bool,
    pub ignore: bool,
}

impl DocBlock {
    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }

    pub fn deprecation_message(&self) -> &str {
        self.deprecated.as_deref().unwrap_or("")
    }
}

/// A resolved class, interface or trait. Identity is the fully qualified
/// name (leading backslash); one instance per name per run.
#[derive(Debug, Default)]
pub struct ClassEntity {
    /// Fully qualified, e.g. `\Acme\HtmlParser`.
    pub name: String,
    /// Enclosing namespace with leading backslash, empty for global types.
    pub namespace: String,
    pub kind: TypeKind,
    pub is_abstract: bool,
    /// Fully qualified parent name.
    pub extends: Option<String>,
    /// Fully qualified interface names in declaration order.
    pub implements: Vec<String>,
    pub doc: DocBlock,
    /// Members in declaration order, already filtered.
    pub functions: Vec<FunctionEntity>,
}

impl ClassEntity {
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Display name: global classes drop the leading backslash, namespaced
    /// classes keep the fully qualified form.
    pub fn display_name(&self) -> &str {
        if self.name.matches('\\').count() == 1 {
            self.name.trim_start_matches('\\')
        } else {
            &self.name
        }
    }

    /// Section heading, `%name% %extra%` with the extra marker naming the
    /// abstraction (`(interface)`, `(abstract)`) when there is one.
    pub fn title(&self) -> String {
        let extra = if self.is_interface() {
            " (interface)"
        } else if self.is_abstract {
            " (abstract)"
        } else {
            ""
        };
        format!("{}{}", self.display_name(), extra)
    }

    /// Anchor slug for in-document links. Lowercased fully qualified name
    /// with every character outside `[a-z0-9_]` mapped to `-`; the leading
    /// backslash is dropped so a global class slugs to its bare name.
    /// Distinct qualified names always produce distinct slugs because `-`
    /// cannot occur inside a PHP identifier.
    pub fn anchor(&self) -> String {
        self.name
            .trim_start_matches('\\')
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect()
    }
}

/// A documented method, owned by exactly one [`ClassEntity`].
#[derive(Debug, Default, Clone)]
pub struct FunctionEntity {
    pub name: String,
    pub params: Vec<ParamEntity>,
    /// Declared or documented return type, `void` when absent.
    pub return_type: String,
    /// The return type string when it names a runtime class with no
    /// section in this run (linked to php.net instead of an anchor).
    pub return_native_class: Option<String>,
    pub doc: DocBlock,
    /// `public`, `protected` or `private`.
    pub visibility: String,
    pub is_static: bool,
    pub is_abstract: bool,
}

/// One declared parameter, owned by exactly one [`FunctionEntity`].
#[derive(Debug, Default, Clone)]
pub struct ParamEntity {
    /// With sigil, e.g. `$haystack`.
    pub name: String,
    /// Documented type, native signature type, or `mixed`.
    pub declared_type: String,
    pub description: String,
    /// Default value literal from the signature, verbatim.
    pub default: Option<String>,
    /// The type string when it names a runtime class outside this run.
    pub native_class_type: Option<String>,
}
