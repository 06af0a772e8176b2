//! PHP type-name helpers: the native-type table, namespace qualification
//! and php.net reference links.
//!
//! Type declarations arrive in many shapes (`int`, `Foo[]`, `\Acme\Foo`,
//! `null|string`). Everything here is plain string surgery; nothing is
//! validated against real PHP semantics.

/// Types provided by the PHP runtime itself. Anything else that looks like
/// an identifier is treated as a class reference.
const NATIVE_TYPES: &[&str] = &[
    "mixed", "string", "array", "object", "generator", "resource", "float",
    "bool", "boolean", "false", "true", "int", "integer", "number", "void",
    "null", "callable", "iterable", "self", "static",
];

/// Strip array notation and surrounding noise down to the comparable core
/// of a type declaration.
fn type_core(declaration: &str) -> String {
    declaration
        .trim()
        .trim_end_matches(|c| c == '[' || c == ']')
        .to_lowercase()
}

/// True when the declaration names a runtime-native type (`int`, `bool[]`, …).
pub fn is_native_type(declaration: &str) -> bool {
    NATIVE_TYPES.contains(&type_core(declaration).as_str())
}

/// True when the declaration looks like a reference to a class, interface
/// or trait rather than a native type. Multi-word values (prose that ended
/// up in a type position) are never class references.
pub fn is_class_reference(declaration: &str) -> bool {
    let core = type_core(declaration);
    !core.is_empty() && !core.contains(' ') && !NATIVE_TYPES.contains(&core.as_str())
}

/// Normalize a class name to exactly one leading backslash.
pub fn sanitize_class_name(name: &str) -> String {
    format!("\\{}", name.trim_matches(|c| c == ' ' || c == '\\'))
}

/// Normalize a type declaration against its enclosing namespace.
///
/// Union members are split on `|`, class references are qualified (a bare
/// name gets the namespace prefixed, an absolute name is kept), native
/// types pass through untouched. Members are rejoined with `/` because `|`
/// would break a Markdown table cell.
pub fn sanitize_declaration(declaration: &str, namespace: &str) -> String {
    let parts: Vec<String> = declaration
        .split('|')
        .map(|part| {
            if !part.starts_with('\\') && is_class_reference(part) {
                sanitize_class_name(&format!(
                    "\\{}\\{}",
                    namespace.trim_matches('\\'),
                    part
                ))
            } else if is_class_reference(part) {
                sanitize_class_name(part)
            } else {
                part.to_string()
            }
        })
        .collect();
    parts.join("/")
}

/// php.net manual URL for a runtime-native class such as `\Exception`.
pub fn php_net_url(class_name: &str) -> String {
    format!(
        "https://php.net/manual/en/class.{}.php",
        class_name.replace("[]", "").replace('\\', "").to_lowercase()
    )
}
