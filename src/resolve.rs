//! Type registry and class resolver.
//!
//! The registry maps qualified names to raw signature records from the
//! scanner. The resolver turns those records into [`ClassEntity`] values,
//! memoized per run: resolving a name twice hands back the same `Rc`, so
//! a class is parsed at most once no matter how often it appears as a
//! parent or interface.

use crate::error::{Error, Result};
use crate::model::{ClassEntity, DocBlock, FunctionEntity, ParamEntity, TypeKind};
use crate::parser::comment::{self, DocInfo};
use crate::parser::php::{RawClass, RawKind, RawMethod};
use crate::types;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, warn};

// -- Registry -----------------------------------------------------------------

/// All raw type declarations known to this run, looked up by qualified
/// name. PHP class names are case-insensitive, so keys are lowercased.
#[derive(Default)]
pub struct TypeRegistry {
    classes: HashMap<String, RawClass>,
}

impl TypeRegistry {
    /// Register a declaration. The first declaration of a name wins.
    pub fn add(&mut self, class: RawClass) {
        self.classes.entry(class.name.to_lowercase()).or_insert(class);
    }

    pub fn get(&self, name: &str) -> Option<&RawClass> {
        self.classes
            .get(&types::sanitize_class_name(name).to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

// -- Resolver -----------------------------------------------------------------

/// Member filters, configured once per run.
pub struct ResolverOptions {
    /// A member is kept when any of its modifiers is in this set.
    pub visibility: Vec<String>,
    /// A member is kept only when its name matches, if set.
    pub method_regex: Option<Regex>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            visibility: ["public", "protected", "abstract", "final"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            method_regex: None,
        }
    }
}

/// Memoizing resolver from type names to finished entities.
pub struct ClassResolver {
    registry: Rc<TypeRegistry>,
    options: ResolverOptions,
    cache: HashMap<String, Rc<ClassEntity>>,
    in_progress: HashSet<String>,
}

impl ClassResolver {
    pub fn new(registry: TypeRegistry, options: ResolverOptions) -> Self {
        ClassResolver {
            registry: Rc::new(registry),
            options,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Resolve a name to its entity, parsing it on first use.
    pub fn resolve(&mut self, name: &str) -> Result<Rc<ClassEntity>> {
        let qualified = types::sanitize_class_name(name);
        let key = qualified.to_lowercase();
        if let Some(entity) = self.cache.get(&key) {
            return Ok(entity.clone());
        }
        // A name re-entered while its own members resolve means a cyclic
        // extends chain; treat the second entry as unresolvable.
        if !self.in_progress.insert(key.clone()) {
            return Err(Error::UnknownType { name: qualified });
        }
        let registry = self.registry.clone();
        let built = match registry.get(&qualified) {
            Some(raw) => {
                debug!("resolving {}", qualified);
                Ok(self.build_class(raw))
            }
            None => Err(Error::UnknownType { name: qualified }),
        };
        self.in_progress.remove(&key);
        let entity = Rc::new(built?);
        self.cache.insert(key, entity.clone());
        Ok(entity)
    }

    /// Find a member by name on a class or anywhere up its extends chain.
    /// Interfaces are not searched. A visited set keeps malformed cyclic
    /// chains finite.
    pub fn find(&mut self, method_name: &str, class_name: &str) -> Option<FunctionEntity> {
        let mut visited = HashSet::new();
        let mut current = types::sanitize_class_name(class_name);
        loop {
            if !visited.insert(current.to_lowercase()) {
                return None;
            }
            let entity = self.resolve(&current).ok()?;
            if let Some(found) = entity.functions.iter().find(|f| f.name == method_name) {
                return Some(found.clone());
            }
            current = entity.extends.clone()?;
        }
    }

    /// Find a member across candidate classes, first match wins.
    pub fn find_in_classes(
        &mut self,
        method_name: &str,
        candidates: &[String],
    ) -> Option<FunctionEntity> {
        candidates
            .iter()
            .find_map(|candidate| self.find(method_name, candidate))
    }

    fn build_class(&mut self, raw: &RawClass) -> ClassEntity {
        let info = comment::parse(&raw.raw_comment, &raw.namespace);
        let mut entity = ClassEntity {
            name: raw.name.clone(),
            namespace: raw.namespace.clone(),
            kind: match raw.kind {
                RawKind::Class => TypeKind::Class,
                RawKind::Interface => TypeKind::Interface,
                RawKind::Trait => TypeKind::Trait,
            },
            is_abstract: raw.is_abstract,
            extends: raw.extends.clone(),
            implements: raw.implements.clone(),
            doc: DocBlock::default(),
            functions: Vec::new(),
        };
        info.apply_to(&mut entity.doc);

        for method in &raw.members {
            if !self.retain(method) {
                continue;
            }
            let info = comment::parse(&method.raw_comment, &raw.namespace);
            if info.has_ignore_tag() {
                continue;
            }
            let func = if info.should_inherit_doc() {
                self.inherited_member(method, raw)
            } else {
                self.build_function(method, &info, &raw.namespace)
            };
            entity.functions.push(func);
        }
        entity
    }

    fn retain(&self, method: &RawMethod) -> bool {
        let allowed = &self.options.visibility;
        if !method.modifiers().iter().any(|m| allowed.iter().any(|v| v == m)) {
            return false;
        }
        if let Some(re) = &self.options.method_regex {
            if !re.is_match(&method.name) {
                return false;
            }
        }
        true
    }

    /// `{@inheritdoc}`: take the ancestor's documentation, keep the
    /// declaring class's own modifiers. Parent chain first, then
    /// interfaces; without a hit the member is documented from its
    /// signature alone.
    fn inherited_member(&mut self, method: &RawMethod, raw: &RawClass) -> FunctionEntity {
        let mut candidates: Vec<String> = Vec::new();
        if let Some(parent) = &raw.extends {
            candidates.push(parent.clone());
        }
        candidates.extend(raw.implements.iter().cloned());

        match self.find_in_classes(&method.name, &candidates) {
            Some(mut found) => {
                found.name = method.name.clone();
                found.visibility = method.visibility.clone();
                found.is_static = method.is_static;
                found.is_abstract = method.is_abstract;
                found
            }
            None => {
                warn!(
                    "no inherited documentation found for {}::{}",
                    raw.name, method.name
                );
                self.build_function(method, &DocInfo::default(), &raw.namespace)
            }
        }
    }

    fn build_function(
        &self,
        method: &RawMethod,
        info: &DocInfo,
        namespace: &str,
    ) -> FunctionEntity {
        let params = method
            .params
            .iter()
            .map(|raw_param| {
                let documented = info.param(&raw_param.name);
                let declared_type = documented
                    .map(|d| d.declared_type.clone())
                    .or_else(|| raw_param.native_type.as_ref().map(|t| t.replace('|', "/")))
                    .unwrap_or_else(|| "mixed".to_string());
                ParamEntity {
                    name: raw_param.name.clone(),
                    native_class_type: self.native_class_type(&declared_type),
                    declared_type,
                    description: documented.map(|d| d.description.clone()).unwrap_or_default(),
                    default: raw_param.default.clone(),
                }
            })
            .collect();

        let return_type = info
            .return_tag()
            .map(|t| types::sanitize_declaration(t, namespace))
            .or_else(|| method.return_type.as_ref().map(|t| t.replace('|', "/")))
            .unwrap_or_else(|| "void".to_string());

        let mut doc = DocBlock::default();
        info.apply_to(&mut doc);

        FunctionEntity {
            name: method.name.clone(),
            params,
            return_native_class: self.native_class_type(&return_type),
            return_type,
            doc,
            visibility: method.visibility.clone(),
            is_static: method.is_static,
            is_abstract: method.is_abstract,
        }
    }

    /// First union member naming a runtime class outside this run: a
    /// class reference in the global namespace with no registry entry
    /// (`\Exception`, `\DateTime`, …). Namespaced unknowns stay plain.
    fn native_class_type(&self, declaration: &str) -> Option<String> {
        declaration.split(['/', '|']).find_map(|part| {
            let part = part.trim();
            if !types::is_class_reference(part) {
                return None;
            }
            let core = part.trim_end_matches(|c| c == '[' || c == ']');
            if core.trim_start_matches('\\').contains('\\') {
                return None;
            }
            if self.registry.contains(core) {
                return None;
            }
            Some(part.to_string())
        })
    }
}
