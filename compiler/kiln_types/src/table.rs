//! Symbol table: every type visible to a unit, keyed by full name.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::corelib::is_core;
use crate::metadata::{MethodSig, ModuleMetadata, TypeKind, TypeMetadata, Visibility};

/// Where a visible type comes from.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Origin {
    /// Declared in the unit being checked.
    Unit,
    /// Imported from the named reference module.
    Reference(String),
}

#[derive(Clone, Debug)]
pub struct TypeEntry {
    pub meta: TypeMetadata,
    pub origin: Origin,
}

impl TypeEntry {
    pub fn is_local(&self) -> bool {
        self.origin == Origin::Unit
    }
}

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    types: FxHashMap<String, TypeEntry>,
    namespaces: FxHashSet<String>,
    has_core: bool,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from reference metadata. Only public types are imported;
    /// on a name clash the earlier reference wins.
    pub fn from_references(references: &[ModuleMetadata]) -> Self {
        let mut table = SymbolTable::new();
        for module in references {
            table.add_reference(module);
        }
        table
    }

    pub fn add_reference(&mut self, module: &ModuleMetadata) {
        if is_core(module) {
            self.has_core = true;
        }
        for ty in &module.types {
            if ty.visibility != Visibility::Public || self.types.contains_key(&ty.full_name) {
                continue;
            }
            self.add_namespace(ty.namespace());
            self.types.insert(
                ty.full_name.clone(),
                TypeEntry {
                    meta: ty.clone(),
                    origin: Origin::Reference(module.name.clone()),
                },
            );
        }
    }

    /// Register a type declared in the unit. Returns `false` (and changes
    /// nothing) if the full name is already taken.
    pub fn add_local(&mut self, meta: TypeMetadata) -> bool {
        if self.types.contains_key(&meta.full_name) {
            return false;
        }
        self.add_namespace(meta.namespace());
        self.types.insert(
            meta.full_name.clone(),
            TypeEntry {
                meta,
                origin: Origin::Unit,
            },
        );
        true
    }

    /// Register a namespace and all of its prefixes.
    pub fn add_namespace(&mut self, namespace: &str) {
        let mut prefix = String::new();
        for segment in namespace.split('.').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            self.namespaces.insert(prefix.clone());
        }
    }

    pub fn has_core(&self) -> bool {
        self.has_core
    }

    pub fn get(&self, full_name: &str) -> Option<&TypeEntry> {
        self.types.get(full_name)
    }

    pub fn get_mut(&mut self, full_name: &str) -> Option<&mut TypeEntry> {
        self.types.get_mut(full_name)
    }

    pub fn is_namespace(&self, name: &str) -> bool {
        self.namespaces.contains(name)
    }

    pub fn is_interface(&self, full_name: &str) -> bool {
        self.get(full_name)
            .is_some_and(|e| e.meta.kind == TypeKind::Interface)
    }

    /// Interfaces `full_name` lists, followed transitively. Cycles are cut;
    /// the type itself appears in the result only if it is part of one.
    pub fn all_interfaces(&self, full_name: &str) -> Vec<String> {
        let mut seen = FxHashSet::default();
        let mut order = Vec::new();
        let mut stack: Vec<String> = self
            .get(full_name)
            .map(|e| e.meta.interfaces.iter().rev().cloned().collect())
            .unwrap_or_default();
        while let Some(name) = stack.pop() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(entry) = self.get(&name) {
                stack.extend(entry.meta.interfaces.iter().rev().cloned());
            }
            order.push(name);
        }
        order
    }

    /// True if a value of type `from` can be used where `to` is expected.
    pub fn implements(&self, from: &str, to: &str) -> bool {
        from == to || self.all_interfaces(from).iter().any(|i| i == to)
    }

    /// Find a method on `full_name`, searching base interfaces of an
    /// interface. Returns the declaring type alongside the signature.
    pub fn find_method(&self, full_name: &str, name: &str) -> Option<(String, &MethodSig)> {
        let entry = self.get(full_name)?;
        if let Some(sig) = entry.meta.method(name) {
            return Some((full_name.to_string(), sig));
        }
        if entry.meta.kind != TypeKind::Interface {
            return None;
        }
        self.all_interfaces(full_name).into_iter().find_map(|base| {
            let sig = self.get(&base)?.meta.method(name)?;
            Some((base, sig))
        })
    }

    /// Full name of the type `name` declared in `namespace`, if it exists.
    pub fn lookup_in(&self, namespace: &str, name: &str) -> Option<String> {
        let full = qualify(namespace, name);
        self.types.contains_key(&full).then_some(full)
    }
}

/// Join a namespace and a name; the global namespace is `""`.
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
