//! Loaded modules: load, the type registry, and instantiation.

use std::sync::Arc;

use kiln_emit::{LoadableUnit, MethodCode, ModuleImage};
use kiln_types::{ModuleMetadata, OutputKind, TypeKind, TypeMetadata, Visibility};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::capability::{Capability, InvocationHandle};
use crate::console::SharedConsole;
use crate::error::{invalid, InstantiateError, LoadError, RuntimeError};
use crate::interp::Interpreter;
use crate::options::{ExecutionLimits, LoadOptions};
use crate::value::{Object, ObjectRef, Value};
use crate::verify::verify;

/// Where a `CallStatic` target lives, fixed at load time.
pub(crate) enum ResolvedCall {
    Local {
        type_index: usize,
        method_index: usize,
    },
    External {
        module: ModuleHandle,
        type_index: usize,
        method_index: usize,
    },
    /// Dispatched on the receiver at each call.
    Virtual,
}

/// Creates instances of one class: zeroed fields, then the initializer.
struct Factory {
    type_index: usize,
    defaults: Vec<Value>,
}

impl Factory {
    fn create(&self, module: &ModuleHandle) -> Result<ObjectRef, RuntimeError> {
        let object = Arc::new(Object {
            module: module.clone(),
            type_index: self.type_index,
            fields: Mutex::new(self.defaults.clone()),
        });
        if let Some(init) = &module.image().types[self.type_index].init {
            Interpreter::new(module.limits()).call(module, init, Some(&object), Vec::new())?;
        }
        Ok(object)
    }
}

pub(crate) struct LoadedModule {
    image: ModuleImage,
    calls: Vec<ResolvedCall>,
    globals: Mutex<Vec<Value>>,
    types_by_name: FxHashMap<String, usize>,
    /// Type registry: full name → factory, for instantiable classes.
    factories: FxHashMap<String, Factory>,
    method_tables: Vec<FxHashMap<String, usize>>,
    limits: ExecutionLimits,
    console: SharedConsole,
}

/// A loaded unit. Cheap to clone; clones share globals.
#[derive(Clone)]
pub struct ModuleHandle(Arc<LoadedModule>);

impl std::fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleHandle")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Decode, verify and link a unit, then run its static initializers.
#[tracing::instrument(level = "debug", skip_all)]
pub fn load(unit: &LoadableUnit, options: LoadOptions) -> Result<ModuleHandle, LoadError> {
    let image = unit.decode()?;
    verify(&image)?;
    debug!(module = %image.name, types = image.types.len(), "unit verified");
    if tracing::enabled!(tracing::Level::TRACE) {
        for ty in &image.types {
            for code in &ty.methods {
                trace!(type_name = %ty.full_name, method = code.name(), "bytecode:\n{}", code.disassemble());
            }
        }
    }

    let calls = resolve_calls(&image, &options.dependencies)?;
    let types_by_name = image
        .types
        .iter()
        .enumerate()
        .map(|(index, ty)| (ty.full_name.clone(), index))
        .collect();
    let method_tables = image
        .types
        .iter()
        .map(|ty| {
            ty.methods
                .iter()
                .enumerate()
                .map(|(index, m)| (m.name().to_string(), index))
                .collect()
        })
        .collect();
    let factories = image
        .types
        .iter()
        .enumerate()
        .filter(|(_, ty)| ty.kind == TypeKind::Class && !ty.is_static)
        .map(|(type_index, ty)| {
            let defaults = ty
                .fields
                .iter()
                .filter(|f| f.global.is_none())
                .map(|f| Value::from(&f.default))
                .collect();
            (ty.full_name.clone(), Factory { type_index, defaults })
        })
        .collect();
    let globals = Mutex::new(image.globals.iter().map(Value::from).collect());

    let module = ModuleHandle(Arc::new(LoadedModule {
        image,
        calls,
        globals,
        types_by_name,
        factories,
        method_tables,
        limits: options.limits,
        console: options.console,
    }));
    module.run_static_initializers()?;
    debug!(module = %module.name(), "load complete");
    Ok(module)
}

fn resolve_calls(image: &ModuleImage, dependencies: &[ModuleHandle]) -> Result<Vec<ResolvedCall>, LoadError> {
    image
        .call_targets
        .iter()
        .map(|target| {
            if target.type_name.is_empty() {
                return Ok(ResolvedCall::Virtual);
            }
            let unresolved = || LoadError::UnresolvedCall {
                type_name: target.type_name.clone(),
                method: target.method.clone(),
            };
            let fits = |code: &MethodCode| {
                code.sig.is_static
                    && code.arity() == usize::from(target.argc)
                    && code.returns_value() == target.returns_value
            };
            if let Some((type_index, ty)) = image.find_type(&target.type_name) {
                return match ty.method(&target.method) {
                    Some((method_index, code)) if fits(code) => Ok(ResolvedCall::Local {
                        type_index,
                        method_index,
                    }),
                    _ => Err(unresolved()),
                };
            }
            for dependency in dependencies {
                let Some((type_index, ty)) = dependency.image().find_type(&target.type_name) else {
                    continue;
                };
                return match ty.method(&target.method) {
                    Some((method_index, code)) if fits(code) && code.sig.visibility == Visibility::Public => {
                        Ok(ResolvedCall::External {
                            module: dependency.clone(),
                            type_index,
                            method_index,
                        })
                    }
                    _ => Err(unresolved()),
                };
            }
            Err(unresolved())
        })
        .collect()
}

impl ModuleHandle {
    pub fn name(&self) -> &str {
        &self.0.image.name
    }

    pub fn output_kind(&self) -> OutputKind {
        self.0.image.output_kind
    }

    /// Public surface of the unit.
    pub fn metadata(&self) -> &ModuleMetadata {
        &self.0.image.metadata
    }

    /// Full names of every type in the unit, in declaration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.0.image.types.iter().map(|t| t.full_name.as_str())
    }

    pub(crate) fn image(&self) -> &ModuleImage {
        &self.0.image
    }

    pub(crate) fn limits(&self) -> ExecutionLimits {
        self.0.limits
    }

    pub(crate) fn console(&self) -> &SharedConsole {
        &self.0.console
    }

    pub(crate) fn type_name(&self, type_index: usize) -> &str {
        self.0
            .image
            .types
            .get(type_index)
            .map_or("<unknown>", |t| t.full_name.as_str())
    }

    pub(crate) fn implements(&self, type_index: usize, interface: &str) -> bool {
        self.0
            .image
            .types
            .get(type_index)
            .is_some_and(|t| t.interfaces.iter().any(|i| i == interface))
    }

    pub(crate) fn method_index(&self, type_index: usize, name: &str) -> Option<usize> {
        self.0.method_tables.get(type_index)?.get(name).copied()
    }

    pub(crate) fn method(&self, type_index: usize, method_index: usize) -> Result<&MethodCode, RuntimeError> {
        self.0
            .image
            .types
            .get(type_index)
            .and_then(|t| t.methods.get(method_index))
            .ok_or_else(|| invalid(format!("method {method_index} of type {type_index} does not exist")))
    }

    pub(crate) fn resolved_call(&self, id: u32) -> Result<&ResolvedCall, RuntimeError> {
        self.0
            .calls
            .get(id as usize)
            .ok_or_else(|| invalid(format!("call target ${id} does not exist")))
    }

    pub(crate) fn call_method_name(&self, id: u32) -> Result<&str, RuntimeError> {
        self.0
            .image
            .call_targets
            .get(id as usize)
            .map(|t| t.method.as_str())
            .ok_or_else(|| invalid(format!("call target ${id} does not exist")))
    }

    pub(crate) fn call_argc(&self, id: u32) -> Result<usize, RuntimeError> {
        self.0
            .image
            .call_targets
            .get(id as usize)
            .map(|t| usize::from(t.argc))
            .ok_or_else(|| invalid(format!("call target ${id} does not exist")))
    }

    pub(crate) fn load_global(&self, index: u32) -> Result<Value, RuntimeError> {
        self.0
            .globals
            .lock()
            .get(index as usize)
            .cloned()
            .ok_or_else(|| invalid(format!("global {index} does not exist")))
    }

    pub(crate) fn store_global(&self, index: u32, value: Value) -> Result<(), RuntimeError> {
        let mut globals = self.0.globals.lock();
        let slot = globals
            .get_mut(index as usize)
            .ok_or_else(|| invalid(format!("global {index} does not exist")))?;
        *slot = value;
        Ok(())
    }

    pub(crate) fn string(&self, id: u32) -> Result<&str, RuntimeError> {
        self.0
            .image
            .strings
            .get(id as usize)
            .map(String::as_str)
            .ok_or_else(|| invalid(format!("string #{id} does not exist")))
    }

    fn run_static_initializers(&self) -> Result<(), LoadError> {
        for ty in &self.0.image.types {
            if let Some(init) = &ty.static_init {
                Interpreter::new(self.limits())
                    .call(self, init, None, Vec::new())
                    .map_err(|source| LoadError::StaticInitializer {
                        type_name: ty.full_name.clone(),
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Create an instance of `type_name` and expose it through `capability`.
    ///
    /// The type must be a non-static class that names the capability among
    /// its interfaces and has a public instance method of the exact shape of
    /// every capability method.
    pub fn instantiate(
        &self,
        type_name: &str,
        capability: &TypeMetadata,
    ) -> Result<InvocationHandle, InstantiateError> {
        let Some(&type_index) = self.0.types_by_name.get(type_name) else {
            return Err(InstantiateError::TypeNotFound(type_name.to_string()));
        };
        let ty = &self.0.image.types[type_index];
        let not_instantiable = |reason: &str| InstantiateError::NotInstantiable {
            type_name: type_name.to_string(),
            reason: reason.to_string(),
        };
        if ty.kind == TypeKind::Interface {
            return Err(not_instantiable("interfaces have no implementation"));
        }
        let Some(factory) = self.0.factories.get(type_name) else {
            return Err(not_instantiable("static classes cannot be instantiated"));
        };

        let mismatch = |reason: String| InstantiateError::CapabilityMismatch {
            type_name: type_name.to_string(),
            capability: capability.full_name.clone(),
            reason,
        };
        if !ty.interfaces.contains(&capability.full_name) {
            return Err(mismatch("the type does not implement the interface".to_string()));
        }
        let mut methods = FxHashMap::default();
        for wanted in &capability.methods {
            let found = ty.method(&wanted.name).filter(|(_, code)| {
                !code.sig.is_static
                    && code.sig.visibility == Visibility::Public
                    && code.sig.same_shape(wanted)
            });
            let Some((index, _)) = found else {
                return Err(mismatch(format!(
                    "no public method matches `{}`",
                    wanted.qualified(&capability.full_name)
                )));
            };
            methods.insert(wanted.name.clone(), (index, wanted.clone()));
        }

        let object = factory
            .create(self)
            .map_err(|source| InstantiateError::Initializer {
                type_name: type_name.to_string(),
                source,
            })?;
        debug!(type_name, capability = %capability.full_name, "instantiated");
        Ok(InvocationHandle::new(
            self.clone(),
            object,
            capability.full_name.clone(),
            methods,
        ))
    }

    /// [`ModuleHandle::instantiate`] for a host-side capability type.
    pub fn instantiate_as<C: Capability>(&self, type_name: &str) -> Result<C, InstantiateError> {
        self.instantiate(type_name, &C::interface()).map(C::bind)
    }

    /// Run the entry point of an executable unit. `void Main` exits with 0.
    pub fn run_main(&self) -> Result<i32, RuntimeError> {
        let entry = self.0.image.entry_point.as_ref().ok_or(RuntimeError::NoEntryPoint)?;
        let code = self.method(entry.type_index as usize, entry.method_index as usize)?;
        let result = Interpreter::new(self.limits()).call(self, code, None, Vec::new())?;
        Ok(result.as_int().unwrap_or(0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
