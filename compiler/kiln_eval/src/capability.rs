//! Capabilities: host-side views of guest objects.
//!
//! An [`InvocationHandle`] is the only way a host reaches a guest object.
//! It exposes exactly the methods of one interface, checks arguments
//! against that interface's signatures, and serializes calls on the
//! instance. [`Capability`] lets a host wrap a handle in its own type.

use kiln_types::{MethodSig, TypeMetadata};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::RuntimeError;
use crate::interp::Interpreter;
use crate::module::ModuleHandle;
use crate::value::{ObjectRef, Value};

/// A host type that can be bound to an instance implementing
/// [`Capability::interface`].
///
/// ```ignore
/// struct Adder(InvocationHandle);
///
/// impl Capability for Adder {
///     fn interface() -> TypeMetadata {
///         TypeMetadata::interface("Playground.ICalculator")
///             .with_method(MethodSig::new("Add", vec![Ty::Int, Ty::Int], Ty::Int))
///     }
///     fn bind(handle: InvocationHandle) -> Self {
///         Adder(handle)
///     }
/// }
/// ```
pub trait Capability: Sized {
    fn interface() -> TypeMetadata;
    fn bind(handle: InvocationHandle) -> Self;
}

pub struct InvocationHandle {
    module: ModuleHandle,
    object: ObjectRef,
    capability: String,
    /// Method name → (index in the object's type, capability signature).
    methods: FxHashMap<String, (usize, MethodSig)>,
    /// Held for the duration of an invocation.
    lock: Mutex<()>,
}

impl std::fmt::Debug for InvocationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationHandle")
            .field("type", &self.object.type_name())
            .field("capability", &self.capability)
            .finish_non_exhaustive()
    }
}

impl InvocationHandle {
    pub(crate) fn new(
        module: ModuleHandle,
        object: ObjectRef,
        capability: String,
        methods: FxHashMap<String, (usize, MethodSig)>,
    ) -> Self {
        InvocationHandle {
            module,
            object,
            capability,
            methods,
            lock: Mutex::new(()),
        }
    }

    /// Full name of the interface this handle exposes.
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// Full name of the instance's type.
    pub fn type_name(&self) -> &str {
        self.object.type_name()
    }

    /// Call a capability method. Each call gets a fresh step budget.
    #[tracing::instrument(level = "debug", skip(self, args), fields(capability = %self.capability))]
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let (index, sig) = self
            .methods
            .get(method)
            .ok_or_else(|| RuntimeError::NotInCapability {
                method: method.to_string(),
            })?;
        if args.len() != sig.params.len() {
            return Err(RuntimeError::ArgumentCount {
                method: method.to_string(),
                expected: sig.params.len(),
                found: args.len(),
            });
        }
        for (position, (arg, param)) in args.iter().zip(&sig.params).enumerate() {
            if !arg.conforms_to(param) {
                return Err(RuntimeError::ArgumentType {
                    method: method.to_string(),
                    position,
                    expected: param.to_string(),
                });
            }
        }

        let _guard = self.lock.lock();
        let code = self.module.method(self.object.type_index, *index)?;
        Interpreter::new(self.module.limits()).call(&self.module, code, Some(&self.object), args.to_vec())
    }

    /// [`InvocationHandle::invoke`] for a method returning `int`.
    pub fn invoke_int(&self, method: &str, args: &[Value]) -> Result<i32, RuntimeError> {
        let value = self.invoke(method, args)?;
        value.as_int().ok_or_else(|| {
            RuntimeError::InvalidProgram(format!("`{method}` returned {} instead of int", value.type_name()))
        })
    }
}
