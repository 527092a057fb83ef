//! Load, instantiation and runtime errors.

use kiln_emit::FormatError;

/// A failure while executing guest code.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("attempted to divide by zero")]
    DivideByZero,
    #[error("arithmetic operation resulted in an overflow: {operation}")]
    Overflow { operation: &'static str },
    #[error("`Math.Clamp`: minimum {min} cannot be greater than maximum {max}")]
    ClampRange { min: i32, max: i32 },
    #[error("execution exceeded the limit of {limit} steps")]
    StepLimit { limit: u64 },
    #[error("call depth exceeded the limit of {limit} frames")]
    StackOverflow { limit: u32 },
    #[error("object reference not set to an instance of an object")]
    NullReference,
    #[error("method `{method}` takes {expected} argument(s) but {found} were supplied")]
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },
    #[error("argument {position} of `{method}` must be `{expected}`")]
    ArgumentType {
        method: String,
        position: usize,
        expected: String,
    },
    #[error("`{method}` is not a member of the capability this handle exposes")]
    NotInCapability { method: String },
    #[error("`{type_name}` has no method `{method}`")]
    MissingMethod { type_name: String, method: String },
    /// Bytecode did something verification could not rule out, such as
    /// reading a field the receiver does not have.
    #[error("invalid program: {0}")]
    InvalidProgram(String),
    #[error("unit has no entry point")]
    NoEntryPoint,
}

pub(crate) fn invalid(message: impl Into<String>) -> RuntimeError {
    RuntimeError::InvalidProgram(message.into())
}

/// Bytecode rejected by the verifier.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("`{type_name}.{method}`{}: {message}", location(.at))]
pub struct VerifyError {
    pub type_name: String,
    pub method: String,
    pub at: Option<usize>,
    pub message: String,
}

fn location(at: &Option<usize>) -> String {
    at.map(|pc| format!(" at @{pc}")).unwrap_or_default()
}

/// Why a unit could not be loaded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("unit failed verification: {0}")]
    Verify(#[from] VerifyError),
    #[error("call to `{type_name}.{method}` cannot be resolved in the unit or its dependencies")]
    UnresolvedCall { type_name: String, method: String },
    #[error("static initializer of `{type_name}` failed: {source}")]
    StaticInitializer {
        type_name: String,
        #[source]
        source: RuntimeError,
    },
}

/// Why a type could not be instantiated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InstantiateError {
    #[error("type `{0}` was not found in the unit")]
    TypeNotFound(String),
    #[error("type `{type_name}` does not satisfy `{capability}`: {reason}")]
    CapabilityMismatch {
        type_name: String,
        capability: String,
        reason: String,
    },
    #[error("type `{type_name}` cannot be instantiated: {reason}")]
    NotInstantiable { type_name: String, reason: String },
    #[error("field initializer of `{type_name}` failed: {source}")]
    Initializer {
        type_name: String,
        #[source]
        source: RuntimeError,
    },
}
