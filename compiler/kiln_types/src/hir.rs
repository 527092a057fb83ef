//! Checked module: the typed, name-resolved form of a unit.
//!
//! Every name is resolved: locals are slots, fields are indices into their
//! type's field list, and calls name their target explicitly. The emitter
//! lowers this tree to bytecode without further lookups.

use kiln_ir::Span;
use serde::{Deserialize, Serialize};

use crate::corelib::Native;
use crate::metadata::{ModuleMetadata, TypeKind};
use crate::ty::Ty;

/// What a compilation produces.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum OutputKind {
    /// A unit whose types are instantiated by the host.
    #[default]
    Library,
    /// A unit with a `static Main()` entry point.
    Executable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckedModule {
    pub name: String,
    pub output_kind: OutputKind,
    pub types: Vec<HType>,
    pub entry_point: Option<EntryPoint>,
    /// Public surface, for use as a reference by later compilations.
    pub metadata: ModuleMetadata,
}

impl CheckedModule {
    pub fn find_type(&self, full_name: &str) -> Option<&HType> {
        self.types.iter().find(|t| t.full_name == full_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryPoint {
    pub type_name: String,
    pub method: String,
    pub returns_int: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HType {
    pub full_name: String,
    pub kind: TypeKind,
    pub is_static: bool,
    pub is_public: bool,
    /// Every implemented interface, including inherited ones.
    pub interfaces: Vec<String>,
    pub fields: Vec<HField>,
    pub methods: Vec<HMethod>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HField {
    pub name: String,
    pub ty: Ty,
    pub is_static: bool,
    /// `None` means the type's default value.
    pub init: Option<HExpr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HMethod {
    pub name: String,
    pub params: Vec<Ty>,
    pub ret: Ty,
    pub is_static: bool,
    pub is_public: bool,
    /// Slot types; parameters occupy the first slots.
    pub locals: Vec<Ty>,
    /// `None` for interface methods.
    pub body: Option<Vec<HStmt>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HStmt {
    Local { slot: u32, init: HExpr },
    Expr(HExpr),
    Return(Option<HExpr>),
    If {
        cond: HExpr,
        then_branch: Vec<HStmt>,
        else_branch: Vec<HStmt>,
    },
    While { cond: HExpr, body: Vec<HStmt> },
    Block(Vec<HStmt>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HExpr {
    pub kind: HExprKind,
    pub ty: Ty,
    pub span: Span,
}

impl HExpr {
    pub fn new(kind: HExprKind, ty: Ty, span: Span) -> Self {
        HExpr { kind, ty, span }
    }

    /// Placeholder for an expression that failed to check.
    pub fn error(span: Span) -> Self {
        HExpr::new(HExprKind::Error, Ty::Error, span)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum HUnaryOp {
    Neg,
    Not,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum HBinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    /// Short-circuit `&&`.
    And,
    /// Short-circuit `||`.
    Or,
    /// String concatenation; either operand may be an int or bool.
    Concat,
}

/// Storage an assignment writes to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Place {
    Local(u32),
    Field { receiver: Box<HExpr>, index: u32 },
    StaticField { type_name: String, index: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HExprKind {
    Int(i32),
    Bool(bool),
    Str(String),
    This,
    Local(u32),
    Field {
        receiver: Box<HExpr>,
        index: u32,
    },
    StaticField {
        type_name: String,
        index: u32,
    },
    Unary {
        op: HUnaryOp,
        operand: Box<HExpr>,
    },
    Binary {
        op: HBinOp,
        lhs: Box<HExpr>,
        rhs: Box<HExpr>,
    },
    Assign {
        place: Place,
        /// Compound assignment operator.
        op: Option<HBinOp>,
        value: Box<HExpr>,
    },
    Conditional {
        cond: Box<HExpr>,
        then_expr: Box<HExpr>,
        else_expr: Box<HExpr>,
    },
    /// Static method of a compiled type, in this unit or a reference.
    CallStatic {
        type_name: String,
        method: String,
        args: Vec<HExpr>,
    },
    /// Instance method, dispatched on the receiver's runtime type.
    CallVirtual {
        receiver: Box<HExpr>,
        method: String,
        args: Vec<HExpr>,
    },
    CallNative {
        native: Native,
        args: Vec<HExpr>,
    },
    /// Only present in modules with errors.
    Error,
}
