//! Syntax tree for Kiln source units.
//!
//! Every node can be built two ways: by the parser (with real spans) or
//! programmatically through the `with_*` builder methods (with
//! [`Span::DUMMY`]). The builder mirrors the grammar one node at a time, so a
//! generated class reads like its printed form:
//!
//! ```text
//! let add = MethodDecl::new(TypeRef::int(), "Add")
//!     .with_modifiers(Modifiers::PUBLIC)
//!     .with_param(Param::new(TypeRef::int(), "a"))
//!     .with_param(Param::new(TypeRef::int(), "b"))
//!     .with_body(Block::new(vec![Stmt::ret(Expr::binary(
//!         BinaryOp::Add, Expr::name("a"), Expr::name("b"),
//!     ))]));
//! ```

use std::fmt;

use bitflags::bitflags;

use crate::Span;

/// An identifier with its location.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    /// Identifier without a source location.
    pub fn new(name: impl Into<String>) -> Self {
        Ident {
            name: name.into(),
            span: Span::DUMMY,
        }
    }

    pub fn with_span(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A dotted name such as `GeneratedCalculator` or `System.Math`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct QualifiedName {
    pub segments: Vec<Ident>,
    pub span: Span,
}

impl QualifiedName {
    pub fn new(segments: Vec<Ident>) -> Self {
        let span = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => Span::DUMMY,
        };
        QualifiedName { segments, span }
    }

    /// Split a dotted string into segments. Empty segments are dropped.
    pub fn from_dotted(dotted: &str) -> Self {
        QualifiedName::new(
            dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(Ident::new)
                .collect(),
        )
    }

    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }

    /// The final segment (the simple name).
    pub fn last(&self) -> Option<&Ident> {
        self.segments.last()
    }

    pub fn to_dotted(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&seg.name)?;
        }
        Ok(())
    }
}

bitflags! {
    /// Declaration modifiers.
    #[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Modifiers: u8 {
        const PUBLIC = 1;
        const PRIVATE = 1 << 1;
        const INTERNAL = 1 << 2;
        const STATIC = 1 << 3;
        const SEALED = 1 << 4;
    }
}

impl Modifiers {
    /// Keywords of the set modifiers in canonical print order.
    pub fn keywords(self) -> Vec<&'static str> {
        let mut words = Vec::new();
        for (flag, word) in [
            (Modifiers::PUBLIC, "public"),
            (Modifiers::PRIVATE, "private"),
            (Modifiers::INTERNAL, "internal"),
            (Modifiers::STATIC, "static"),
            (Modifiers::SEALED, "sealed"),
        ] {
            if self.contains(flag) {
                words.push(word);
            }
        }
        words
    }
}

/// Types spelled with a keyword.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PredefinedType {
    Int,
    Bool,
    String,
    Void,
}

impl PredefinedType {
    pub fn keyword(self) -> &'static str {
        match self {
            PredefinedType::Int => "int",
            PredefinedType::Bool => "bool",
            PredefinedType::String => "string",
            PredefinedType::Void => "void",
        }
    }

    /// Name of the backing type in the core library.
    pub fn core_name(self) -> &'static str {
        match self {
            PredefinedType::Int => "System.Int32",
            PredefinedType::Bool => "System.Boolean",
            PredefinedType::String => "System.String",
            PredefinedType::Void => "System.Void",
        }
    }
}

/// A type as written in source.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeRef {
    Predefined { ty: PredefinedType, span: Span },
    Named(QualifiedName),
}

impl TypeRef {
    pub fn predefined(ty: PredefinedType) -> Self {
        TypeRef::Predefined {
            ty,
            span: Span::DUMMY,
        }
    }

    pub fn int() -> Self {
        Self::predefined(PredefinedType::Int)
    }

    pub fn bool() -> Self {
        Self::predefined(PredefinedType::Bool)
    }

    pub fn string() -> Self {
        Self::predefined(PredefinedType::String)
    }

    pub fn void() -> Self {
        Self::predefined(PredefinedType::Void)
    }

    /// A named type, e.g. `TypeRef::named("ICalculator")`.
    pub fn named(dotted: &str) -> Self {
        TypeRef::Named(QualifiedName::from_dotted(dotted))
    }

    pub fn span(&self) -> Span {
        match self {
            TypeRef::Predefined { span, .. } => *span,
            TypeRef::Named(name) => name.span,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Predefined { ty, .. } => f.write_str(ty.keyword()),
            TypeRef::Named(name) => write!(f, "{name}"),
        }
    }
}

/// `using Name;`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct UsingDirective {
    pub name: QualifiedName,
    pub span: Span,
}

impl UsingDirective {
    pub fn new(name: QualifiedName) -> Self {
        UsingDirective {
            name,
            span: Span::DUMMY,
        }
    }
}

/// Root of a syntax tree: one translation unit.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct CompilationUnit {
    pub usings: Vec<UsingDirective>,
    pub members: Vec<NamespaceMember>,
}

impl CompilationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_using(mut self, using: UsingDirective) -> Self {
        self.usings.push(using);
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: impl Into<NamespaceMember>) -> Self {
        self.members.push(member.into());
        self
    }

    /// A unit with no usings and no members.
    pub fn is_empty(&self) -> bool {
        self.usings.is_empty() && self.members.is_empty()
    }
}

/// Item allowed at unit or namespace level.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum NamespaceMember {
    Namespace(NamespaceDecl),
    Type(TypeDecl),
}

impl From<NamespaceDecl> for NamespaceMember {
    fn from(ns: NamespaceDecl) -> Self {
        NamespaceMember::Namespace(ns)
    }
}

impl From<TypeDecl> for NamespaceMember {
    fn from(ty: TypeDecl) -> Self {
        NamespaceMember::Type(ty)
    }
}

/// `namespace Name { ... }`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NamespaceDecl {
    pub name: QualifiedName,
    pub usings: Vec<UsingDirective>,
    pub members: Vec<NamespaceMember>,
    pub span: Span,
}

impl NamespaceDecl {
    pub fn new(name: QualifiedName) -> Self {
        NamespaceDecl {
            name,
            usings: Vec::new(),
            members: Vec::new(),
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn with_using(mut self, using: UsingDirective) -> Self {
        self.usings.push(using);
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: impl Into<NamespaceMember>) -> Self {
        self.members.push(member.into());
        self
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeDeclKind {
    Class,
    Interface,
}

impl TypeDeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeDeclKind::Class => "class",
            TypeDeclKind::Interface => "interface",
        }
    }
}

/// A class or interface declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeDecl {
    pub kind: TypeDeclKind,
    pub modifiers: Modifiers,
    pub name: Ident,
    pub bases: Vec<TypeRef>,
    pub members: Vec<Member>,
    pub span: Span,
}

impl TypeDecl {
    fn new(kind: TypeDeclKind, name: impl Into<String>) -> Self {
        TypeDecl {
            kind,
            modifiers: Modifiers::empty(),
            name: Ident::new(name),
            bases: Vec::new(),
            members: Vec::new(),
            span: Span::DUMMY,
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(TypeDeclKind::Class, name)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(TypeDeclKind::Interface, name)
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.bases.push(base);
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: impl Into<Member>) -> Self {
        self.members.push(member.into());
        self
    }
}

/// Class or interface member.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Member {
    Method(MethodDecl),
    Field(FieldDecl),
}

impl Member {
    pub fn name(&self) -> &Ident {
        match self {
            Member::Method(m) => &m.name,
            Member::Field(f) => &f.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Member::Method(m) => m.span,
            Member::Field(f) => f.span,
        }
    }
}

impl From<MethodDecl> for Member {
    fn from(method: MethodDecl) -> Self {
        Member::Method(method)
    }
}

impl From<FieldDecl> for Member {
    fn from(field: FieldDecl) -> Self {
        Member::Field(field)
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub return_type: TypeRef,
    pub name: Ident,
    pub params: Vec<Param>,
    /// `None` for interface members (`int Add(int a, int b);`).
    pub body: Option<MethodBody>,
    pub span: Span,
}

impl MethodDecl {
    pub fn new(return_type: TypeRef, name: impl Into<String>) -> Self {
        MethodDecl {
            modifiers: Modifiers::empty(),
            return_type,
            name: Ident::new(name),
            params: Vec::new(),
            body: None,
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Block) -> Self {
        self.body = Some(MethodBody::Block(body));
        self
    }

    /// `=> expr;` body.
    #[must_use]
    pub fn with_expression_body(mut self, expr: Expr) -> Self {
        self.body = Some(MethodBody::Expr(expr));
        self
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum MethodBody {
    Block(Block),
    Expr(Expr),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub ty: TypeRef,
    pub name: Ident,
    pub span: Span,
}

impl Param {
    pub fn new(ty: TypeRef, name: impl Into<String>) -> Self {
        Param {
            ty,
            name: Ident::new(name),
            span: Span::DUMMY,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub name: Ident,
    pub init: Option<Expr>,
    pub span: Span,
}

impl FieldDecl {
    pub fn new(ty: TypeRef, name: impl Into<String>) -> Self {
        FieldDecl {
            modifiers: Modifiers::empty(),
            ty,
            name: Ident::new(name),
            init: None,
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn with_initializer(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }
}

/// `{ stmt* }`
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Block {
            stmts,
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn with_stmt(mut self, stmt: Stmt) -> Self {
        self.stmts.push(stmt);
        self
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    Block(Block),
    /// `T x = init;` or `var x = init;` (`ty == None`).
    Local {
        ty: Option<TypeRef>,
        name: Ident,
        init: Expr,
    },
    Expr(Expr),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Empty,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Stmt {
            kind,
            span: Span::DUMMY,
        }
    }

    pub fn ret(value: Expr) -> Self {
        Self::new(StmtKind::Return(Some(value)))
    }

    pub fn ret_void() -> Self {
        Self::new(StmtKind::Return(None))
    }

    pub fn expr(expr: Expr) -> Self {
        Self::new(StmtKind::Expr(expr))
    }

    /// `ty name = init;`; pass `None` for `var`.
    pub fn local(ty: Option<TypeRef>, name: impl Into<String>, init: Expr) -> Self {
        Self::new(StmtKind::Local {
            ty,
            name: Ident::new(name),
            init,
        })
    }

    pub fn if_else(cond: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Self {
        Self::new(StmtKind::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        })
    }

    pub fn while_loop(cond: Expr, body: Stmt) -> Self {
        Self::new(StmtKind::While {
            cond,
            body: Box::new(body),
        })
    }

    pub fn block(block: Block) -> Self {
        Self::new(StmtKind::Block(block))
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    /// Binding power; higher binds tighter. All binary operators are
    /// left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 3,
            BinaryOp::And => 4,
            BinaryOp::Eq | BinaryOp::NotEq => 5,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => 6,
            BinaryOp::Add | BinaryOp::Sub => 7,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 8,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
        }
    }

    /// The arithmetic operator a compound assignment applies.
    pub fn binary_op(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinaryOp::Add),
            AssignOp::SubAssign => Some(BinaryOp::Sub),
        }
    }
}

/// Precedence of `?:`; below every binary operator.
pub const CONDITIONAL_PRECEDENCE: u8 = 2;
/// Precedence of assignment; the loosest expression form.
pub const ASSIGN_PRECEDENCE: u8 = 1;
/// Precedence of prefix operators.
pub const UNARY_PRECEDENCE: u8 = 9;
/// Precedence of literals, names, calls and member access.
pub const PRIMARY_PRECEDENCE: u8 = 10;

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Integer literal magnitude. `-2147483648` is `Neg(Int(2147483648))`.
    Int(u64),
    Bool(bool),
    Str(String),
    Name(Ident),
    This,
    Member {
        target: Box<Expr>,
        name: Ident,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Paren(Box<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr {
            kind,
            span: Span::DUMMY,
        }
    }

    /// Integer literal; negative values become a negated magnitude.
    pub fn int(value: i32) -> Self {
        let magnitude = Expr::new(ExprKind::Int(u64::from(value.unsigned_abs())));
        if value < 0 {
            Expr::unary(UnaryOp::Neg, magnitude)
        } else {
            magnitude
        }
    }

    pub fn bool(value: bool) -> Self {
        Expr::new(ExprKind::Bool(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::new(ExprKind::Str(value.into()))
    }

    pub fn name(name: impl Into<String>) -> Self {
        Expr::new(ExprKind::Name(Ident::new(name)))
    }

    pub fn this() -> Self {
        Expr::new(ExprKind::This)
    }

    pub fn member(target: Expr, name: impl Into<String>) -> Self {
        Expr::new(ExprKind::Member {
            target: Box::new(target),
            name: Ident::new(name),
        })
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Call {
            callee: Box::new(callee),
            args,
        })
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::new(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::new(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn assign(op: AssignOp, target: Expr, value: Expr) -> Self {
        Expr::new(ExprKind::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    pub fn conditional(cond: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Expr::new(ExprKind::Conditional {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    pub fn paren(inner: Expr) -> Self {
        Expr::new(ExprKind::Paren(Box::new(inner)))
    }

    /// Precedence of this expression's outermost form.
    pub fn precedence(&self) -> u8 {
        match &self.kind {
            ExprKind::Assign { .. } => ASSIGN_PRECEDENCE,
            ExprKind::Conditional { .. } => CONDITIONAL_PRECEDENCE,
            ExprKind::Binary { op, .. } => op.precedence(),
            ExprKind::Unary { .. } => UNARY_PRECEDENCE,
            ExprKind::Int(_)
            | ExprKind::Bool(_)
            | ExprKind::Str(_)
            | ExprKind::Name(_)
            | ExprKind::This
            | ExprKind::Member { .. }
            | ExprKind::Call { .. }
            | ExprKind::Paren(_) => PRIMARY_PRECEDENCE,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr {
        let mut expr = self;
        while let ExprKind::Paren(inner) = &expr.kind {
            expr = inner;
        }
        expr
    }
}
