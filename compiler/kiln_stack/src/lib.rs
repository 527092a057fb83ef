//! Stack safety for the recursive phases of the Kiln toolchain.
//!
//! The parser, printer, checker and code generator all recurse over the
//! syntax tree. Two tools keep that recursion from overflowing the host stack:
//!
//! - [`ensure_sufficient_stack`] grows the stack on demand (native targets).
//! - [`NestingLimit`] bounds how deep the parser lets a tree get, so every
//!   later phase (and the tree's own `Drop`) sees bounded depth. Loops that
//!   grow a spine (left-associative operator chains, postfix chains) charge
//!   one level per link.
//!
//! ```text
//! fn check_expr(&mut self, expr: &Expr) -> TExpr {
//!     ensure_sufficient_stack(|| self.check_expr_inner(expr))
//! }
//! ```

use std::fmt;

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Default maximum syntactic nesting depth accepted by the parser.
pub const DEFAULT_MAX_NESTING: u32 = 512;

/// Ensure sufficient stack space is available before executing `f`.
///
/// If the remaining stack is below the red zone, additional stack space is
/// allocated before calling `f`.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version: call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Returned by [`NestingLimit::enter`] when the limit is reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NestingTooDeep {
    pub limit: u32,
}

impl fmt::Display for NestingTooDeep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nesting exceeds the limit of {} levels", self.limit)
    }
}

impl std::error::Error for NestingTooDeep {}

/// Depth counter for recursive descent.
///
/// Callers pair every successful [`enter`](Self::enter) with one
/// [`exit`](Self::exit).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NestingLimit {
    depth: u32,
    max: u32,
}

impl Default for NestingLimit {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NESTING)
    }
}

impl NestingLimit {
    pub const fn new(max: u32) -> Self {
        NestingLimit { depth: 0, max }
    }

    /// Descend one level.
    pub fn enter(&mut self) -> Result<(), NestingTooDeep> {
        if self.depth >= self.max {
            return Err(NestingTooDeep { limit: self.max });
        }
        self.depth += 1;
        Ok(())
    }

    /// Ascend one level.
    pub fn exit(&mut self) {
        debug_assert!(self.depth > 0, "unbalanced NestingLimit::exit");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Ascend `levels` levels at once, for loops that entered once per
    /// iteration.
    pub fn release(&mut self, levels: u32) {
        debug_assert!(self.depth >= levels, "unbalanced NestingLimit::release");
        self.depth = self.depth.saturating_sub(levels);
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}
