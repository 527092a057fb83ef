//! Grammar productions.
//!
//! Each module extends `Parser` with the methods for one layer of syntax:
//!
//! - [`item`]: usings, namespaces, type declarations and members
//! - [`stmt`]: blocks and statements
//! - [`expr`]: expressions, by precedence climbing
//! - [`ty`]: type references and dotted names

mod expr;
mod item;
mod stmt;
mod ty;
