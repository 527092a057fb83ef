//! Kiln Printer
//!
//! Turns syntax trees back into normalized source text. Printing a tree and
//! parsing the result yields the same tree modulo spans and redundant
//! parentheses, and printing is idempotent on its own output.
//!
//! # Modules
//!
//! - [`emitter`]: output abstraction
//! - [`printer`]: layout of declarations, statements and expressions

pub mod emitter;
pub mod printer;

use kiln_diagnostic::Diagnostic;
use kiln_ir::{CompilationUnit, Expr, Member, Stmt};

pub use emitter::{Emitter, StringEmitter};
pub use printer::{expr_to_string, Printer};

/// Spaces per indentation level.
pub const INDENT_WIDTH: usize = 4;

/// Print a whole compilation unit. An empty unit prints as "".
pub fn format_unit(unit: &CompilationUnit) -> String {
    let mut printer = Printer::new(StringEmitter::with_capacity(1024));
    printer.print_unit(unit);
    let mut out = printer.finish();
    out.trim_trailing_blank_lines();
    out.output()
}

/// Print a single member at indentation level zero.
pub fn format_member(member: &Member) -> String {
    let mut printer = Printer::new(StringEmitter::new());
    printer.print_member(member);
    printer.finish().output()
}

/// Print a single statement at indentation level zero.
pub fn format_stmt(stmt: &Stmt) -> String {
    let mut printer = Printer::new(StringEmitter::new());
    printer.print_stmt(stmt);
    printer.finish().output()
}

/// Print an expression on one line.
pub fn format_expr(expr: &Expr) -> String {
    expr_to_string(expr)
}

/// Parse `source` and print it normalized. Fails with the lexical and
/// syntax diagnostics if the source does not parse cleanly.
pub fn format_source(source: &str) -> Result<String, Vec<Diagnostic>> {
    let output = kiln_parse::parse_source(source);
    if output.has_errors() {
        return Err(output.diagnostics);
    }
    Ok(format_unit(&output.unit))
}

/// Convert tabs to spaces, each tab reaching the next multiple of
/// [`INDENT_WIDTH`] columns.
///
/// ```
/// use kiln_fmt::tabs_to_spaces;
///
/// assert_eq!(tabs_to_spaces("\treturn a;"), "    return a;");
/// ```
pub fn tabs_to_spaces(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut column = 0;

    for c in source.chars() {
        match c {
            '\t' => {
                let spaces = INDENT_WIDTH - (column % INDENT_WIDTH);
                for _ in 0..spaces {
                    result.push(' ');
                }
                column += spaces;
            }
            '\n' => {
                result.push('\n');
                column = 0;
            }
            _ => {
                result.push(c);
                column += 1;
            }
        }
    }

    result
}
