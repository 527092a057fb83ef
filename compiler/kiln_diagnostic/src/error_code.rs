//! Error codes for all Kiln diagnostics.
//!
//! Each code is a stable identifier (e.g., `E1001`) whose first digit names
//! the phase that reports it. Used for `kiln explain` lookups and for
//! selecting warnings to escalate.

use std::fmt;

use crate::Severity;

/// Error codes for all Kiln diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E20xx: Semantic errors
/// - E21xx: Semantic warnings
/// - E22xx: Informational diagnostics
/// - E3xxx: Emission errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string literal or block comment
    E0001,
    /// Invalid character in source
    E0002,
    /// Invalid number literal or escape sequence
    E0003,

    // Parser Errors (E1xxx)
    /// Empty source unit
    E1000,
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Unclosed delimiter
    E1003,
    /// Expected identifier
    E1004,
    /// Expected type
    E1005,
    /// Invalid declaration
    E1006,
    /// Missing method body
    E1007,
    /// Nesting or chain too deep
    E1008,

    // Semantic Errors (E20xx)
    /// Type mismatch
    E2001,
    /// Unknown type
    E2002,
    /// Unknown identifier
    E2003,
    /// Argument count mismatch
    E2004,
    /// Duplicate definition
    E2005,
    /// Interface member not implemented
    E2006,
    /// Not all code paths return a value
    E2007,
    /// Unknown namespace in `using`
    E2008,
    /// Base type is not an interface
    E2009,
    /// Unknown member
    E2010,
    /// Invalid assignment target
    E2011,
    /// Static/instance member misuse
    E2012,
    /// Missing or ambiguous entry point
    E2013,
    /// Invalid `return` for the method's return type
    E2014,
    /// Implementing method has the wrong signature
    E2015,
    /// Void value used as an expression
    E2016,
    /// Expression is not callable
    E2017,
    /// Predefined type not available
    E2018,
    /// Reference could not be read
    E2019,
    /// Integer literal out of range
    E2020,
    /// Invalid expression statement
    E2021,
    /// Interface member has a body or is a field
    E2022,
    /// Invalid modifier
    E2023,
    /// Ambiguous name
    E2024,

    // Semantic Warnings (E21xx)
    /// Unused local variable
    E2100,
    /// Unreachable code
    E2101,
    /// Duplicate `using` directive
    E2102,

    // Informational (E22xx)
    /// Unnecessary `using` directive
    E2200,

    // Emission Errors (E3xxx)
    /// Compiled unit exceeds a format limit
    E3001,
}

impl ErrorCode {
    /// Every code, in numeric order.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E1000,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E1008,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E2013,
        ErrorCode::E2014,
        ErrorCode::E2015,
        ErrorCode::E2016,
        ErrorCode::E2017,
        ErrorCode::E2018,
        ErrorCode::E2019,
        ErrorCode::E2020,
        ErrorCode::E2021,
        ErrorCode::E2022,
        ErrorCode::E2023,
        ErrorCode::E2024,
        ErrorCode::E2100,
        ErrorCode::E2101,
        ErrorCode::E2102,
        ErrorCode::E2200,
        ErrorCode::E3001,
    ];

    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E1000 => "E1000",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E2018 => "E2018",
            ErrorCode::E2019 => "E2019",
            ErrorCode::E2020 => "E2020",
            ErrorCode::E2021 => "E2021",
            ErrorCode::E2022 => "E2022",
            ErrorCode::E2023 => "E2023",
            ErrorCode::E2024 => "E2024",
            ErrorCode::E2100 => "E2100",
            ErrorCode::E2101 => "E2101",
            ErrorCode::E2102 => "E2102",
            ErrorCode::E2200 => "E2200",
            ErrorCode::E3001 => "E3001",
        }
    }

    /// One-line title used by `kiln explain` listings.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "unterminated string literal or comment",
            ErrorCode::E0002 => "invalid character",
            ErrorCode::E0003 => "invalid literal",
            ErrorCode::E1000 => "empty source unit",
            ErrorCode::E1001 => "unexpected token",
            ErrorCode::E1002 => "expected expression",
            ErrorCode::E1003 => "unclosed delimiter",
            ErrorCode::E1004 => "expected identifier",
            ErrorCode::E1005 => "expected type",
            ErrorCode::E1006 => "invalid declaration",
            ErrorCode::E1007 => "missing method body",
            ErrorCode::E1008 => "nested too deeply",
            ErrorCode::E2001 => "type mismatch",
            ErrorCode::E2002 => "unknown type",
            ErrorCode::E2003 => "unknown identifier",
            ErrorCode::E2004 => "argument count mismatch",
            ErrorCode::E2005 => "duplicate definition",
            ErrorCode::E2006 => "interface member not implemented",
            ErrorCode::E2007 => "not all code paths return a value",
            ErrorCode::E2008 => "unknown namespace",
            ErrorCode::E2009 => "base type is not an interface",
            ErrorCode::E2010 => "unknown member",
            ErrorCode::E2011 => "invalid assignment target",
            ErrorCode::E2012 => "static member misuse",
            ErrorCode::E2013 => "entry point problem",
            ErrorCode::E2014 => "invalid return",
            ErrorCode::E2015 => "wrong signature for interface member",
            ErrorCode::E2016 => "void value used",
            ErrorCode::E2017 => "expression is not callable",
            ErrorCode::E2018 => "predefined type not available",
            ErrorCode::E2019 => "unreadable reference",
            ErrorCode::E2020 => "integer literal out of range",
            ErrorCode::E2021 => "invalid expression statement",
            ErrorCode::E2022 => "invalid interface member",
            ErrorCode::E2023 => "invalid modifier",
            ErrorCode::E2024 => "ambiguous name",
            ErrorCode::E2100 => "unused local variable",
            ErrorCode::E2101 => "unreachable code",
            ErrorCode::E2102 => "duplicate using directive",
            ErrorCode::E2200 => "unnecessary using directive",
            ErrorCode::E3001 => "format limit exceeded",
        }
    }

    /// Severity a diagnostic with this code is reported at.
    pub fn default_severity(&self) -> Severity {
        if self.is_warning() {
            Severity::Warning
        } else if self.is_info() {
            Severity::Info
        } else {
            Severity::Error
        }
    }

    /// Check if this is a lexer error (E0xxx range).
    pub fn is_lexer_error(&self) -> bool {
        matches!(self, ErrorCode::E0001 | ErrorCode::E0002 | ErrorCode::E0003)
    }

    /// Check if this is a parser error (E1xxx range).
    pub fn is_parser_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1000
                | ErrorCode::E1001
                | ErrorCode::E1002
                | ErrorCode::E1003
                | ErrorCode::E1004
                | ErrorCode::E1005
                | ErrorCode::E1006
                | ErrorCode::E1007
                | ErrorCode::E1008
        )
    }

    /// Check if this is a semantic error (E20xx range).
    pub fn is_semantic_error(&self) -> bool {
        let s = self.as_str();
        s.starts_with("E20")
    }

    /// Check if this is a warning code (E21xx range).
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::E2100 | ErrorCode::E2101 | ErrorCode::E2102)
    }

    /// Check if this is an informational code (E22xx range).
    pub fn is_info(&self) -> bool {
        matches!(self, ErrorCode::E2200)
    }

    /// Check if this is an emission error (E3xxx range).
    pub fn is_emit_error(&self) -> bool {
        matches!(self, ErrorCode::E3001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a string does not name a known error code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseErrorCodeError(pub String);

impl fmt::Display for ParseErrorCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown error code `{}`", self.0)
    }
}

impl std::error::Error for ParseErrorCodeError {}

/// Parse an error code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ParseErrorCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or_else(|| ParseErrorCodeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests;
