//! Long-form error explanations for `kiln explain`.

use crate::ErrorCode;

/// Registry of error explanations.
pub struct ErrorDocs;

impl ErrorDocs {
    /// Explanation for `code`, or `None` if none is written yet.
    pub fn get(code: ErrorCode) -> Option<&'static str> {
        DOCS.iter().find(|(c, _)| *c == code).map(|(_, doc)| *doc)
    }

    /// All documented error codes.
    pub fn all_codes() -> impl Iterator<Item = ErrorCode> {
        DOCS.iter().map(|(code, _)| *code)
    }

    pub fn has_docs(code: ErrorCode) -> bool {
        DOCS.iter().any(|(c, _)| *c == code)
    }

    /// Render the `kiln explain` page: title line plus explanation.
    pub fn render(code: ErrorCode) -> String {
        let body = Self::get(code).unwrap_or("No extended explanation is available.");
        format!("{code}: {}\n\n{body}\n", code.title())
    }
}

static DOCS: &[(ErrorCode, &str)] = &[
    (
        ErrorCode::E0001,
        "A string literal was opened with `\"` but the line or file ended before \
         the closing quote.\n\n    string s = \"unterminated;\n\nClose the literal on the same line. A `/*` comment without a matching \
         `*/` is reported with the same code.",
    ),
    (
        ErrorCode::E0002,
        "The source contains a character that is not part of Kiln's syntax, such \
         as `@` or `#` outside a string literal.",
    ),
    (
        ErrorCode::E0003,
        "A numeric literal or string escape is malformed: digits followed by \
         letters (`12ab`), or an escape other than `\\\\ \\\" \\n \\t \\r \\0`.",
    ),
    (
        ErrorCode::E1000,
        "The source unit contains no namespaces, types, or using directives. \
         There is nothing to compile.",
    ),
    (
        ErrorCode::E1001,
        "The parser found a token that cannot appear at this position. The \
         message names what was expected.",
    ),
    (
        ErrorCode::E1002,
        "An expression was required (after `return`, `=`, an operator, or inside \
         parentheses) but something else was found.",
    ),
    (
        ErrorCode::E1003,
        "A `{` or `(` was opened but never closed before the end of the \
         enclosing construct.",
    ),
    (
        ErrorCode::E1004,
        "A name was required, e.g. after `class`, `namespace`, or a type in a \
         declaration.",
    ),
    (
        ErrorCode::E1005,
        "A type was required: `int`, `bool`, `string`, `void`, or a type name.",
    ),
    (
        ErrorCode::E1006,
        "The declaration is malformed. Namespaces may contain only using \
         directives, namespaces, classes, and interfaces; classes may contain \
         only fields and methods.",
    ),
    (
        ErrorCode::E1007,
        "A class method must have a body: either a block `{ ... }` or an \
         expression body `=> expr;`.\n\n    public int Add(int a, int b);   // error\n    \
         public int Add(int a, int b) => a + b;",
    ),
    (
        ErrorCode::E1008,
        "The source nests deeper than the parser accepts (512 levels). Every \
         parenthesis, block, prefix operator, binary operator in a chain, member \
         access and call counts as a level, so a very long `a + b + c + ...` \
         chain hits the limit as well as deeply nested parentheses.\n\nSplit the \
         expression into several statements with intermediate locals.",
    ),
    (
        ErrorCode::E2001,
        "An expression has a different type than its context requires, e.g. a \
         `string` returned from a method declared to return `int`, or an `int` \
         used as an `if` condition.",
    ),
    (
        ErrorCode::E2002,
        "A type name could not be resolved. Check the spelling, add the \
         `using` directive for its namespace, or add the reference that \
         declares it.",
    ),
    (
        ErrorCode::E2003,
        "A name used in an expression is not a parameter, local, field, or type \
         in scope.\n\n    public int Add() { return a + b; }   // `a` and `b` are not declared\n\n\
         Declare the names as parameters: `public int Add(int a, int b)`.",
    ),
    (
        ErrorCode::E2004,
        "A method was called with a different number of arguments than it \
         declares.",
    ),
    (
        ErrorCode::E2005,
        "Two declarations in the same scope share a name: two types in a \
         namespace, two members in a class, or two locals/parameters in a method.",
    ),
    (
        ErrorCode::E2006,
        "A class lists an interface as a base but does not declare a public, \
         non-static method for every interface member.",
    ),
    (
        ErrorCode::E2007,
        "A method with a non-void return type can reach the end of its body \
         without a `return` statement.",
    ),
    (
        ErrorCode::E2008,
        "A `using` directive names a namespace that no declaration or reference \
         provides. `using System;` requires the core library reference.",
    ),
    (
        ErrorCode::E2009,
        "Classes may only list interfaces after `:`. There is no class \
         inheritance in Kiln.",
    ),
    (
        ErrorCode::E2010,
        "The type has no member with this name, or the member is not accessible \
         from here.",
    ),
    (
        ErrorCode::E2011,
        "The left side of an assignment must be a local, a parameter, or a \
         field.",
    ),
    (
        ErrorCode::E2012,
        "An instance member was used from a static context (including through \
         the type name), or a static member was accessed through `this`.",
    ),
    (
        ErrorCode::E2013,
        "An executable unit needs exactly one `static int Main()` or \
         `static void Main()` method.",
    ),
    (
        ErrorCode::E2014,
        "`return expr;` appears in a void method, or `return;` appears in a \
         method that must return a value.",
    ),
    (
        ErrorCode::E2015,
        "A class implements an interface member with a matching name but \
         different parameter types or return type.",
    ),
    (
        ErrorCode::E2016,
        "The result of a `void` method was used as a value.",
    ),
    (
        ErrorCode::E2017,
        "Only methods can be called. A field, local, or literal was followed by \
         an argument list.",
    ),
    (
        ErrorCode::E2018,
        "A predefined type (`int` is `System.Int32`, `bool` is `System.Boolean`, \
         `string` is `System.String`, `void` is `System.Void`) is used but the \
         core library is not in the reference set.",
    ),
    (
        ErrorCode::E2019,
        "A reference could not be read: the file is missing, or its contents are \
         not a compiled Kiln unit for this toolchain.",
    ),
    (
        ErrorCode::E2020,
        "Integer literals must fit in a 32-bit signed integer. The only literal \
         above 2147483647 allowed is `-2147483648`.",
    ),
    (
        ErrorCode::E2021,
        "Only assignments and method calls can be used as statements.",
    ),
    (
        ErrorCode::E2022,
        "Interfaces contain only method signatures: no fields and no bodies.",
    ),
    (
        ErrorCode::E2023,
        "A modifier is not allowed here, or conflicts with another one (e.g. \
         `public private`, a `static` field, or a `static` interface member).",
    ),
    (
        ErrorCode::E2024,
        "A simple type name matches types in more than one imported namespace. \
         Use the qualified name.",
    ),
    (
        ErrorCode::E2100,
        "A local variable is assigned but never read.",
    ),
    (
        ErrorCode::E2101,
        "A statement follows a `return` in the same block and can never run.",
    ),
    (
        ErrorCode::E2102,
        "The same namespace is imported twice in one scope.",
    ),
    (
        ErrorCode::E2200,
        "A `using` directive imports a namespace from which no type name is \
         resolved. It can be removed.",
    ),
    (
        ErrorCode::E3001,
        "The compiled unit exceeds a limit of the binary format, such as the \
         maximum number of locals or strings per unit.",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_is_documented() {
        for code in ErrorCode::ALL {
            assert!(ErrorDocs::has_docs(*code), "{code} is undocumented");
        }
        assert_eq!(ErrorDocs::all_codes().count(), ErrorCode::ALL.len());
    }

    #[test]
    fn test_render_includes_title() {
        let page = ErrorDocs::render(ErrorCode::E2003);
        assert!(page.starts_with("E2003: unknown identifier"));
        assert!(page.contains("int Add(int a, int b)"));
    }
}
