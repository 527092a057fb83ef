//! Escape processing for string literals.
//!
//! Valid escapes: `\"` `\\` `\n` `\t` `\r` `\0`. An invalid escape reports
//! `E0003` and keeps the escaped character literally so lexing continues.

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::Span;

#[inline]
fn resolve_escape(c: char) -> Option<char> {
    match c {
        '"' => Some('"'),
        '\\' => Some('\\'),
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        _ => None,
    }
}

/// Unescape a string literal's content (between the quotes).
///
/// `base_offset` is the byte offset of `content` in the source, used to
/// place diagnostics on the offending escape.
pub(crate) fn unescape_string(
    content: &str,
    base_offset: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    if !content.contains('\\') {
        return content.to_string();
    }

    let mut result = String::with_capacity(content.len());
    let mut chars = content.char_indices();

    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some((j, esc)) => {
                if let Some(cooked) = resolve_escape(esc) {
                    result.push(cooked);
                } else {
                    let start = base_offset + i;
                    let end = base_offset + j + esc.len_utf8();
                    diagnostics.push(
                        Diagnostic::error(ErrorCode::E0003)
                            .with_message(format!("invalid escape sequence `\\{esc}`"))
                            .with_label(Span::from_range(start..end), "unknown escape")
                            .with_note("valid escapes are \\\" \\\\ \\n \\t \\r \\0"),
                    );
                    result.push(esc);
                }
            }
            None => {
                // A trailing backslash only survives when the literal was
                // unterminated; that error is already reported.
                result.push('\\');
            }
        }
    }
    result
}
