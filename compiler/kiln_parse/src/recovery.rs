//! Error recovery for the parser.
//!
//! Token sets and synchronization for continuing after a syntax error. Each
//! set is a `u64` bitset indexed by [`TokenKind::tag`], so membership is one
//! AND.

use kiln_ir::TokenKind;

use crate::cursor::Cursor;

/// A set of token kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) struct TokenSet(u64);

impl TokenSet {
    pub(crate) const fn new() -> Self {
        Self(0)
    }

    /// Add a token kind (builder form for `const` sets).
    #[must_use]
    pub(crate) const fn with(self, kind: &TokenKind) -> Self {
        Self(self.0 | (1u64 << kind.tag()))
    }

    pub(crate) const fn contains(&self, kind: &TokenKind) -> bool {
        (self.0 & (1u64 << kind.tag())) != 0
    }

    #[cfg(test)]
    pub(crate) const fn count(&self) -> u32 {
        self.0.count_ones()
    }
}

/// Modifier keywords; any of them may start a type or member declaration.
pub(crate) const MODIFIERS: TokenSet = TokenSet::new()
    .with(&TokenKind::Public)
    .with(&TokenKind::Private)
    .with(&TokenKind::Internal)
    .with(&TokenKind::Static)
    .with(&TokenKind::Sealed);

/// Tokens that start a declaration at unit or namespace level.
pub(crate) const ITEM_START: TokenSet = MODIFIERS
    .with(&TokenKind::Namespace)
    .with(&TokenKind::Using)
    .with(&TokenKind::Class)
    .with(&TokenKind::Interface);

/// Where item-level recovery stops.
pub(crate) const ITEM_BOUNDARY: TokenSet = ITEM_START
    .with(&TokenKind::RBrace)
    .with(&TokenKind::Eof);

/// Where member-level recovery stops.
pub(crate) const MEMBER_BOUNDARY: TokenSet = MODIFIERS
    .with(&TokenKind::Class)
    .with(&TokenKind::Interface)
    .with(&TokenKind::Semicolon)
    .with(&TokenKind::LBrace)
    .with(&TokenKind::RBrace)
    .with(&TokenKind::Eof);

/// Where statement-level recovery stops.
pub(crate) const STMT_BOUNDARY: TokenSet = TokenSet::new()
    .with(&TokenKind::Semicolon)
    .with(&TokenKind::LBrace)
    .with(&TokenKind::RBrace)
    .with(&TokenKind::Return)
    .with(&TokenKind::If)
    .with(&TokenKind::While)
    .with(&TokenKind::Var)
    .with(&TokenKind::Eof);

/// Advance the cursor until reaching a token in the recovery set or EOF.
///
/// Returns `true` if a recovery token was found, `false` if EOF was reached.
pub(crate) fn synchronize(cursor: &mut Cursor<'_>, recovery: TokenSet) -> bool {
    while !cursor.is_at_end() {
        if recovery.contains(cursor.current_kind()) {
            return true;
        }
        cursor.advance();
    }
    false
}

/// Skip a balanced `{ ... }` or `( ... )` group starting at the cursor.
/// Stops at EOF if the group is never closed.
pub(crate) fn skip_group(cursor: &mut Cursor<'_>) {
    let mut depth = 0usize;
    loop {
        match cursor.current_kind() {
            TokenKind::LBrace | TokenKind::LParen => depth += 1,
            TokenKind::RBrace | TokenKind::RParen => depth = depth.saturating_sub(1),
            TokenKind::Eof => return,
            _ => {}
        }
        cursor.advance();
        if depth == 0 {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_ir::TokenList;

    fn tokens(source: &str) -> TokenList {
        kiln_lexer::lex(source).tokens
    }

    #[test]
    fn test_token_set_membership() {
        assert!(MODIFIERS.contains(&TokenKind::Static));
        assert!(!MODIFIERS.contains(&TokenKind::Class));
        assert_eq!(MODIFIERS.count(), 5);
        assert!(STMT_BOUNDARY.contains(&TokenKind::Eof));
    }

    #[test]
    fn test_payload_kinds_share_a_bit() {
        let set = TokenSet::new().with(&TokenKind::Int(0));
        assert!(set.contains(&TokenKind::Int(42)));
        assert!(!set.contains(&TokenKind::Str(String::new())));
    }

    #[test]
    fn test_synchronize_stops_at_boundary() {
        let list = tokens("a b + ; return");
        let mut cursor = Cursor::new(&list);
        assert!(synchronize(&mut cursor, STMT_BOUNDARY));
        assert_eq!(cursor.current_kind(), &TokenKind::Semicolon);
    }

    #[test]
    fn test_synchronize_reaches_eof() {
        let list = tokens("a b c");
        let mut cursor = Cursor::new(&list);
        assert!(!synchronize(&mut cursor, MODIFIERS));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_skip_group_is_balanced() {
        let list = tokens("{ a { b } ( c ) } d");
        let mut cursor = Cursor::new(&list);
        skip_group(&mut cursor);
        assert_eq!(cursor.current_kind(), &TokenKind::Ident("d".to_string()));
    }

    #[test]
    fn test_skip_group_unclosed() {
        let list = tokens("{ a { b }");
        let mut cursor = Cursor::new(&list);
        skip_group(&mut cursor);
        assert!(cursor.is_at_end());
    }
}
