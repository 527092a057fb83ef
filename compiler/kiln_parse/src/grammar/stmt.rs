//! Blocks and statements.

use kiln_diagnostic::unclosed_delimiter;
use kiln_ir::{Block, Stmt, StmtKind, TokenKind};

use crate::error::PResult;
use crate::recovery::STMT_BOUNDARY;
use crate::Parser;

impl Parser<'_> {
    /// `{ stmt* }`. Statement errors are recorded and skipped, so a block
    /// only fails if its opening brace is missing.
    pub(crate) fn parse_block(&mut self) -> PResult<Block> {
        let open = self.cursor.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.is_at_end() {
            let start = self.cursor.position();
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(error) => {
                    self.report(error);
                    self.recover(start, STMT_BOUNDARY);
                    self.cursor.eat(&TokenKind::Semicolon);
                }
            }
        }
        if !self.cursor.eat(&TokenKind::RBrace) {
            let diag = unclosed_delimiter(open, self.cursor.current_span(), '{');
            self.report_diag(diag);
        }
        Ok(Block {
            stmts,
            span: self.span_from(open),
        })
    }

    pub(crate) fn parse_stmt(&mut self) -> PResult<Stmt> {
        self.nested(Self::parse_stmt_inner)
    }

    fn parse_stmt_inner(&mut self) -> PResult<Stmt> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::Semicolon => {
                self.cursor.advance();
                StmtKind::Empty
            }
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.cursor.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.cursor.expect(&TokenKind::Semicolon)?;
                StmtKind::Return(value)
            }
            TokenKind::If => {
                self.cursor.advance();
                let cond = self.parse_condition()?;
                let then_branch = Box::new(self.parse_stmt()?);
                let else_branch = if self.cursor.eat(&TokenKind::Else) {
                    Some(Box::new(self.parse_stmt()?))
                } else {
                    None
                };
                StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                }
            }
            TokenKind::While => {
                self.cursor.advance();
                let cond = self.parse_condition()?;
                let body = Box::new(self.parse_stmt()?);
                StmtKind::While { cond, body }
            }
            TokenKind::Var => {
                self.cursor.advance();
                self.parse_local_rest(None)?
            }
            _ if self.at_local_decl() => {
                let ty = self.parse_type()?;
                self.parse_local_rest(Some(ty))?
            }
            _ => {
                let expr = self.parse_expr()?;
                self.cursor.expect(&TokenKind::Semicolon)?;
                StmtKind::Expr(expr)
            }
        };
        Ok(Stmt {
            kind,
            span: self.span_from(start),
        })
    }

    /// `( expr )` after `if` or `while`.
    fn parse_condition(&mut self) -> PResult<kiln_ir::Expr> {
        let open = self.cursor.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect_closing(open, &TokenKind::RParen, '(')?;
        Ok(cond)
    }

    /// `name = init;` after the declared type (or `var`).
    fn parse_local_rest(&mut self, ty: Option<kiln_ir::TypeRef>) -> PResult<StmtKind> {
        let name = self.cursor.expect_ident("variable name")?;
        self.cursor
            .expect(&TokenKind::Eq)
            .map_err(|e| e.with_note("local variables must be initialized"))?;
        let init = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Semicolon)?;
        Ok(StmtKind::Local { ty, name, init })
    }
}
