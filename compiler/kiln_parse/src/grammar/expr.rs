//! Expressions, by precedence climbing.
//!
//! Loosest to tightest: assignment (right-associative), `?:`
//! (right-associative), then the binary operators by
//! [`BinaryOp::precedence`] (all left-associative), prefix `-` and `!`,
//! and finally postfix member access and calls.

use kiln_diagnostic::expected_expression;
use kiln_ir::ast::CONDITIONAL_PRECEDENCE;
use kiln_ir::{AssignOp, BinaryOp, Expr, ExprKind, Ident, TokenKind, UnaryOp};

use crate::error::{PResult, ParseError};
use crate::Parser;

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        self.nested(Self::parse_assignment)
    }

    fn parse_assignment(&mut self) -> PResult<Expr> {
        let target = self.parse_conditional()?;
        let Some(op) = self.match_assign_op() else {
            return Ok(target);
        };
        self.cursor.advance();
        let value = self.parse_expr()?;
        let span = target.span.merge(value.span);
        Ok(Expr {
            kind: ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        })
    }

    fn parse_conditional(&mut self) -> PResult<Expr> {
        let cond = self.parse_binary(CONDITIONAL_PRECEDENCE + 1)?;
        if !self.cursor.eat(&TokenKind::Question) {
            return Ok(cond);
        }
        let then_expr = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Colon)?;
        let else_expr = self.nested(Self::parse_conditional)?;
        let span = cond.span.merge(else_expr.span);
        Ok(Expr {
            kind: ExprKind::Conditional {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            span,
        })
    }

    /// Binary operators binding at least as tightly as `min_prec`.
    ///
    /// Each fold deepens the left spine by one, so it is charged to the
    /// nesting budget until the chain ends.
    fn parse_binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut folds = 0;
        let result = self.parse_binary_chain(min_prec, &mut folds);
        self.nesting.release(folds);
        result
    }

    fn parse_binary_chain(&mut self, min_prec: u8, folds: &mut u32) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = self.match_binary_op() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.descend()?;
            *folds += 1;
            self.cursor.advance();
            let rhs = self.parse_binary(prec + 1)?;
            let span = lhs.span.merge(rhs.span);
            lhs = Expr {
                kind: ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let Some(op) = self.match_unary_op() else {
            return self.parse_postfix();
        };
        let start = self.cursor.advance().span;
        let operand = self.nested(Self::parse_unary)?;
        let span = start.merge(operand.span);
        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        })
    }

    /// Member accesses and calls, each charged one nesting level like a
    /// binary fold.
    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut links = 0;
        let result = self.parse_postfix_chain(&mut links);
        self.nesting.release(links);
        result
    }

    fn parse_postfix_chain(&mut self, links: &mut u32) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if matches!(self.cursor.current_kind(), TokenKind::Dot | TokenKind::LParen) {
                self.descend()?;
                *links += 1;
            }
            match self.cursor.current_kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    let name = self.cursor.expect_ident("member name after `.`")?;
                    let span = expr.span.merge(name.span);
                    expr = Expr {
                        kind: ExprKind::Member {
                            target: Box::new(expr),
                            name,
                        },
                        span,
                    };
                }
                TokenKind::LParen => {
                    let open = self.cursor.advance().span;
                    let mut args = Vec::new();
                    if !self.cursor.check(&TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if !self.cursor.eat(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    let close = self.expect_closing(open, &TokenKind::RParen, '(')?;
                    let span = expr.span.merge(close);
                    expr = Expr {
                        kind: ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let token = self.cursor.current();
        let kind = match &token.kind {
            TokenKind::Int(value) => ExprKind::Int(*value),
            TokenKind::Str(value) => ExprKind::Str(value.clone()),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::This => ExprKind::This,
            TokenKind::Ident(name) => ExprKind::Name(Ident::with_span(name.clone(), token.span)),
            TokenKind::LParen => {
                let open = self.cursor.advance().span;
                let inner = self.parse_expr()?;
                let close = self.expect_closing(open, &TokenKind::RParen, '(')?;
                return Ok(Expr {
                    kind: ExprKind::Paren(Box::new(inner)),
                    span: open.merge(close),
                });
            }
            other => {
                return Err(ParseError::from(expected_expression(
                    token.span,
                    &other.describe(),
                )));
            }
        };
        self.cursor.advance();
        Ok(Expr {
            kind,
            span: token.span,
        })
    }

    fn match_assign_op(&self) -> Option<AssignOp> {
        match self.cursor.current_kind() {
            TokenKind::Eq => Some(AssignOp::Assign),
            TokenKind::PlusEq => Some(AssignOp::AddAssign),
            TokenKind::MinusEq => Some(AssignOp::SubAssign),
            _ => None,
        }
    }

    fn match_binary_op(&self) -> Option<BinaryOp> {
        match self.cursor.current_kind() {
            TokenKind::PipePipe => Some(BinaryOp::Or),
            TokenKind::AmpAmp => Some(BinaryOp::And),
            TokenKind::EqEq => Some(BinaryOp::Eq),
            TokenKind::NotEq => Some(BinaryOp::NotEq),
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::LtEq => Some(BinaryOp::LtEq),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::GtEq => Some(BinaryOp::GtEq),
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Rem),
            _ => None,
        }
    }

    fn match_unary_op(&self) -> Option<UnaryOp> {
        match self.cursor.current_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        }
    }
}
