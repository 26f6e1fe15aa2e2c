//! Precedence-climbing parser.
//!
//! Binding power, loosest first:
//!
//! | Level | Operators | Associativity |
//! |---|---|---|
//! | 1 | `or` `\|\|` | left |
//! | 2 | `and` `&&` | left |
//! | 3 | `not` `!` (prefix) | - |
//! | 4 | `==` `!=` `<` `<=` `>` `>=` `in` | none |
//! | 5 | `+` `-` | left |
//! | 6 | `*` `/` `%` | left |
//! | 7 | unary `-` | - |

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::functions::Function;
use super::lexer::{tokenize, Token, TokenKind};
use super::value::Value;
use crate::error::CompileError;

const NOT_BP: u8 = 3;
const COMPARISON_BP: u8 = 4;
const NEG_BP: u8 = 7;

/// Parse an expression source into a syntax tree. Function names and
/// arities are checked here, not at evaluation time.
pub fn parse(source: &str) -> Result<Expr, CompileError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expression(0)?;
    let next = parser.peek();
    if next.kind != TokenKind::Eof {
        return Err(CompileError::Syntax {
            offset: next.offset,
            message: format!("unexpected token {:?}", next.kind),
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

fn infix(kind: &TokenKind) -> Option<(BinaryOp, u8)> {
    let op = match kind {
        TokenKind::Or => (BinaryOp::Or, 1),
        TokenKind::And => (BinaryOp::And, 2),
        TokenKind::Eq => (BinaryOp::Eq, COMPARISON_BP),
        TokenKind::Ne => (BinaryOp::Ne, COMPARISON_BP),
        TokenKind::Lt => (BinaryOp::Lt, COMPARISON_BP),
        TokenKind::Le => (BinaryOp::Le, COMPARISON_BP),
        TokenKind::Gt => (BinaryOp::Gt, COMPARISON_BP),
        TokenKind::Ge => (BinaryOp::Ge, COMPARISON_BP),
        TokenKind::In => (BinaryOp::In, COMPARISON_BP),
        TokenKind::Plus => (BinaryOp::Add, 5),
        TokenKind::Minus => (BinaryOp::Sub, 5),
        TokenKind::Star => (BinaryOp::Mul, 6),
        TokenKind::Slash => (BinaryOp::Div, 6),
        TokenKind::Percent => (BinaryOp::Rem, 6),
        _ => return None,
    };
    Some(op)
}

impl Parser {
    fn peek(&self) -> &Token {
        // `tokenize` always ends with Eof and `advance` never passes it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, CompileError> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(CompileError::Syntax {
                offset: token.offset,
                message: format!("expected {what}, found {:?}", token.kind),
            })
        }
    }

    fn expression(&mut self, min_bp: u8) -> Result<Expr, CompileError> {
        let mut left = self.prefix()?;
        loop {
            let Some((op, bp)) = infix(&self.peek().kind) else {
                break;
            };
            if bp == COMPARISON_BP && min_bp == COMPARISON_BP {
                return Err(CompileError::Syntax {
                    offset: self.peek().offset,
                    message: "comparisons cannot be chained".into(),
                });
            }
            if bp <= min_bp {
                break;
            }
            self.advance();
            // Left associative: the right side binds strictly tighter.
            let right = self.expression(bp)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn prefix(&mut self) -> Result<Expr, CompileError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Not => {
                let operand = self.expression(NOT_BP)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                })
            }
            TokenKind::Minus => {
                let operand = self.expression(NEG_BP)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                })
            }
            TokenKind::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            TokenKind::Str(s) => Ok(Expr::Literal(Value::String(s))),
            TokenKind::True => Ok(Expr::Literal(Value::Bool(true))),
            TokenKind::False => Ok(Expr::Literal(Value::Bool(false))),
            TokenKind::Null => Ok(Expr::Literal(Value::Null)),
            TokenKind::LParen => {
                let inner = self.expression(0)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                let items = self.sequence(TokenKind::RBracket, "']'")?;
                Ok(Expr::List(items))
            }
            TokenKind::Ident(name) => {
                if self.peek().kind == TokenKind::LParen {
                    self.advance();
                    let args = self.sequence(TokenKind::RParen, "')'")?;
                    let function =
                        Function::from_name(&name).ok_or_else(|| CompileError::UnknownFunction {
                            name: name.clone(),
                            offset: token.offset,
                        })?;
                    function.check_arity(args.len())?;
                    return Ok(Expr::Call { function, args });
                }
                let mut segments = vec![name];
                while self.peek().kind == TokenKind::Dot {
                    self.advance();
                    let next = self.advance();
                    match next.kind {
                        TokenKind::Ident(segment) => segments.push(segment),
                        other => {
                            return Err(CompileError::Syntax {
                                offset: next.offset,
                                message: format!("expected path segment after '.', found {other:?}"),
                            })
                        }
                    }
                }
                Ok(Expr::Path(segments))
            }
            other => Err(CompileError::Syntax {
                offset: token.offset,
                message: format!("unexpected token {other:?}"),
            }),
        }
    }

    /// Comma-separated expressions up to `close`. The opening token has
    /// already been consumed.
    fn sequence(&mut self, close: TokenKind, what: &str) -> Result<Vec<Expr>, CompileError> {
        let mut items = Vec::new();
        if self.peek().kind == close {
            self.advance();
            return Ok(items);
        }
        loop {
            items.push(self.expression(0)?);
            if self.peek().kind == TokenKind::Comma {
                self.advance();
                continue;
            }
            self.expect(close, what)?;
            return Ok(items);
        }
    }
}
