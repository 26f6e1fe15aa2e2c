//! Tokenizer for the expression language.

use crate::error::CompileError;

/// Token kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Numeric literal.
    Number(f64),
    /// String literal (quotes removed, escapes resolved).
    Str(String),
    /// Identifier or path segment.
    Ident(String),
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `and` / `&&`
    And,
    /// `or` / `||`
    Or,
    /// `not` / `!`
    Not,
    /// `in`
    In,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// End of input.
    Eof,
}

/// A token with its byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Kind and payload.
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub offset: usize,
}

/// Split an expression into tokens, ending with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        let start = pos;
        let two = bytes.get(pos..pos + 2);
        let kind = match (c, two) {
            (_, Some(b"==")) => {
                pos += 2;
                TokenKind::Eq
            }
            (_, Some(b"!=")) => {
                pos += 2;
                TokenKind::Ne
            }
            (_, Some(b"<=")) => {
                pos += 2;
                TokenKind::Le
            }
            (_, Some(b">=")) => {
                pos += 2;
                TokenKind::Ge
            }
            (_, Some(b"&&")) => {
                pos += 2;
                TokenKind::And
            }
            (_, Some(b"||")) => {
                pos += 2;
                TokenKind::Or
            }
            (b'<', _) => single(&mut pos, TokenKind::Lt),
            (b'>', _) => single(&mut pos, TokenKind::Gt),
            (b'!', _) => single(&mut pos, TokenKind::Not),
            (b'(', _) => single(&mut pos, TokenKind::LParen),
            (b')', _) => single(&mut pos, TokenKind::RParen),
            (b'[', _) => single(&mut pos, TokenKind::LBracket),
            (b']', _) => single(&mut pos, TokenKind::RBracket),
            (b',', _) => single(&mut pos, TokenKind::Comma),
            (b'.', _) => single(&mut pos, TokenKind::Dot),
            (b'+', _) => single(&mut pos, TokenKind::Plus),
            (b'-', _) => single(&mut pos, TokenKind::Minus),
            (b'*', _) => single(&mut pos, TokenKind::Star),
            (b'/', _) => single(&mut pos, TokenKind::Slash),
            (b'%', _) => single(&mut pos, TokenKind::Percent),
            (b'"' | b'\'', _) => {
                let (text, end) = string_literal(source, pos)?;
                pos = end;
                TokenKind::Str(text)
            }
            (b'0'..=b'9', _) => {
                let (value, end) = number_literal(source, pos)?;
                pos = end;
                TokenKind::Number(value)
            }
            (c, _) if c.is_ascii_alphabetic() || c == b'_' => {
                while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
                keyword_or_ident(&source[start..pos])
            }
            _ => {
                let ch = source[start..].chars().next().unwrap_or('?');
                return Err(CompileError::Syntax {
                    offset: start,
                    message: format!("unexpected character '{ch}'"),
                });
            }
        };
        tokens.push(Token {
            kind,
            offset: start,
        });
    }
    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: source.len(),
    });
    Ok(tokens)
}

fn single(pos: &mut usize, kind: TokenKind) -> TokenKind {
    *pos += 1;
    kind
}

fn keyword_or_ident(word: &str) -> TokenKind {
    match word {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "in" => TokenKind::In,
        _ => TokenKind::Ident(word.to_string()),
    }
}

fn number_literal(source: &str, start: usize) -> Result<(f64, usize), CompileError> {
    let bytes = source.as_bytes();
    let mut pos = start;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    // A dot is a decimal point only when a digit follows.
    if pos + 1 < bytes.len() && bytes[pos] == b'.' && bytes[pos + 1].is_ascii_digit() {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    let text = &source[start..pos];
    text.parse::<f64>()
        .map(|v| (v, pos))
        .map_err(|_| CompileError::Syntax {
            offset: start,
            message: format!("invalid number '{text}'"),
        })
}

fn string_literal(source: &str, start: usize) -> Result<(String, usize), CompileError> {
    let mut chars = source[start..].char_indices();
    let quote = match chars.next() {
        Some((_, q)) => q,
        None => {
            return Err(CompileError::Syntax {
                offset: start,
                message: "expected string".into(),
            })
        }
    };
    let mut out = String::new();
    let mut escaped = false;
    for (i, ch) in chars {
        if escaped {
            out.push(match ch {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            return Ok((out, start + i + ch.len_utf8()));
        } else {
            out.push(ch);
        }
    }
    Err(CompileError::Syntax {
        offset: start,
        message: "unterminated string literal".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn operators_and_keywords() {
        assert_eq!(
            kinds("a.b >= 1.5 and not x || y != 'z'"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Dot,
                TokenKind::Ident("b".into()),
                TokenKind::Ge,
                TokenKind::Number(1.5),
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Ident("x".into()),
                TokenKind::Or,
                TokenKind::Ident("y".into()),
                TokenKind::Ne,
                TokenKind::Str("z".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(kinds(r#""a\"b""#)[0], TokenKind::Str("a\"b".into()));
    }

    #[test]
    fn unterminated_string_reports_offset() {
        let err = tokenize("x == 'abc").unwrap_err();
        assert_eq!(
            err,
            CompileError::Syntax {
                offset: 5,
                message: "unterminated string literal".into()
            }
        );
    }

    #[test]
    fn unexpected_character() {
        assert!(matches!(
            tokenize("a # b"),
            Err(CompileError::Syntax { offset: 2, .. })
        ));
    }
}
