//! Typed argument values and the coercion of raw tokens into them.

use crate::error::SyntaxError;
use crate::lexer::{self, Token, TokenKind};
use std::fmt::{self, Write as _};

/// A single argument handed to a command.
///
/// Integral numeric literals become [`Value::Int`], other numbers [`Value::Float`].
/// Bare words and quoted strings are [`Value::Str`]; quoted strings have their escape
/// sequences decoded first.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Coerce a numeric literal.
    ///
    /// Literals that look like integers are parsed as `i64` directly so no precision is
    /// lost; everything else goes through `f64` and becomes an integer when it has no
    /// fractional part and fits. A literal that fails both is kept verbatim as a string.
    pub fn from_number(literal: &str) -> Value {
        if let Ok(i) = literal.parse::<i64>() {
            return Value::Int(i);
        }
        match literal.parse::<f64>() {
            Ok(f) if is_integral(f) => Value::Int(f as i64),
            Ok(f) => Value::Float(f),
            Err(_) => Value::Str(literal.to_string()),
        }
    }

    /// The text of a string value; `None` for numbers.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as source text that parses back to an equal value.
    ///
    /// Strings stay bare when they read back as a single bare word and are
    /// double-quoted otherwise.
    pub fn to_token(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Float(f) if f.is_infinite() => {
                let overflow = if *f > 0.0 { "1e999" } else { "-1e999" };
                overflow.to_string()
            }
            // Debug keeps the shortest round-trip digits and switches to exponent
            // notation for very large or small magnitudes.
            Value::Float(f) => format!("{f:?}"),
            Value::Str(s) if lexer::is_bare_word(s) => s.clone(),
            Value::Str(s) => quote(s),
        }
    }
}

/// Plain text of the value, as a command would print or compare it.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

fn is_integral(f: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Convert an argument token into its [`Value`].
pub(crate) fn coerce(token: &Token<'_>) -> Result<Value, SyntaxError> {
    match token.kind {
        TokenKind::Number => Ok(Value::from_number(token.text)),
        TokenKind::Word | TokenKind::Separator => Ok(Value::Str(token.text.to_string())),
        TokenKind::Str => {
            // Both quote characters are ASCII, so slicing one byte off each end is safe.
            let body = &token.text[1..token.text.len() - 1];
            decode_escapes(body).map(Value::Str).map_err(|bad| SyntaxError::InvalidEscape {
                pos: token.pos + 1 + bad.offset,
                text: bad.text,
            })
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct BadEscape {
    offset: usize,
    text: String,
}

/// Resolve backslash escapes inside a quoted string body.
///
/// Single- and double-quoted strings are decoded the same way. Unknown escapes keep
/// both the backslash and the character; a backslash before a newline joins the lines.
pub(crate) fn decode_escapes(body: &str) -> Result<String, BadEscape> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, esc)) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            '\\' | '\'' | '"' => out.push(esc),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            '\n' => {}
            '0'..='7' => {
                let mut code = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|&(_, d)| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                // At most 0o777, always a valid scalar value.
                out.extend(char::from_u32(code));
            }
            'x' | 'u' | 'U' => {
                let width = match esc {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let mut code = 0u32;
                let mut end = start + 2;
                for _ in 0..width {
                    match chars.peek().and_then(|&(i, d)| d.to_digit(16).map(|v| (i, v))) {
                        Some((i, v)) => {
                            code = code * 16 + v;
                            end = i + 1;
                            chars.next();
                        }
                        None => {
                            return Err(BadEscape {
                                offset: start,
                                text: body[start..end].to_string(),
                            });
                        }
                    }
                }
                match char::from_u32(code) {
                    Some(ch) => out.push(ch),
                    None => {
                        return Err(BadEscape {
                            offset: start,
                            text: body[start..end].to_string(),
                        });
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}
