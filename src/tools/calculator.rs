//! Arithmetic-only expression evaluator backing the `calculate` tool.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | '(' expr ')'
//! ```
//!
//! Anything outside numeric literals, the four operators, parentheses and
//! whitespace is rejected at tokenization.

use serde_json::Value;
use thiserror::Error;

const MAX_DEPTH: usize = 256;

/// Largest magnitude at which every whole `f64` is still an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected token '{token}' at position {pos}")]
    UnexpectedToken { token: String, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NonFinite,
    #[error("expression is nested too deeply")]
    TooDeep,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TokenKind {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

impl Token {
    fn describe(&self) -> String {
        match self.kind {
            TokenKind::Number(n) => format_number(n),
            TokenKind::Plus => "+".to_string(),
            TokenKind::Minus => "-".to_string(),
            TokenKind::Star => "*".to_string(),
            TokenKind::Slash => "/".to_string(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let kind = match ch {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                let mut literal = String::new();
                let mut seen_dot = false;
                while i < chars.len() && (chars[i].is_ascii_digit() || (chars[i] == '.' && !seen_dot)) {
                    seen_dot |= chars[i] == '.';
                    literal.push(chars[i]);
                    i += 1;
                }
                // Exponent only counts when digits follow it.
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        literal.extend(&chars[i..j]);
                        i = j;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| CalcError::InvalidNumber(literal.clone()))?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    pos: start,
                });
                continue;
            }
            other => return Err(CalcError::UnexpectedChar { ch: other, pos: i }),
        };
        tokens.push(Token { kind, pos: i });
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        Ok(())
    }

    fn parse_expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.parse_term()?;
        while let Some(op @ (TokenKind::Plus | TokenKind::Minus)) = self.peek() {
            self.advance();
            let rhs = self.parse_term()?;
            value = if op == TokenKind::Plus {
                value + rhs
            } else {
                value - rhs
            };
        }
        Ok(value)
    }

    fn parse_term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.parse_unary()?;
        while let Some(op @ (TokenKind::Star | TokenKind::Slash)) = self.peek() {
            self.advance();
            let rhs = self.parse_unary()?;
            value = if op == TokenKind::Star {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                value / rhs
            };
        }
        Ok(value)
    }

    fn parse_unary(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(TokenKind::Plus) | Some(TokenKind::Minus) => {
                let negate = self.peek() == Some(TokenKind::Minus);
                self.advance();
                self.descend()?;
                let value = self.parse_unary()?;
                self.depth -= 1;
                Ok(if negate { -value } else { value })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<f64, CalcError> {
        let token = self.advance().ok_or(CalcError::UnexpectedEnd)?;
        match token.kind {
            TokenKind::Number(value) => Ok(value),
            TokenKind::LParen => {
                self.descend()?;
                let value = self.parse_expr()?;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => {
                        self.depth -= 1;
                        Ok(value)
                    }
                    None => Err(CalcError::UnbalancedParens),
                    Some(other) => Err(CalcError::UnexpectedToken {
                        token: other.describe(),
                        pos: other.pos,
                    }),
                }
            }
            _ => Err(CalcError::UnexpectedToken {
                token: token.describe(),
                pos: token.pos,
            }),
        }
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.parse_expr()?;

    if let Some(token) = parser.advance() {
        return Err(match token.kind {
            TokenKind::RParen => CalcError::UnbalancedParens,
            _ => CalcError::UnexpectedToken {
                token: token.describe(),
                pos: token.pos,
            },
        });
    }

    if !value.is_finite() {
        return Err(CalcError::NonFinite);
    }
    Ok(value)
}

/// Render a result the way a person would write it: whole numbers without a
/// fractional part, everything else in shortest round-trip form.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Evaluate and format, folding any failure into an `Error: ` string.
pub fn calculate(expression: &str) -> String {
    match evaluate(expression) {
        Ok(value) => format_number(value),
        Err(e) => format!("Error: {}", e),
    }
}

pub fn handle_calculate(args: &Value) -> Result<String, String> {
    let expression = args
        .get("expression")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "Missing required argument: expression".to_string())?;

    evaluate(expression)
        .map(format_number)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_and_parens() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("100 / 10 / 5").unwrap(), 2.0);
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(evaluate("-3 * -2").unwrap(), 6.0);
        assert_eq!(evaluate("+4 - -1").unwrap(), 5.0);
        assert_eq!(evaluate("-(2 + 3)").unwrap(), -5.0);
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(evaluate(".5 + 5.").unwrap(), 5.5);
        assert_eq!(evaluate("1e3 + 2E-1").unwrap(), 1000.2);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1071.0), "1071");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(10.72), "10.72");
        assert_eq!(format_number(10.0 / 3.0), "3.3333333333333335");
    }

    #[test]
    fn test_tokenizer_rejects_names() {
        assert_eq!(
            evaluate("__import__('os')"),
            Err(CalcError::UnexpectedChar { ch: '_', pos: 0 })
        );
        assert!(matches!(evaluate("2 ** 3"), Err(CalcError::UnexpectedToken { .. })));
        assert!(matches!(evaluate("7 % 2"), Err(CalcError::UnexpectedChar { ch: '%', .. })));
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(evaluate(&deep), Err(CalcError::TooDeep));
        let unary = format!("{}1", "-".repeat(MAX_DEPTH + 1));
        assert_eq!(evaluate(&unary), Err(CalcError::TooDeep));
    }
}
