//! Deterministic parser for rewritten templates.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! compare  := concat (("=" | "<>" | "<" | ">" | "<=" | ">=") concat)*
//! concat   := additive ("&" additive)*
//! additive := term (("+" | "-") term)*
//! term     := power (("*" | "/") power)*
//! power    := unary ("^" unary)*
//! unary    := ("-" | "+") unary | postfix
//! postfix  := primary ("[" (NUMBER | STRING) "]" | "%")*
//! primary  := NUMBER | STRING | TRUE | FALSE | refs "[" (NUMBER | STRING) "]"
//!           | NAME "(" (compare ("," compare)*)? ")" | "(" compare ")"
//! ```

use super::ast::{BinaryOp, Expr, IndexKey, UnaryOp};
use super::deps::RefKey;
use crate::error::TemplateError;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Op(&'static str),
}

/// Parse rewritten template text into an [`Expr`].
pub fn parse_expression(text: &str) -> Result<Expr, TemplateError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        text,
        tokens,
        pos: 0,
    };
    let expr = parser.compare()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(expr)
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, TemplateError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        let start = i;
        match b {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'(' => tokens.push((Token::LParen, start)),
            b')' => tokens.push((Token::RParen, start)),
            b'[' => tokens.push((Token::LBracket, start)),
            b']' => tokens.push((Token::RBracket, start)),
            b',' => tokens.push((Token::Comma, start)),
            b'+' => tokens.push((Token::Op("+"), start)),
            b'-' => tokens.push((Token::Op("-"), start)),
            b'*' => tokens.push((Token::Op("*"), start)),
            b'/' => tokens.push((Token::Op("/"), start)),
            b'^' => tokens.push((Token::Op("^"), start)),
            b'&' => tokens.push((Token::Op("&"), start)),
            b'%' => tokens.push((Token::Op("%"), start)),
            b'=' => tokens.push((Token::Op("="), start)),
            b'<' => {
                let op = match bytes.get(i + 1) {
                    Some(b'>') => "<>",
                    Some(b'=') => "<=",
                    _ => "<",
                };
                i += op.len() - 1;
                tokens.push((Token::Op(op), start));
            }
            b'>' => {
                let op = if bytes.get(i + 1) == Some(&b'=') { ">=" } else { ">" };
                i += op.len() - 1;
                tokens.push((Token::Op(op), start));
            }
            b'"' => {
                let mut value = String::new();
                i += 1;
                loop {
                    let Some(ch) = text[i..].chars().next() else {
                        return Err(TemplateError::UnterminatedString {
                            template: text.to_string(),
                        });
                    };
                    if ch == '"' {
                        if bytes.get(i + 1) == Some(&b'"') {
                            value.push('"');
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    value.push(ch);
                    i += ch.len_utf8();
                }
                tokens.push((Token::Str(value), start));
            }
            b'0'..=b'9' | b'.' => {
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        i = j;
                        while i < bytes.len() && bytes[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let literal = &text[start..i];
                let value = literal.parse::<f64>().map_err(|_| TemplateError::Syntax {
                    template: text.to_string(),
                    position: start,
                    message: format!("invalid number {:?}", literal),
                })?;
                tokens.push((Token::Number(value), start));
                continue;
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
                {
                    i += 1;
                }
                tokens.push((Token::Ident(text[start..i].to_string()), start));
                continue;
            }
            _ => {
                let ch = text[i..].chars().next().unwrap_or('?');
                return Err(TemplateError::Syntax {
                    template: text.to_string(),
                    position: start,
                    message: format!("unexpected character {:?}", ch),
                });
            }
        }
        i += 1;
    }

    Ok(tokens)
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: &str) -> TemplateError {
        let position = self
            .tokens
            .get(self.pos)
            .map(|(_, p)| *p)
            .unwrap_or(self.text.len());
        TemplateError::Syntax {
            template: self.text.to_string(),
            position,
            message: message.to_string(),
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), TemplateError> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected {}", what)))
        }
    }

    fn eat_op(&mut self, ops: &[&'static str]) -> Option<&'static str> {
        let found = match self.peek() {
            Some(Token::Op(op)) => ops.iter().copied().find(|candidate| *candidate == *op),
            _ => None,
        };
        if found.is_some() {
            self.pos += 1;
        }
        found
    }

    fn binary_level(
        &mut self,
        ops: &[&'static str],
        next: fn(&mut Self) -> Result<Expr, TemplateError>,
    ) -> Result<Expr, TemplateError> {
        let mut lhs = next(self)?;
        while let Some(op) = self.eat_op(ops) {
            let rhs = next(self)?;
            lhs = Expr::Binary {
                op: binary_op(op),
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn compare(&mut self) -> Result<Expr, TemplateError> {
        self.binary_level(&["=", "<>", "<", ">", "<=", ">="], Self::concat)
    }

    fn concat(&mut self) -> Result<Expr, TemplateError> {
        self.binary_level(&["&"], Self::additive)
    }

    fn additive(&mut self) -> Result<Expr, TemplateError> {
        self.binary_level(&["+", "-"], Self::term)
    }

    fn term(&mut self) -> Result<Expr, TemplateError> {
        self.binary_level(&["*", "/"], Self::power)
    }

    fn power(&mut self) -> Result<Expr, TemplateError> {
        self.binary_level(&["^"], Self::unary)
    }

    fn unary(&mut self) -> Result<Expr, TemplateError> {
        if let Some(op) = self.eat_op(&["-", "+"]) {
            let operand = self.unary()?;
            let op = if op == "-" { UnaryOp::Neg } else { UnaryOp::Plus };
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, TemplateError> {
        let mut expr = self.primary()?;
        loop {
            if self.peek() == Some(&Token::LBracket) {
                self.pos += 1;
                let index = match self.next() {
                    Some(Token::Number(n)) if n >= 0.0 && n.fract() == 0.0 => {
                        IndexKey::Position(n as usize)
                    }
                    Some(Token::Str(s)) => IndexKey::Name(s),
                    _ => {
                        self.pos = self.pos.saturating_sub(1);
                        return Err(self.error("expected a position or a quoted name in [...]"));
                    }
                };
                self.expect(Token::RBracket, "']'")?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index,
                };
            } else if self.eat_op(&["%"]).is_some() {
                expr = Expr::Unary {
                    op: UnaryOp::Percent,
                    operand: Box::new(expr),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, TemplateError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Text(s)),
            Some(Token::LParen) => {
                let inner = self.compare()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if name == "refs" && self.peek() == Some(&Token::LBracket) {
                    self.pos += 1;
                    let key = match self.next() {
                        Some(Token::Number(n)) if n >= 0.0 && n.fract() == 0.0 => {
                            RefKey::Index(n as usize)
                        }
                        Some(Token::Str(s)) => RefKey::Name(s),
                        _ => return Err(self.error("malformed reference lookup")),
                    };
                    self.expect(Token::RBracket, "']'")?;
                    return Ok(Expr::Ref(key));
                }
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let mut args = Vec::new();
                    if self.peek() != Some(&Token::RParen) {
                        loop {
                            args.push(self.compare()?);
                            if self.peek() == Some(&Token::Comma) {
                                self.pos += 1;
                                continue;
                            }
                            break;
                        }
                    }
                    self.expect(Token::RParen, "')' to close the argument list")?;
                    return Ok(Expr::Call {
                        name: name.to_ascii_uppercase(),
                        args,
                    });
                }
                match name.to_ascii_uppercase().as_str() {
                    "TRUE" => Ok(Expr::Bool(true)),
                    "FALSE" => Ok(Expr::Bool(false)),
                    _ => {
                        self.pos -= 1;
                        Err(self.error(&format!("unknown name {:?}", name)))
                    }
                }
            }
            Some(_) => {
                self.pos -= 1;
                Err(self.error("expected a value"))
            }
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

fn binary_op(op: &str) -> BinaryOp {
    match op {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "^" => BinaryOp::Pow,
        "&" => BinaryOp::Concat,
        "=" => BinaryOp::Eq,
        "<>" => BinaryOp::Ne,
        "<" => BinaryOp::Lt,
        ">" => BinaryOp::Gt,
        "<=" => BinaryOp::Le,
        _ => BinaryOp::Ge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Number(n))
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let expr = parse_expression("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Add,
                lhs: num(1.0),
                rhs: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    lhs: num(2.0),
                    rhs: num(3.0),
                }),
            }
        );
    }

    #[test]
    fn test_parens_and_left_associativity() {
        let expr = parse_expression("(1 - 2) - 3").unwrap();
        match expr {
            Expr::Binary { op, lhs, .. } => {
                assert_eq!(op, BinaryOp::Sub);
                assert!(matches!(*lhs, Expr::Binary { op: BinaryOp::Sub, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_refs_lookup() {
        assert_eq!(
            parse_expression("refs[\"a b\"]").unwrap(),
            Expr::Ref(RefKey::Name("a b".into()))
        );
        assert_eq!(parse_expression("refs[2]").unwrap(), Expr::Ref(RefKey::Index(2)));
    }

    #[test]
    fn test_call_uppercases_name_and_parses_args() {
        let expr = parse_expression("sum(refs[0], 2)").unwrap();
        match expr {
            Expr::Call { name, args } => {
                assert_eq!(name, "SUM");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse_expression("NOW()").unwrap(),
            Expr::Call { ref args, .. } if args.is_empty()
        ));
    }

    #[test]
    fn test_comparisons_and_concat() {
        assert!(matches!(
            parse_expression("refs[0] <> \"x\" & \"y\"").unwrap(),
            Expr::Binary { op: BinaryOp::Ne, .. }
        ));
        assert!(matches!(
            parse_expression("1 >= 2").unwrap(),
            Expr::Binary { op: BinaryOp::Ge, .. }
        ));
    }

    #[test]
    fn test_postfix_index_and_percent() {
        assert!(matches!(
            parse_expression("refs[\"col\"][1]").unwrap(),
            Expr::Index { index: IndexKey::Position(1), .. }
        ));
        assert!(matches!(
            parse_expression("50%").unwrap(),
            Expr::Unary { op: UnaryOp::Percent, .. }
        ));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            parse_expression("\"say \"\"hi\"\"\"").unwrap(),
            Expr::Text("say \"hi\"".into())
        );
    }

    #[test]
    fn test_booleans() {
        assert_eq!(parse_expression("true").unwrap(), Expr::Bool(true));
    }

    #[test]
    fn test_errors() {
        assert!(parse_expression("1 +").is_err());
        assert!(parse_expression("foo + 1").is_err());
        assert!(parse_expression("1 2").is_err());
        assert!(parse_expression("SUM(1,").is_err());
        assert!(parse_expression("1 $ 2").is_err());
    }
}
