//! Tokenizer and recursive-descent parser for the expression sublanguage

use crate::error::ExprError;

/// Binary operators, comparisons included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Named variable, resolved at evaluation time
    Variable(String),
    /// Unary negation
    Neg(Box<Expr>),
    /// Binary operation; comparisons yield 1.0 or 0.0
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// min(...) or max(...), two or more arguments
    Call { function: String, args: Vec<Expr> },
}

impl Expr {
    /// Parse a source string into an expression tree
    pub fn parse(source: &str) -> Result<Expr, ExprError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.comparison()?;
        if let Some((tok, position)) = parser.peek() {
            return Err(ExprError::Parse {
                position,
                message: format!("unexpected trailing input '{tok}'"),
            });
        }
        Ok(expr)
    }

    /// Every variable name the expression references
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out.sort();
        out.dedup();
        out
    }

    fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => out.push(name.clone()),
            Expr::Neg(inner) => inner.collect_variables(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    LParen,
    RParen,
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::EqEq => write!(f, "=="),
            Token::Ne => write!(f, "!="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, ExprError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push((Token::Plus, i));
                i += 1;
            }
            '-' => {
                tokens.push((Token::Minus, i));
                i += 1;
            }
            '*' => {
                tokens.push((Token::Star, i));
                i += 1;
            }
            '/' => {
                tokens.push((Token::Slash, i));
                i += 1;
            }
            '(' => {
                tokens.push((Token::LParen, i));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, i));
                i += 1;
            }
            ',' => {
                tokens.push((Token::Comma, i));
                i += 1;
            }
            '<' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push((Token::Le, i));
                    i += 2;
                } else {
                    tokens.push((Token::Lt, i));
                    i += 1;
                }
            }
            '>' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push((Token::Ge, i));
                    i += 2;
                } else {
                    tokens.push((Token::Gt, i));
                    i += 1;
                }
            }
            '=' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push((Token::EqEq, i));
                    i += 2;
                } else {
                    return Err(ExprError::Parse {
                        position: i,
                        message: "single '=' is not an operator (use '==')".to_string(),
                    });
                }
            }
            '!' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push((Token::Ne, i));
                    i += 2;
                } else {
                    return Err(ExprError::Parse {
                        position: i,
                        message: "expected '!='".to_string(),
                    });
                }
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let text = &source[start..i];
                let value = text.parse::<f64>().map_err(|_| ExprError::Parse {
                    position: start,
                    message: format!("invalid number '{text}'"),
                })?;
                tokens.push((Token::Number(value), start));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                tokens.push((Token::Ident(source[start..i].to_string()), start));
            }
            other => {
                return Err(ExprError::Parse {
                    position: i,
                    message: format!("unexpected character '{other}'"),
                });
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<(Token, usize)> {
        self.tokens.get(self.pos).cloned()
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn end_position(&self) -> usize {
        self.tokens.last().map(|(_, p)| p + 1).unwrap_or(0)
    }

    // A single, non-associative comparison over additive expressions.
    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.additive()?;
        let op = match self.peek() {
            Some((Token::Lt, _)) => Some(BinOp::Lt),
            Some((Token::Le, _)) => Some(BinOp::Le),
            Some((Token::Gt, _)) => Some(BinOp::Gt),
            Some((Token::Ge, _)) => Some(BinOp::Ge),
            Some((Token::EqEq, _)) => Some(BinOp::Eq),
            Some((Token::Ne, _)) => Some(BinOp::Ne),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let rhs = self.additive()?;
            return Ok(Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.term()?;
        loop {
            let op = match self.peek() {
                Some((Token::Plus, _)) => BinOp::Add,
                Some((Token::Minus, _)) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.term()?;
            expr = Expr::Binary {
                op,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.unary()?;
        loop {
            let op = match self.peek() {
                Some((Token::Star, _)) => BinOp::Mul,
                Some((Token::Slash, _)) => BinOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.unary()?;
            expr = Expr::Binary {
                op,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        if let Some((Token::Minus, _)) = self.peek() {
            self.advance();
            let inner = self.unary()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        match self.advance() {
            Some((Token::Number(value), _)) => Ok(Expr::Number(value)),
            Some((Token::Ident(name), position)) => {
                if let Some((Token::LParen, _)) = self.peek() {
                    self.advance();
                    let args = self.arguments(position)?;
                    Ok(Expr::Call {
                        function: name,
                        args,
                    })
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Some((Token::LParen, position)) => {
                let expr = self.comparison()?;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(expr),
                    _ => Err(ExprError::Parse {
                        position,
                        message: "unclosed parenthesis".to_string(),
                    }),
                }
            }
            Some((tok, position)) => Err(ExprError::Parse {
                position,
                message: format!("unexpected token '{tok}'"),
            }),
            None => Err(ExprError::Parse {
                position: self.end_position(),
                message: "unexpected end of expression".to_string(),
            }),
        }
    }

    fn arguments(&mut self, call_position: usize) -> Result<Vec<Expr>, ExprError> {
        let mut args = Vec::new();
        if let Some((Token::RParen, _)) = self.peek() {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.comparison()?);
            match self.advance() {
                Some((Token::Comma, _)) => continue,
                Some((Token::RParen, _)) => break,
                _ => {
                    return Err(ExprError::Parse {
                        position: call_position,
                        message: "expected ',' or ')' in argument list".to_string(),
                    });
                }
            }
        }
        Ok(args)
    }
}
