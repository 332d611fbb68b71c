// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! A small expression language for guard conditions.
//!
//! ```text
//! expr    := or
//! or      := and (("or" | "||") and)*
//! and     := not (("and" | "&&") not)*
//! not     := ("not" | "!") not | compare
//! compare := operand (("==" | "!=" | "<" | "<=" | ">" | ">=") operand)?
//! operand := literal | reference | call | "(" expr ")"
//! call    := name "(" (expr ("," expr)*)? ")"
//! ```
//!
//! Literals are quoted strings, integers, `true`/`false` and `none`.
//! References are dotted names resolved through [`Scopes`], so
//! `context.force` and `env.SHELL` read the same values a template would;
//! an unset environment variable evaluates to `none`. Builtin calls are
//! `installed("cmd")` and `exists("path")`.

use std::fmt;
use std::path::Path;

use crate::substitute::{Resolved, Scopes};

#[cfg(test)]
#[path = "./condition_test.rs"]
mod condition_test;

/// Builtin functions callable from a condition.
pub const BUILTINS: &[&str] = &["installed", "exists"];

/// Deepest nesting of groups, calls and `not` accepted in one condition.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Comma,
    Not,
    And,
    Or,
    Compare(CompareOp),
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    Name(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::Comma => f.write_str(","),
            Self::Not => f.write_str("not"),
            Self::And => f.write_str("and"),
            Self::Or => f.write_str("or"),
            Self::Compare(op) => write!(f, "{op}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::None => f.write_str("none"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        };
        f.write_str(op)
    }
}

/// A parsed condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Operand),
    Reference(String),
    Call(String, Vec<Expr>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(Box<Expr>, CompareOp, Box<Expr>),
}

/// A runtime value inside a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Bool(bool),
    Int(i64),
    Str(String),
    None,
}

impl Operand {
    pub fn truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Str(s) => !s.is_empty(),
            Self::None => false,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Str(_) => "string",
            Self::None => "none",
        }
    }
}

impl From<Resolved> for Operand {
    fn from(value: Resolved) -> Self {
        match value {
            Resolved::Bool(b) => Self::Bool(b),
            Resolved::Text(s) => Self::Str(s),
            Resolved::Missing => Self::None,
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '!' | '=' | '<' | '>' => {
                chars.next();
                let followed_by_eq = chars.next_if_eq(&'=').is_some();
                let token = match (c, followed_by_eq) {
                    ('!', true) => Token::Compare(CompareOp::Ne),
                    ('!', false) => Token::Not,
                    ('=', true) => Token::Compare(CompareOp::Eq),
                    ('=', false) => return Err("unexpected `=`, use `==` to compare".to_string()),
                    ('<', true) => Token::Compare(CompareOp::Le),
                    ('<', false) => Token::Compare(CompareOp::Lt),
                    ('>', true) => Token::Compare(CompareOp::Ge),
                    _ => Token::Compare(CompareOp::Gt),
                };
                tokens.push(token);
            }
            '&' | '|' => {
                chars.next();
                if chars.next_if_eq(&c).is_none() {
                    return Err(format!("unexpected `{c}`, use `{c}{c}`"));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            '"' | '\'' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => match chars.next() {
                            Some('n') => text.push('\n'),
                            Some('t') => text.push('\t'),
                            Some(escaped) => text.push(escaped),
                            None => break,
                        },
                        q if q == c => {
                            closed = true;
                            break;
                        }
                        other => text.push(other),
                    }
                }
                if !closed {
                    return Err("unterminated string literal".to_string());
                }
                tokens.push(Token::Str(text));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut digits = String::new();
                digits.push(c);
                chars.next();
                while let Some(d) = chars.next_if(char::is_ascii_digit) {
                    digits.push(d);
                }
                let value = digits
                    .parse::<i64>()
                    .map_err(|_| format!("invalid integer `{digits}`"))?;
                tokens.push(Token::Int(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(n) =
                    chars.next_if(|n| n.is_alphanumeric() || matches!(n, '_' | '.' | '-'))
                {
                    name.push(n);
                }
                let token = match name.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "true" | "True" => Token::Bool(true),
                    "false" | "False" => Token::Bool(false),
                    "none" | "None" => Token::None,
                    _ => Token::Name(name),
                };
                tokens.push(token);
            }
            other => return Err(format!("unexpected character `{other}`")),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(format!("expected `{expected}`, found `{token}`")),
            None => Err(format!("expected `{expected}`, found end of condition")),
        }
    }

    fn descend(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(format!("condition nests deeper than {MAX_DEPTH} levels"));
        }
        Ok(())
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        self.descend()?;
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        self.depth -= 1;
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_not()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, String> {
        if self.eat(&Token::Not) {
            self.descend()?;
            let inner = self.parse_not()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<Expr, String> {
        let lhs = self.parse_operand()?;
        if let Some(Token::Compare(op)) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.parse_operand()?;
            if let Some(Token::Compare(_)) = self.peek() {
                return Err("chained comparisons are not supported".to_string());
            }
            return Ok(Expr::Compare(Box::new(lhs), op, Box::new(rhs)));
        }
        Ok(lhs)
    }

    fn parse_operand(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Str(s)) => Ok(Expr::Literal(Operand::Str(s))),
            Some(Token::Int(i)) => Ok(Expr::Literal(Operand::Int(i))),
            Some(Token::Bool(b)) => Ok(Expr::Literal(Operand::Bool(b))),
            Some(Token::None) => Ok(Expr::Literal(Operand::None)),
            Some(Token::Name(name)) => {
                if !self.eat(&Token::LParen) {
                    return Ok(Expr::Reference(name));
                }
                let mut args = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        args.push(self.parse_or()?);
                        if self.eat(&Token::RParen) {
                            break;
                        }
                        self.expect(&Token::Comma)?;
                    }
                }
                Ok(Expr::Call(name, args))
            }
            Some(token) => Err(format!("unexpected `{token}`")),
            None => Err("unexpected end of condition".to_string()),
        }
    }
}

/// Parse a condition into an expression tree.
pub fn parse(source: &str) -> Result<Expr, String> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err("empty condition".to_string());
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(format!("unexpected `{token}` after complete expression")),
    }
}

/// Parse and evaluate a condition, reducing it to its truthiness.
pub fn evaluate(source: &str, scopes: &Scopes<'_>) -> Result<bool, String> {
    let expr = parse(source)?;
    Ok(eval(&expr, scopes)?.truthy())
}

fn eval(expr: &Expr, scopes: &Scopes<'_>) -> Result<Operand, String> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Reference(reference) => scopes.lookup(reference).map(Operand::from),
        Expr::Not(inner) => Ok(Operand::Bool(!eval(inner, scopes)?.truthy())),
        Expr::And(lhs, rhs) => {
            if !eval(lhs, scopes)?.truthy() {
                return Ok(Operand::Bool(false));
            }
            Ok(Operand::Bool(eval(rhs, scopes)?.truthy()))
        }
        Expr::Or(lhs, rhs) => {
            if eval(lhs, scopes)?.truthy() {
                return Ok(Operand::Bool(true));
            }
            Ok(Operand::Bool(eval(rhs, scopes)?.truthy()))
        }
        Expr::Compare(lhs, op, rhs) => {
            let lhs = eval(lhs, scopes)?;
            let rhs = eval(rhs, scopes)?;
            compare(&lhs, *op, &rhs).map(Operand::Bool)
        }
        Expr::Call(name, args) => {
            let args = args
                .iter()
                .map(|arg| eval(arg, scopes))
                .collect::<Result<Vec<_>, _>>()?;
            call(name, &args, scopes)
        }
    }
}

fn compare(lhs: &Operand, op: CompareOp, rhs: &Operand) -> Result<bool, String> {
    use std::cmp::Ordering;

    match op {
        CompareOp::Eq => return Ok(lhs == rhs),
        CompareOp::Ne => return Ok(lhs != rhs),
        _ => {}
    }
    let ordering: Ordering = match (lhs, rhs) {
        (Operand::Int(a), Operand::Int(b)) => a.cmp(b),
        (Operand::Str(a), Operand::Str(b)) => a.cmp(b),
        (Operand::Bool(a), Operand::Bool(b)) => a.cmp(b),
        _ => {
            return Err(format!(
                "cannot order {} and {} with `{op}`",
                lhs.type_name(),
                rhs.type_name()
            ));
        }
    };
    Ok(match op {
        CompareOp::Lt => ordering.is_lt(),
        CompareOp::Le => ordering.is_le(),
        CompareOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    })
}

fn call(name: &str, args: &[Operand], scopes: &Scopes<'_>) -> Result<Operand, String> {
    let argument = match args {
        [Operand::Str(argument)] => argument.as_str(),
        _ if BUILTINS.contains(&name) => {
            return Err(format!("`{name}` takes a single string argument"));
        }
        _ => {
            return Err(format!(
                "unknown function `{name}`, expected one of: {}",
                BUILTINS.join(", ")
            ));
        }
    };
    match name {
        // A forced run treats every command as missing so installs are redone.
        "installed" => {
            let found = which::which(argument).is_ok();
            Ok(Operand::Bool(found && !scopes.context().force))
        }
        "exists" => Ok(Operand::Bool(Path::new(argument).exists())),
        _ => Err(format!(
            "unknown function `{name}`, expected one of: {}",
            BUILTINS.join(", ")
        )),
    }
}
