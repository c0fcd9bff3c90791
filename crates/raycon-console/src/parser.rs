//! Statement parsing.
//!
//! ```text
//! Statement := Identifier
//!            | Identifier '(' ArgList? ')'
//!            | Identifier WS ArgList
//! ArgList   := Expr (',' Expr)*
//! Expr      := Term (('+' | '-') Term)*
//! Term      := Unary (('*' | '/') Unary)*
//! Unary     := '-' Unary | Primary
//! Primary   := Word | '"' chars '"' | Word '(' ArgList? ')' | '(' ArgList ')'
//! ```
//!
//! Parsing only builds the tree. Identifiers are resolved when the tree is
//! evaluated against a [`Resolver`], so a nested call runs only after its
//! own arguments evaluated cleanly.

use raycon_types::error::{CommandError, ParseError};

use crate::argument::Argument;
use crate::ops::{self, BinaryOp};

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Word(String),
    Quoted(String),
    LParen,
    RParen,
    Comma,
    Op(BinaryOp),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

impl Token {
    fn text(&self) -> String {
        match &self.kind {
            TokenKind::Word(w) => w.clone(),
            TokenKind::Quoted(q) => quote(q),
            TokenKind::LParen => "(".into(),
            TokenKind::RParen => ")".into(),
            TokenKind::Comma => ",".into(),
            TokenKind::Op(op) => op.symbol().to_string(),
        }
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | ',' | '+' | '-' | '*' | '/' | '"')
}

fn starts_numeric(word: &str) -> bool {
    word.starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        let single = match ch {
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ',' => Some(TokenKind::Comma),
            '+' => Some(TokenKind::Op(BinaryOp::Add)),
            '-' => Some(TokenKind::Op(BinaryOp::Sub)),
            '*' => Some(TokenKind::Op(BinaryOp::Mul)),
            '/' => Some(TokenKind::Op(BinaryOp::Div)),
            _ => None,
        };
        if let Some(kind) = single {
            chars.next();
            tokens.push(Token {
                kind,
                start,
                end: start + 1,
            });
            continue;
        }
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch == '"' {
            chars.next();
            let mut quoted = String::new();
            let end = loop {
                match chars.next() {
                    Some((i, '"')) => break i + 1,
                    Some((_, '\\')) => match chars.next() {
                        Some((_, c)) => push_escaped(&mut quoted, c),
                        None => return Err(ParseError::UnterminatedString { position: start }),
                    },
                    Some((_, c)) => quoted.push(c),
                    None => return Err(ParseError::UnterminatedString { position: start }),
                }
            };
            tokens.push(Token {
                kind: TokenKind::Quoted(quoted),
                start,
                end,
            });
            continue;
        }

        let mut word = String::new();
        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            // keep the sign of an exponent (`1e-3`) inside the number
            let exponent_sign = matches!(c, '+' | '-')
                && starts_numeric(&word)
                && word.ends_with(['e', 'E']);
            if !is_word_char(c) && !exponent_sign {
                break;
            }
            word.push(c);
            end = i + c.len_utf8();
            chars.next();
        }
        tokens.push(Token {
            kind: TokenKind::Word(word),
            start,
            end,
        });
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Syntax tree
// ---------------------------------------------------------------------------

/// Name lookups needed to evaluate a parsed statement.
pub(crate) trait Resolver {
    /// Current value of a variable-backed command.
    fn variable(&self, name: &str) -> Option<Argument>;

    /// Run a command with evaluated arguments.
    fn call(&self, name: &str, args: Vec<Argument>) -> Result<Argument, CommandError>;
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    /// A bare word: a variable read, or else a literal.
    Word(String),
    Quoted(String),
    Call { name: String, args: CallArgs },
    /// A parenthesized list of two or more expressions.
    Vector(Vec<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Negate(Box<Expr>),
}

/// Arguments of a call: parsed expressions, or raw text pieces for commands
/// that take their arguments unevaluated.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CallArgs {
    Parsed(Vec<Expr>),
    Raw(Vec<String>),
}

impl CallArgs {
    /// Evaluate every argument in order.
    pub(crate) fn evaluate(&self, resolver: &dyn Resolver) -> Result<Vec<Argument>, CommandError> {
        match self {
            Self::Parsed(exprs) => exprs.iter().map(|e| e.evaluate(resolver)).collect(),
            Self::Raw(pieces) => Ok(pieces.iter().map(|p| Argument::string(p.as_str())).collect()),
        }
    }
}

impl Expr {
    /// Evaluate the expression, resolving names through `resolver`.
    pub(crate) fn evaluate(&self, resolver: &dyn Resolver) -> Result<Argument, CommandError> {
        match self {
            Self::Word(word) => Ok(resolver
                .variable(word)
                .unwrap_or_else(|| Argument::from_literal(word))),
            Self::Quoted(text) => Ok(Argument::string(text.as_str())),
            Self::Call { name, args } => {
                let args = args.evaluate(resolver)?;
                resolver.call(name, args)
            },
            Self::Vector(items) => {
                let parts = items
                    .iter()
                    .map(|e| e.evaluate(resolver))
                    .collect::<Result<Vec<_>, _>>()?;
                let origin = parts
                    .iter()
                    .map(Argument::origin)
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(Argument::concat(&parts, format!("({origin})")))
            },
            Self::Binary { op, lhs, rhs } => {
                let lhs = lhs.evaluate(resolver)?;
                let rhs = rhs.evaluate(resolver)?;
                Ok(ops::apply(&lhs, &rhs, *op))
            },
            Self::Negate(inner) => Ok(ops::negate(&inner.evaluate(resolver)?)),
        }
    }
}

/// How a statement was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementForm {
    /// `Speed`
    Bare,
    /// `Speed(2.0)`
    Call,
    /// `Speed 2.0`
    Spaced,
}

/// One parsed top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub name: String,
    pub form: StatementForm,
    /// Unevaluated argument text, trimmed.
    pub arguments_text: String,
    pub args: CallArgs,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    force_string: &'a dyn Fn(&str) -> bool,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(t) if t.kind == TokenKind::RParen => ParseError::UnexpectedCloseParen {
                position: t.start,
            },
            Some(t) => ParseError::UnexpectedToken {
                token: t.text(),
                position: t.start,
            },
            None => ParseError::UnexpectedEnd,
        }
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        let name = match self.peek() {
            Some(Token {
                kind: TokenKind::Word(w),
                ..
            }) => w.clone(),
            Some(t) => return Err(ParseError::MissingName { position: t.start }),
            None => return Err(ParseError::MissingName { position: 0 }),
        };
        let name_end = self.tokens[self.pos].end;
        self.pos += 1;
        let force = (self.force_string)(&name);

        let (form, arguments_text, args) = match self.peek_kind() {
            None => (StatementForm::Bare, String::new(), CallArgs::Parsed(Vec::new())),
            Some(TokenKind::LParen) => {
                let (inner, args) = self.call_arguments(force)?;
                if self.peek().is_some() {
                    return Err(self.unexpected());
                }
                (StatementForm::Call, inner, args)
            },
            Some(TokenKind::RParen) => return Err(self.unexpected()),
            Some(_) => {
                let rest = self.text[name_end..].trim().to_string();
                let args = if force {
                    self.pos = self.tokens.len();
                    CallArgs::Raw(raw_pieces(&rest))
                } else {
                    let exprs = self.argument_list()?;
                    if self.peek().is_some() {
                        return Err(self.unexpected());
                    }
                    CallArgs::Parsed(exprs)
                };
                (StatementForm::Spaced, rest, args)
            },
        };
        Ok(Statement {
            name,
            form,
            arguments_text,
            args,
        })
    }

    /// Parse `'(' ArgList? ')'` at the current position. Returns the trimmed
    /// text between the parentheses along with the arguments.
    fn call_arguments(&mut self, force: bool) -> Result<(String, CallArgs), ParseError> {
        let open = self.tokens[self.pos].clone();
        let close = self.matching_paren()?;
        let inner = self.text[open.end..self.tokens[close].start].trim().to_string();

        if force {
            self.pos = close + 1;
            return Ok((inner.clone(), CallArgs::Raw(raw_pieces(&inner))));
        }

        self.pos += 1;
        let exprs = if self.peek_kind() == Some(&TokenKind::RParen) {
            Vec::new()
        } else {
            self.argument_list()?
        };
        if self.peek_kind() != Some(&TokenKind::RParen) {
            return Err(self.unexpected());
        }
        self.pos += 1;
        Ok((inner, CallArgs::Parsed(exprs)))
    }

    /// Index of the `)` closing the `(` at the current position.
    fn matching_paren(&self) -> Result<usize, ParseError> {
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(self.pos) {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                },
                _ => {},
            }
        }
        Err(ParseError::UnterminatedParens {
            position: self.tokens[self.pos].start,
        })
    }

    fn argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.expr()?];
        while self.peek_kind() == Some(&TokenKind::Comma) {
            self.pos += 1;
            exprs.push(self.expr()?);
        }
        Ok(exprs)
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.term()?;
        while let Some(TokenKind::Op(op @ (BinaryOp::Add | BinaryOp::Sub))) = self.peek_kind() {
            let op = *op;
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        while let Some(TokenKind::Op(op @ (BinaryOp::Mul | BinaryOp::Div))) = self.peek_kind() {
            let op = *op;
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let Some(TokenKind::Op(BinaryOp::Sub)) = self.peek_kind() else {
            return self.primary();
        };
        let minus_end = self.tokens[self.pos].end;
        self.pos += 1;

        // `-1` directly attached is a signed literal, not a negated `1`
        if let Some(Token {
            kind: TokenKind::Word(w),
            start,
            ..
        }) = self.peek()
            && *start == minus_end
            && starts_numeric(w)
            && self.tokens.get(self.pos + 1).map(|t| &t.kind) != Some(&TokenKind::LParen)
        {
            let literal = format!("-{w}");
            self.pos += 1;
            return Ok(Expr::Word(literal));
        }
        Ok(Expr::Negate(Box::new(self.unary()?)))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.peek().cloned() else {
            return Err(ParseError::UnexpectedEnd);
        };
        match token.kind {
            TokenKind::Word(name) => {
                self.pos += 1;
                if self.peek_kind() != Some(&TokenKind::LParen) {
                    return Ok(Expr::Word(name));
                }
                let force = (self.force_string)(&name);
                let (_, args) = self.call_arguments(force)?;
                Ok(Expr::Call { name, args })
            },
            TokenKind::Quoted(text) => {
                self.pos += 1;
                Ok(Expr::Quoted(text))
            },
            TokenKind::LParen => {
                self.pos += 1;
                let mut items = self.argument_list()?;
                if self.peek_kind() != Some(&TokenKind::RParen) {
                    return match self.peek() {
                        None => Err(ParseError::UnterminatedParens {
                            position: token.start,
                        }),
                        Some(_) => Err(self.unexpected()),
                    };
                }
                self.pos += 1;
                if items.len() == 1 {
                    return Ok(items.remove(0));
                }
                Ok(Expr::Vector(items))
            },
            _ => Err(ParseError::UnexpectedToken {
                token: token.text(),
                position: token.start,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse one statement. `force_string` reports which command names take
/// their arguments as unevaluated text.
pub(crate) fn parse_statement(
    text: &str,
    force_string: &dyn Fn(&str) -> bool,
) -> Result<Statement, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        text,
        tokens,
        pos: 0,
        force_string,
    };
    parser.statement()
}

/// Split `text` on commas that are outside parentheses and quotes.
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut quotes = QuoteScan::default();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if !quotes.outside(c) {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(&text[start..i]);
                start = i + 1;
            },
            _ => {},
        }
    }
    pieces.push(&text[start..]);
    pieces
}

/// Trimmed, unquoted, non-empty top-level pieces of raw argument text.
fn raw_pieces(text: &str) -> Vec<String> {
    split_top_level(text)
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.strip_prefix('"')
                .and_then(|q| q.strip_suffix('"'))
                .map_or_else(|| p.to_string(), unescape)
        })
        .collect()
}

/// The leading command name of a statement: everything before the first
/// `(` or whitespace.
pub fn leading_name(text: &str) -> &str {
    let text = text.trim_start();
    let end = text
        .find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(text.len());
    &text[..end]
}

/// Split a statement into its name and its raw argument text without
/// evaluating anything: `"name(a,b)"` gives `("name", "a,b")`, and the space
/// form `"name a b"` gives `("name", "a b")`.
pub fn parse_function_and_argument_list(text: &str) -> Result<(String, String), ParseError> {
    let trimmed = text.trim();
    let name = leading_name(trimmed);
    if name.is_empty() {
        return Err(ParseError::MissingName {
            position: text.len() - text.trim_start().len(),
        });
    }
    let rest = trimmed[name.len()..].trim_start();
    if !rest.starts_with('(') {
        return Ok((name.to_string(), rest.to_string()));
    }
    let offset = trimmed.len() - rest.len();

    let mut depth = 0usize;
    let mut quotes = QuoteScan::default();
    for (i, c) in rest.char_indices() {
        if !quotes.outside(c) {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let trailing = rest[i + 1..].trim();
                    if !trailing.is_empty() {
                        return Err(ParseError::UnexpectedToken {
                            token: trailing.to_string(),
                            position: offset + i + 1,
                        });
                    }
                    return Ok((name.to_string(), rest[1..i].to_string()));
                }
            },
            _ => {},
        }
    }
    Err(ParseError::UnterminatedParens { position: offset })
}

// ---------------------------------------------------------------------------
// Quoted strings
// ---------------------------------------------------------------------------

/// Tracks whether a character scan is inside a quoted string.
#[derive(Default)]
struct QuoteScan {
    in_quotes: bool,
    escaped: bool,
}

impl QuoteScan {
    /// Feed the next character. Returns true when `c` is outside quotes and
    /// is not a quote itself.
    fn outside(&mut self, c: char) -> bool {
        if !self.in_quotes {
            self.in_quotes = c == '"';
            return !self.in_quotes;
        }
        if self.escaped {
            self.escaped = false;
        } else if c == '\\' {
            self.escaped = true;
        } else if c == '"' {
            self.in_quotes = false;
        }
        false
    }
}

/// Decode the character following a `\` inside a quoted string. Unknown
/// escapes keep their backslash so Windows-style paths read back unchanged.
fn push_escaped(out: &mut String, c: char) {
    match c {
        'n' => out.push('\n'),
        'r' => out.push('\r'),
        't' => out.push('\t'),
        '"' | '\\' => out.push(c),
        other => {
            out.push('\\');
            out.push(other);
        },
    }
}

/// Decode the body of a quoted string.
pub(crate) fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => push_escaped(&mut out, next),
                None => out.push(c),
            },
            c => out.push(c),
        }
    }
    out
}

/// Quote `text` so the lexer reads it back as the same string.
pub(crate) fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
