//! File-backed templates.
//!
//! A file body is scanned once at load time: literal text is split from
//! `${ … }` placeholder expressions, and each expression is kept as a
//! literal lookup path. Invocation resolves every path against an ordered
//! list of JSON scopes, searched left to right, and renders through the
//! owning template. No part of the file is ever evaluated as code.

use std::fmt;
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::rendered::Rendered;
use crate::template::Template;
use crate::value::Value;

/// A template loaded from a file, bound to the tag that loaded it.
pub struct FileTemplate<'t> {
    template: &'t Template,
    path: String,
    segments: Vec<String>,
    exprs: Vec<PathExpr>,
}

impl<'t> FileTemplate<'t> {
    pub(crate) fn load(template: &'t Template, path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let path = path.display().to_string();

        debug!("loading template '{}' from {}", template.name(), path);

        let (segments, exprs) = scan(&source, &path)?;
        Ok(Self { template, path, segments, exprs })
    }

    /// The file this template was loaded from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The placeholder paths found in the file, in order of appearance.
    pub fn placeholders(&self) -> Vec<String> {
        self.exprs.iter().map(|expr| expr.to_string()).collect()
    }

    /// Renders the file body against the given lookup scopes.
    ///
    /// Each placeholder path is resolved by searching the scopes left to
    /// right for its root name; earlier scopes win. A path no scope can
    /// resolve fails with a reference error naming the path.
    pub fn render(&self, scopes: &[serde_json::Value]) -> Result<Rendered<'t>> {
        let values = self
            .exprs
            .iter()
            .map(|expr| {
                resolve_path(scopes, expr).map(Value::from).ok_or_else(|| {
                    Error::ReferenceNotFound {
                        name: expr.to_string(),
                        template: self.template.name().to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.template.render(&self.segments, values)
    }
}

/// A placeholder lookup path: a root name followed by property steps.
#[derive(Debug)]
struct PathExpr {
    root: String,
    steps: Vec<Step>,
}

#[derive(Debug)]
enum Step {
    /// A named property: `.name` or `["name"]`.
    Key(String),
    /// A literal array index: `[0]`.
    Index(usize),
    /// A computed key, itself resolved against the scopes: `[choice]`.
    Computed(PathExpr),
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for step in &self.steps {
            match step {
                Step::Key(key) => write!(f, ".{key}")?,
                Step::Index(index) => write!(f, "[{index}]")?,
                Step::Computed(path) => write!(f, "[{path}]")?,
            }
        }
        Ok(())
    }
}

/// Resolves a path to the JSON value it names, if any scope holds it.
fn resolve_path(scopes: &[serde_json::Value], expr: &PathExpr) -> Option<serde_json::Value> {
    let mut current = scopes.iter().find_map(|scope| scope.get(&expr.root))?;
    for step in &expr.steps {
        current = match step {
            Step::Key(key) => current.get(key.as_str()),
            Step::Index(index) => current.get(*index),
            Step::Computed(path) => match resolve_path(scopes, path)? {
                serde_json::Value::String(key) => current.get(key.as_str()),
                serde_json::Value::Number(n) => {
                    n.as_u64().and_then(|i| current.get(i as usize))
                }
                _ => None,
            },
        }?;
    }
    Some(current.clone())
}

/// Splits a file body into literal segments and placeholder paths.
///
/// `\$` produces a literal `$`, so `\${` suppresses a placeholder.
fn scan(source: &str, path: &str) -> Result<(Vec<String>, Vec<PathExpr>)> {
    let mut scanner = Scanner::new(source, path);
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut exprs = Vec::new();

    while let Some(ch) = scanner.peek() {
        match ch {
            '\\' if scanner.peek_at(1) == Some('$') => {
                scanner.bump();
                scanner.bump();
                current.push('$');
            }
            '$' if scanner.peek_at(1) == Some('{') => {
                scanner.bump();
                scanner.bump();
                scanner.skip_whitespace();
                let expr = scanner.path_expr()?;
                scanner.skip_whitespace();
                scanner.expect('}')?;
                exprs.push(expr);
                segments.push(std::mem::take(&mut current));
            }
            _ => {
                current.push(ch);
                scanner.bump();
            }
        }
    }
    segments.push(current);

    Ok((segments, exprs))
}

struct Scanner<'a> {
    chars: Vec<char>,
    pos: usize,
    path: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(source: &str, path: &'a str) -> Self {
        Self { chars: source.chars().collect(), pos: 0, path }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|ch| ch.is_whitespace()) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.bump() {
            Some(ch) if ch == expected => Ok(()),
            _ => Err(self.error(&format!("expected '{expected}'"))),
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::Syntax {
            path: self.path.to_string(),
            offset: self.pos,
            message: message.to_string(),
        }
    }

    /// `path := ident ( '.' ident | '[' index ']' )*`
    fn path_expr(&mut self) -> Result<PathExpr> {
        let root = self.identifier()?;
        let mut steps = Vec::new();
        loop {
            match self.peek() {
                Some('.') => {
                    self.bump();
                    steps.push(Step::Key(self.identifier()?));
                }
                Some('[') => {
                    self.bump();
                    self.skip_whitespace();
                    let step = match self.peek() {
                        Some('\'') | Some('"') => Step::Key(self.string_literal()?),
                        Some(ch) if ch.is_ascii_digit() => Step::Index(self.integer()?),
                        Some(ch) if is_ident_start(ch) => {
                            Step::Computed(self.path_expr()?)
                        }
                        _ => return Err(self.error("expected an index expression")),
                    };
                    self.skip_whitespace();
                    self.expect(']')?;
                    steps.push(step);
                }
                _ => break,
            }
        }
        Ok(PathExpr { root, steps })
    }

    fn identifier(&mut self) -> Result<String> {
        match self.peek() {
            Some(ch) if is_ident_start(ch) => {}
            _ => return Err(self.error("expected an identifier")),
        }
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                name.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        Ok(name)
    }

    fn integer(&mut self) -> Result<usize> {
        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        digits.parse().map_err(|_| self.error("index out of range"))
    }

    fn string_literal(&mut self) -> Result<String> {
        let quote = match self.bump() {
            Some(quote) => quote,
            None => return Err(self.error("expected a string")),
        };
        let mut text = String::new();
        loop {
            match self.bump() {
                Some(ch) if ch == quote => return Ok(text),
                Some(ch) => text.push(ch),
                None => return Err(self.error("unterminated string")),
            }
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}
