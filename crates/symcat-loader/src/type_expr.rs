//! Syntactic type expressions.
//!
//! Fixtures spell types as short strings: `Int`, `System.Collections.IEnumerable`,
//! `std::vec::Vec<T>`, `\Exception`, `Dictionary<TKey, List<TValue>>`, or `?`
//! for the dynamic placeholder. The loader only parses them; deciding whether
//! a name denotes a generic parameter or a declaration is left to the
//! qualifier resolver.

use std::fmt;
use symcat_common::limits::MAX_TYPE_EXPR_DEPTH;

/// A parsed type expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// A (possibly qualified) name with optional generic arguments.
    Named {
        path: Vec<String>,
        args: Vec<TypeExpr>,
    },
    /// The dynamic placeholder `?`: the type is not statically known.
    Dynamic,
}

/// A syntax error inside a type string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSyntaxError {
    /// Byte offset of the offending character.
    pub offset: usize,
    pub message: &'static str,
}

impl TypeExpr {
    /// Convenience constructor for an unqualified name without arguments.
    pub fn simple(name: &str) -> Self {
        TypeExpr::Named {
            path: vec![name.to_string()],
            args: Vec::new(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, TypeExpr::Dynamic)
    }

    /// Parse a type string.
    pub fn parse(text: &str) -> Result<Self, TypeSyntaxError> {
        let mut parser = TypeParser {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        };
        let expr = parser.parse_type(0)?;
        parser.skip_ws();
        if parser.pos != parser.bytes.len() {
            return Err(parser.error("unexpected trailing characters"));
        }
        Ok(expr)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Dynamic => f.write_str("?"),
            TypeExpr::Named { path, args } => {
                f.write_str(&path.join("."))?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}

struct TypeParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn error(&self, message: &'static str) -> TypeSyntaxError {
        TypeSyntaxError {
            offset: self.pos,
            message,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consume a path separator (`.`, `::`, `\`) if one is next.
    fn eat_separator(&mut self) -> bool {
        match self.peek() {
            Some(b'.') | Some(b'\\') => {
                self.pos += 1;
                true
            }
            Some(b':') if self.bytes.get(self.pos + 1) == Some(&b':') => {
                self.pos += 2;
                true
            }
            _ => false,
        }
    }

    fn parse_type(&mut self, depth: usize) -> Result<TypeExpr, TypeSyntaxError> {
        if depth > MAX_TYPE_EXPR_DEPTH {
            return Err(self.error("generic arguments nested too deeply"));
        }
        self.skip_ws();
        if self.peek() == Some(b'?') {
            self.pos += 1;
            return Ok(TypeExpr::Dynamic);
        }

        // A leading separator anchors the path at the root (`\Exception`,
        // `::std::string::String`); the resolver searches from the root anyway.
        self.eat_separator();

        let mut path = vec![self.parse_ident()?];
        while self.eat_separator() {
            path.push(self.parse_ident()?);
        }

        self.skip_ws();
        let mut args = Vec::new();
        if self.peek() == Some(b'<') {
            self.pos += 1;
            loop {
                args.push(self.parse_type(depth + 1)?);
                self.skip_ws();
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b'>') => {
                        self.pos += 1;
                        break;
                    }
                    Some(_) => return Err(self.error("expected ',' or '>'")),
                    None => return Err(self.error("unclosed generic argument list")),
                }
            }
        }

        Ok(TypeExpr::Named { path, args })
    }

    fn parse_ident(&mut self) -> Result<String, TypeSyntaxError> {
        let start = self.pos;
        for (offset, ch) in self.text[start..].char_indices() {
            if !(ch.is_alphanumeric() || ch == '_' || ch == '$') {
                self.pos = start + offset;
                break;
            }
            self.pos = start + offset + ch.len_utf8();
        }
        if self.pos == start {
            return Err(self.error("expected a type name"));
        }
        Ok(self.text[start..self.pos].to_string())
    }
}

#[cfg(test)]
#[path = "tests/type_expr_tests.rs"]
mod tests;
