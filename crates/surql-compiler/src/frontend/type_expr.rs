//! Type expressions in annotation syntax.
//!
//! ```text
//! expr := term ('|' term)*
//! term := IDENT ('[' expr (',' expr)* ']')?
//! ```
//!
//! Expressions are parsed into a small syntax tree first and resolved against
//! the declared models and enums afterwards, so a model may be referenced
//! before it is declared.

use std::collections::HashMap;

use crate::diagnostic::{SchemaError, Span};
use crate::ir::{Catalog, ContainerKind, EnumType, PrimitiveKind, Sentinel, TypeDescriptor};

/// A union of one or more terms.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub terms: Vec<Term>,
}

/// A named type, optionally applied to parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub name: String,
    pub args: Vec<TypeExpr>,
    pub span: Span,
}

pub fn parse(source: &str) -> Result<TypeExpr, SchemaError> {
    let mut parser = Parser { source, pos: 0 };
    let expr = parser.expr()?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected '{}'", c), Span::new(parser.pos, parser.pos + c.len_utf8())));
    }
    Ok(expr)
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, message: impl Into<String>, span: Span) -> SchemaError {
        SchemaError::TypeSyntax {
            message: message.into(),
            expr: self.source.to_string(),
            span: span.into(),
        }
    }

    fn expr(&mut self) -> Result<TypeExpr, SchemaError> {
        let mut terms = vec![self.term()?];
        loop {
            self.skip_whitespace();
            if self.peek() != Some('|') {
                break;
            }
            self.pos += 1;
            terms.push(self.term()?);
        }
        Ok(TypeExpr { terms })
    }

    fn term(&mut self) -> Result<Term, SchemaError> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_' || c == '.') {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.pos == start {
            return Err(self.error("expected a type name", Span::at(start)));
        }
        let name = self.source[start..self.pos].to_string();

        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some('[') {
            self.pos += 1;
            args.push(self.expr()?);
            loop {
                self.skip_whitespace();
                match self.peek() {
                    Some(',') => {
                        self.pos += 1;
                        args.push(self.expr()?);
                    }
                    Some(']') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or ']'", Span::at(self.pos))),
                }
            }
        }

        Ok(Term {
            name,
            args,
            span: Span::new(start, self.pos),
        })
    }
}

/// Resolves parsed expressions to descriptors.
pub struct TypeResolver<'a> {
    catalog: &'a Catalog,
    enums: &'a HashMap<String, EnumType>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(catalog: &'a Catalog, enums: &'a HashMap<String, EnumType>) -> Self {
        Self { catalog, enums }
    }

    /// Parses and resolves `source` in one step.
    pub fn parse(&self, source: &str) -> Result<TypeDescriptor, SchemaError> {
        let expr = parse(source)?;
        self.resolve(&expr, source)
    }

    pub fn resolve(&self, expr: &TypeExpr, source: &str) -> Result<TypeDescriptor, SchemaError> {
        let mut alternatives = Vec::with_capacity(expr.terms.len());
        for term in &expr.terms {
            alternatives.push(self.resolve_term(term, source)?);
        }
        if alternatives.len() == 1 {
            Ok(alternatives.remove(0))
        } else {
            Ok(TypeDescriptor::union(alternatives))
        }
    }

    fn resolve_term(&self, term: &Term, source: &str) -> Result<TypeDescriptor, SchemaError> {
        let syntax_error = |message: String| SchemaError::TypeSyntax {
            message,
            expr: source.to_string(),
            span: term.span.into(),
        };

        let leaf = match term.name.as_str() {
            "str" => Some(TypeDescriptor::Primitive(PrimitiveKind::Text)),
            "int" => Some(TypeDescriptor::Primitive(PrimitiveKind::Integer)),
            "float" => Some(TypeDescriptor::Primitive(PrimitiveKind::Float)),
            "bool" => Some(TypeDescriptor::Primitive(PrimitiveKind::Boolean)),
            "datetime" => Some(TypeDescriptor::Primitive(PrimitiveKind::DateTime)),
            "date" => Some(TypeDescriptor::Primitive(PrimitiveKind::Date)),
            "Any" => Some(TypeDescriptor::Sentinel(Sentinel::Any)),
            "None" => Some(TypeDescriptor::Sentinel(Sentinel::Absent)),
            "Null" => Some(TypeDescriptor::Sentinel(Sentinel::Null)),
            "AnyRecord" => Some(TypeDescriptor::Sentinel(Sentinel::AnyRecord)),
            "dict" => Some(TypeDescriptor::OpenMap),
            _ => None,
        };
        if let Some(leaf) = leaf {
            if !term.args.is_empty() {
                return Err(syntax_error(format!("'{}' takes no parameters", term.name)));
            }
            return Ok(leaf);
        }

        let container = match term.name.as_str() {
            "list" => Some(ContainerKind::List),
            "set" => Some(ContainerKind::Set),
            "tuple" => Some(ContainerKind::Tuple),
            _ => None,
        };
        if let Some(container) = container {
            let mut args = Vec::with_capacity(term.args.len());
            for arg in &term.args {
                args.push(self.resolve(arg, source)?);
            }
            return Ok(TypeDescriptor::Generic { container, args });
        }

        match term.name.as_str() {
            "Optional" => {
                let [inner] = term.args.as_slice() else {
                    return Err(syntax_error("Optional takes exactly one parameter".to_string()));
                };
                Ok(TypeDescriptor::optional(self.resolve(inner, source)?))
            }
            "Union" => {
                if term.args.is_empty() {
                    return Err(syntax_error("Union needs at least one parameter".to_string()));
                }
                let mut alternatives = Vec::with_capacity(term.args.len());
                for arg in &term.args {
                    alternatives.push(self.resolve(arg, source)?);
                }
                Ok(TypeDescriptor::union(alternatives))
            }
            "record" => match term.args.as_slice() {
                [table] if table.terms.len() == 1 && table.terms[0].args.is_empty() => {
                    Ok(TypeDescriptor::RecordRef(table.terms[0].name.clone()))
                }
                _ => Err(syntax_error("record takes exactly one table name".to_string())),
            },
            name => {
                if !term.args.is_empty() {
                    return Err(syntax_error(format!("'{}' takes no parameters", name)));
                }
                if let Some(id) = self.catalog.lookup(name) {
                    Ok(TypeDescriptor::Composite(id))
                } else if let Some(e) = self.enums.get(name) {
                    Ok(TypeDescriptor::Enum(e.clone()))
                } else {
                    Ok(TypeDescriptor::Opaque(name.to_string()))
                }
            }
        }
    }
}
