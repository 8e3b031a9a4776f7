//! `DEFINE FIELD` rendering.

use tracing::trace;

use crate::diagnostic::SchemaError;
use crate::ir::CompositeId;
use crate::schema::{Definition, IdentityCache, MetaType, SchemaField, TargetType};

/// Renders schema trees of one table into `DEFINE FIELD` statements.
///
/// Nested object members are rendered after the line of the field that holds
/// them, with the field's absolute path as prefix. A composite that is already
/// being expanded higher up renders its own field line only, which bounds the
/// output for self-referencing objects.
pub struct SdlEmitter<'a> {
    cache: &'a IdentityCache,
    table: &'a str,
    stack: Vec<CompositeId>,
}

impl<'a> SdlEmitter<'a> {
    pub fn new(cache: &'a IdentityCache, table: &'a str) -> Self {
        Self {
            cache,
            table,
            stack: Vec::new(),
        }
    }

    /// Renders every field of a cached composite.
    pub fn render_schema(&mut self, id: CompositeId) -> Result<String, SchemaError> {
        let mut lines = Vec::new();
        self.schema_lines(id, "", &mut lines)?;
        Ok(lines.join("\n"))
    }

    /// Renders a single top-level field and its nested definitions.
    pub fn render_field(&mut self, field: &SchemaField) -> Result<String, SchemaError> {
        let mut lines = Vec::new();
        self.field_lines(field, "", &mut lines)?;
        Ok(lines.join("\n"))
    }

    fn schema_lines(&mut self, id: CompositeId, prefix: &str, out: &mut Vec<String>) -> Result<(), SchemaError> {
        if self.stack.contains(&id) {
            trace!(table = %self.table, prefix, "recursive object, members not expanded");
            return Ok(());
        }
        let cache = self.cache;
        let schema = cache.get(id)?;

        self.stack.push(id);
        for field in &schema.fields {
            self.field_lines(field, prefix, out)?;
        }
        self.stack.pop();
        Ok(())
    }

    fn field_lines(&mut self, field: &SchemaField, prefix: &str, out: &mut Vec<String>) -> Result<(), SchemaError> {
        let path = join_path(prefix, &field.path);

        let mut line = format!("DEFINE FIELD {} ON TABLE {} ", path, self.table);
        if field.is_flexible() {
            line.push_str("FLEXIBLE ");
        }
        line.push_str("TYPE ");
        line.push_str(&type_expression(field)?);

        let assertions: Vec<String> = field.branches.iter().filter_map(MetaType::enum_assertion).collect();
        if !assertions.is_empty() {
            line.push_str(&format!(" ASSERT ({})", assertions.join(" OR ")));
        }
        if let Some(permissions) = &field.permissions {
            line.push('\n');
            line.push_str(&permissions.to_sdl());
        }
        line.push(';');
        out.push(line);

        self.definition_lines(field, &path, out)
    }

    /// Member lines of object definitions, including objects inside containers.
    fn definition_lines(&mut self, field: &SchemaField, path: &str, out: &mut Vec<String>) -> Result<(), SchemaError> {
        for (_, definition) in field.iter() {
            match definition {
                Some(Definition::Schema(id)) => self.schema_lines(*id, path, out)?,
                Some(Definition::Element(element)) => {
                    self.definition_lines(element, &format!("{}.*", path), out)?
                }
                None => {}
            }
        }
        Ok(())
    }
}

/// Builds the `TYPE` expression of a field.
///
/// Value branches are joined with `|`; an optional field wraps the result
/// once in `option<...>`. Containers inline their element expression.
pub fn type_expression(field: &SchemaField) -> Result<String, SchemaError> {
    let mut atoms = Vec::with_capacity(field.branches.len());
    for (branch, definition) in field.iter() {
        let atom = match branch.tag {
            TargetType::Optional => continue,
            TargetType::Record => match &branch.record_link {
                Some(table) => format!("record<{}>", table),
                None => TargetType::AnyRecord.keyword().to_string(),
            },
            tag if tag.is_container() => match definition {
                Some(Definition::Element(element)) => {
                    format!("{}<{}>", tag.keyword(), type_expression(element)?)
                }
                _ => tag.keyword().to_string(),
            },
            tag => tag.keyword().to_string(),
        };
        atoms.push(atom);
    }

    if atoms.is_empty() {
        return Err(SchemaError::NoValueType {
            path: field.path.clone(),
        });
    }
    let joined = atoms.join("|");
    if field.is_optional() {
        Ok(format!("{}<{}>", TargetType::Optional.keyword(), joined))
    } else {
        Ok(joined)
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{}.{}", prefix, path)
    }
}
