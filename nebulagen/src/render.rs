//! nGQL statement rendering.
//!
//! Every data statement is rendered against an explicit [`TypeSchema`]; the
//! value tuple is checked for length and kind before any text is produced, so
//! a stale schema surfaces as [`GraphGenError::SchemaMismatch`] instead of a
//! silently shifted column.

use crate::config::SpaceConfig;
use crate::errors::{GraphGenError, Result};
use crate::schema::{SchemaCategory, TypeSchema, Value};

const QUOTE: char = '"';

/// `CREATE TAG IF NOT EXISTS` / `CREATE EDGE IF NOT EXISTS` for the schema.
pub fn declare(schema: &TypeSchema) -> Result<String> {
    let props = schema
        .properties
        .iter()
        .map(|prop| {
            let mut decl = format!("{} {}", ident(&prop.name)?, prop.kind);
            if prop.nullable {
                decl.push_str(" NULL");
            }
            Ok(decl)
        })
        .collect::<Result<Vec<_>>>()?
        .join(", ");
    Ok(format!(
        "CREATE {} IF NOT EXISTS {}({});",
        schema.category.keyword(),
        ident(&schema.name)?,
        props
    ))
}

/// `CREATE SPACE IF NOT EXISTS ...;` followed by `USE ...;`.
pub fn declare_space(space: &SpaceConfig) -> Result<[String; 2]> {
    let name = ident(&space.name)?;
    Ok([
        format!(
            "CREATE SPACE IF NOT EXISTS {}(partition_num={}, replica_factor={}, vid_type=fixed_string({}));",
            name, space.partition_num, space.replica_factor, space.vid_length
        ),
        format!("USE {};", name),
    ])
}

pub fn insert_vertex(schema: &TypeSchema, vid: &str, values: &[Value]) -> Result<String> {
    expect_category(schema, SchemaCategory::Tag)?;
    let values = render_values(schema, values)?;
    Ok(format!(
        "INSERT VERTEX {}({}) VALUES {}:({});",
        ident(&schema.name)?,
        property_list(schema)?,
        quote(vid),
        values
    ))
}

pub fn insert_edge(schema: &TypeSchema, src: &str, dst: &str, values: &[Value]) -> Result<String> {
    expect_category(schema, SchemaCategory::Edge)?;
    let values = render_values(schema, values)?;
    Ok(format!(
        "INSERT EDGE {}({}) VALUES {} -> {}:({});",
        ident(&schema.name)?,
        property_list(schema)?,
        quote(src),
        quote(dst),
        values
    ))
}

fn expect_category(schema: &TypeSchema, category: SchemaCategory) -> Result<()> {
    if schema.category != category {
        return Err(GraphGenError::schema_mismatch(
            &schema.name,
            format!(
                "declared as {} but rendered as {}",
                schema.category.keyword(),
                category.keyword()
            ),
        ));
    }
    Ok(())
}

fn property_list(schema: &TypeSchema) -> Result<String> {
    Ok(schema
        .property_names()
        .map(ident)
        .collect::<Result<Vec<_>>>()?
        .join(", "))
}

fn render_values(schema: &TypeSchema, values: &[Value]) -> Result<String> {
    if values.len() != schema.len() {
        return Err(GraphGenError::schema_mismatch(
            &schema.name,
            format!(
                "expected {} values, got {}",
                schema.len(),
                values.len()
            ),
        ));
    }

    let mut rendered = Vec::with_capacity(values.len());
    for (prop, value) in schema.properties.iter().zip(values) {
        match value.kind() {
            Some(kind) if kind != prop.kind => {
                return Err(GraphGenError::schema_mismatch(
                    &schema.name,
                    format!("property '{}' is {} but got {:?}", prop.name, prop.kind, value),
                ));
            }
            None if !prop.nullable => {
                return Err(GraphGenError::schema_mismatch(
                    &schema.name,
                    format!("property '{}' is not nullable", prop.name),
                ));
            }
            _ => {}
        }
        rendered.push(literal(value));
    }
    Ok(rendered.join(", "))
}

fn literal(value: &Value) -> String {
    match value {
        Value::Str(s) => quote(s),
        Value::Int(i) => i.to_string(),
        Value::Null => "NULL".to_string(),
    }
}

/// Wraps `raw` in double quotes, escaping backslashes, quotes and line breaks.
pub fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push(QUOTE);
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push(QUOTE);
    out
}

/// Bare identifier when it is a plain word, backtick-quoted otherwise.
///
/// Names that are empty or contain a backtick cannot be quoted and are rejected.
pub fn ident(name: &str) -> Result<String> {
    if name.is_empty() || name.contains('`') {
        return Err(GraphGenError::InvalidArg(format!(
            "'{}' cannot be used as an identifier",
            name
        )));
    }
    let mut chars = name.chars();
    let plain = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if plain {
        Ok(name.to_string())
    } else {
        Ok(format!("`{}`", name))
    }
}
