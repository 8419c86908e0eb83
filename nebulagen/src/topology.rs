//! Generic topology pipeline.
//!
//! Nodes and links arrive as one Vitrage-style `{nodes, links}` document.
//! Each node type's schema is inferred from the first node of that type;
//! links address nodes by `graph_index`, resolved through an index-keyed
//! [`IdentifierRegistry`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::batch::{EmissionBatch, OutputUnit};
use crate::config::SpaceConfig;
use crate::emit::Diagnostics;
use crate::errors::{GraphGenError, Result};
use crate::registry::{IdentifierRegistry, vertex_id};
use crate::render;
use crate::schema::{PropertyDef, TypeSchema, Value};

const VID_COLUMN: &str = "vid";
const SRC_COLUMN: &str = "src";
const DST_COLUMN: &str = "dst";
const EDGE_SOURCE_SYSTEM: &str = "vitrage";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyDocument {
    #[serde(default)]
    pub nodes: Vec<TopologyNode>,
    #[serde(default)]
    pub links: Vec<TopologyLink>,
}

impl TopologyDocument {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyNode {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub vitrage_type: String,
    #[serde(default)]
    pub state: Option<String>,
    pub graph_index: u64,
    /// Every other attribute of the node, keyed and ordered by name.
    #[serde(flatten)]
    pub attributes: JsonMap<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyLink {
    pub source: u64,
    pub target: u64,
    pub relationship_type: String,
}

/// Type-specific node attributes, chosen by the node's `vitrage_type`.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDetails {
    Port {
        ip_addresses: Value,
    },
    Instance {
        instance_name: Value,
    },
    Volume {
        volume_type: Value,
        attachments: Value,
    },
    /// Unrecognised types keep all of their scalar-rendered attributes.
    Generic(Vec<(String, Value)>),
}

impl NodeDetails {
    /// Fails with `SchemaMismatch` when a known type lacks one of its detail keys.
    /// A key that is present with a JSON `null` is kept as `NULL`.
    pub fn from_node(node: &TopologyNode) -> Result<Self> {
        let attr = |key: &str| -> Result<Value> {
            node.attributes.get(key).map(json_to_value).ok_or_else(|| {
                GraphGenError::schema_mismatch(
                    &node.vitrage_type,
                    format!("record '{}' lacks key '{}'", node.id, key),
                )
            })
        };
        let details = match node.vitrage_type.as_str() {
            "neutron.port" => NodeDetails::Port {
                ip_addresses: attr("ip_addresses")?,
            },
            "nova.instance" => NodeDetails::Instance {
                instance_name: attr("instance_name")?,
            },
            "cinder.volume" => NodeDetails::Volume {
                volume_type: attr("volume_type")?,
                attachments: attr("attachments")?,
            },
            _ => NodeDetails::Generic(
                node.attributes
                    .iter()
                    .map(|(key, value)| (key.clone(), json_to_value(value)))
                    .collect(),
            ),
        };
        Ok(details)
    }

    fn into_fields(self) -> Vec<(String, Value)> {
        match self {
            NodeDetails::Port { ip_addresses } => vec![("ip_addresses".to_string(), ip_addresses)],
            NodeDetails::Instance { instance_name } => {
                vec![("instance_name".to_string(), instance_name)]
            }
            NodeDetails::Volume {
                volume_type,
                attachments,
            } => vec![
                ("volume_type".to_string(), volume_type),
                ("attachments".to_string(), attachments),
            ],
            NodeDetails::Generic(fields) => fields,
        }
    }
}

fn json_to_value(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::String(s) => Value::Str(s.clone()),
        other => Value::Str(other.to_string()),
    }
}

/// One flattened record: the key used for the vertex or edge, then named columns.
#[derive(Debug, Clone)]
struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    fn columns(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    fn cells(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .map(|column| self.get(column).map(Value::as_cell).unwrap_or_default())
            .collect()
    }
}

/// Rows sharing a type tag, with the column set of the first row.
#[derive(Debug)]
struct TypeGroup {
    tag: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TypeGroup {
    fn new(tag: String, first: Row) -> Self {
        Self {
            tag,
            columns: first.columns(),
            rows: vec![first],
        }
    }

    /// Appends a row, failing if its column set differs from the first row's.
    fn push(&mut self, row: Row) -> Result<()> {
        let row_columns = row.columns();
        if let Some(missing) = self.columns.iter().find(|c| !row_columns.contains(c)) {
            return Err(GraphGenError::schema_mismatch(
                &self.tag,
                format!("record lacks key '{}' present in the first record", missing),
            ));
        }
        if let Some(extra) = row_columns.iter().find(|c| !self.columns.contains(c)) {
            return Err(GraphGenError::schema_mismatch(
                &self.tag,
                format!("record has key '{}' absent from the first record", extra),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Inferred schema: every column except the key columns, as nullable strings.
    fn schema(&self, build: fn(String, Vec<PropertyDef>) -> TypeSchema, keys: &[&str]) -> TypeSchema {
        let properties = self
            .columns
            .iter()
            .filter(|column| !keys.contains(&column.as_str()))
            .map(|column| PropertyDef::string(column.as_str()).nullable())
            .collect();
        build(type_name(&self.tag), properties)
    }

    fn values(&self, row: &Row, schema: &TypeSchema) -> Vec<Value> {
        schema
            .property_names()
            .map(|name| row.get(name).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// Groups rows by tag in first-seen order.
#[derive(Debug, Default)]
struct Grouped {
    groups: Vec<TypeGroup>,
    positions: HashMap<String, usize>,
}

impl Grouped {
    fn insert(&mut self, tag: &str, row: Row) -> Result<()> {
        match self.positions.get(tag) {
            Some(&pos) => self.groups[pos].push(row),
            None => {
                self.positions.insert(tag.to_string(), self.groups.len());
                self.groups.push(TypeGroup::new(tag.to_string(), row));
                Ok(())
            }
        }
    }
}

/// nGQL type name for a Vitrage type tag.
pub fn type_name(tag: &str) -> String {
    tag.replace('.', "_")
}

fn tag_schema(name: String, properties: Vec<PropertyDef>) -> TypeSchema {
    TypeSchema::tag(name, properties)
}

fn edge_schema(name: String, properties: Vec<PropertyDef>) -> TypeSchema {
    TypeSchema::edge(name, properties)
}

/// Renders a whole topology document into per-type vertex and edge batches,
/// their CSV twins, and one consolidated schema batch.
pub struct TopologyEmitter<'a> {
    document: &'a TopologyDocument,
    space: &'a SpaceConfig,
}

impl<'a> TopologyEmitter<'a> {
    pub fn new(document: &'a TopologyDocument, space: &'a SpaceConfig) -> Self {
        Self { document, space }
    }

    pub fn emit(&self, diagnostics: &mut Diagnostics) -> Result<Vec<EmissionBatch>> {
        let mut index_registry: IdentifierRegistry<u64> = IdentifierRegistry::new();
        let mut node_groups = Grouped::default();

        for node in &self.document.nodes {
            let vid = vertex_id(node.name.as_deref(), &node.id);
            index_registry.register(node.graph_index, vid.as_str());

            let mut fields = vec![
                (VID_COLUMN.to_string(), Value::Str(vid.clone())),
                ("name".to_string(), Value::Str(vid)),
                ("state".to_string(), Value::from(node.state.as_deref())),
                ("uuid".to_string(), Value::from(node.id.as_str())),
                (
                    "graph_index".to_string(),
                    Value::Str(node.graph_index.to_string()),
                ),
            ];
            fields.extend(NodeDetails::from_node(node)?.into_fields());
            node_groups.insert(&node.vitrage_type, Row { fields })?;
        }

        let mut edge_groups = Grouped::default();
        for link in &self.document.links {
            let unit = edge_unit_name(&link.relationship_type);
            let src = index_registry.lookup(&link.source);
            let dst = index_registry.lookup(&link.target);
            let (src, dst) = match (src, dst) {
                (Some(src), Some(dst)) => (src, dst),
                (None, anchor) => {
                    diagnostics.record_unresolved(&unit, anchor, link.source.to_string());
                    continue;
                }
                (anchor, None) => {
                    diagnostics.record_unresolved(&unit, anchor, link.target.to_string());
                    continue;
                }
            };
            let fields = vec![
                (SRC_COLUMN.to_string(), Value::from(src)),
                (DST_COLUMN.to_string(), Value::from(dst)),
                (
                    "edge_type".to_string(),
                    Value::from(link.relationship_type.as_str()),
                ),
            ];
            edge_groups.insert(&link.relationship_type, Row { fields })?;
        }

        let mut batches = Vec::new();
        let mut declarations = render::declare_space(self.space)?.to_vec();

        for group in &node_groups.groups {
            let schema = group.schema(tag_schema, &[VID_COLUMN]);
            let unit = OutputUnit::vertices(group.tag.as_str());
            batches.push(table_batch(unit.as_csv(), group));

            let mut statements = Vec::with_capacity(group.rows.len());
            for row in &group.rows {
                let vid = row.get(VID_COLUMN).map(Value::as_cell).unwrap_or_default();
                statements.push(render::insert_vertex(
                    &schema,
                    &vid,
                    &group.values(row, &schema),
                )?);
            }
            batches.push(EmissionBatch::statements(unit, statements));
            declarations.push(render::declare(&schema)?);
        }

        for group in &edge_groups.groups {
            let schema = group.schema(edge_schema, &[SRC_COLUMN, DST_COLUMN]);
            let unit = OutputUnit::edges(edge_unit_name(&group.tag));
            batches.push(table_batch(unit.as_csv(), group));

            let mut statements = Vec::with_capacity(group.rows.len());
            for row in &group.rows {
                let src = row.get(SRC_COLUMN).map(Value::as_cell).unwrap_or_default();
                let dst = row.get(DST_COLUMN).map(Value::as_cell).unwrap_or_default();
                statements.push(render::insert_edge(
                    &schema,
                    &src,
                    &dst,
                    &group.values(row, &schema),
                )?);
            }
            batches.push(EmissionBatch::statements(unit, statements));
            declarations.push(render::declare(&schema)?);
        }

        log::info!(
            "Topology rendered: {} node types, {} edge types, {} nodes indexed",
            node_groups.groups.len(),
            edge_groups.groups.len(),
            index_registry.len()
        );

        batches.push(EmissionBatch::statements(OutputUnit::schema(), declarations));
        Ok(batches)
    }
}

fn edge_unit_name(relationship_type: &str) -> String {
    format!("{}.{}", EDGE_SOURCE_SYSTEM, relationship_type)
}

fn table_batch(unit: OutputUnit, group: &TypeGroup) -> EmissionBatch {
    let rows = group
        .rows
        .iter()
        .map(|row| row.cells(&group.columns))
        .collect();
    EmissionBatch::table(unit, group.columns.clone(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: JsonValue) -> TopologyDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn known_types_pick_their_detail_shape() {
        let doc = document(json!({
            "nodes": [{
                "id": "p1",
                "vitrage_type": "neutron.port",
                "state": "ACTIVE",
                "graph_index": 0,
                "ip_addresses": ["10.0.0.5"],
                "vitrage_category": "RESOURCE"
            }]
        }));
        let details = NodeDetails::from_node(&doc.nodes[0]).unwrap();
        assert_eq!(
            details,
            NodeDetails::Port {
                ip_addresses: Value::Str("[\"10.0.0.5\"]".to_string())
            }
        );
    }

    #[test]
    fn unknown_types_keep_all_attributes() {
        let doc = document(json!({
            "nodes": [{
                "id": "h1",
                "vitrage_type": "nova.host",
                "graph_index": 3,
                "zone": "nova",
                "is_deleted": false
            }]
        }));
        let details = NodeDetails::from_node(&doc.nodes[0]).unwrap();
        assert_eq!(
            details,
            NodeDetails::Generic(vec![
                ("is_deleted".to_string(), Value::Str("false".to_string())),
                ("zone".to_string(), Value::Str("nova".to_string())),
            ])
        );
    }

    #[test]
    fn heterogeneous_group_fails_fast() {
        let doc = document(json!({
            "nodes": [
                {"id": "h1", "vitrage_type": "nova.host", "graph_index": 0, "zone": "a"},
                {"id": "h2", "vitrage_type": "nova.host", "graph_index": 1}
            ]
        }));
        let space = SpaceConfig::default();
        let err = TopologyEmitter::new(&doc, &space)
            .emit(&mut Diagnostics::default())
            .unwrap_err();
        match err {
            GraphGenError::SchemaMismatch { type_name, detail } => {
                assert_eq!(type_name, "nova.host");
                assert!(detail.contains("'zone'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn known_type_missing_detail_key_fails_fast() {
        let doc = document(json!({
            "nodes": [
                {"id": "i1", "name": "vm-1", "vitrage_type": "nova.instance", "state": "ACTIVE",
                 "graph_index": 0, "instance_name": "instance-00000001"},
                {"id": "i2", "name": "vm-2", "vitrage_type": "nova.instance", "state": "ACTIVE",
                 "graph_index": 1}
            ]
        }));
        let space = SpaceConfig::default();
        let err = TopologyEmitter::new(&doc, &space)
            .emit(&mut Diagnostics::default())
            .unwrap_err();
        match err {
            GraphGenError::SchemaMismatch { type_name, detail } => {
                assert_eq!(type_name, "nova.instance");
                assert!(detail.contains("'instance_name'"));
                assert!(detail.contains("'i2'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn explicit_null_detail_is_kept() {
        let doc = document(json!({
            "nodes": [{"id": "vol1", "vitrage_type": "cinder.volume", "graph_index": 0,
                       "volume_type": null, "attachments": []}]
        }));
        let details = NodeDetails::from_node(&doc.nodes[0]).unwrap();
        assert_eq!(
            details,
            NodeDetails::Volume {
                volume_type: Value::Null,
                attachments: Value::Str("[]".to_string()),
            }
        );
    }

    #[test]
    fn dangling_link_is_skipped() {
        let doc = document(json!({
            "nodes": [{"id": "h1", "name": "compute-0", "vitrage_type": "nova.host", "graph_index": 0}],
            "links": [{"source": 0, "target": 9, "relationship_type": "contains"}]
        }));
        let space = SpaceConfig::default();
        let mut diagnostics = Diagnostics::default();
        let batches = TopologyEmitter::new(&doc, &space)
            .emit(&mut diagnostics)
            .unwrap();

        assert_eq!(diagnostics.unresolved.len(), 1);
        assert_eq!(diagnostics.unresolved[0].missing_key, "9");
        assert_eq!(diagnostics.unresolved[0].anchor.as_deref(), Some("compute-0"));
        assert!(batches.iter().all(|b| b.unit.name != "vitrage.contains"));
    }

    #[test]
    fn type_names_replace_dots() {
        assert_eq!(type_name("nova.instance"), "nova_instance");
    }
}
