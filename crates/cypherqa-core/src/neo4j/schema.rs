//! Schema introspection for Neo4j
//!
//! Reads the database catalog through the built-in `db.schema.*` procedures
//! and a relationship pattern scan, and renders the result as the text block
//! embedded in the Cypher generation prompt.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::error::{QaError, QaResult};
use crate::traits::GraphClient;
use crate::types::SchemaDescription;

pub const NODE_PROPERTIES_QUERY: &str = "\
CALL db.schema.nodeTypeProperties()
YIELD nodeLabels, propertyName, propertyTypes
RETURN nodeLabels, propertyName, propertyTypes";

pub const REL_PROPERTIES_QUERY: &str = "\
CALL db.schema.relTypeProperties()
YIELD relType, propertyName, propertyTypes
RETURN relType, propertyName, propertyTypes";

pub const RELATIONSHIPS_QUERY: &str = "\
MATCH (a)-[r]->(b)
UNWIND labels(a) AS startLabel
UNWIND labels(b) AS endLabel
RETURN DISTINCT startLabel, type(r) AS relType, endLabel";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PropertyDef {
    pub name: String,
    pub types: Vec<String>,
}

impl fmt::Display for PropertyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.types.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.types.join("|"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RelationshipPattern {
    pub start: String,
    pub rel_type: String,
    pub end: String,
}

impl fmt::Display for RelationshipPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(:{})-[:{}]->(:{})", self.start, self.rel_type, self.end)
    }
}

/// Structured view of the labels, relationship types and properties that
/// exist in a database.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSchema {
    pub node_props: BTreeMap<String, Vec<PropertyDef>>,
    pub rel_props: BTreeMap<String, Vec<PropertyDef>>,
    pub relationships: Vec<RelationshipPattern>,
}

impl GraphSchema {
    pub fn is_empty(&self) -> bool {
        self.node_props.is_empty() && self.rel_props.is_empty() && self.relationships.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.node_props.keys().map(String::as_str)
    }

    pub fn relationship_types(&self) -> BTreeSet<&str> {
        self.rel_props
            .keys()
            .map(String::as_str)
            .chain(self.relationships.iter().map(|r| r.rel_type.as_str()))
            .collect()
    }

    pub fn describe(&self) -> SchemaDescription {
        SchemaDescription::new(self.to_string())
    }

    fn add_property(map: &mut BTreeMap<String, Vec<PropertyDef>>, owner: &str, name: Option<&str>, types: Vec<String>) {
        let props = map.entry(owner.to_string()).or_default();
        if let Some(name) = name {
            if !props.iter().any(|p| p.name == name) {
                props.push(PropertyDef {
                    name: name.to_string(),
                    types,
                });
                props.sort();
            }
        }
    }
}

impl fmt::Display for GraphSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_props(f: &mut fmt::Formatter<'_>, owner: &str, props: &[PropertyDef]) -> fmt::Result {
            let rendered: Vec<String> = props.iter().map(ToString::to_string).collect();
            writeln!(f, "{} {{{}}}", owner, rendered.join(", "))
        }

        writeln!(f, "Node properties:")?;
        for (label, props) in &self.node_props {
            write_props(f, label, props)?;
        }
        writeln!(f, "Relationship properties:")?;
        for (rel_type, props) in &self.rel_props {
            write_props(f, rel_type, props)?;
        }
        write!(f, "The relationships:")?;
        for rel in &self.relationships {
            write!(f, "\n{}", rel)?;
        }
        Ok(())
    }
}

/// Reads the schema of the database behind a [`GraphClient`].
pub struct SchemaIntrospector<'a> {
    client: &'a dyn GraphClient,
}

impl<'a> SchemaIntrospector<'a> {
    pub fn new(client: &'a dyn GraphClient) -> Self {
        Self { client }
    }

    /// Textual schema for prompt embedding.
    pub async fn get_schema(&self) -> QaResult<SchemaDescription> {
        Ok(self.introspect().await?.describe())
    }

    pub async fn introspect(&self) -> QaResult<GraphSchema> {
        let mut schema = GraphSchema::default();

        for row in self.run(NODE_PROPERTIES_QUERY).await? {
            let labels = string_list(&row["nodeLabels"]);
            let name = row["propertyName"].as_str();
            let types = string_list(&row["propertyTypes"]);
            for label in labels {
                GraphSchema::add_property(&mut schema.node_props, &label, name, types.clone());
            }
        }

        for row in self.run(REL_PROPERTIES_QUERY).await? {
            let Some(rel_type) = row["relType"].as_str().map(clean_rel_type) else {
                continue;
            };
            let name = row["propertyName"].as_str();
            let types = string_list(&row["propertyTypes"]);
            GraphSchema::add_property(&mut schema.rel_props, &rel_type, name, types);
        }
        // Relationship types without properties carry nothing useful here.
        schema.rel_props.retain(|_, props| !props.is_empty());

        let mut patterns = BTreeSet::new();
        for row in self.run(RELATIONSHIPS_QUERY).await? {
            if let (Some(start), Some(rel_type), Some(end)) = (
                row["startLabel"].as_str(),
                row["relType"].as_str(),
                row["endLabel"].as_str(),
            ) {
                patterns.insert(RelationshipPattern {
                    start: start.to_string(),
                    rel_type: rel_type.to_string(),
                    end: end.to_string(),
                });
            }
        }
        schema.relationships = patterns.into_iter().collect();

        if schema.is_empty() {
            warn!("Database has no labels or relationships yet; generated queries will have nothing to match");
        }

        info!(
            "Introspected schema: {} labels, {} relationship patterns",
            schema.node_props.len(),
            schema.relationships.len()
        );
        Ok(schema)
    }

    async fn run(&self, cypher: &str) -> QaResult<Vec<Value>> {
        debug!("Schema query: {}", cypher);
        self.client
            .execute_cypher(cypher)
            .await
            .map_err(|e| QaError::Connection(format!("Schema introspection failed: {}", e)))
    }
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// `db.schema.relTypeProperties` reports types as ``:`ACTED_IN` ``.
fn clean_rel_type(raw: &str) -> String {
    raw.trim_start_matches(':').trim_matches('`').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;

    struct CatalogGraph;

    #[async_trait]
    impl GraphClient for CatalogGraph {
        async fn execute_cypher(&self, cypher: &str) -> Result<Vec<Value>> {
            if cypher == NODE_PROPERTIES_QUERY {
                return Ok(vec![
                    json!({"nodeLabels": ["Genre"], "propertyName": null, "propertyTypes": null}),
                    json!({"nodeLabels": ["Person", "Director"], "propertyName": "name", "propertyTypes": ["String"]}),
                    json!({"nodeLabels": ["Movie"], "propertyName": "title", "propertyTypes": ["String"]}),
                ]);
            }
            if cypher == REL_PROPERTIES_QUERY {
                return Ok(vec![
                    json!({"relType": ":`DIRECTED`", "propertyName": null, "propertyTypes": null}),
                    json!({"relType": ":`ACTED_IN`", "propertyName": "role", "propertyTypes": ["String"]}),
                ]);
            }
            Ok(vec![
                json!({"startLabel": "Person", "relType": "DIRECTED", "endLabel": "Movie"}),
                json!({"startLabel": "Director", "relType": "DIRECTED", "endLabel": "Movie"}),
                json!({"startLabel": "Movie", "relType": "IN_GENRE", "endLabel": "Genre"}),
            ])
        }
    }

    #[tokio::test]
    async fn multi_label_and_propertyless_nodes_are_listed() {
        let schema = SchemaIntrospector::new(&CatalogGraph).introspect().await.unwrap();

        assert_eq!(schema.labels().collect::<Vec<_>>(), ["Director", "Genre", "Movie", "Person"]);
        assert_eq!(
            schema.relationship_types().into_iter().collect::<Vec<_>>(),
            ["ACTED_IN", "DIRECTED", "IN_GENRE"]
        );
        assert_eq!(
            schema.to_string(),
            "Node properties:\n\
             Director {name: String}\n\
             Genre {}\n\
             Movie {title: String}\n\
             Person {name: String}\n\
             Relationship properties:\n\
             ACTED_IN {role: String}\n\
             The relationships:\n\
             (:Director)-[:DIRECTED]->(:Movie)\n\
             (:Movie)-[:IN_GENRE]->(:Genre)\n\
             (:Person)-[:DIRECTED]->(:Movie)"
        );
    }

    #[test]
    fn clean_rel_type_strips_prefix_and_backticks() {
        assert_eq!(clean_rel_type(":`ACTED_IN`"), "ACTED_IN");
        assert_eq!(clean_rel_type("LOCATED_AT"), "LOCATED_AT");
    }

    #[test]
    fn empty_schema_renders_headers_only() {
        let text = GraphSchema::default().to_string();
        assert_eq!(text, "Node properties:\nRelationship properties:\nThe relationships:");
    }

    #[test]
    fn schema_renders_sorted_entries() {
        let mut schema = GraphSchema::default();
        GraphSchema::add_property(&mut schema.node_props, "Manager", Some("managerName"), vec!["String".into()]);
        GraphSchema::add_property(&mut schema.node_props, "Address", Some("city"), vec!["String".into()]);
        GraphSchema::add_property(&mut schema.node_props, "Address", Some("city"), vec!["String".into()]);
        schema.relationships.push(RelationshipPattern {
            start: "Manager".into(),
            rel_type: "LOCATED_AT".into(),
            end: "Address".into(),
        });

        assert_eq!(
            schema.to_string(),
            "Node properties:\n\
             Address {city: String}\n\
             Manager {managerName: String}\n\
             Relationship properties:\n\
             The relationships:\n\
             (:Manager)-[:LOCATED_AT]->(:Address)"
        );
    }
}
