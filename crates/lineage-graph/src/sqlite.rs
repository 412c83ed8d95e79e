//! SQLite graph backend

use crate::access::{is_readable, readable_properties};
use crate::batch::{check_batch, ElementLookup};
use crate::GraphError;
use lineage_domain::traits::GraphStore;
use lineage_domain::{
    Authorizations, Direction, Edge, ElementRef, Mutation, Property, Vertex, Visibility,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const VERTEX: &str = "vertex";
const EDGE: &str = "edge";

/// SQLite-based implementation of [`GraphStore`]
///
/// Each batch runs inside one transaction. Readers and writers share a
/// single connection behind a mutex.
pub struct SqliteGraph {
    conn: Mutex<Connection>,
}

impl SqliteGraph {
    /// Open (or create) a graph database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lineage_graph::SqliteGraph;
    ///
    /// let graph = SqliteGraph::new("lineage.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

struct SqliteLookup<'a>(&'a Connection);

impl ElementLookup for SqliteLookup<'_> {
    fn is_readable(
        &self,
        element: &ElementRef,
        authorizations: &Authorizations,
    ) -> Result<bool, GraphError> {
        let state = match element {
            ElementRef::Vertex(id) => vertex_state(self.0, id)?,
            ElementRef::Edge(id) => edge_row(self.0, id)?.map(|row| (row.visibility, row.deleted)),
        };
        let Some((visibility, deleted)) = state else {
            return Ok(false);
        };
        let hidden = hidden_marks(self.0, element.kind(), element.id())?;
        Ok(is_readable(&visibility, &hidden, deleted, authorizations))
    }
}

struct EdgeRow {
    label: String,
    out_vertex_id: String,
    in_vertex_id: String,
    visibility: Visibility,
    deleted: bool,
}

fn vertex_state(conn: &Connection, id: &str) -> Result<Option<(Visibility, bool)>, GraphError> {
    let row = conn
        .query_row(
            "SELECT visibility, deleted FROM vertices WHERE id = ?1",
            params![id],
            |row| {
                let visibility: String = row.get(0)?;
                let deleted: bool = row.get(1)?;
                Ok((Visibility::new(visibility), deleted))
            },
        )
        .optional()?;
    Ok(row)
}

fn edge_row(conn: &Connection, id: &str) -> Result<Option<EdgeRow>, GraphError> {
    let row = conn
        .query_row(
            "SELECT label, out_vertex_id, in_vertex_id, visibility, deleted FROM edges WHERE id = ?1",
            params![id],
            |row| {
                let visibility: String = row.get(3)?;
                Ok(EdgeRow {
                    label: row.get(0)?,
                    out_vertex_id: row.get(1)?,
                    in_vertex_id: row.get(2)?,
                    visibility: Visibility::new(visibility),
                    deleted: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

fn hidden_marks(conn: &Connection, kind: &str, id: &str) -> Result<Vec<Visibility>, GraphError> {
    let mut stmt = conn.prepare(
        "SELECT visibility FROM hidden WHERE element_kind = ?1 AND element_id = ?2",
    )?;
    let marks = stmt
        .query_map(params![kind, id], |row| row.get::<_, String>(0))?
        .map(|r| r.map(Visibility::new))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(marks)
}

fn load_properties(conn: &Connection, kind: &str, id: &str) -> Result<Vec<Property>, GraphError> {
    let mut stmt = conn.prepare(
        "SELECT key, name, value, visibility FROM properties
         WHERE element_kind = ?1 AND element_id = ?2 ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map(params![kind, id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(key, name, value, visibility)| -> Result<Property, GraphError> {
            Ok(Property {
                key,
                name,
                value: serde_json::from_str(&value)?,
                visibility: Visibility::new(visibility),
            })
        })
        .collect()
}

fn read_vertex(
    conn: &Connection,
    id: &str,
    authorizations: &Authorizations,
) -> Result<Option<Vertex>, GraphError> {
    let Some((visibility, deleted)) = vertex_state(conn, id)? else {
        return Ok(None);
    };
    let hidden = hidden_marks(conn, VERTEX, id)?;
    if !is_readable(&visibility, &hidden, deleted, authorizations) {
        return Ok(None);
    }
    let properties = load_properties(conn, VERTEX, id)?;
    Ok(Some(Vertex {
        id: id.to_string(),
        visibility,
        properties: readable_properties(&properties, authorizations),
    }))
}

fn read_edge(
    conn: &Connection,
    id: &str,
    authorizations: &Authorizations,
) -> Result<Option<Edge>, GraphError> {
    let Some(row) = edge_row(conn, id)? else {
        return Ok(None);
    };
    let hidden = hidden_marks(conn, EDGE, id)?;
    if !is_readable(&row.visibility, &hidden, row.deleted, authorizations) {
        return Ok(None);
    }
    let properties = load_properties(conn, EDGE, id)?;
    Ok(Some(Edge {
        id: id.to_string(),
        label: row.label,
        out_vertex_id: row.out_vertex_id,
        in_vertex_id: row.in_vertex_id,
        visibility: row.visibility,
        properties: readable_properties(&properties, authorizations),
    }))
}

fn upsert_property(
    conn: &Connection,
    kind: &str,
    id: &str,
    property: &Property,
) -> Result<(), GraphError> {
    conn.execute(
        "INSERT INTO properties (element_kind, element_id, key, name, value, visibility)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (element_kind, element_id, key, name)
         DO UPDATE SET value = excluded.value, visibility = excluded.visibility",
        params![
            kind,
            id,
            &property.key,
            &property.name,
            serde_json::to_string(&property.value)?,
            property.visibility.as_str(),
        ],
    )?;
    Ok(())
}

fn replace_properties(
    conn: &Connection,
    kind: &str,
    id: &str,
    properties: &[Property],
) -> Result<(), GraphError> {
    conn.execute(
        "DELETE FROM properties WHERE element_kind = ?1 AND element_id = ?2",
        params![kind, id],
    )?;
    properties
        .iter()
        .try_for_each(|property| upsert_property(conn, kind, id, property))
}

fn write(conn: &Connection, mutation: &Mutation) -> Result<(), GraphError> {
    match mutation {
        Mutation::PutVertex {
            id,
            visibility,
            properties,
        } => {
            conn.execute(
                "INSERT INTO vertices (id, visibility, deleted) VALUES (?1, ?2, 0)
                 ON CONFLICT (id) DO UPDATE SET visibility = excluded.visibility, deleted = 0",
                params![id, visibility.as_str()],
            )?;
            replace_properties(conn, VERTEX, id, properties)?;
        }
        Mutation::PutEdge {
            id,
            label,
            out_vertex_id,
            in_vertex_id,
            visibility,
            properties,
        } => {
            conn.execute(
                "INSERT INTO edges (id, label, out_vertex_id, in_vertex_id, visibility, deleted)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)
                 ON CONFLICT (id) DO UPDATE SET
                     label = excluded.label,
                     out_vertex_id = excluded.out_vertex_id,
                     in_vertex_id = excluded.in_vertex_id,
                     visibility = excluded.visibility,
                     deleted = 0",
                params![id, label, out_vertex_id, in_vertex_id, visibility.as_str()],
            )?;
            replace_properties(conn, EDGE, id, properties)?;
        }
        Mutation::AlterVisibility {
            element,
            visibility,
        } => {
            let sql = match element {
                ElementRef::Vertex(_) => "UPDATE vertices SET visibility = ?2 WHERE id = ?1",
                ElementRef::Edge(_) => "UPDATE edges SET visibility = ?2 WHERE id = ?1",
            };
            conn.execute(sql, params![element.id(), visibility.as_str()])?;
        }
        Mutation::AlterPropertyVisibility {
            element,
            key,
            name,
            visibility,
        } => {
            conn.execute(
                "UPDATE properties SET visibility = ?5
                 WHERE element_kind = ?1 AND element_id = ?2 AND key = ?3 AND name = ?4",
                params![element.kind(), element.id(), key, name, visibility.as_str()],
            )?;
        }
        Mutation::SetProperty { element, property } => {
            upsert_property(conn, element.kind(), element.id(), property)?;
        }
        Mutation::RemoveProperty { element, key, name } => {
            conn.execute(
                "DELETE FROM properties
                 WHERE element_kind = ?1 AND element_id = ?2 AND key = ?3 AND name = ?4",
                params![element.kind(), element.id(), key, name],
            )?;
        }
        Mutation::SoftDelete(element) => match element {
            ElementRef::Vertex(id) => {
                conn.execute("UPDATE vertices SET deleted = 1 WHERE id = ?1", params![id])?;
                conn.execute(
                    "UPDATE edges SET deleted = 1 WHERE out_vertex_id = ?1 OR in_vertex_id = ?1",
                    params![id],
                )?;
            }
            ElementRef::Edge(id) => {
                conn.execute("UPDATE edges SET deleted = 1 WHERE id = ?1", params![id])?;
            }
        },
        Mutation::MarkHidden {
            element,
            visibility,
        } => {
            conn.execute(
                "INSERT OR IGNORE INTO hidden (element_kind, element_id, visibility)
                 VALUES (?1, ?2, ?3)",
                params![element.kind(), element.id(), visibility.as_str()],
            )?;
        }
    }
    Ok(())
}

impl GraphStore for SqliteGraph {
    type Error = GraphError;

    fn get_vertex(
        &self,
        id: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<Vertex>, Self::Error> {
        let conn = self.conn.lock().map_err(|_| GraphError::LockPoisoned)?;
        read_vertex(&conn, id, authorizations)
    }

    fn get_edge(
        &self,
        id: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<Edge>, Self::Error> {
        let conn = self.conn.lock().map_err(|_| GraphError::LockPoisoned)?;
        read_edge(&conn, id, authorizations)
    }

    fn edges(
        &self,
        vertex_id: &str,
        direction: Direction,
        labels: &[&str],
        authorizations: &Authorizations,
    ) -> Result<Vec<Edge>, Self::Error> {
        let conn = self.conn.lock().map_err(|_| GraphError::LockPoisoned)?;
        if read_vertex(&conn, vertex_id, authorizations)?.is_none() {
            return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(
            "SELECT id FROM edges WHERE out_vertex_id = ?1 OR in_vertex_id = ?1 ORDER BY seq",
        )?;
        let ids = stmt
            .query_map(params![vertex_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut edges = Vec::new();
        for id in ids {
            let Some(edge) = read_edge(&conn, &id, authorizations)? else {
                continue;
            };
            if direction.matches(vertex_id, &edge)
                && (labels.is_empty() || labels.contains(&edge.label.as_str()))
            {
                edges.push(edge);
            }
        }
        Ok(edges)
    }

    fn apply(
        &self,
        mutations: &[Mutation],
        authorizations: &Authorizations,
    ) -> Result<(), Self::Error> {
        let mut conn = self.conn.lock().map_err(|_| GraphError::LockPoisoned)?;
        let tx = conn.transaction()?;
        check_batch(&SqliteLookup(&tx), mutations, authorizations)?;
        for mutation in mutations {
            write(&tx, mutation)?;
        }
        tx.commit()?;
        tracing::trace!("committed {} mutations", mutations.len());
        Ok(())
    }

    fn flush(&self) -> Result<(), Self::Error> {
        // Each batch commits its own transaction.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> SqliteGraph {
        SqliteGraph::new(":memory:").unwrap()
    }

    #[test]
    fn test_schema_initializes() {
        let graph = graph();
        assert!(graph
            .get_vertex("missing", &Authorizations::empty())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_property_values_round_trip_as_json() {
        let graph = graph();
        let auths = Authorizations::empty();
        graph
            .apply(
                &[Mutation::PutVertex {
                    id: "v".to_string(),
                    visibility: Visibility::empty(),
                    properties: vec![
                        Property::new("", "n", 42, Visibility::empty()),
                        Property::new("", "s", "text", Visibility::empty()),
                    ],
                }],
                &auths,
            )
            .unwrap();
        let vertex = graph.get_vertex("v", &auths).unwrap().unwrap();
        assert_eq!(vertex.properties[0].value.as_i64(), Some(42));
        assert_eq!(vertex.properties[1].value.as_str(), Some("text"));
    }

    #[test]
    fn test_rejected_batch_rolls_back() {
        let graph = graph();
        let auths = Authorizations::empty();
        let result = graph.apply(
            &[
                Mutation::PutVertex {
                    id: "v".to_string(),
                    visibility: Visibility::empty(),
                    properties: vec![],
                },
                Mutation::SoftDelete(ElementRef::Edge("nope".to_string())),
            ],
            &auths,
        );
        assert!(matches!(result, Err(GraphError::NotFound(_))));
        assert!(graph.get_vertex("v", &auths).unwrap().is_none());
    }
}
