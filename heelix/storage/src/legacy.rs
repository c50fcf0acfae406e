//! The legacy monolithic graph file.
//!
//! # Layout
//!
//! ```text
//! [type tag:text][entities:int]
//! ([id:int][score:int][label:text]([lat:float32][lng:float32] if place)) * entities
//! [docs:int]     ([doc:int][n:int32][entity:int] * n) * docs
//! [entities:int] ([entity:int][n:int32][doc:int] * n) * entities
//! ```
//!
//! Unlike the migrated link graph, the document section may contain records
//! with zero related entities, and entity ids may repeat within a record.

use std::io::{Read, Write};

use crate::codec::{StreamReader, StreamWriter};
use crate::error::CodecResult;
use crate::graph::{read_doc_section, read_entity_section, write_doc_section, write_entity_section};
use crate::model::{DocLinks, EntityCategory, EntityLinks};

/// One entity record of a legacy graph.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyEntity {
    pub id: i64,
    pub score: i64,
    pub label: String,
    /// `(lat, lng)`, present only for place entities.
    pub coords: Option<(f32, f32)>,
}

impl LegacyEntity {
    pub fn new(id: i64, score: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            score,
            label: label.into(),
            coords: None,
        }
    }

    pub fn with_coords(mut self, lat: f32, lng: f32) -> Self {
        self.coords = Some((lat, lng));
        self
    }
}

/// A fully decoded legacy graph file.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyGraph {
    pub category: EntityCategory,
    /// Persisted entity type name, e.g. `synthos_svr.Place`.
    pub type_tag: String,
    pub entities: Vec<LegacyEntity>,
    pub documents: Vec<DocLinks>,
    pub entity_links: Vec<EntityLinks>,
}

impl LegacyGraph {
    pub fn new(category: EntityCategory) -> Self {
        let type_name = match category {
            EntityCategory::Person => "Person",
            EntityCategory::Org => "Org",
            EntityCategory::Place => "Place",
        };
        Self {
            category,
            type_tag: format!("synthos_svr.{type_name}"),
            entities: Vec::new(),
            documents: Vec::new(),
            entity_links: Vec::new(),
        }
    }

    pub fn read_from<R: Read>(
        input: &mut StreamReader<R>,
        category: EntityCategory,
    ) -> CodecResult<Self> {
        let type_tag = input.get_string()?;
        let count = input.get_count("entity count")?;
        let mut entities = Vec::new();
        for _ in 0..count {
            let id = input.get_int()?;
            let score = input.get_int()?;
            let label = input.get_string()?;
            let coords = if category.has_geo_coords() {
                Some((input.get_float32()?, input.get_float32()?))
            } else {
                None
            };
            entities.push(LegacyEntity {
                id,
                score,
                label,
                coords,
            });
        }
        let documents = read_doc_section(input)?;
        let entity_links = read_entity_section(input)?;

        Ok(Self {
            category,
            type_tag,
            entities,
            documents,
            entity_links,
        })
    }

    /// Encodes the graph in the legacy layout.
    ///
    /// Place entities without coordinates are written at `(0.0, 0.0)`;
    /// coordinates on other categories are not written.
    pub fn write_to<W: Write>(&self, out: &mut StreamWriter<W>) -> CodecResult<()> {
        out.put_string(&self.type_tag)?;
        out.put_count(self.entities.len(), "entity count")?;
        for entity in &self.entities {
            out.put_int(entity.id)?;
            out.put_int(entity.score)?;
            out.put_string(&entity.label)?;
            if self.category.has_geo_coords() {
                let (lat, lng) = entity.coords.unwrap_or((0.0, 0.0));
                out.put_float32(lat)?;
                out.put_float32(lng)?;
            }
        }
        write_doc_section(out, &self.documents)?;
        write_entity_section(out, &self.entity_links)
    }

    pub fn to_bytes(&self) -> CodecResult<Vec<u8>> {
        let mut out = StreamWriter::new(Vec::new());
        self.write_to(&mut out)?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::CodecError;

    fn place_graph() -> LegacyGraph {
        let mut graph = LegacyGraph::new(EntityCategory::Place);
        graph.entities = vec![
            LegacyEntity::new(1, 9, "Paris").with_coords(48.8, 2.3),
            LegacyEntity::new(2, 3, "Lyon").with_coords(45.7, 4.8),
        ];
        graph.documents = vec![DocLinks {
            doc_id: 100,
            entity_ids: vec![1, 1, 2],
        }];
        graph.entity_links = vec![
            EntityLinks {
                entity_id: 1,
                doc_ids: vec![100],
            },
            EntityLinks {
                entity_id: 2,
                doc_ids: vec![100],
            },
        ];
        graph
    }

    #[test]
    fn test_place_graph_decodes_what_was_encoded() {
        let graph = place_graph();
        let bytes = graph.to_bytes().unwrap();
        let mut input = StreamReader::new(Cursor::new(bytes));
        let decoded = LegacyGraph::read_from(&mut input, EntityCategory::Place).unwrap();
        assert_eq!(decoded, graph);
    }

    #[test]
    fn test_person_records_have_no_coords() {
        let mut graph = LegacyGraph::new(EntityCategory::Person);
        graph.entities = vec![LegacyEntity::new(4, 1, "Ada").with_coords(1.0, 1.0)];
        let with_coords = graph.to_bytes().unwrap();
        graph.entities[0].coords = None;
        assert_eq!(graph.to_bytes().unwrap(), with_coords);
    }

    #[test]
    fn test_declared_count_exceeds_records() {
        let graph = place_graph();
        let mut bytes = graph.to_bytes().unwrap();
        // Drop the entity section and the last document id.
        bytes.truncate(bytes.len() - (8 + 2 * (8 + 4 + 8)) - 4);

        let mut input = StreamReader::new(Cursor::new(bytes));
        let result = LegacyGraph::read_from(&mut input, EntityCategory::Place);
        assert!(matches!(result, Err(CodecError::Truncated { .. })));
    }
}
