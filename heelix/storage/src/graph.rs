//! Migrated entity files, as read by the analytics engine at startup.
//!
//! # File Layouts
//!
//! ```text
//! <category>Info.dat   [count:int] ([id:int][label:text]) * count
//! geoCoords.dat        [count:int] ([id:int][lat:float32][lng:float32]) * count
//! <category>Graph.dat  [docs:int]     ([doc:int][n:int32][entity:int] * n) * docs
//!                      [entities:int] ([entity:int][n:int32][doc:int] * n) * entities
//! ```
//!
//! The document section of a migrated link graph is sparse: documents without
//! related entities are absent and must be read as having none.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crate::codec::{StreamReader, StreamWriter};
use crate::error::{CodecResult, MigrationError, MigrationResult};
use crate::model::{DocLinks, EntityLabel, EntityLinks, GeoCoord};

fn open<P: AsRef<Path>>(path: P) -> MigrationResult<BufReader<File>> {
    let path = path.as_ref();
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| MigrationError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads a document-to-entity section.
pub fn read_doc_section<R: Read>(input: &mut StreamReader<R>) -> CodecResult<Vec<DocLinks>> {
    let count = input.get_count("document count")?;
    let mut docs = Vec::new();
    for _ in 0..count {
        let doc_id = input.get_int()?;
        let related = input.get_count32("related entity count")?;
        let entity_ids = (0..related)
            .map(|_| input.get_int())
            .collect::<CodecResult<Vec<_>>>()?;
        docs.push(DocLinks { doc_id, entity_ids });
    }
    Ok(docs)
}

/// Writes a document-to-entity section.
pub fn write_doc_section<W: Write>(
    out: &mut StreamWriter<W>,
    docs: &[DocLinks],
) -> CodecResult<()> {
    out.put_count(docs.len(), "document count")?;
    for doc in docs {
        out.put_int(doc.doc_id)?;
        out.put_count32(doc.entity_ids.len(), "related entity count")?;
        for &entity_id in &doc.entity_ids {
            out.put_int(entity_id)?;
        }
    }
    Ok(())
}

/// Reads an entity-to-document section.
pub fn read_entity_section<R: Read>(
    input: &mut StreamReader<R>,
) -> CodecResult<Vec<EntityLinks>> {
    let count = input.get_count("entity count")?;
    let mut entities = Vec::new();
    for _ in 0..count {
        let entity_id = input.get_int()?;
        let related = input.get_count32("related document count")?;
        let doc_ids = (0..related)
            .map(|_| input.get_int())
            .collect::<CodecResult<Vec<_>>>()?;
        entities.push(EntityLinks { entity_id, doc_ids });
    }
    Ok(entities)
}

/// Writes an entity-to-document section.
pub fn write_entity_section<W: Write>(
    out: &mut StreamWriter<W>,
    entities: &[EntityLinks],
) -> CodecResult<()> {
    out.put_count(entities.len(), "entity count")?;
    for entity in entities {
        out.put_int(entity.entity_id)?;
        out.put_count32(entity.doc_ids.len(), "related document count")?;
        for &doc_id in &entity.doc_ids {
            out.put_int(doc_id)?;
        }
    }
    Ok(())
}

/// Contents of a `<category>Info.dat` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityInfo {
    pub entities: Vec<EntityLabel>,
}

impl EntityInfo {
    /// Decodes an `int` entity count followed by `(int id, text label)` records.
    pub fn read_from<R: Read>(input: &mut StreamReader<R>) -> CodecResult<Self> {
        let count = input.get_count("entity count")?;
        let mut entities = Vec::new();
        for _ in 0..count {
            let id = input.get_int()?;
            let label = input.get_string()?;
            entities.push(EntityLabel { id, label });
        }
        Ok(Self { entities })
    }

    /// Encodes the layout read by [`EntityInfo::read_from`].
    pub fn write_to<W: Write>(&self, out: &mut StreamWriter<W>) -> CodecResult<()> {
        out.put_count(self.entities.len(), "entity count")?;
        for entity in &self.entities {
            out.put_int(entity.id)?;
            out.put_string(&entity.label)?;
        }
        Ok(())
    }

    /// Reads and decodes an info file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> MigrationResult<Self> {
        let mut input = StreamReader::new(open(&path)?);
        Self::read_from(&mut input).map_err(|source| MigrationError::Decode {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Contents of `geoCoords.dat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoCoords {
    pub coords: Vec<GeoCoord>,
}

impl GeoCoords {
    /// Decodes an `int` count followed by `(int id, float32 lat, float32 lng)` records.
    pub fn read_from<R: Read>(input: &mut StreamReader<R>) -> CodecResult<Self> {
        let count = input.get_count("entity count")?;
        let mut coords = Vec::new();
        for _ in 0..count {
            let id = input.get_int()?;
            let lat = input.get_float32()?;
            let lng = input.get_float32()?;
            coords.push(GeoCoord { id, lat, lng });
        }
        Ok(Self { coords })
    }

    /// Encodes the layout read by [`GeoCoords::read_from`].
    pub fn write_to<W: Write>(&self, out: &mut StreamWriter<W>) -> CodecResult<()> {
        out.put_count(self.coords.len(), "entity count")?;
        for coord in &self.coords {
            out.put_int(coord.id)?;
            out.put_float32(coord.lat)?;
            out.put_float32(coord.lng)?;
        }
        Ok(())
    }

    /// Reads and decodes `geoCoords.dat` from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> MigrationResult<Self> {
        let mut input = StreamReader::new(open(&path)?);
        Self::read_from(&mut input).map_err(|source| MigrationError::Decode {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// A migrated `<category>Graph.dat` link graph.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    documents: Vec<DocLinks>,
    entities: Vec<EntityLinks>,
    doc_index: HashMap<i64, usize>,
}

impl LinkGraph {
    /// Builds a graph and indexes its documents by id.
    pub fn new(documents: Vec<DocLinks>, entities: Vec<EntityLinks>) -> Self {
        let doc_index = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (doc.doc_id, i))
            .collect();
        Self {
            documents,
            entities,
            doc_index,
        }
    }

    /// Documents in file order.
    pub fn documents(&self) -> &[DocLinks] {
        &self.documents
    }

    /// Entities in file order.
    pub fn entities(&self) -> &[EntityLinks] {
        &self.entities
    }

    /// Entities related to `doc_id`; empty for documents absent from the file.
    pub fn related_entities(&self, doc_id: i64) -> &[i64] {
        self.doc_index
            .get(&doc_id)
            .map(|&i| self.documents[i].entity_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Decodes a document section followed by an entity section.
    pub fn read_from<R: Read>(input: &mut StreamReader<R>) -> CodecResult<Self> {
        let documents = read_doc_section(input)?;
        let entities = read_entity_section(input)?;
        Ok(Self::new(documents, entities))
    }

    /// Writes the document section, then the entity section.
    pub fn write_to<W: Write>(&self, out: &mut StreamWriter<W>) -> CodecResult<()> {
        write_doc_section(out, &self.documents)?;
        write_entity_section(out, &self.entities)
    }

    /// Reads and decodes a migrated graph file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> MigrationResult<Self> {
        let mut input = StreamReader::new(open(&path)?);
        Self::read_from(&mut input).map_err(|source| MigrationError::Decode {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::CodecError;

    #[test]
    fn test_sparse_lookup() {
        let graph = LinkGraph::new(
            vec![DocLinks {
                doc_id: 100,
                entity_ids: vec![1, 2],
            }],
            vec![],
        );
        assert_eq!(graph.related_entities(100), &[1, 2]);
        assert!(graph.related_entities(101).is_empty());
    }

    #[test]
    fn test_link_graph_file_layout() {
        let graph = LinkGraph::new(
            vec![DocLinks {
                doc_id: 5,
                entity_ids: vec![9],
            }],
            vec![EntityLinks {
                entity_id: 9,
                doc_ids: vec![5],
            }],
        );
        let mut out = StreamWriter::new(Vec::new());
        graph.write_to(&mut out).unwrap();
        let bytes = out.into_inner();
        // doc count + doc id + int32 count + entity id, twice over.
        assert_eq!(bytes.len(), 2 * (8 + 8 + 4 + 8));

        let mut input = StreamReader::new(Cursor::new(bytes));
        let decoded = LinkGraph::read_from(&mut input).unwrap();
        assert_eq!(decoded.documents(), graph.documents());
        assert_eq!(decoded.entities(), graph.entities());
    }

    #[test]
    fn test_truncated_info_file() {
        let info = EntityInfo {
            entities: vec![EntityLabel {
                id: 1,
                label: "Paris".to_string(),
            }],
        };
        let mut out = StreamWriter::new(Vec::new());
        info.write_to(&mut out).unwrap();
        let mut bytes = out.into_inner();
        bytes.truncate(bytes.len() - 2);

        let mut input = StreamReader::new(Cursor::new(bytes));
        assert!(matches!(
            EntityInfo::read_from(&mut input),
            Err(CodecError::LengthPastEnd { .. })
        ));
    }

    #[test]
    fn test_load_geo_coords_file() {
        let coords = GeoCoords {
            coords: vec![GeoCoord {
                id: 1,
                lat: 48.8,
                lng: 2.3,
            }],
        };
        let mut out = StreamWriter::new(Vec::new());
        coords.write_to(&mut out).unwrap();
        let file = temp_file::with_contents(&out.into_inner());

        let loaded = GeoCoords::load(file.path()).unwrap();
        assert_eq!(loaded, coords);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = temp_dir::TempDir::new().unwrap();
        let result = EntityInfo::load(dir.child("personInfo.dat"));
        assert!(matches!(result, Err(MigrationError::Open { .. })));
    }
}
