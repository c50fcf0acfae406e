//! Per-category rewrite of a legacy graph into the split layout.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use super::{CategoryStats, MigrationObserver};
use crate::codec::{IntSet, StreamReader, StreamWriter};
use crate::error::{CodecResult, MigrationError, MigrationResult};
use crate::layout::DataLayout;
use crate::model::EntityCategory;

type FileWriter = StreamWriter<BufWriter<File>>;

fn create(path: PathBuf) -> MigrationResult<(PathBuf, FileWriter)> {
    match File::create(&path) {
        Ok(file) => Ok((path, StreamWriter::new(BufWriter::new(file)))),
        Err(source) => Err(MigrationError::Create { path, source }),
    }
}

/// Flushes buffered output and syncs the file before its handle is dropped.
fn finish(path: &Path, out: FileWriter) -> MigrationResult<()> {
    let to_finish_error = |source: std::io::Error| MigrationError::Finish {
        path: path.to_path_buf(),
        source,
    };
    let file = out
        .into_inner()
        .into_inner()
        .map_err(|e| to_finish_error(e.into_error()))?;
    file.sync_all().map_err(to_finish_error)
}

/// Rewrites the legacy graph of one category.
///
/// Reads `<category>Graph.dat` and writes `<category>Info.dat`, the rebuilt
/// link graph to `<category>Graph.dat.tmp`, and for places `geoCoords.dat`.
/// The legacy file itself is never modified.
pub struct EntityGraphMigrator<'a> {
    layout: &'a DataLayout,
    observer: &'a dyn MigrationObserver,
}

impl<'a> EntityGraphMigrator<'a> {
    pub fn new(layout: &'a DataLayout, observer: &'a dyn MigrationObserver) -> Self {
        Self { layout, observer }
    }

    pub fn migrate(&self, category: EntityCategory) -> MigrationResult<CategoryStats> {
        self.observer.category_started(category);

        let legacy_path = self.layout.graph_file(category);
        let legacy = File::open(&legacy_path).map_err(|source| MigrationError::Open {
            path: legacy_path,
            source,
        })?;
        let mut input = StreamReader::new(BufReader::new(legacy));

        let (info_path, mut info_out) = create(self.layout.info_file(category))?;
        let (graph_path, mut graph_out) = create(self.layout.temp_graph_file(category))?;
        let mut geo = if category.has_geo_coords() {
            Some(create(self.layout.geo_coords_file())?)
        } else {
            None
        };

        let stats = migrate_streams(
            category,
            &mut input,
            &mut info_out,
            &mut graph_out,
            geo.as_mut().map(|(_, out)| out),
            self.observer,
        )
        .map_err(|source| MigrationError::Category { category, source })?;

        finish(&info_path, info_out)?;
        finish(&graph_path, graph_out)?;
        if let Some((geo_path, geo_out)) = geo {
            finish(&geo_path, geo_out)?;
        }

        self.observer.category_finished(&stats);
        Ok(stats)
    }
}

/// Migrates one legacy graph stream.
///
/// The entity records go to `info_out` (and to `geo_out` when the category
/// carries coordinates) in declaration order. `graph_out` receives the rebuilt
/// document section followed by the entity section copied through verbatim.
///
/// Documents with no related entities are dropped. Each remaining document has
/// its entity ids deduplicated, and documents are written in ascending id order
/// so the output is byte-identical across runs. A document id that repeats in
/// the legacy section has its entity ids merged.
pub fn migrate_streams<R, W, G>(
    category: EntityCategory,
    input: &mut StreamReader<R>,
    info_out: &mut StreamWriter<W>,
    graph_out: &mut StreamWriter<W>,
    mut geo_out: Option<&mut StreamWriter<G>>,
    observer: &dyn MigrationObserver,
) -> CodecResult<CategoryStats>
where
    R: Read,
    W: Write,
    G: Write,
{
    let mut stats = CategoryStats::new(category);

    let type_tag = input.get_string()?;
    let entity_count = input.get_count("entity count")?;
    observer.header_decoded(category, &type_tag, entity_count);

    info_out.put_count(entity_count, "entity count")?;
    if let Some(geo) = &mut geo_out {
        geo.put_count(entity_count, "entity count")?;
    }

    for _ in 0..entity_count {
        let id = input.get_int()?;
        let _score = input.get_int()?;
        let label = input.get_string()?;

        info_out.put_int(id)?;
        info_out.put_string(&label)?;

        if category.has_geo_coords() {
            let lat = input.get_float32()?;
            let lng = input.get_float32()?;
            if let Some(geo) = &mut geo_out {
                geo.put_int(id)?;
                geo.put_float32(lat)?;
                geo.put_float32(lng)?;
            }
        }
    }
    stats.entities = entity_count;

    let doc_count = input.get_count("document count")?;
    let mut linked: HashMap<i64, IntSet> = HashMap::new();
    for _ in 0..doc_count {
        let doc_id = input.get_int()?;
        let related = input.get_count32("related entity count")?;
        if related == 0 {
            stats.documents_without_entities += 1;
            continue;
        }
        let entity_ids = linked.entry(doc_id).or_default();
        for _ in 0..related {
            entity_ids.put(input.get_int()?);
        }
    }
    stats.documents_read = doc_count;
    observer.documents_without_entities(category, stats.documents_without_entities);

    let mut doc_ids: Vec<i64> = linked.keys().copied().collect();
    doc_ids.sort_unstable();

    graph_out.put_count(doc_ids.len(), "document count")?;
    for doc_id in &doc_ids {
        let entity_ids = &linked[doc_id];
        graph_out.put_int(*doc_id)?;
        graph_out.put_count32(entity_ids.len(), "related entity count")?;
        for entity_id in entity_ids.iter() {
            graph_out.put_int(entity_id)?;
        }
    }
    stats.documents_written = doc_ids.len();

    let link_count = input.get_count("entity count")?;
    graph_out.put_count(link_count, "entity count")?;
    for index in 0..link_count {
        let entity_id = input.get_int()?;
        let related = input.get_count32("related document count")?;
        if related == 0 {
            stats.entities_without_documents += 1;
            observer.entity_without_documents(category, index, entity_id);
        }

        graph_out.put_int(entity_id)?;
        graph_out.put_count32(related, "related document count")?;
        for _ in 0..related {
            graph_out.put_int(input.get_int()?)?;
        }
    }
    stats.entity_links = link_count;

    info_out.flush()?;
    graph_out.flush()?;
    if let Some(geo) = &mut geo_out {
        geo.flush()?;
    }

    Ok(stats)
}
