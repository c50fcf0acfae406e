use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use heelix_storage::EntityCategory;
use heelix_storage::layout::DataLayout;
use heelix_storage::legacy::{LegacyEntity, LegacyGraph};
use heelix_storage::migrate::{CategoryStats, MigrationObserver, SkipReason, write_version};
use heelix_storage::model::{DocLinks, EntityLinks};
use temp_dir::TempDir;

pub const LEGACY_VERSION: &str = "0.9.0";

/// Records the observer callbacks a migration made, in order.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl MigrationObserver for RecordingObserver {
    fn skipped(&self, _data_dir: &Path, reason: &SkipReason) {
        self.push(format!("skipped: {reason}"));
    }

    fn category_started(&self, category: EntityCategory) {
        self.push(format!("start {category}"));
    }

    fn documents_without_entities(&self, category: EntityCategory, count: usize) {
        self.push(format!("{category}: {count} empty documents"));
    }

    fn entity_without_documents(&self, category: EntityCategory, index: usize, entity_id: i64) {
        self.push(format!("{category}: orphan {entity_id} at {index}"));
    }

    fn category_finished(&self, stats: &CategoryStats) {
        self.push(format!("finish {}", stats.category));
    }

    fn swapped(&self, _data_dir: &Path) {
        self.push("swapped".to_string());
    }

    fn finished(&self, _data_dir: &Path, version: &str) {
        self.push(format!("stamped {version}"));
    }
}

pub fn doc(doc_id: i64, entity_ids: &[i64]) -> DocLinks {
    DocLinks {
        doc_id,
        entity_ids: entity_ids.to_vec(),
    }
}

pub fn links(entity_id: i64, doc_ids: &[i64]) -> EntityLinks {
    EntityLinks {
        entity_id,
        doc_ids: doc_ids.to_vec(),
    }
}

pub fn person_graph() -> LegacyGraph {
    let mut graph = LegacyGraph::new(EntityCategory::Person);
    graph.entities = vec![
        LegacyEntity::new(10, 4, "Ada Lovelace"),
        LegacyEntity::new(11, 2, "Alan Turing"),
        LegacyEntity::new(12, 1, "Grace Hopper"),
    ];
    graph.documents = vec![
        doc(500, &[10, 11, 10]),
        doc(501, &[]),
        doc(502, &[11]),
    ];
    graph.entity_links = vec![
        links(10, &[500]),
        links(11, &[500, 502]),
        links(12, &[]),
    ];
    graph
}

pub fn org_graph() -> LegacyGraph {
    let mut graph = LegacyGraph::new(EntityCategory::Org);
    graph.entities = vec![LegacyEntity::new(20, 7, "Acme")];
    graph.documents = vec![doc(600, &[20])];
    graph.entity_links = vec![links(20, &[600])];
    graph
}

pub fn place_graph() -> LegacyGraph {
    let mut graph = LegacyGraph::new(EntityCategory::Place);
    graph.entities = vec![
        LegacyEntity::new(1, 9, "Paris").with_coords(48.8, 2.3),
        LegacyEntity::new(2, 3, "Lyon").with_coords(45.7, 4.8),
    ];
    graph.documents = vec![doc(100, &[1, 1, 2])];
    graph.entity_links = vec![links(1, &[100]), links(2, &[100])];
    graph
}

pub fn write_legacy(dir: &Path, graph: &LegacyGraph) {
    let path = DataLayout::new(dir).graph_file(graph.category);
    fs::write(path, graph.to_bytes().unwrap()).unwrap();
}

/// A stamped legacy data directory holding all three category graphs.
pub fn legacy_data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    for graph in [person_graph(), org_graph(), place_graph()] {
        write_legacy(dir.path(), &graph);
    }
    write_version(dir.path(), LEGACY_VERSION).unwrap();
    dir
}

/// Every file in `dir` with its contents, keyed by file name.
pub fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.file_name().to_string_lossy().into_owned(),
                fs::read(entry.path()).unwrap(),
            )
        })
        .collect()
}
