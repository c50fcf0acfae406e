//! Record types shared by the legacy and migrated entity files.

use std::fmt;

/// The fixed set of entity categories persisted in a data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Person,
    Org,
    Place,
}

impl EntityCategory {
    /// Every category, in the order migration processes them.
    pub const ALL: [EntityCategory; 3] = [
        EntityCategory::Person,
        EntityCategory::Org,
        EntityCategory::Place,
    ];

    /// The file-name stem of this category (e.g. `person` in `personGraph.dat`).
    pub fn name(self) -> &'static str {
        match self {
            EntityCategory::Person => "person",
            EntityCategory::Org => "org",
            EntityCategory::Place => "place",
        }
    }

    /// Whether legacy records of this category carry a latitude and longitude.
    pub fn has_geo_coords(self) -> bool {
        matches!(self, EntityCategory::Place)
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An entity id with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLabel {
    pub id: i64,
    pub label: String,
}

/// The location of a place entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoord {
    pub id: i64,
    pub lat: f32,
    pub lng: f32,
}

/// Entities mentioned by one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLinks {
    pub doc_id: i64,
    pub entity_ids: Vec<i64>,
}

/// Documents mentioning one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLinks {
    pub entity_id: i64,
    pub doc_ids: Vec<i64>,
}
