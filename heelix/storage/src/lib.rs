pub mod codec;
pub mod error;
pub mod graph;
pub mod layout;
pub mod legacy;
pub mod migrate;
pub mod model;

pub use error::{CodecError, MigrationError};
pub use layout::DataLayout;
pub use migrate::{DATA_VERSION, MigrationDriver, MigrationOutcome, migrate};
pub use model::EntityCategory;
