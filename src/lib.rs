// Creature Viewer - Core Library
// Exposes data access and the view pipeline for the TUI, the server, and tests

pub mod creature;
pub mod api;
pub mod filter;
pub mod view;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use creature::{Creature, DerivedCreature, derive_all};
pub use api::{
    DataSource, LoadError,
    get_all, get_by_name, parse_creatures, spawn_load,
    DEFAULT_SOURCE, RESOURCE_PATH,
};
pub use filter::{SearchPattern, Summary, Threshold, search};
pub use view::{LoadState, Message, Snapshot, ViewState};
