pub mod error;
pub mod logging;

pub mod config;
pub mod explorer;
pub mod model;
pub mod opener;
pub mod project;
pub mod tree;

pub use error::Result;
pub use explorer::{Explorer, ExplorerEvent, RefreshHandle, Snapshot, Trigger};
