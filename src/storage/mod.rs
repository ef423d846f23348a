//! Persistence for pipeline files.
//!
//! - `format`: the plain-text record store (`keys.dat`) layout and parser
//! - `local`: atomic reads and writes under the data directory

pub mod format;
pub mod local;

pub use format::{Layout, RecordParser};
pub use local::LocalStorage;
