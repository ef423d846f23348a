//! Pipeline entry points.
//!
//! - `run_scrape`: Collect identifiers, fetch payload pages, write the record store
//! - `run_synthesize`: Turn stored records into signed URLs
//! - `run_probe`: Check each signed URL with a header-only request
//! - `run_pipeline`: All batch stages in order
//! - `run_manual`: Strict single-identifier run

pub mod manual;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod probe;
pub mod scrape;
pub mod synthesize;

pub use manual::{parse_identifier, prompt_identifier, run_manual};
pub use pipeline::run_pipeline;
pub use probe::run_probe;
pub use scrape::{ScrapeOutcome, run_collect, run_scrape, scrape_ids};
pub use synthesize::run_synthesize;
