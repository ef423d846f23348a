//! Service layer for the token pipeline.
//!
//! This module contains the components of each stage:
//! - Identifier collection (`IdentifierCollector`)
//! - Payload fetching (`PayloadFetcher`, `HttpFetcher`)
//! - Payload extraction and decoding (`PayloadExtractor`)
//! - Signed URL synthesis (`UrlSynthesizer`)
//! - Header probing (`Prober`, `CurlProber`, `ProbeRunner`)

mod collector;
mod extractor;
mod fetcher;
mod prober;
mod synthesizer;

pub use collector::IdentifierCollector;
pub use extractor::{BLOB_LEN, DecodedDocument, PayloadExtractor, PayloadField, require_complete};
pub use fetcher::{HttpFetcher, PayloadFetcher};
pub use prober::{CurlProber, ProbeReport, ProbeRunner, Prober, StatusClassifier};
pub use synthesizer::UrlSynthesizer;
