//! `geodash-enrich`: joins a per-region numeric attribute into GeoJSON features.
//!
//! Pure engine crate: receives a parsed boundary document and a loaded table,
//! returns a new document. No IO, no logging; inputs are never mutated.

pub mod document;
pub mod enrich;
pub mod error;
pub mod options;
pub mod style;

pub use document::{features, parse_boundary, region_names};
pub use enrich::{enrich, enrich_with_report, DuplicateKey, EnrichReport, Enriched};
pub use error::{EnrichError, FieldOwner};
pub use options::{DuplicatePolicy, EnrichOptions};
pub use style::{style_document, FillRamp, LayerStyle, StyleOptions};
