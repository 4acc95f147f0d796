//! PMC Harvester - Harvest PubMed Central metadata over OAI-PMH.
//!
//! This crate pages through the PubMed Central OAI-PMH endpoint collecting
//! raw article records, and normalizes each record into a uniform document
//! shape for downstream indexing.
//!
//! # Example
//!
//! ```
//! use pmc_harvester::{normalize, RawRecord};
//!
//! let xml = r#"<record xmlns="http://www.openarchives.org/OAI/2.0/">
//!   <header><identifier>oai:pubmedcentral.nih.gov:1</identifier></header>
//!   <metadata><article xmlns="http://dtd.nlm.nih.gov/2.0/xsd/archivearticle">
//!     <front><article-meta>
//!       <article-id pub-id-type="pmid">12345</article-id>
//!       <pub-date pub-type="ppub"><day>9</day><month>1</month><year>2015</year></pub-date>
//!     </article-meta></front>
//!   </article></metadata>
//! </record>"#;
//!
//! let doc = normalize(&RawRecord::new(xml, "oai:pubmedcentral.nih.gov:1"), "now").unwrap();
//! assert_eq!(doc.ids.url, "http://www.ncbi.nlm.nih.gov/pubmed/12345");
//! assert_eq!(doc.date_created, "2015-1-9");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Endpoint constants, URL builders and validation
//! - [`types`]: Raw and normalized document types
//! - [`error`]: Error types and Result alias
//! - [`http`]: HTTP client and the [`http::Fetch`] seam
//! - [`oai`]: `ListRecords` response parsing
//! - [`xml`]: Namespace-aware path queries and text extraction
//! - [`harvester`]: Paginated harvesting
//! - [`normalizer`]: Record normalization
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod harvester;
pub mod http;
pub mod normalizer;
pub mod oai;
pub mod types;
pub mod xml;

// Re-export main functions
pub use harvester::{consume, Harvester};
pub use normalizer::normalize;

// Re-export commonly used items
pub use error::{HarvesterError, Result};
pub use types::{Contributor, Identifiers, NormalizedDocument, RawRecord};
