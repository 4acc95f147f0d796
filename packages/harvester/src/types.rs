//! Core data types for the harvester.
//!
//! `RawRecord` is what the harvester hands out, `NormalizedDocument` is what
//! the normalizer produces. Serialized field names follow the document shape
//! downstream indexers expect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{FILE_TYPE, SOURCE_ID};

/// One harvested OAI-PMH record, still in its source XML form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// The record element, standalone-parseable, with an XML declaration.
    #[serde(rename = "doc")]
    pub document: String,

    /// Source identifier (always [`SOURCE_ID`]).
    #[serde(rename = "source")]
    pub source_id: String,

    /// OAI-PMH header identifier of the record.
    pub doc_id: String,

    /// File type (always [`FILE_TYPE`]).
    #[serde(rename = "filetype")]
    pub file_type: String,
}

impl RawRecord {
    /// Build a record for this source from its XML text and identifier.
    ///
    /// # Examples
    /// ```
    /// use pmc_harvester::types::RawRecord;
    ///
    /// let record = RawRecord::new("<record/>", "oai:pubmedcentral.nih.gov:1");
    /// assert_eq!(record.source_id, "pubmedcentralpmc");
    /// assert_eq!(record.file_type, "xml");
    /// ```
    #[must_use]
    pub fn new(document: impl Into<String>, doc_id: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            source_id: SOURCE_ID.to_string(),
            doc_id: doc_id.into(),
            file_type: FILE_TYPE.to_string(),
        }
    }
}

/// A contributor (author) of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    /// "surname, given-names"; given names may be empty.
    pub full_name: String,
    pub email: String,
}

/// Identifiers of a normalized document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifiers {
    /// Canonical URL, never empty.
    pub url: String,

    /// DOI, or empty when the article has none.
    pub doi: String,

    /// OAI-PMH header identifier.
    pub service_id: String,
}

/// Journal the article was published in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PublishedIn {
    pub journal_ids: Vec<String>,
    pub journal_title: Vec<String>,
    pub issn: Vec<String>,
    pub volume: String,
    pub issue: String,
    #[serde(rename = "fpage")]
    pub first_page: String,
    #[serde(rename = "lpage")]
    pub last_page: String,
}

/// Copyright and license information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Permissions {
    pub copyright_statement: String,
    pub copyright_year: String,
    pub copyright_holder: String,
    pub license: String,
}

/// Source-specific properties carried alongside the common fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Properties {
    pub published_in: PublishedIn,
    pub author_affiliations: Vec<String>,
    pub publisher: String,
    pub permissions: Permissions,
}

/// Uniform document shape produced from one raw record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub title: String,
    pub contributors: Vec<Contributor>,
    pub properties: Properties,
    pub description: String,

    /// Always empty at this stage.
    pub meta: BTreeMap<String, String>,

    #[serde(rename = "id")]
    pub ids: Identifiers,

    pub tags: Vec<String>,

    #[serde(rename = "source")]
    pub source_id: String,

    /// Publication date as "year-month-day", components not zero-padded.
    pub date_created: String,

    /// String form of the caller-supplied timestamp.
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_wire_names() {
        let record = RawRecord::new("<record/>", "oai:pmc:1");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["doc"], "<record/>");
        assert_eq!(json["source"], "pubmedcentralpmc");
        assert_eq!(json["doc_id"], "oai:pmc:1");
        assert_eq!(json["filetype"], "xml");
    }

    #[test]
    fn test_properties_wire_names() {
        let properties = Properties {
            published_in: PublishedIn {
                journal_ids: vec!["Nature".to_string()],
                first_page: "1".to_string(),
                ..PublishedIn::default()
            },
            author_affiliations: vec!["Somewhere".to_string()],
            publisher: "NPG".to_string(),
            permissions: Permissions {
                copyright_year: "2014".to_string(),
                ..Permissions::default()
            },
        };
        let json = serde_json::to_value(&properties).unwrap();

        assert_eq!(json["published-in"]["journal-ids"][0], "Nature");
        assert_eq!(json["published-in"]["journal-title"], serde_json::json!([]));
        assert_eq!(json["published-in"]["fpage"], "1");
        assert_eq!(json["author-affiliations"][0], "Somewhere");
        assert_eq!(json["permissions"]["copyright-year"], "2014");
        assert_eq!(json["permissions"]["license"], "");
    }
}
