//! Error types for the harvester.
//!
//! Every failure is fatal to the current call. Transport and parse errors are
//! passed through from `reqwest` and `roxmltree`; the normalization failures
//! get their own variants so callers can tell them apart.

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body is not valid UTF-8.
    #[error("Response is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// The OAI-PMH endpoint answered with a protocol error.
    #[error("OAI-PMH error '{code}': {message}")]
    Oai { code: String, message: String },

    /// No pmcid, pmid or doi was found, so no canonical URL exists.
    #[error("No article identifier (pmcid, pmid or doi) found for {service_id}")]
    MissingIdentifier { service_id: String },

    /// Neither the epub nor the ppub publication date is complete.
    #[error("Incomplete publication date for {service_id}: need year, month and day in epub or ppub")]
    IncompleteDate { service_id: String },

    /// Missing required XML element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// Invalid date format.
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD (e.g., 2025-01-01)")]
    InvalidDate(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HarvesterError::InvalidDate("2025/01/01".to_string());
        assert!(err.to_string().contains("2025/01/01"));
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_missing_identifier_display() {
        let err = HarvesterError::MissingIdentifier {
            service_id: "oai:pubmedcentral.nih.gov:12345".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No article identifier (pmcid, pmid or doi) found for oai:pubmedcentral.nih.gov:12345"
        );
    }

    #[test]
    fn test_oai_error_display() {
        let err = HarvesterError::Oai {
            code: "badResumptionToken".to_string(),
            message: "expired".to_string(),
        };
        assert_eq!(err.to_string(), "OAI-PMH error 'badResumptionToken': expired");
    }

    #[test]
    fn test_missing_element_display() {
        let err = HarvesterError::MissingElement {
            element: "header/identifier".to_string(),
            context: "record".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing required XML element: header/identifier in record"
        );
    }
}
