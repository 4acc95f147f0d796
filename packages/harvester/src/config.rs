//! Configuration constants and validation functions for the harvester.

use chrono::{Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::error::{HarvesterError, Result};

/// Base URL of the PubMed Central OAI-PMH endpoint.
pub const OAI_BASE_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/oai/oai.cgi";

/// Metadata format requested from the endpoint.
pub const METADATA_PREFIX: &str = "pmc";

/// Source identifier stamped on every raw and normalized document.
pub const SOURCE_ID: &str = "pubmedcentralpmc";

/// File type of harvested records.
pub const FILE_TYPE: &str = "xml";

/// OAI-PMH envelope namespace.
pub const OAI_NS: &str = "http://www.openarchives.org/OAI/2.0/";

/// PMC archive article namespace.
pub const PMC_NS: &str = "http://dtd.nlm.nih.gov/2.0/xsd/archivearticle";

/// Declaration prepended to every harvested record.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Pause between continuation requests (milliseconds).
///
/// PMC asks harvesters not to hammer the endpoint.
pub const PAGE_DELAY_MS: u64 = 500;

/// Default look-back window for the CLI.
pub const DEFAULT_DAYS_BACK: u32 = 1;

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Validate and parse a `from` date (YYYY-MM-DD).
///
/// Rejects dates in the future since the endpoint has nothing to report for them.
///
/// # Examples
/// ```
/// use pmc_harvester::config::validate_date;
///
/// assert!(validate_date("2025-01-01").is_ok());
/// assert!(validate_date("invalid").is_err());
/// assert!(validate_date("2025-13-01").is_err()); // Invalid month
/// ```
pub fn validate_date(date_str: &str) -> Result<NaiveDate> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(HarvesterError::InvalidDate(date_str.to_string()));
    }

    let parsed_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| HarvesterError::InvalidDate(date_str.to_string()))?;

    let today = chrono::Local::now().date_naive();
    if parsed_date > today {
        return Err(HarvesterError::InvalidDate(format!(
            "{date_str} is in the future (today is {today})"
        )));
    }

    Ok(parsed_date)
}

/// Compute the harvest start date `days_back` days before `today`.
///
/// Saturates at the earliest representable date.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use pmc_harvester::config::start_date;
///
/// let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// assert_eq!(start_date(today, 1), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
/// ```
pub fn start_date(today: NaiveDate, days_back: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days_back)))
        .unwrap_or(NaiveDate::MIN)
}

/// Build the first ListRecords request URL.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use pmc_harvester::config::list_records_url;
///
/// let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// assert_eq!(
///     list_records_url("https://example.org/oai", from).unwrap(),
///     "https://example.org/oai?verb=ListRecords&metadataPrefix=pmc&from=2025-01-01"
/// );
/// ```
pub fn list_records_url(base_url: &str, from: NaiveDate) -> Result<String> {
    let from = from.format("%Y-%m-%d").to_string();
    let url = Url::parse_with_params(
        base_url,
        &[
            ("verb", "ListRecords"),
            ("metadataPrefix", METADATA_PREFIX),
            ("from", from.as_str()),
        ],
    )?;
    Ok(url.into())
}

/// Build a continuation request URL for a resumption token.
///
/// The token is opaque; it is percent-encoded as a query value.
pub fn resumption_url(base_url: &str, token: &str) -> Result<String> {
    let url = Url::parse_with_params(
        base_url,
        &[("verb", "ListRecords"), ("resumptionToken", token)],
    )?;
    Ok(url.into())
}

/// PMC article page for a pmcid.
pub fn pmc_article_url(pmcid: &str) -> String {
    format!("http://www.ncbi.nlm.nih.gov/pmc/articles/{pmcid}")
}

/// PubMed page for a pmid.
pub fn pubmed_url(pmid: &str) -> String {
    format!("http://www.ncbi.nlm.nih.gov/pubmed/{pmid}")
}

/// DOI resolver URL for a doi.
pub fn doi_url(doi: &str) -> String {
    format!("http://dx.doi.org/{doi}")
}
