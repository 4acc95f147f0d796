//! Harvester service: pages through `ListRecords` and collects raw records.

use std::thread;
use std::time::Duration;

use chrono::NaiveDate;

use crate::config::{list_records_url, resumption_url, start_date, OAI_BASE_URL, PAGE_DELAY_MS};
use crate::error::Result;
use crate::http::{Fetch, HttpFetcher};
use crate::oai::parse_list_records;
use crate::types::RawRecord;

/// Harvests records from an OAI-PMH endpoint through a [`Fetch`] source.
#[derive(Debug, Clone)]
pub struct Harvester<F> {
    fetcher: F,
    base_url: String,
    page_delay: Duration,
}

impl Harvester<HttpFetcher> {
    /// Harvester for the PMC endpoint using a default HTTP client.
    pub fn pmc() -> Result<Self> {
        Ok(Self::new(HttpFetcher::new()?))
    }
}

impl<F: Fetch> Harvester<F> {
    /// Create a harvester for the PMC endpoint with the default page delay.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            base_url: OAI_BASE_URL.to_string(),
            page_delay: Duration::from_millis(PAGE_DELAY_MS),
        }
    }

    /// Use a different endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a different pause between continuation requests.
    #[must_use]
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Endpoint this harvester requests.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Harvest every record changed in the last `days_back` days.
    pub fn consume(&self, days_back: u32) -> Result<Vec<RawRecord>> {
        let today = chrono::Local::now().date_naive();
        self.consume_since(start_date(today, days_back))
    }

    /// Harvest every record changed since `from`.
    ///
    /// Follows resumption tokens until a page arrives without one, sleeping
    /// the page delay before each continuation request. Records are returned
    /// in the order the server sent them. Any failing page aborts the harvest.
    pub fn consume_since(&self, from: NaiveDate) -> Result<Vec<RawRecord>> {
        let mut url = list_records_url(&self.base_url, from)?;
        let mut records = Vec::new();
        let mut page_number = 1usize;

        loop {
            tracing::info!(page = page_number, url = %url, "Requesting ListRecords page");
            let body = self.fetcher.fetch(&url)?;
            let page = parse_list_records(&body)?;
            tracing::debug!(
                page = page_number,
                records = page.records.len(),
                "Parsed ListRecords page"
            );
            records.extend(page.records);

            let Some(token) = page.resumption_token else {
                break;
            };

            tracing::debug!(token = %token, "Continuing with resumption token");
            thread::sleep(self.page_delay);
            url = resumption_url(&self.base_url, &token)?;
            page_number += 1;
        }

        tracing::info!(
            pages = page_number,
            records = records.len(),
            since = %from,
            "Harvest complete"
        );
        Ok(records)
    }
}

/// Harvest PMC records changed in the last `days_back` days using the
/// default endpoint and HTTP client.
pub fn consume(days_back: u32) -> Result<Vec<RawRecord>> {
    Harvester::pmc()?.consume(days_back)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarvesterError;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Serves canned pages in order and records the requested URLs.
    struct StubFetcher {
        pages: RefCell<VecDeque<Result<String>>>,
        requested: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn new(pages: Vec<Result<String>>) -> Self {
            Self {
                pages: RefCell::new(pages.into()),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetch for StubFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected request: {url}"))
        }
    }

    fn page(ids: &[&str], token: Option<&str>) -> Result<String> {
        let records: String = ids
            .iter()
            .map(|id| format!("<record><header><identifier>{id}</identifier></header></record>"))
            .collect();
        let token = token
            .map(|t| format!("<resumptionToken>{t}</resumptionToken>"))
            .unwrap_or_else(|| "<resumptionToken/>".to_string());
        Ok(format!(
            r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/"><ListRecords>{records}{token}</ListRecords></OAI-PMH>"#
        ))
    }

    fn harvester(stub: &StubFetcher) -> Harvester<&StubFetcher> {
        Harvester::new(stub)
            .with_base_url("http://oai.test/oai.cgi")
            .with_page_delay(Duration::ZERO)
    }

    fn from() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_single_page() {
        let stub = StubFetcher::new(vec![page(&["a", "b"], None)]);
        let records = harvester(&stub).consume_since(from()).unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(
            *stub.requested.borrow(),
            vec!["http://oai.test/oai.cgi?verb=ListRecords&metadataPrefix=pmc&from=2025-01-01"]
        );
    }

    #[test]
    fn test_pages_are_concatenated_in_order() {
        let stub = StubFetcher::new(vec![
            page(&["a", "b"], Some("t1")),
            page(&["c"], Some("t2")),
            page(&["d", "e"], None),
        ]);
        let records = harvester(&stub).consume_since(from()).unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(
            stub.requested.borrow()[1..],
            [
                "http://oai.test/oai.cgi?verb=ListRecords&resumptionToken=t1",
                "http://oai.test/oai.cgi?verb=ListRecords&resumptionToken=t2",
            ]
        );
    }

    #[test]
    fn test_failing_page_aborts_harvest() {
        let stub = StubFetcher::new(vec![
            page(&["a"], Some("t1")),
            Ok("<OAI-PMH><ListRecords>".to_string()),
        ]);
        let err = harvester(&stub).consume_since(from()).unwrap_err();

        assert!(matches!(err, HarvesterError::XmlParse(_)));
    }

    #[test]
    fn test_fetch_error_propagates() {
        let stub = StubFetcher::new(vec![Err(HarvesterError::InvalidDate("boom".to_string()))]);
        let err = harvester(&stub).consume_since(from()).unwrap_err();

        assert!(matches!(err, HarvesterError::InvalidDate(_)));
    }

    #[test]
    fn test_empty_harvest() {
        let stub = StubFetcher::new(vec![Ok(r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
            <error code="noRecordsMatch"/></OAI-PMH>"#
            .to_string())]);
        let records = harvester(&stub).consume_since(from()).unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn test_consume_uses_days_back() {
        let stub = StubFetcher::new(vec![page(&[], None)]);
        harvester(&stub).consume(3).unwrap();

        let expected = start_date(chrono::Local::now().date_naive(), 3);
        let requested = stub.requested.borrow();
        assert!(requested[0].ends_with(&format!("from={}", expected.format("%Y-%m-%d"))));
    }

    #[test]
    fn test_builder_defaults() {
        let stub = StubFetcher::new(Vec::new());
        let harvester = Harvester::new(&stub);
        assert_eq!(harvester.base_url(), OAI_BASE_URL);
        assert_eq!(harvester.page_delay, Duration::from_millis(PAGE_DELAY_MS));
    }
}
