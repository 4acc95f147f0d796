//! OAI-PMH `ListRecords` response parsing.
//!
//! A response page carries zero or more `record` elements and, while the list
//! is incomplete, a `resumptionToken`. Each record is cut out of the response
//! text verbatim and re-rooted so it parses on its own.

use roxmltree::{Document, Node};

use crate::config::XML_DECLARATION;
use crate::error::{HarvesterError, Result};
use crate::types::RawRecord;
use crate::xml::{first_text, select, Step};

/// OAI-PMH error code for an empty result set.
const NO_RECORDS_MATCH: &str = "noRecordsMatch";

/// One parsed `ListRecords` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRecordsPage {
    /// Records in document order.
    pub records: Vec<RawRecord>,

    /// Continuation token, `None` on the last page.
    pub resumption_token: Option<String>,
}

/// Parse a `ListRecords` response body.
///
/// An OAI-PMH `noRecordsMatch` error yields an empty final page; any other
/// protocol error is returned as [`HarvesterError::Oai`]. An empty
/// `resumptionToken` element marks the end of the list.
pub fn parse_list_records(xml: &str) -> Result<ListRecordsPage> {
    let doc = Document::parse(xml)?;

    if let Some(error) = select(doc.root(), &[Step::oai("error")]).first() {
        let code = error.attribute("code").unwrap_or_default();
        if code == NO_RECORDS_MATCH {
            tracing::info!("No records match the request");
            return Ok(ListRecordsPage {
                records: Vec::new(),
                resumption_token: None,
            });
        }
        return Err(HarvesterError::Oai {
            code: code.to_string(),
            message: error.text().unwrap_or_default().trim().to_string(),
        });
    }

    let records = select(doc.root(), &[Step::oai("record")])
        .into_iter()
        .map(|record| raw_record(xml, record))
        .collect::<Result<Vec<_>>>()?;

    let resumption_token = first_text(doc.root(), &[Step::oai("resumptionToken")])
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    Ok(ListRecordsPage {
        records,
        resumption_token,
    })
}

/// Wrap one `record` element into a [`RawRecord`].
fn raw_record(source: &str, record: Node<'_, '_>) -> Result<RawRecord> {
    let doc_id = first_text(record, &[Step::oai("header"), Step::oai("identifier")])
        .map(|id| id.trim().to_string())
        .ok_or_else(|| HarvesterError::MissingElement {
            element: "header/identifier".to_string(),
            context: "record".to_string(),
        })?;

    Ok(RawRecord::new(serialize_element(source, record), doc_id))
}

/// Cut an element out of its source text as a standalone document.
///
/// Namespaces in scope from ancestors are declared on the element's start
/// tag, and the XML declaration is prepended.
pub fn serialize_element(source: &str, element: Node<'_, '_>) -> String {
    let fragment = &source[element.range()];
    let start_tag = &fragment[..start_tag_end(fragment)];
    let declared = declared_prefixes(start_tag);
    let name_end = qualified_name_end(fragment);

    let mut inherited = String::new();
    let mut seen: Vec<Option<&str>> = Vec::new();
    for ns in element.namespaces() {
        let prefix = ns.name();
        if prefix == Some("xml")
            || ns.uri().is_empty()
            || seen.contains(&prefix)
            || declared.contains(&prefix.unwrap_or_default())
        {
            continue;
        }
        seen.push(prefix);
        let attribute = match prefix {
            Some(p) => format!("xmlns:{p}"),
            None => "xmlns".to_string(),
        };
        inherited.push_str(&format!(" {attribute}=\"{}\"", escape_attribute(ns.uri())));
    }

    let mut out = String::with_capacity(XML_DECLARATION.len() + fragment.len() + inherited.len());
    out.push_str(XML_DECLARATION);
    out.push_str(&fragment[..name_end]);
    out.push_str(&inherited);
    out.push_str(&fragment[name_end..]);
    out
}

/// Byte offset just past the `>` that closes the leading start tag.
fn start_tag_end(fragment: &str) -> usize {
    let mut quote: Option<char> = None;
    for (i, c) in fragment.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return i + 1,
            (None, _) => {}
        }
    }
    fragment.len()
}

/// Byte offset just past the element name of the leading start tag.
fn qualified_name_end(fragment: &str) -> usize {
    fragment
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_whitespace() || *c == '/' || *c == '>')
        .map_or(fragment.len(), |(i, _)| i)
}

/// Namespace prefixes declared on a start tag; `""` stands for the default
/// namespace.
fn declared_prefixes(start_tag: &str) -> Vec<&str> {
    let mut prefixes = Vec::new();
    let mut rest = &start_tag[qualified_name_end(start_tag)..];

    loop {
        rest = rest.trim_start();
        let Some(eq) = rest.find('=') else {
            break;
        };
        let name = rest[..eq].trim();
        if name == "xmlns" {
            prefixes.push("");
        } else if let Some(prefix) = name.strip_prefix("xmlns:") {
            prefixes.push(prefix);
        }

        let value = rest[eq + 1..].trim_start();
        let Some(quote) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            break;
        };
        let Some(close) = value[1..].find(quote) else {
            break;
        };
        rest = &value[close + 2..];
    }

    prefixes
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}
