//! Normalization of PMC archive-article records.
//!
//! PMC records vary a lot: an article may carry an `epub` or a `ppub` date (or
//! both), any subset of pmcid, pmid and doi, and any number of contributors,
//! keywords and affiliations. Every field below is extracted independently and
//! falls back to an empty value, except the canonical URL and the publication
//! date which are required.

use std::collections::BTreeMap;
use std::fmt::Display;

use roxmltree::{Document, Node};

use crate::config::{doi_url, pmc_article_url, pubmed_url, PMC_NS, SOURCE_ID};
use crate::error::{HarvesterError, Result};
use crate::types::{
    Contributor, Identifiers, NormalizedDocument, Permissions, Properties, PublishedIn, RawRecord,
};
use crate::xml::{child_nodes, direct_text, first_text, is_element, mixed_text, text_nodes, Step};

const HEADER_IDENTIFIER: [Step<'static>; 2] = [Step::oai("header"), Step::oai("identifier")];

/// Convert one raw record into a normalized document.
///
/// The result depends only on `raw.document` and `timestamp`.
///
/// # Errors
/// * [`HarvesterError::XmlParse`] if the record is not well-formed XML
/// * [`HarvesterError::MissingElement`] if the OAI header identifier is absent
/// * [`HarvesterError::MissingIdentifier`] if no pmcid, pmid or doi is present
/// * [`HarvesterError::IncompleteDate`] if neither the epub nor the ppub date
///   has a year, month and day
pub fn normalize(raw: &RawRecord, timestamp: impl Display) -> Result<NormalizedDocument> {
    let doc = Document::parse(&raw.document)?;
    let root = doc.root();

    let ids = extract_identifiers(root)?;
    let date_created = extract_date(root).ok_or_else(|| HarvesterError::IncompleteDate {
        service_id: ids.service_id.clone(),
    })?;

    tracing::debug!(service_id = %ids.service_id, url = %ids.url, "Normalized record");

    Ok(NormalizedDocument {
        title: extract_title(root),
        contributors: extract_contributors(root),
        properties: extract_properties(root),
        description: extract_description(root),
        meta: BTreeMap::new(),
        ids,
        tags: extract_tags(root),
        source_id: SOURCE_ID.to_string(),
        date_created,
        timestamp: timestamp.to_string(),
    })
}

fn extract_title(root: Node<'_, '_>) -> String {
    let nodes = child_nodes(root, &[Step::pmc("title-group"), Step::pmc("article-title")]);
    mixed_text(&nodes, &[Step::pmc("sup")])
}

fn extract_description(root: Node<'_, '_>) -> String {
    let nodes = child_nodes(root, &[Step::pmc("abstract"), Step::pmc("p")]);
    mixed_text(&nodes, &[])
}

/// One contributor per element of the contributor group that names a surname.
fn extract_contributors(root: Node<'_, '_>) -> Vec<Contributor> {
    child_nodes(root, &[Step::pmc("contrib-group")])
        .into_iter()
        .filter(|n| n.is_element())
        .filter_map(|contrib| {
            let mut surname = "";
            let mut given_names = "";
            let mut email = "";

            for element in contrib.descendants().filter(|n| n.is_element()) {
                if is_element(element, PMC_NS, "surname") {
                    surname = direct_text(element);
                } else if is_element(element, PMC_NS, "given-names") {
                    given_names = direct_text(element);
                } else if is_element(element, PMC_NS, "email") {
                    email = direct_text(element);
                }
            }

            (!surname.is_empty()).then(|| Contributor {
                full_name: format!("{surname}, {given_names}"),
                email: email.to_string(),
            })
        })
        .collect()
}

/// Italic keywords first, then plain keyword text on a single line.
fn extract_tags(root: Node<'_, '_>) -> Vec<String> {
    let mut tags = text_nodes(
        root,
        &[Step::pmc("kwd-group"), Step::pmc("kwd"), Step::pmc("italic")],
    );

    tags.extend(
        text_nodes(root, &[Step::pmc("kwd-group"), Step::pmc("kwd")])
            .into_iter()
            .filter(|kwd| !kwd.contains('\n')),
    );

    tags
}

fn article_id(root: Node<'_, '_>, pub_id_type: &str) -> Option<String> {
    first_text(
        root,
        &[Step::pmc("article-id").with_attribute("pub-id-type", pub_id_type)],
    )
}

/// Resolve the canonical URL: pmcid, then pmid, then doi, the last one
/// present wins.
fn extract_identifiers(root: Node<'_, '_>) -> Result<Identifiers> {
    let service_id = first_text(root, &HEADER_IDENTIFIER)
        .map(|id| id.trim().to_string())
        .ok_or_else(|| HarvesterError::MissingElement {
            element: "header/identifier".to_string(),
            context: "record".to_string(),
        })?;

    let mut url = None;
    if let Some(pmcid) = article_id(root, "pmcid") {
        url = Some(pmc_article_url(&pmcid));
    }
    if let Some(pmid) = article_id(root, "pmid") {
        url = Some(pubmed_url(&pmid));
    }
    let doi = article_id(root, "doi");
    if let Some(doi) = &doi {
        url = Some(doi_url(doi));
    }

    let url = url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| HarvesterError::MissingIdentifier {
            service_id: service_id.clone(),
        })?;

    Ok(Identifiers {
        url,
        doi: doi.unwrap_or_default(),
        service_id,
    })
}

/// Year, month and day of one `pub-date` group, if all three are present.
fn date_triple(root: Node<'_, '_>, pub_type: &str) -> Option<(String, String, String)> {
    let component = |name: &str| {
        first_text(
            root,
            &[
                Step::pmc("pub-date").with_attribute("pub-type", pub_type),
                Step::pmc(name),
            ],
        )
    };

    Some((component("year")?, component("month")?, component("day")?))
}

/// "year-month-day" from the epub date, or from the ppub date when the epub
/// date is incomplete. Components are used as written, without padding.
fn extract_date(root: Node<'_, '_>) -> Option<String> {
    let (year, month, day) = date_triple(root, "epub").or_else(|| {
        tracing::debug!("Incomplete epub date, falling back to ppub");
        date_triple(root, "ppub")
    })?;
    Some(format!("{year}-{month}-{day}"))
}

fn first_or_empty(root: Node<'_, '_>, path: &[Step<'_>]) -> String {
    first_text(root, path).unwrap_or_default()
}

fn extract_properties(root: Node<'_, '_>) -> Properties {
    let article_meta =
        |name: &str| first_or_empty(root, &[Step::pmc("article-meta"), Step::pmc(name)]);

    let license_nodes = child_nodes(root, &[Step::pmc("license"), Step::pmc("license-p")]);

    Properties {
        published_in: PublishedIn {
            journal_ids: text_nodes(root, &[Step::pmc("journal-id")]),
            journal_title: text_nodes(
                root,
                &[Step::pmc("journal-title-group"), Step::pmc("journal-title")],
            ),
            issn: text_nodes(root, &[Step::pmc("issn")]),
            volume: article_meta("volume"),
            issue: article_meta("issue"),
            first_page: article_meta("fpage"),
            last_page: article_meta("lpage"),
        },
        author_affiliations: text_nodes(root, &[Step::pmc("aff"), Step::pmc("institution")]),
        publisher: first_or_empty(root, &[Step::pmc("publisher"), Step::pmc("publisher-name")]),
        permissions: Permissions {
            copyright_statement: first_or_empty(
                root,
                &[Step::pmc("permissions"), Step::pmc("copyright-statement")],
            ),
            copyright_year: first_or_empty(
                root,
                &[Step::pmc("permissions"), Step::pmc("copyright-year")],
            ),
            copyright_holder: first_or_empty(
                root,
                &[Step::pmc("permissions"), Step::pmc("copyright-holder")],
            ),
            license: mixed_text(&license_nodes, &[]),
        },
    }
}
