//! Text extraction from mixed content.

use roxmltree::Node;

use super::utils::{direct_text, Step};

/// Concatenate mixed-content nodes into one string.
///
/// Text nodes are appended verbatim. An element contributes the direct text
/// of the last element visited in a pre-order walk of its subtree, so for
/// `<italic>a<bold>b</bold></italic>` the contribution is `b`. Elements
/// matching one of `blank` contribute empty text when visited.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use pmc_harvester::xml::{child_nodes, mixed_text, Step};
///
/// let xml = r#"<t xmlns="urn:x">E = mc<sup>2</sup> in <i>vacuo</i></t>"#;
/// let doc = Document::parse(xml).unwrap();
/// let nodes = child_nodes(doc.root(), &[Step::new("urn:x", "t")]);
///
/// assert_eq!(mixed_text(&nodes, &[]), "E = mc2 in vacuo");
/// assert_eq!(mixed_text(&nodes, &[Step::new("urn:x", "sup")]), "E = mc in vacuo");
/// ```
pub fn mixed_text(nodes: &[Node<'_, '_>], blank: &[Step<'_>]) -> String {
    let mut text = String::new();

    for node in nodes {
        if node.is_text() {
            text.push_str(node.text().unwrap_or_default());
        } else if node.is_element() {
            let innermost = node
                .descendants()
                .filter(|n| n.is_element())
                .map(|n| {
                    if blank.iter().any(|step| step.matches(n)) {
                        ""
                    } else {
                        direct_text(n)
                    }
                })
                .last()
                .unwrap_or_default();
            text.push_str(innermost);
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::child_nodes;
    use roxmltree::Document;

    const NS: &str = "urn:test";

    fn concat(xml: &str, blank: &[Step<'_>]) -> String {
        let doc = Document::parse(xml).unwrap();
        let nodes = child_nodes(doc.root(), &[Step::new(NS, "t")]);
        mixed_text(&nodes, blank)
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(concat(r#"<t xmlns="urn:test">Plain title</t>"#, &[]), "Plain title");
    }

    #[test]
    fn test_inline_markup_keeps_text_and_tail() {
        assert_eq!(
            concat(r#"<t xmlns="urn:test">The <italic>BRCA1</italic> gene</t>"#, &[]),
            "The BRCA1 gene"
        );
    }

    #[test]
    fn test_innermost_element_wins() {
        // Only the last visited element's own text survives.
        assert_eq!(
            concat(
                r#"<t xmlns="urn:test">x <bold>outer <italic>inner</italic></bold> y</t>"#,
                &[]
            ),
            "x inner y"
        );
    }

    #[test]
    fn test_blank_elements_contribute_nothing() {
        let sup = [Step::new(NS, "sup")];
        assert_eq!(
            concat(r#"<t xmlns="urn:test">Ca<sup>2+</sup> signalling</t>"#, &sup),
            "Ca signalling"
        );
    }

    #[test]
    fn test_blank_only_when_last_visited() {
        let sup = [Step::new(NS, "sup")];
        assert_eq!(
            concat(
                r#"<t xmlns="urn:test"><bold><sup>1</sup><italic>k</italic></bold></t>"#,
                &sup
            ),
            "k"
        );
    }

    #[test]
    fn test_empty_element() {
        assert_eq!(concat(r#"<t xmlns="urn:test">a<break/>b</t>"#, &[]), "ab");
    }

    #[test]
    fn test_multiple_matches_are_concatenated() {
        assert_eq!(
            concat(r#"<r xmlns="urn:test"><t>one </t><t>two</t></r>"#, &[]),
            "one two"
        );
    }
}
