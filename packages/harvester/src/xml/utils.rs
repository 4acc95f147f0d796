//! Path queries over roxmltree documents.

use roxmltree::Node;

use crate::config::{OAI_NS, PMC_NS};

/// One step of a path query: a qualified element name with an optional
/// attribute predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<'s> {
    pub namespace: &'s str,
    pub name: &'s str,
    pub attribute: Option<(&'s str, &'s str)>,
}

impl<'s> Step<'s> {
    pub const fn new(namespace: &'s str, name: &'s str) -> Self {
        Self {
            namespace,
            name,
            attribute: None,
        }
    }

    /// Element in the PMC article namespace.
    pub const fn pmc(name: &'s str) -> Self {
        Self::new(PMC_NS, name)
    }

    /// Element in the OAI-PMH envelope namespace.
    pub const fn oai(name: &'s str) -> Self {
        Self::new(OAI_NS, name)
    }

    /// Require an attribute with an exact value, like `[@name='value']`.
    pub const fn with_attribute(self, name: &'s str, value: &'s str) -> Self {
        Self {
            attribute: Some((name, value)),
            ..self
        }
    }

    /// Check whether `node` satisfies this step.
    pub fn matches(&self, node: Node<'_, '_>) -> bool {
        is_element(node, self.namespace, self.name)
            && self
                .attribute
                .map_or(true, |(name, value)| node.attribute(name) == Some(value))
    }
}

/// Check if a node is an element with the given qualified name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use pmc_harvester::xml::is_element;
///
/// let xml = r#"<a:root xmlns:a="urn:a"><surname-x/></a:root>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert!(is_element(doc.root_element(), "urn:a", "root"));
/// assert!(!is_element(doc.root_element(), "urn:b", "root"));
/// ```
pub fn is_element(node: Node<'_, '_>, namespace: &str, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(namespace)
        && node.tag_name().name() == name
}

/// Select elements matching `//first/second/...` below `root`.
///
/// The first step matches any descendant (or `root` itself), each further
/// step matches direct children. Results are grouped per first-step match,
/// in document order.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use pmc_harvester::xml::{select, Step};
///
/// let xml = r#"<r xmlns="urn:x"><g><t>1</t></g><t>2</t><g><t>3</t></g></r>"#;
/// let doc = Document::parse(xml).unwrap();
/// let found = select(doc.root(), &[Step::new("urn:x", "g"), Step::new("urn:x", "t")]);
/// let texts: Vec<_> = found.iter().filter_map(|n| n.text()).collect();
/// assert_eq!(texts, vec!["1", "3"]);
/// ```
pub fn select<'a, 'input>(root: Node<'a, 'input>, path: &[Step<'_>]) -> Vec<Node<'a, 'input>> {
    let Some((first, rest)) = path.split_first() else {
        return Vec::new();
    };

    let mut current: Vec<Node<'a, 'input>> =
        root.descendants().filter(|n| first.matches(*n)).collect();

    for step in rest {
        current = current
            .into_iter()
            .flat_map(move |n| n.children().filter(move |c| step.matches(*c)))
            .collect();
    }

    current
}

/// Child nodes (elements and text) of every element matched by `path`,
/// like XPath `path/node()`. Comments and processing instructions are skipped.
pub fn child_nodes<'a, 'input>(
    root: Node<'a, 'input>,
    path: &[Step<'_>],
) -> Vec<Node<'a, 'input>> {
    select(root, path)
        .into_iter()
        .flat_map(|n| n.children().filter(|c| c.is_element() || c.is_text()))
        .collect()
}

/// Text children of every element matched by `path`, untrimmed.
pub fn text_nodes(root: Node<'_, '_>, path: &[Step<'_>]) -> Vec<String> {
    child_nodes(root, path)
        .into_iter()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .map(str::to_string)
        .collect()
}

/// First text child of the elements matched by `path`.
///
/// When several elements match, the first one in document order wins.
pub fn first_text(root: Node<'_, '_>, path: &[Step<'_>]) -> Option<String> {
    let texts = text_nodes(root, path);
    if texts.len() > 1 {
        tracing::debug!(
            element = path.last().map(|s| s.name).unwrap_or_default(),
            matches = texts.len(),
            "Multiple matches, using the first"
        );
    }
    texts.into_iter().next()
}

/// The text directly inside an element before its first child element,
/// or an empty string.
pub fn direct_text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or_default()
}
