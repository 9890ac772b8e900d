//! OAI-PMH response documents.
//!
//! Every response shares one envelope: an `xml-stylesheet` processing
//! instruction, the `OAI-PMH` root with its namespace and schema location, a
//! `responseDate` and a `request` element echoing the request URL. Each verb
//! document declares the rest of its elements up front, so setters only ever
//! rewrite existing nodes.
//!
//! # Example
//!
//! ```
//! use openarchive::document::{Document, IdentifyDocument};
//!
//! let mut doc = IdentifyDocument::new();
//! doc.set_repository_name("repo1");
//! doc.set_repository_name("repo2");
//! assert_eq!(doc.base().value("repositoryName"), Some("repo2"));
//! ```

mod error;
mod identify;
mod list_metadata_formats;
mod list_records;

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::{DEFAULT_STYLESHEET, OAI_NAMESPACE, OAI_SCHEMA_LOCATION, XSI_NAMESPACE};
use crate::datetime::format_utc;
use crate::types::Verb;
use crate::xml::{NodeId, XmlTree};

pub use error::ErrorDocument;
pub use identify::IdentifyDocument;
pub use list_metadata_formats::ListMetadataFormatsDocument;
pub use list_records::ListRecordsDocument;

/// Root element name of every response.
pub const ROOT_ELEMENT: &str = "OAI-PMH";

/// Which response a document represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Verb(Verb),
    Error,
}

impl DocumentKind {
    /// The verb echoed on the `request` element, if any.
    #[must_use]
    pub fn verb(&self) -> Option<Verb> {
        match self {
            Self::Verb(verb) => Some(*verb),
            Self::Error => None,
        }
    }
}

/// The shared envelope plus a registry of named live elements.
#[derive(Debug, Clone)]
pub struct OaiDocument {
    kind: DocumentKind,
    tree: XmlTree,
    elements: HashMap<&'static str, NodeId>,
    response_date: NodeId,
    request: NodeId,
}

impl OaiDocument {
    /// Build the envelope for `kind`, referencing `stylesheet`.
    pub fn new(kind: DocumentKind, stylesheet: &str) -> Self {
        let mut tree = XmlTree::new(ROOT_ELEMENT);
        tree.add_processing_instruction(
            "xml-stylesheet",
            format!("type=\"text/xsl\" href=\"{}\"", crate::xml::escape(stylesheet)),
        );

        let root = tree.root();
        tree.set_attribute(root, "xmlns", OAI_NAMESPACE);
        tree.set_attribute(root, "xmlns:xsi", XSI_NAMESPACE);
        tree.set_attribute(root, "xsi:schemaLocation", OAI_SCHEMA_LOCATION);

        let response_date = tree.append_element(root, "responseDate");
        let request = tree.append_element(root, "request");
        if let Some(verb) = kind.verb() {
            tree.set_attribute(request, "verb", verb.as_str());
        }

        let elements = HashMap::from([("responseDate", response_date), ("request", request)]);

        Self {
            kind,
            tree,
            elements,
            response_date,
            request,
        }
    }

    pub(crate) fn with_default_stylesheet(kind: DocumentKind) -> Self {
        Self::new(kind, DEFAULT_STYLESHEET)
    }

    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Declare a named element under `parent` (the root when `None`).
    pub(crate) fn declare(&mut self, parent: Option<NodeId>, name: &'static str) -> NodeId {
        let parent = parent.unwrap_or_else(|| self.tree.root());
        let id = self.tree.append_element(parent, name);
        self.elements.insert(name, id);
        id
    }

    pub(crate) fn set_node_text(&mut self, node: NodeId, value: impl Into<String>) {
        self.tree.set_text(node, value);
    }

    pub(crate) fn set_node_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        self.tree.set_attribute(node, name, value);
    }

    /// Live node registered under `name`.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<NodeId> {
        self.elements.get(name).copied()
    }

    /// Current text of the element registered under `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.element(name).and_then(|id| self.tree.text(id))
    }

    /// Attribute of the element registered under `name`.
    #[must_use]
    pub fn attribute(&self, name: &str, attribute: &str) -> Option<&str> {
        self.element(name)
            .and_then(|id| self.tree.attribute(id, attribute))
    }

    /// Names of every registered element.
    pub fn element_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.elements.keys().copied()
    }

    #[must_use]
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    pub fn set_response_date(&mut self, instant: DateTime<Utc>) {
        self.tree.set_text(self.response_date, format_utc(&instant));
    }

    pub fn set_request_url(&mut self, url: &str) {
        self.tree.set_text(self.request, url);
    }

    /// Echo a request argument as an attribute of `request`.
    pub fn set_request_argument(&mut self, name: &str, value: &str) {
        self.tree.set_attribute(self.request, name, value);
    }

    #[must_use]
    pub fn to_xml_string(&self) -> String {
        self.tree.to_xml_string()
    }
}

/// Common behavior of all response documents.
pub trait Document {
    fn base(&self) -> &OaiDocument;

    fn base_mut(&mut self) -> &mut OaiDocument;

    fn set_response_date(&mut self, instant: DateTime<Utc>) {
        self.base_mut().set_response_date(instant);
    }

    fn set_request_url(&mut self, url: &str) {
        self.base_mut().set_request_url(url);
    }

    /// Serialize the document into the response body.
    fn document_body(&self) -> String {
        self.base().to_xml_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_envelope_shape() {
        let mut doc = OaiDocument::new(DocumentKind::Verb(Verb::ListRecords), "/oai.xsl");
        let instant = Utc.with_ymd_and_hms(2022, 1, 1, 7, 0, 0).unwrap();
        doc.set_response_date(instant);
        doc.set_request_url("https://example.org/oai");

        let xml = doc.to_xml_string();
        assert!(xml.contains("<?xml-stylesheet type=\"text/xsl\" href=\"/oai.xsl\"?>"));

        let parsed = roxmltree::Document::parse(&xml).unwrap();
        let root = parsed.root_element();
        assert_eq!(root.tag_name().name(), ROOT_ELEMENT);
        assert_eq!(root.tag_name().namespace(), Some(OAI_NAMESPACE));
        assert_eq!(
            root.attribute((XSI_NAMESPACE, "schemaLocation")),
            Some(OAI_SCHEMA_LOCATION)
        );

        assert_eq!(doc.value("responseDate"), Some("2022-01-01T07:00:00Z"));
        assert_eq!(doc.value("request"), Some("https://example.org/oai"));
        assert_eq!(doc.attribute("request", "verb"), Some("ListRecords"));
    }

    #[test]
    fn test_error_kind_has_no_verb_attribute() {
        let doc = OaiDocument::with_default_stylesheet(DocumentKind::Error);
        assert_eq!(doc.kind().verb(), None);
        assert_eq!(doc.attribute("request", "verb"), None);
    }

    #[test]
    fn test_declare_registers_element() {
        let mut doc = OaiDocument::with_default_stylesheet(DocumentKind::Error);
        let id = doc.declare(None, "error");
        assert_eq!(doc.element("error"), Some(id));

        let mut names: Vec<_> = doc.element_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["error", "request", "responseDate"]);
    }

    #[test]
    fn test_set_request_argument() {
        let mut doc = OaiDocument::with_default_stylesheet(DocumentKind::Verb(Verb::ListRecords));
        doc.set_request_argument("metadataPrefix", "oai_dc");
        assert_eq!(doc.attribute("request", "metadataPrefix"), Some("oai_dc"));
    }
}
