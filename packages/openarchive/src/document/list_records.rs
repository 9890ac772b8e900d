//! ListRecords response document.
//!
//! Record retrieval lives outside this crate, so the `ListRecords` container
//! stays empty. The document still echoes the metadata prefix and any
//! accepted resumption token on `request`.

use super::{Document, DocumentKind, OaiDocument};
use crate::types::Verb;

#[derive(Debug, Clone)]
pub struct ListRecordsDocument {
    base: OaiDocument,
}

impl ListRecordsDocument {
    const KIND: DocumentKind = DocumentKind::Verb(Verb::ListRecords);

    #[must_use]
    pub fn new() -> Self {
        Self::from_base(OaiDocument::with_default_stylesheet(Self::KIND))
    }

    #[must_use]
    pub fn with_stylesheet(stylesheet: &str) -> Self {
        Self::from_base(OaiDocument::new(Self::KIND, stylesheet))
    }

    fn from_base(mut base: OaiDocument) -> Self {
        base.declare(None, "ListRecords");
        Self { base }
    }

    pub fn set_metadata_prefix(&mut self, prefix: &str) {
        self.base.set_request_argument("metadataPrefix", prefix);
    }

    pub fn set_resumption_token(&mut self, token: &str) {
        self.base.set_request_argument("resumptionToken", token);
    }
}

impl Default for ListRecordsDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for ListRecordsDocument {
    fn base(&self) -> &OaiDocument {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OaiDocument {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct() {
        let doc = ListRecordsDocument::new();
        assert_eq!(doc.base().attribute("request", "verb"), Some("ListRecords"));
        assert!(doc.base().element("ListRecords").is_some());
        assert_eq!(doc.base().attribute("request", "metadataPrefix"), None);
    }

    #[test]
    fn test_request_arguments_are_replaced() {
        let mut doc = ListRecordsDocument::new();
        doc.set_metadata_prefix("oai_dc");
        doc.set_resumption_token("abc");
        doc.set_resumption_token("def");

        assert_eq!(
            doc.base().attribute("request", "metadataPrefix"),
            Some("oai_dc")
        );
        assert_eq!(doc.base().attribute("request", "resumptionToken"), Some("def"));
        assert_eq!(doc.document_body().matches("resumptionToken=").count(), 1);
    }
}
