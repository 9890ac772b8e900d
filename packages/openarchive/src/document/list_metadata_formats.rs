//! ListMetadataFormats response document.

use super::{Document, DocumentKind, OaiDocument};
use crate::types::{MetadataFormat, Verb};
use crate::xml::NodeId;

/// Advertises the single metadata format the repository serves.
#[derive(Debug, Clone)]
pub struct ListMetadataFormatsDocument {
    base: OaiDocument,
    metadata_prefix: NodeId,
    schema: NodeId,
    metadata_namespace: NodeId,
}

impl ListMetadataFormatsDocument {
    const KIND: DocumentKind = DocumentKind::Verb(Verb::ListMetadataFormats);

    #[must_use]
    pub fn new() -> Self {
        Self::from_base(OaiDocument::with_default_stylesheet(Self::KIND))
    }

    #[must_use]
    pub fn with_stylesheet(stylesheet: &str) -> Self {
        Self::from_base(OaiDocument::new(Self::KIND, stylesheet))
    }

    fn from_base(mut base: OaiDocument) -> Self {
        let list = Some(base.declare(None, "ListMetadataFormats"));
        let format = Some(base.declare(list, "metadataFormat"));
        Self {
            metadata_prefix: base.declare(format, "metadataPrefix"),
            schema: base.declare(format, "schema"),
            metadata_namespace: base.declare(format, "metadataNamespace"),
            base,
        }
    }

    pub fn set_metadata_format(&mut self, format: &MetadataFormat) {
        self.base.set_node_text(self.metadata_prefix, format.prefix);
        self.base.set_node_text(self.schema, format.schema);
        self.base
            .set_node_text(self.metadata_namespace, format.namespace);
    }
}

impl Default for ListMetadataFormatsDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for ListMetadataFormatsDocument {
    fn base(&self) -> &OaiDocument {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OaiDocument {
        &mut self.base
    }
}
