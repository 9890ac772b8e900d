//! Identify response document.

use super::{Document, DocumentKind, OaiDocument};
use crate::datetime::utc_from_timestamp;
use crate::error::Result;
use crate::types::Verb;
use crate::xml::NodeId;

/// Repository identity: name, base URL, protocol and datestamp policies.
#[derive(Debug, Clone)]
pub struct IdentifyDocument {
    base: OaiDocument,
    repository_name: NodeId,
    base_url: NodeId,
    protocol_version: NodeId,
    admin_email: NodeId,
    earliest_datestamp: NodeId,
    deleted_record: NodeId,
    granularity: NodeId,
}

impl IdentifyDocument {
    const KIND: DocumentKind = DocumentKind::Verb(Verb::Identify);

    #[must_use]
    pub fn new() -> Self {
        Self::from_base(OaiDocument::with_default_stylesheet(Self::KIND))
    }

    #[must_use]
    pub fn with_stylesheet(stylesheet: &str) -> Self {
        Self::from_base(OaiDocument::new(Self::KIND, stylesheet))
    }

    fn from_base(mut base: OaiDocument) -> Self {
        let identify = Some(base.declare(None, "Identify"));
        // Element order follows the OAI-PMH Identify schema.
        Self {
            repository_name: base.declare(identify, "repositoryName"),
            base_url: base.declare(identify, "baseURL"),
            protocol_version: base.declare(identify, "protocolVersion"),
            admin_email: base.declare(identify, "adminEmail"),
            earliest_datestamp: base.declare(identify, "earliestDatestamp"),
            deleted_record: base.declare(identify, "deletedRecord"),
            granularity: base.declare(identify, "granularity"),
            base,
        }
    }

    pub fn set_repository_name(&mut self, name: &str) {
        self.base.set_node_text(self.repository_name, name);
    }

    pub fn set_base_url(&mut self, url: &str) {
        self.base.set_node_text(self.base_url, url);
    }

    pub fn set_protocol_version(&mut self, version: &str) {
        self.base.set_node_text(self.protocol_version, version);
    }

    pub fn set_admin_email(&mut self, email: &str) {
        self.base.set_node_text(self.admin_email, email);
    }

    /// Set the earliest datestamp from seconds since the UNIX epoch.
    pub fn set_earliest_datestamp(&mut self, seconds: i64) -> Result<()> {
        let rendered = utc_from_timestamp(seconds)?;
        self.base.set_node_text(self.earliest_datestamp, rendered);
        Ok(())
    }

    pub fn set_deleted_record(&mut self, policy: &str) {
        self.base.set_node_text(self.deleted_record, policy);
    }

    pub fn set_granularity(&mut self, granularity: &str) {
        self.base.set_node_text(self.granularity, granularity);
    }
}

impl Default for IdentifyDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for IdentifyDocument {
    fn base(&self) -> &OaiDocument {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OaiDocument {
        &mut self.base
    }
}
