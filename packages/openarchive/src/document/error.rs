//! Protocol error response document.
//!
//! The `request` element of a `badVerb` or `badArgument` document carries
//! no attributes. Other error documents echo the verb and arguments of the
//! request through [`ErrorDocument::echo_request`].

use super::{Document, DocumentKind, OaiDocument};
use crate::error::OaiError;
use crate::types::Verb;
use crate::xml::NodeId;

/// OAI-PMH `badVerb` error code.
pub const BAD_VERB: &str = "badVerb";

const BAD_VERB_MESSAGE: &str = "Value of the verb argument is not a legal OAI-PMH verb, the verb argument is missing, or the verb argument is repeated.";

#[derive(Debug, Clone)]
pub struct ErrorDocument {
    base: OaiDocument,
    error: NodeId,
}

impl ErrorDocument {
    /// An error document for an unrecognized or missing verb.
    #[must_use]
    pub fn bad_verb() -> Self {
        Self::with_code(BAD_VERB, BAD_VERB_MESSAGE)
    }

    #[must_use]
    pub fn with_code(code: &str, message: &str) -> Self {
        let mut doc = Self::from_base(OaiDocument::with_default_stylesheet(DocumentKind::Error));
        doc.set_error(code, message);
        doc
    }

    /// An empty error document referencing `stylesheet`; call [`Self::set_error`] next.
    #[must_use]
    pub fn with_stylesheet(stylesheet: &str) -> Self {
        Self::from_base(OaiDocument::new(DocumentKind::Error, stylesheet))
    }

    /// Build the error document for a recoverable protocol error.
    ///
    /// Returns `None` for errors that have no OAI error code and must abort
    /// the request instead.
    #[must_use]
    pub fn from_error(err: &OaiError, stylesheet: &str) -> Option<Self> {
        let code = err.error_code()?;
        let mut doc = Self::with_stylesheet(stylesheet);
        match err {
            OaiError::UnsupportedVerb(_) => doc.set_error(code, BAD_VERB_MESSAGE),
            _ => doc.set_error(code, &err.to_string()),
        }
        Some(doc)
    }

    fn from_base(mut base: OaiDocument) -> Self {
        let error = base.declare(None, "error");
        Self { base, error }
    }

    pub fn set_error(&mut self, code: &str, message: &str) {
        self.base.set_node_attribute(self.error, "code", code);
        self.base.set_node_text(self.error, message);
    }

    /// Echo `verb` and `arguments` as attributes of `request`.
    pub fn echo_request(&mut self, verb: Verb, arguments: &[(&str, &str)]) {
        self.base.set_request_argument("verb", verb.as_str());
        for (name, value) in arguments {
            self.base.set_request_argument(name, value);
        }
    }
}

impl Document for ErrorDocument {
    fn base(&self) -> &OaiDocument {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OaiDocument {
        &mut self.base
    }
}
