//! Core request/response types for the responder.

use std::str::FromStr;

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::OaiError;

/// The OAI-PMH verbs this repository answers.
///
/// Parsing is case-sensitive: `identify` is not a verb.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, IntoStaticStr, EnumIter,
)]
pub enum Verb {
    Identify,
    ListMetadataFormats,
    ListRecords,
}

impl Verb {
    /// Parse a request verb, mapping anything unknown to [`OaiError::UnsupportedVerb`].
    ///
    /// # Examples
    /// ```
    /// use openarchive::types::Verb;
    ///
    /// assert_eq!(Verb::parse("Identify").unwrap(), Verb::Identify);
    /// assert!(Verb::parse("GetRecord").is_err());
    /// ```
    pub fn parse(verb: &str) -> Result<Self, OaiError> {
        Self::from_str(verb).map_err(|_| OaiError::UnsupportedVerb(verb.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// A metadata format declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataFormat {
    pub prefix: &'static str,
    pub schema: &'static str,
    pub namespace: &'static str,
}

/// Already-extracted parameters of one protocol request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OaiRequest {
    /// Request path relative to the configured base URL.
    pub path: String,
    pub verb: Option<String>,
    pub from: Option<String>,
    pub until: Option<String>,
    pub set: Option<String>,
    pub resumption_token: Option<String>,
}

impl OaiRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_verb(mut self, verb: impl Into<String>) -> Self {
        self.verb = Some(verb.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_until(mut self, until: impl Into<String>) -> Self {
        self.until = Some(until.into());
        self
    }

    pub fn with_set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }

    pub fn with_resumption_token(mut self, token: impl Into<String>) -> Self {
        self.resumption_token = Some(token.into());
        self
    }

    /// Supplied arguments, other than `verb`, under their protocol names.
    #[must_use]
    pub fn arguments(&self) -> Vec<(&'static str, &str)> {
        [
            ("from", self.from.as_deref()),
            ("until", self.until.as_deref()),
            ("set", self.set.as_deref()),
            ("resumptionToken", self.resumption_token.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

/// A rendered response: content type plus XML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OaiResponse {
    pub content_type: &'static str,
    pub body: String,
}
