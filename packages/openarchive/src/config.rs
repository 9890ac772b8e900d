//! Protocol constants and repository configuration.

use crate::error::{OaiError, Result};
use crate::types::MetadataFormat;

/// Environment variable holding the repository administrator email.
pub const ADMIN_EMAIL_ENV: &str = "OAI_API_ADMIN_EMAIL";

/// OAI-PMH protocol version implemented by this responder.
pub const PROTOCOL_VERSION: &str = "2.0";

/// How the repository represents deleted records.
pub const DELETED_RECORD_POLICY: &str = "persistent";

/// Datestamp granularity advertised in Identify responses.
pub const SUPPORTED_GRANULARITY: &str = "YYYY-MM-DDThh:mm:ssZ";

/// OAI-PMH 2.0 namespace, used as the default namespace of every response.
pub const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";

/// XML Schema instance namespace.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Schema location of the OAI-PMH response envelope.
pub const OAI_SCHEMA_LOCATION: &str =
    "http://www.openarchives.org/OAI/2.0/ http://www.openarchives.org/OAI/2.0/OAI-PMH.xsd";

/// Default stylesheet referenced by the `xml-stylesheet` processing instruction.
pub const DEFAULT_STYLESHEET: &str = "/resources/oai2.xsl";

/// Content type of every response body.
pub const CONTENT_TYPE: &str = "text/xml";

/// The single metadata format this repository serves.
pub const DUBLIN_CORE: MetadataFormat = MetadataFormat {
    prefix: "oai_dc",
    schema: "http://www.openarchives.org/OAI/2.0/oai_dc.xsd",
    namespace: "http://www.openarchives.org/OAI/2.0/oai_dc/",
};

/// Immutable repository settings, loaded once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Absolute base URL of the site (e.g. `https://example.org/`).
    pub base_url: String,
    /// Display name reported by Identify.
    pub repository_name: String,
    /// Administrator email; Identify cannot be answered without it.
    pub admin_email: Option<String>,
    /// Earliest datestamp as seconds since the UNIX epoch.
    pub earliest_datestamp: i64,
    /// Href of the response stylesheet.
    pub stylesheet: String,
}

impl RepositoryConfig {
    pub fn new(base_url: impl Into<String>, repository_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            repository_name: repository_name.into(),
            admin_email: None,
            earliest_datestamp: 0,
            stylesheet: DEFAULT_STYLESHEET.to_string(),
        }
    }

    pub fn with_admin_email(mut self, admin_email: impl Into<String>) -> Self {
        self.admin_email = Some(admin_email.into());
        self
    }

    pub fn with_earliest_datestamp(mut self, earliest_datestamp: i64) -> Self {
        self.earliest_datestamp = earliest_datestamp;
        self
    }

    pub fn with_stylesheet(mut self, stylesheet: impl Into<String>) -> Self {
        self.stylesheet = stylesheet.into();
        self
    }

    /// Load configuration from the environment.
    ///
    /// A missing admin email is not an error here: the service still answers
    /// every verb except Identify, which then fails per request.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("OAI_BASE_URL").unwrap_or_else(|_| "http://localhost:8000/".into());

        let repository_name =
            std::env::var("OAI_REPOSITORY_NAME").unwrap_or_else(|_| "OpenArchive".into());

        let admin_email = std::env::var(ADMIN_EMAIL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());

        let earliest_datestamp = match std::env::var("OAI_EARLIEST_DATESTAMP") {
            Ok(v) => parse_earliest_datestamp(&v)?,
            Err(_) => 0,
        };

        let stylesheet =
            std::env::var("OAI_STYLESHEET").unwrap_or_else(|_| DEFAULT_STYLESHEET.into());

        if admin_email.is_none() {
            tracing::warn!("{ADMIN_EMAIL_ENV} is not set; Identify requests will fail");
        }

        Ok(Self {
            base_url,
            repository_name,
            admin_email,
            earliest_datestamp,
            stylesheet,
        })
    }

    /// Join the base URL with a request path into an absolute request URL.
    ///
    /// # Examples
    /// ```
    /// use openarchive::config::RepositoryConfig;
    ///
    /// let config = RepositoryConfig::new("https://example.org/", "Repo");
    /// assert_eq!(config.request_url("/oai"), "https://example.org/oai");
    /// assert_eq!(config.request_url("oai"), "https://example.org/oai");
    /// ```
    #[must_use]
    pub fn request_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

/// Parse `OAI_EARLIEST_DATESTAMP`: UNIX seconds that must map to a real instant.
fn parse_earliest_datestamp(raw: &str) -> Result<i64> {
    let seconds: i64 = raw.trim().parse().map_err(|_| {
        OaiError::InvalidConfiguration(format!(
            "OAI_EARLIEST_DATESTAMP must be an integer, got '{raw}'"
        ))
    })?;

    if chrono::DateTime::from_timestamp(seconds, 0).is_none() {
        return Err(OaiError::InvalidConfiguration(format!(
            "OAI_EARLIEST_DATESTAMP {seconds} is not a representable timestamp"
        )));
    }
    Ok(seconds)
}
