//! Verb dispatch: one request in, one XML response out.
//!
//! Unknown verbs and illegal arguments are protocol errors and come back as
//! an OAI error document. Only a missing operational setting (the admin email
//! for Identify) fails the whole request.

use chrono::{DateTime, Utc};

use crate::config::{
    RepositoryConfig, ADMIN_EMAIL_ENV, CONTENT_TYPE, DELETED_RECORD_POLICY, DUBLIN_CORE,
    PROTOCOL_VERSION, SUPPORTED_GRANULARITY,
};
use crate::datetime::Granularity;
use crate::document::{
    Document, ErrorDocument, IdentifyDocument, ListMetadataFormatsDocument, ListRecordsDocument,
};
use crate::error::{OaiError, Result};
use crate::token::{validate_and_get_page, TokenContext};
use crate::types::{OaiRequest, OaiResponse, Verb};

/// Answers protocol requests for one repository.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: RepositoryConfig,
}

impl Dispatcher {
    pub fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Handle `request` with the current time as response date.
    pub fn handle(&self, request: &OaiRequest) -> Result<OaiResponse> {
        self.handle_at(request, Utc::now())
    }

    /// Handle `request`, stamping the response with `now`.
    pub fn handle_at(&self, request: &OaiRequest, now: DateTime<Utc>) -> Result<OaiResponse> {
        let request_url = self.config.request_url(&request.path);

        let verb = match Verb::parse(request.verb.as_deref().unwrap_or_default()) {
            Ok(verb) => verb,
            Err(err) => {
                tracing::warn!(verb = ?request.verb, url = %request_url, "unsupported OAI verb");
                return self.error_response(err, None, &request_url, now);
            }
        };

        tracing::debug!(%verb, url = %request_url, "handling OAI request");

        let built = match verb {
            Verb::Identify => self.identify(&request_url, now),
            Verb::ListMetadataFormats => Ok(self.list_metadata_formats(&request_url, now)),
            Verb::ListRecords => self.list_records(request, &request_url, now),
        };

        match built {
            Ok(body) => Ok(Self::response(body)),
            Err(err) => self.error_response(err, Some((verb, request)), &request_url, now),
        }
    }

    fn response(body: String) -> OaiResponse {
        OaiResponse {
            content_type: CONTENT_TYPE,
            body,
        }
    }

    /// Render a recoverable error as an error document; propagate fatal ones.
    ///
    /// `echo` is the understood verb and request, echoed on `request` when the
    /// error code allows it.
    fn error_response(
        &self,
        err: OaiError,
        echo: Option<(Verb, &OaiRequest)>,
        request_url: &str,
        now: DateTime<Utc>,
    ) -> Result<OaiResponse> {
        let Some(mut doc) = ErrorDocument::from_error(&err, &self.config.stylesheet) else {
            tracing::error!(error = %err, url = %request_url, "cannot answer OAI request");
            return Err(err);
        };

        tracing::debug!(error = %err, "rendering OAI error document");
        doc.set_response_date(now);
        doc.set_request_url(request_url);
        if let Some((verb, request)) = echo.filter(|_| err.echoes_request()) {
            let mut arguments = request.arguments();
            if verb == Verb::ListRecords {
                arguments.insert(0, ("metadataPrefix", DUBLIN_CORE.prefix));
            }
            doc.echo_request(verb, &arguments);
        }
        Ok(Self::response(doc.document_body()))
    }

    fn identify(&self, request_url: &str, now: DateTime<Utc>) -> Result<String> {
        let admin_email = self
            .config
            .admin_email
            .as_deref()
            .ok_or_else(|| {
                OaiError::MissingConfiguration(format!(
                    "administrator email ({ADMIN_EMAIL_ENV}) must be set"
                ))
            })?;

        let mut doc = IdentifyDocument::with_stylesheet(&self.config.stylesheet);
        doc.set_response_date(now);
        doc.set_request_url(request_url);
        doc.set_base_url(request_url);
        doc.set_protocol_version(PROTOCOL_VERSION);
        doc.set_deleted_record(DELETED_RECORD_POLICY);
        doc.set_granularity(SUPPORTED_GRANULARITY);
        doc.set_admin_email(admin_email);
        doc.set_earliest_datestamp(self.config.earliest_datestamp)
            .map_err(|_| {
                OaiError::InvalidConfiguration(format!(
                    "earliest datestamp {} is not a representable timestamp",
                    self.config.earliest_datestamp
                ))
            })?;
        doc.set_repository_name(&self.config.repository_name);

        Ok(doc.document_body())
    }

    fn list_metadata_formats(&self, request_url: &str, now: DateTime<Utc>) -> String {
        let mut doc = ListMetadataFormatsDocument::with_stylesheet(&self.config.stylesheet);
        doc.set_response_date(now);
        doc.set_request_url(request_url);
        doc.set_metadata_format(&DUBLIN_CORE);
        doc.document_body()
    }

    fn list_records(
        &self,
        request: &OaiRequest,
        request_url: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let context = list_records_context(request)?;

        let mut doc = ListRecordsDocument::with_stylesheet(&self.config.stylesheet);
        doc.set_response_date(now);
        doc.set_request_url(request_url);
        doc.set_metadata_prefix(DUBLIN_CORE.prefix);

        if let Some(token) = request.resumption_token.as_deref() {
            let page = validate_and_get_page(token, &context)?;
            tracing::debug!(page = page.get(), "resumption token accepted");
            doc.set_resumption_token(token);
        }

        Ok(doc.document_body())
    }
}

/// Validate the ListRecords filter arguments and bind them into a token context.
fn list_records_context(request: &OaiRequest) -> Result<TokenContext> {
    let from = datestamp_argument("from", request.from.as_deref())?;
    let until = datestamp_argument("until", request.until.as_deref())?;

    if let (Some((from, from_granularity)), Some((until, until_granularity))) = (&from, &until) {
        if from_granularity != until_granularity {
            return Err(OaiError::BadArgument(
                "'from' and 'until' must have the same granularity".to_string(),
            ));
        }
        if from > until {
            return Err(OaiError::BadArgument(format!(
                "'from' ({from}) is later than 'until' ({until})"
            )));
        }
    }

    let set = request
        .set
        .as_deref()
        .map(|raw| {
            raw.parse::<u64>()
                .ok()
                .filter(|set| *set > 0)
                .ok_or_else(|| {
                    OaiError::BadArgument(format!("'set' must be a positive integer, got '{raw}'"))
                })
        })
        .transpose()?;

    Ok(TokenContext {
        verb: Verb::ListRecords.as_str().to_string(),
        from: from.map(|(value, _)| value),
        until: until.map(|(value, _)| value),
        set,
    })
}

fn datestamp_argument(name: &str, value: Option<&str>) -> Result<Option<(String, Granularity)>> {
    value
        .map(|v| {
            Granularity::detect(v)
                .map(|granularity| (v.to_string(), granularity))
                .ok_or_else(|| {
                    OaiError::BadArgument(format!("'{name}' is not a supported datestamp: '{v}'"))
                })
        })
        .transpose()
}
