//! OpenArchive - an OAI-PMH 2.0 responder.
//!
//! Given the verb and arguments of a harvesting request, this crate builds
//! the XML response: repository identity, supported metadata formats, a
//! (stub) record list, or a protocol error document.
//!
//! # Example
//!
//! ```
//! use openarchive::{Dispatcher, OaiRequest, RepositoryConfig};
//!
//! let config = RepositoryConfig::new("https://example.org/", "Example Repository")
//!     .with_admin_email("admin@example.org");
//! let dispatcher = Dispatcher::new(config);
//!
//! let response = dispatcher
//!     .handle(&OaiRequest::new("oai").with_verb("Identify"))
//!     .unwrap();
//! assert_eq!(response.content_type, "text/xml");
//! assert!(response.body.contains("<repositoryName>Example Repository</repositoryName>"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Protocol constants and repository configuration
//! - [`types`]: Verbs, requests and responses
//! - [`error`]: Error types and Result alias
//! - [`datetime`]: Local/UTC conversion and granularity validation
//! - [`token`]: Resumption token codec
//! - [`xml`]: Arena-backed XML tree
//! - [`document`]: Response documents per verb
//! - [`dispatcher`]: Verb dispatch
//! - [`server`]: HTTP surface
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod datetime;
pub mod dispatcher;
pub mod document;
pub mod error;
pub mod server;
pub mod token;
pub mod types;
pub mod xml;

pub use dispatcher::Dispatcher;

pub use config::RepositoryConfig;
pub use error::{OaiError, Result};
pub use token::{ResumptionToken, TokenContext};
pub use types::{OaiRequest, OaiResponse, Verb};
