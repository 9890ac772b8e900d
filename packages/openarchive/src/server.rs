//! HTTP surface for the responder.
//!
//! OAI-PMH answers every protocol outcome, errors included, with `200` and
//! an XML body. Only a fatal configuration problem becomes a `500`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::types::OaiRequest;

/// Default path of the OAI endpoint.
pub const DEFAULT_ENDPOINT_PATH: &str = "/oai";

/// Build the request from raw `key=value` pairs.
///
/// A repeated `verb` is illegal in OAI-PMH and is treated like a missing one.
#[must_use]
pub fn request_from_pairs(path: &str, pairs: Vec<(String, String)>) -> OaiRequest {
    let mut request = OaiRequest::new(path);
    let mut verb_count = 0;

    for (key, value) in pairs {
        match key.as_str() {
            "verb" => {
                verb_count += 1;
                request.verb = Some(value);
            }
            "from" => request.from = Some(value),
            "until" => request.until = Some(value),
            "set" => request.set = Some(value),
            "resumptionToken" => request.resumption_token = Some(value),
            _ => {}
        }
    }

    if verb_count > 1 {
        request.verb = None;
    }
    request
}

/// Route path for `endpoint_path`, with exactly one leading `/`.
#[must_use]
pub fn endpoint_route(endpoint_path: &str) -> String {
    format!("/{}", endpoint_path.trim_start_matches('/'))
}

pub fn create_router(dispatcher: Arc<Dispatcher>, endpoint_path: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(&endpoint_route(endpoint_path), get(oai_get).post(oai_post))
        .with_state(dispatcher)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "OK"
}

async fn oai_get(
    State(dispatcher): State<Arc<Dispatcher>>,
    uri: Uri,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    respond(&dispatcher, &request_from_pairs(uri.path(), pairs))
}

async fn oai_post(
    State(dispatcher): State<Arc<Dispatcher>>,
    uri: Uri,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    respond(&dispatcher, &request_from_pairs(uri.path(), pairs))
}

fn respond(dispatcher: &Dispatcher, request: &OaiRequest) -> Response {
    match dispatcher.handle(request) {
        Ok(response) => (
            [(header::CONTENT_TYPE, response.content_type)],
            response.body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "OAI request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Serve the endpoint until ctrl-c.
pub async fn serve(dispatcher: Dispatcher, addr: SocketAddr, endpoint_path: &str) -> Result<()> {
    let app = create_router(Arc::new(dispatcher), endpoint_path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "listening on {addr}, OAI endpoint at {}",
        endpoint_route(endpoint_path)
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
