//! Public routes: the sitemap surface plus liveness.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Query, State},
    http::{StatusCode, header::CONTENT_TYPE},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::application::{error::HttpError, sitemap::SitemapService};

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub sitemap: Arc<SitemapService>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots_txt))
        .route("/_health", get(health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SitemapQuery {
    index: Option<String>,
}

async fn sitemap(State(state): State<HttpState>, Query(query): Query<SitemapQuery>) -> Response {
    // An index that is negative, overflowing, or otherwise not a document
    // number addresses nothing; that is a 404, not a client error.
    let index = match query.index.as_deref() {
        None => None,
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(value) => Some(value),
            Err(_) => return document_not_found(raw),
        },
    };

    match state.sitemap.document(index).await {
        Some(body) => xml_response(body, "application/xml"),
        None => document_not_found(&format!(
            "index {} is outside the document range",
            index.map(|i| i.to_string()).unwrap_or_default()
        )),
    }
}

async fn robots_txt(State(state): State<HttpState>) -> Response {
    plain_response(state.sitemap.robots_txt())
}

async fn health() -> Response {
    plain_response("ok".to_string())
}

fn document_not_found(detail: &str) -> Response {
    HttpError::new(
        "infra::http::public::sitemap",
        StatusCode::NOT_FOUND,
        "No such sitemap document",
        format!("requested sitemap document does not exist: {detail}"),
    )
    .into_response()
}

fn xml_response(body: String, content_type: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn plain_response(body: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
