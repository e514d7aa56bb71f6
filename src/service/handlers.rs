use super::orchestrator::KvsService;
use crate::config::KvsConfig;
use crate::request::types::{KvsRequest, RawParams};
use crate::response::envelope::CONTENT_TYPE;

use axum::{
    Extension, Form, Json, Router,
    extract::{DefaultBodyLimit, FromRequest, Query, Request},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::Value;
use std::sync::Arc;

/// Public endpoint; answers both GET and POST.
pub const ENDPOINT_KVS: &str = "/";

/// Worst-case growth of a value on the wire: JSON `\u00XX` escapes.
const BODY_ENCODING_FACTOR: u64 = 6;
/// Room for reserved parameters and key names.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

enum BodyKind {
    Json,
    Form,
    Other,
}

pub fn router(service: Arc<KvsService>) -> Router {
    let limit = body_limit(service.config());
    Router::new()
        .route(ENDPOINT_KVS, get(handle_get).post(handle_post))
        .layer(DefaultBodyLimit::max(limit))
        .layer(Extension(service))
}

/// Request body cap, large enough that the record quota rejects first.
pub fn body_limit(config: &KvsConfig) -> usize {
    let encoded = config.max_data_size.saturating_mul(BODY_ENCODING_FACTOR);
    usize::try_from(encoded)
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_LIMIT_SLACK)
}

pub async fn handle_get(
    Extension(service): Extension<Arc<KvsService>>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let mut request = KvsRequest::new();
    request.add_parameters(RawParams::from_pairs(query));
    respond(service, request).await
}

/// Query-string parameters first, then the body (form or JSON object).
pub async fn handle_post(
    Extension(service): Extension<Arc<KvsService>>,
    http_request: Request,
) -> Response {
    let mut request = KvsRequest::new();

    match Query::<Vec<(String, String)>>::try_from_uri(http_request.uri()) {
        Ok(Query(query)) => {
            request.add_parameters(RawParams::from_pairs(query));
        }
        Err(rejection) => return rejection.into_response(),
    }

    match body_kind(http_request.headers()) {
        BodyKind::Json => match Json::<Value>::from_request(http_request, &()).await {
            Ok(Json(body)) => match RawParams::from_json(body) {
                Some(params) => {
                    request.add_parameters(params);
                }
                None => {
                    tracing::warn!("Rejected JSON body that is not an object");
                    return (StatusCode::BAD_REQUEST, "JSON body must be an object")
                        .into_response();
                }
            },
            Err(rejection) => return rejection.into_response(),
        },
        BodyKind::Form => {
            match Form::<Vec<(String, String)>>::from_request(http_request, &()).await {
                Ok(Form(pairs)) => {
                    request.add_parameters(RawParams::from_pairs(pairs));
                }
                Err(rejection) => return rejection.into_response(),
            }
        }
        BodyKind::Other => {}
    }

    respond(service, request).await
}

fn body_kind(headers: &HeaderMap) -> BodyKind {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/json") {
        BodyKind::Json
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

/// Always `200` unless the failure is on our side.
async fn respond(service: Arc<KvsService>, request: KvsRequest) -> Response {
    match tokio::task::spawn_blocking(move || service.execute(&request)).await {
        Ok(Ok(response)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE)],
            response.body,
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!("Failed to serve request: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
        Err(e) => {
            tracing::error!("Request worker panicked: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}
