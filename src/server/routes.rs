use std::borrow::Cow;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::data::{DatasetKind, FeatureService};
use crate::server::api::{self, ApiError, DatasetResponse, CACHE_CONTROL, GEOJSON_CONTENT_TYPE};

const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut builder = axum::http::Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, self.content_type);
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        builder
            .body(Body::from(self.body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

/// Route a dataset request. `target` is the path with its optional query string.
pub async fn route_request(service: &FeatureService, method: &str, target: &str) -> HttpResponse {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    match DatasetKind::from_path(path) {
        Some(kind) => {
            let date = date_param(query);
            match api::dataset_payload(service, method, kind, date.as_deref()).await {
                Ok(response) => dataset_response(response),
                Err(err) => error_response(&err),
            }
        }
        None => text_response(404, "Not Found", "route not found"),
    }
}

/// First `date` value in a query string, percent-decoded.
pub fn date_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == "date")
        .map(|(_, value)| value.into_owned())
}

fn dataset_response(response: DatasetResponse) -> HttpResponse {
    let DatasetResponse { payload, head_only } = response;

    // Stated explicitly so HEAD advertises the length GET would send.
    let mut headers = vec![
        ("Content-Length", payload.body.len().to_string()),
        ("Cache-Control", CACHE_CONTROL.to_string()),
        ("X-Feature-Count", payload.count.to_string()),
    ];
    if let Some(year) = payload.year.year() {
        headers.push(("X-Filter-Year", year.to_string()));
    }

    HttpResponse {
        status_code: 200,
        status_text: "OK",
        content_type: GEOJSON_CONTENT_TYPE,
        headers,
        body: if head_only { Bytes::new() } else { payload.body },
    }
}

fn error_response(err: &ApiError) -> HttpResponse {
    let status_code = err.status_code();
    let mut response = text_response(status_code, status_text(status_code), err.public_message());
    if matches!(err, ApiError::MethodNotAllowed) {
        response.headers.push(("Allow", "GET, HEAD".to_string()));
    }
    response
}

fn text_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: TEXT_CONTENT_TYPE,
        headers: Vec::new(),
        body: Bytes::from(message.to_string()),
    }
}

fn status_text(status_code: u16) -> &'static str {
    StatusCode::from_u16(status_code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown")
}
