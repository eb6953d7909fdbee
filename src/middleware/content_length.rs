//! Response post-processing for 204 No Content.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};

/// Any 204 response must carry an explicit `Content-Length: 0` header.
pub async fn normalize_no_content(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    if response.status() == StatusCode::NO_CONTENT {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
    }

    response
}
