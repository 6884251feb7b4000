use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use std::sync::Arc;

/// Methods accepted by the proxied routes
pub const ALLOWED_METHODS: &str = "POST,OPTIONS";
/// Headers browsers are allowed to send to the proxied routes
const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";

/// Obtains the request origin if it is present in the allow-list
pub fn allowed_origin<'a>(config: &Config, headers: &'a HeaderMap) -> Option<&'a HeaderValue> {
    headers
        .get(header::ORIGIN)
        .filter(|origin| config.cors.is_allowed(origin))
}

/// Middleware layer function for appending CORS headers to requests
/// and responding to preflight requests
///
/// The allow origin header is only set when the request origin is
/// in the allow-list, other origins are left for the browser to block
///
/// `config` The config containing the allow-list
/// `req`    The request to handle
/// `next`   The next layer to use
pub async fn cors_layer(
    Extension(config): Extension<Arc<Config>>,
    req: Request,
    next: Next,
) -> Response {
    let origin = allowed_origin(&config, req.headers()).cloned();

    // Preflight requests are answered without reaching the route
    let mut res: Response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = res.headers_mut();
    if let Some(origin) = origin {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    res
}
