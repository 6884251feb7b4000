use crate::{
    config::Config,
    middleware::cors::{allowed_origin, ALLOWED_METHODS},
    services::leaderboard::{models::LeaderboardRequest, Leaderboard, UpstreamResponse},
};
use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use bytes::Bytes;
use log::{debug, error, warn};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Error type used by the leaderboard proxy, every variant is
/// responded to with a JSON error body
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The request body did not match the expected shape
    #[error(
        "Bad Request: expected {{ contestId: number, segment: {{ limit: number, offset: number }} }}"
    )]
    InvalidBody(#[source] serde_json::Error),
    /// The request origin is not in the allow-list
    #[error("Forbidden: origin not allowed")]
    OriginRejected,
    /// The request used a method other than POST or OPTIONS
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    /// The upstream could not be reached or the response could not be read
    #[error("Proxy failed")]
    Upstream(#[from] reqwest::Error),
}

/// JSON body for error responses
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// POST /api/leaderboard
///
/// Forwards a leaderboard request from an allowed origin to the upstream
/// scoring service relaying the upstream status, content type and body
/// unchanged
pub async fn proxy_leaderboard(
    Extension(config): Extension<Arc<Config>>,
    Extension(leaderboard): Extension<Arc<Leaderboard>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    if allowed_origin(&config, &headers).is_none() {
        warn!(
            "Rejected leaderboard request from origin {:?}",
            headers.get(header::ORIGIN)
        );
        return Err(ProxyError::OriginRejected);
    }

    let request: LeaderboardRequest =
        serde_json::from_slice(&body).map_err(ProxyError::InvalidBody)?;

    let shape = config.upstream.forward_style.shape();
    let UpstreamResponse {
        status,
        content_type,
        body,
    } = leaderboard
        .forward(shape, &request)
        .await
        .map_err(|err| {
            error!("Failed to forward leaderboard request: {}", err);
            err
        })?;

    debug!("Relaying upstream leaderboard response ({status})");

    let content_type =
        content_type.unwrap_or_else(|| HeaderValue::from_static("application/json"));
    Ok((status, [(header::CONTENT_TYPE, content_type)], body).into_response())
}

/// Fallback for any method other than POST and OPTIONS
pub async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

/// IntoResponse implementation for ProxyError to allow it to be
/// used within the result type as a error response
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::OriginRejected => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        };

        let message = match &self {
            Self::InvalidBody(err) => Some(err.to_string()),
            Self::Upstream(err) => Some(err.to_string()),
            _ => None,
        };

        let body = ErrorBody {
            error: self.to_string(),
            message,
        };

        let mut response = (status, Json(body)).into_response();
        if let Self::MethodNotAllowed = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        }
        response
    }
}
