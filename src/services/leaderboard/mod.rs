//! Client for the upstream contest scoring service. Provides the
//! transparent forwarding used by the proxy and the probing fetch used
//! by the rendered leaderboard page.

use self::models::{LeaderboardEntry, LeaderboardRequest, RequestShape, SegmentBody};
use crate::config::UpstreamConfig;
use axum::http::{header, HeaderValue, StatusCode};
use bytes::Bytes;
use log::debug;
use reqwest::{Client, RequestBuilder};
use std::fmt::{self, Display};
use thiserror::Error;

pub mod models;

/// Maximum number of characters of a failed response body kept
/// when reporting probe failures
const SNIPPET_LENGTH: usize = 200;

/// Service for making requests to the upstream scoring service, holds
/// the shared connection pool and the upstream details
pub struct Leaderboard {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Response from the upstream kept as raw parts so that it can be
/// relayed without reinterpretation
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl Leaderboard {
    /// Creates a new leaderboard service for the provided upstream
    pub fn new(config: &UpstreamConfig) -> reqwest::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Creates the request builder for the provided shape with the
    /// accept header and credentials attached
    fn request(&self, shape: RequestShape, request: &LeaderboardRequest) -> (String, RequestBuilder) {
        let url = shape.url(&self.base_url, request);
        let builder = match shape {
            RequestShape::PathScoped => self.client.post(&url).json(&SegmentBody {
                segment: &request.segment,
            }),
            RequestShape::Flat => self.client.post(&url).json(request),
            RequestShape::Query => self.client.get(&url),
        };

        let mut builder = builder.header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        (url, builder)
    }

    /// Forwards the request to the upstream using the provided shape and
    /// returns the raw response
    ///
    /// `shape`   The request shape to forward with
    /// `request` The contest and segment to request
    pub async fn forward(
        &self,
        shape: RequestShape,
        request: &LeaderboardRequest,
    ) -> reqwest::Result<UpstreamResponse> {
        let (url, builder) = self.request(shape, request);
        debug!("Forwarding leaderboard request ({shape}: {url})");

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }

    /// Fetches the ranked entries attempting each of the provided shapes
    /// in order, stopping at the first successful response
    ///
    /// `shapes`  The shapes to attempt
    /// `request` The contest and segment to request
    pub async fn fetch(
        &self,
        shapes: &[RequestShape],
        request: &LeaderboardRequest,
    ) -> Result<Vec<LeaderboardEntry>, FetchError> {
        let mut attempts = Vec::with_capacity(shapes.len());

        for &shape in shapes {
            let (url, builder) = self.request(shape, request);
            debug!("Probing leaderboard ({shape}: {url})");

            let outcome = match builder.send().await {
                Ok(response) => {
                    let status = response.status();
                    match response.bytes().await {
                        Ok(body) if status.is_success() => {
                            return serde_json::from_slice(&body).map_err(|source| {
                                FetchError::Malformed { shape, url, source }
                            });
                        }
                        Ok(body) => AttemptOutcome::Status {
                            status,
                            snippet: snippet(&body),
                        },
                        Err(err) => AttemptOutcome::Transport(err.to_string()),
                    }
                }
                Err(err) => AttemptOutcome::Transport(err.to_string()),
            };

            debug!("Leaderboard probe failed ({shape}: {url})");
            attempts.push(ProbeAttempt {
                shape,
                url,
                outcome,
            });
        }

        Err(FetchError::AllCandidatesFailed(ProbeFailures(attempts)))
    }
}

/// Creates a lossy text snippet of a response body
fn snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut chars = text.chars();
    let mut value: String = chars.by_ref().take(SNIPPET_LENGTH).collect();
    if chars.next().is_some() {
        value.push_str("...");
    }
    value
}

/// Errors that can occur while fetching the entries for rendering
#[derive(Debug, Error)]
pub enum FetchError {
    /// A request succeeded but the body could not be parsed
    #[error("Leaderboard {shape} ({url}) returned a malformed body: {source}")]
    Malformed {
        shape: RequestShape,
        url: String,
        source: serde_json::Error,
    },
    /// None of the attempted shapes succeeded
    #[error("{0}")]
    AllCandidatesFailed(ProbeFailures),
}

/// Record of a single failed request shape
#[derive(Debug)]
pub struct ProbeAttempt {
    pub shape: RequestShape,
    pub url: String,
    pub outcome: AttemptOutcome,
}

#[derive(Debug)]
pub enum AttemptOutcome {
    /// The upstream responded with a non success status
    Status { status: StatusCode, snippet: String },
    /// The request could not be completed
    Transport(String),
}

/// Collection of every failed attempt
#[derive(Debug)]
pub struct ProbeFailures(pub Vec<ProbeAttempt>);

impl Display for ProbeAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AttemptOutcome::Status { status, snippet } => {
                write!(f, "{}: {} {} :: {}", self.shape, status, self.url, snippet)
            }
            AttemptOutcome::Transport(err) => {
                write!(f, "{}: transport error {} :: {}", self.shape, self.url, err)
            }
        }
    }
}

impl Display for ProbeFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Failed to fetch leaderboard, all request shapes failed:")?;
        for attempt in &self.0 {
            write!(f, "\n- {attempt}")?;
        }
        Ok(())
    }
}
