use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt::{self, Display};

/// Structure for a single ranked entry returned by the upstream
/// scoring service. The rank is not part of the entry, it is the
/// position of the entry in the returned list
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Login identifier of the contestant
    pub login: i64,
    /// Full name of the contestant
    pub full_name: String,
    /// Country of the contestant
    pub country: String,
    /// Performance as a percentage
    pub performance: f64,
    /// Optional display nickname
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Pagination window requested from the upstream. The values are
/// kept as JSON numbers so they are forwarded exactly as received
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Segment {
    /// Maximum number of entries
    pub limit: Number,
    /// Number of entries to skip
    pub offset: Number,
}

impl Segment {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: limit.into(),
            offset: offset.into(),
        }
    }
}

/// Body for requesting a leaderboard segment for a specific contest,
/// this is both the body accepted by the proxy and the body sent
/// upstream for the flat request shape
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRequest {
    /// The contest to query
    pub contest_id: Number,
    /// The window of entries to query
    pub segment: Segment,
}

/// Body for the path scoped request shape where the contest is
/// part of the URL
#[derive(Serialize)]
pub struct SegmentBody<'a> {
    pub segment: &'a Segment,
}

/// The different shapes a leaderboard request to the upstream can take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// POST {base}/contests/{id}/leaderboard with { segment }
    PathScoped,
    /// POST {base}/leaderboard with { contestId, segment }
    Flat,
    /// GET {base}/leaderboard?contestId=&limit=&offset=
    Query,
}

impl RequestShape {
    /// Order the shapes are attempted in when probing the upstream
    pub const PROBE_ORDER: [RequestShape; 3] = [Self::PathScoped, Self::Flat, Self::Query];

    /// Creates the URL for this request shape
    ///
    /// `base`    The upstream base URL without a trailing slash
    /// `request` The contest and segment being requested
    pub fn url(&self, base: &str, request: &LeaderboardRequest) -> String {
        let LeaderboardRequest {
            contest_id,
            segment,
        } = request;

        match self {
            Self::PathScoped => format!("{base}/contests/{contest_id}/leaderboard"),
            Self::Flat => format!("{base}/leaderboard"),
            Self::Query => format!(
                "{base}/leaderboard?contestId={contest_id}&limit={}&offset={}",
                segment.limit, segment.offset
            ),
        }
    }
}

impl Display for RequestShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PathScoped => "path-scoped POST",
            Self::Flat => "flat POST",
            Self::Query => "query GET",
        })
    }
}
