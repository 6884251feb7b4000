use crate::{
    services::leaderboard::models::RequestShape,
    utils::env::{self, Vars},
};
use axum::http::HeaderValue;
use log::LevelFilter;
use std::{net::IpAddr, str::FromStr};
use thiserror::Error;

/// The server version extracted from the Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration loaded once at startup and shared with the
/// request handlers
#[derive(Debug)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub upstream: UpstreamConfig,
    pub cors: CorsConfig,
    pub renderer: RendererConfig,
    pub logging: LoggingConfig,
}

/// Errors that prevent the server from starting
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable was not set or was blank
    #[error("{0} not set")]
    MissingVariable(&'static str),
    /// The origin allow-list contained no origins
    #[error("{} must contain at least one origin", env::ALLOWED_ORIGINS)]
    EmptyAllowList,
    /// A style variable had an unknown value
    #[error("{key} has unknown value \"{value}\"")]
    InvalidStyle { key: &'static str, value: String },
    /// An allow-list entry was not a valid header value
    #[error("{key} contains invalid origin \"{0}\"", key = env::ALLOWED_ORIGINS)]
    InvalidOrigin(String),
}

impl Config {
    /// Loads the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::process_env)
    }

    /// Loads the configuration using the provided variable source
    pub fn from_vars(vars: &impl Vars) -> Result<Self, ConfigError> {
        let base_url = env::non_empty(vars, env::API_URL)
            .map(|value| value.trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingVariable(env::API_URL))?;

        let allowed_origins: Vec<HeaderValue> = env::non_empty(vars, env::ALLOWED_ORIGINS)
            .ok_or(ConfigError::MissingVariable(env::ALLOWED_ORIGINS))?
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                HeaderValue::from_str(value)
                    .map_err(|_| ConfigError::InvalidOrigin(value.to_string()))
            })
            .collect::<Result<_, _>>()?;

        if allowed_origins.is_empty() {
            return Err(ConfigError::EmptyAllowList);
        }

        let forward_style = parse_style(vars, env::FORWARD_STYLE)?;
        let shape = parse_style(vars, env::RENDER_SHAPE)?;

        Ok(Self {
            host: env::from_env(vars, env::HOST),
            port: env::from_env(vars, env::PORT),
            upstream: UpstreamConfig {
                base_url,
                token: env::non_empty(vars, env::API_TOKEN),
                forward_style,
            },
            cors: CorsConfig { allowed_origins },
            renderer: RendererConfig {
                shape,
                contest_id: env::from_env(vars, env::CONTEST_ID),
                page_size: env::from_env(vars, env::PAGE_SIZE),
            },
            logging: LoggingConfig {
                level: env::from_env(vars, env::LOGGING_LEVEL),
                dir: env::env(vars, env::LOGGING_DIR),
            },
        })
    }
}

/// Parses a style variable, unlike other optional variables an unknown
/// value is an error rather than falling back to the default
fn parse_style<S: FromStr>(vars: &impl Vars, pair: (&'static str, &str)) -> Result<S, ConfigError> {
    let value = env::env(vars, pair);
    S::from_str(&value).map_err(|_| ConfigError::InvalidStyle {
        key: pair.0,
        value,
    })
}

/// Details for reaching the upstream scoring service
#[derive(Debug)]
pub struct UpstreamConfig {
    /// Base URL with trailing slashes removed
    pub base_url: String,
    /// Optional bearer token attached to upstream requests
    pub token: Option<String>,
    /// How the proxy forwards requests
    pub forward_style: ForwardStyle,
}

/// Request style used by the proxy when forwarding to the upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardStyle {
    /// Contest ID sent in the body of POST {base}/leaderboard
    Body,
    /// Contest ID sent in the path of POST {base}/contests/{id}/leaderboard
    Path,
}

impl ForwardStyle {
    /// The upstream request shape for this style
    pub fn shape(&self) -> RequestShape {
        match self {
            Self::Body => RequestShape::Flat,
            Self::Path => RequestShape::PathScoped,
        }
    }
}

impl FromStr for ForwardStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "body" => Ok(Self::Body),
            "path" => Ok(Self::Path),
            _ => Err(()),
        }
    }
}

/// Origin allow-list for the proxy
#[derive(Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<HeaderValue>,
}

impl CorsConfig {
    /// Checks whether the provided origin is in the allow-list
    pub fn is_allowed(&self, origin: &HeaderValue) -> bool {
        self.allowed_origins.contains(origin)
    }
}

/// Settings for the server rendered leaderboard page
#[derive(Debug)]
pub struct RendererConfig {
    pub shape: RenderShape,
    /// Contest shown on the page
    pub contest_id: u64,
    /// Number of entries shown on the page
    pub page_size: u32,
}

/// How the renderer chooses the upstream request shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderShape {
    /// Try each shape in [RequestShape::PROBE_ORDER]
    Probe,
    /// Only use the one known shape
    Pinned(RequestShape),
}

impl RenderShape {
    /// The shapes to attempt in order
    pub fn shapes(&self) -> &[RequestShape] {
        match self {
            Self::Probe => &RequestShape::PROBE_ORDER,
            Self::Pinned(shape) => std::slice::from_ref(shape),
        }
    }
}

impl FromStr for RenderShape {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "probe" => Self::Probe,
            "path" => Self::Pinned(RequestShape::PathScoped),
            "body" => Self::Pinned(RequestShape::Flat),
            "query" => Self::Pinned(RequestShape::Query),
            _ => return Err(()),
        })
    }
}

#[derive(Debug)]
pub struct LoggingConfig {
    pub level: LevelFilter,
    pub dir: String,
}
