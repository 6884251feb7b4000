use log::LevelFilter;
use std::{
    net::{IpAddr, Ipv4Addr},
    str::FromStr,
};

pub const API_URL: &str = "LEADERBOARD_API_URL";
pub const API_TOKEN: &str = "LEADERBOARD_API_TOKEN";
pub const ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";

pub const FORWARD_STYLE: (&str, &str) = ("LEADERBOARD_FORWARD_STYLE", "body");
pub const RENDER_SHAPE: (&str, &str) = ("LEADERBOARD_RENDER_SHAPE", "probe");
pub const CONTEST_ID: (&str, u64) = ("LEADERBOARD_CONTEST_ID", 10);
pub const PAGE_SIZE: (&str, u32) = ("LEADERBOARD_PAGE_SIZE", 10);

pub const HOST: (&str, IpAddr) = ("LR_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED));
pub const PORT: (&str, u16) = ("LR_PORT", 3000);

pub const LOGGING_LEVEL: (&str, LevelFilter) = ("LR_LOG_LEVEL", LevelFilter::Info);
pub const LOGGING_DIR: (&str, &str) = ("LR_LOGGING_DIR", "data/logs");

/// Source of variable values, the process environment at runtime
/// and plain functions in tests
pub trait Vars: Fn(&str) -> Option<String> {}

impl<F> Vars for F where F: Fn(&str) -> Option<String> {}

/// Reads from the process environment
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Reads a variable treating blank values as missing
#[inline]
pub fn non_empty(vars: &impl Vars, key: &str) -> Option<String> {
    vars(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[inline]
pub fn env(vars: &impl Vars, pair: (&str, &str)) -> String {
    non_empty(vars, pair.0).unwrap_or_else(|| pair.1.to_string())
}

#[inline]
pub fn from_env<F: FromStr>(vars: &impl Vars, pair: (&str, F)) -> F {
    if let Some(value) = non_empty(vars, pair.0) {
        if let Ok(value) = F::from_str(&value) {
            return value;
        }
    }
    pair.1
}
