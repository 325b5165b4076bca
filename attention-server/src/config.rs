use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    /// Directory for persistent state (SQLite database).
    /// Defaults to current working directory.
    pub state_dir: PathBuf,
    /// Feature toggle for the whole engine. When false, events are
    /// accepted but produce no attention updates.
    pub attention_set_enabled: bool,
    /// Optional bearer token for the dashboard endpoints.
    /// If set, requests must include `Authorization: Bearer <token>`.
    /// If not set, the dashboard endpoints are disabled (403 Forbidden).
    pub dashboard_auth_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid number")?;

        let state_dir = env::var("STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let attention_set_enabled = env::var("ATTENTION_SET_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let dashboard_auth_token = parse_dashboard_auth_token(env::var("DASHBOARD_AUTH_TOKEN").ok());

        Ok(Config {
            port,
            state_dir,
            attention_set_enabled,
            dashboard_auth_token,
        })
    }
}

/// Parse DASHBOARD_AUTH_TOKEN from an optional string value.
///
/// Returns None if the value is missing, empty, or contains only whitespace.
/// An empty token must not be accepted as a valid credential.
pub fn parse_dashboard_auth_token(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
