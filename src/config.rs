use once_cell::sync::OnceCell;
use reqwest::Url;
use std::{env, time::Duration};

use crate::error::ConfigError;

const DEFAULT_LOCAL_API_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_CHECK_TIMEOUT_MS: u64 = 10_000;

/// Path of the session status endpoint, relative to the API base URL.
pub const SESSION_STATUS_PATH: &str = "/check-session-status";

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// AppConfig
///
/// Holds the shell's entire configuration. It is immutable once loaded, so the
/// same values are seen by every request and every spawned session check.
///
/// It is carried inside `AppState`, forming the "immutable AppConfig" part of the
/// **Unified State Pattern**. Code that runs outside a request (startup, logging
/// setup) reads the process-wide copy installed by [`init`].
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and which variables are mandatory.
    pub env: Env,
    // Base URL of the remote portal API. Never carries a trailing slash.
    pub api_base_url: String,
    // Address the shell host listens on.
    pub bind_addr: String,
    // Upper bound for one session status request.
    pub session_check_timeout: Duration,
}

/// Env
///
/// Defines the runtime context.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe local values for test scaffolding, no environment required.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: DEFAULT_LOCAL_API_BASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_check_timeout: Duration::from_millis(DEFAULT_SESSION_CHECK_TIMEOUT_MS),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// *Mechanism*: `APP_ENV` selects the runtime context first. In production,
    /// `API_BASE_URL` is mandatory and a missing value is a startup error. Locally
    /// it falls back to the development backend. Every value is validated here,
    /// so a bad URL or a zero timeout stops the process before it binds a port
    /// (**Fail-Fast Startup**).
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let raw_base_url = match (env, env::var("API_BASE_URL")) {
            (_, Ok(url)) => url,
            (Env::Production, Err(_)) => return Err(ConfigError::Missing("API_BASE_URL")),
            (Env::Local, Err(_)) => DEFAULT_LOCAL_API_BASE_URL.to_string(),
        };
        let api_base_url = validate_base_url(&raw_base_url)?;

        let bind_addr = env::var("SHELL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let timeout_ms = match env::var("SESSION_CHECK_TIMEOUT_MS") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: "SESSION_CHECK_TIMEOUT_MS",
                    value,
                })?,
            Err(_) => DEFAULT_SESSION_CHECK_TIMEOUT_MS,
        };

        Ok(Self {
            env,
            api_base_url,
            bind_addr,
            session_check_timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// Full URL of the session status endpoint.
    pub fn session_endpoint(&self) -> String {
        format!("{}{}", self.api_base_url, SESSION_STATUS_PATH)
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    Ok(trimmed.to_string())
}

/// init
///
/// Installs the process-wide configuration. Succeeds exactly once per process.
pub fn init(config: AppConfig) -> Result<&'static AppConfig, ConfigError> {
    CONFIG
        .try_insert(config)
        .map_err(|_| ConfigError::AlreadyInitialized)
}

/// The process-wide configuration, if [`init`] has run.
pub fn current() -> Option<&'static AppConfig> {
    CONFIG.get()
}
