use thiserror::Error;

use crate::routes::ViewId;

/// Raised while reading the environment at startup. `main` treats all of these
/// as fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("configuration is already initialized")]
    AlreadyInitialized,
}

/// Why a session check did not produce an answer. Never shown to the visitor:
/// the gate folds every variant into `Unauthenticated`.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("session check transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("session check returned HTTP {0}")]
    Status(u16),

    #[error("malformed session status body: {0}")]
    Malformed(String),
}

/// A view's deferred code could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("no view code registered for {0}")]
    Unregistered(ViewId),

    #[error("failed to load view {view}: {reason}")]
    Failed { view: ViewId, reason: String },

    #[error("view {0} panicked while loading: {1}")]
    Panicked(ViewId, String),
}

/// Anything the Fault Containment Boundary traps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewFault {
    #[error("render failed: {0}")]
    Render(String),

    #[error("render panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Load(#[from] LoadError),
}
