use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE};
use serde::{Deserialize, Serialize};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::error::VerifyError;

/// The role value the gate treats as admin. Every other role is an ordinary member.
pub const ADMIN_ROLE: &str = "admin";

/// Role assumed when the backend reports an active session without one.
pub const MEMBER_ROLE: &str = "user";

/// The `message` value that signals an active session.
pub const SESSION_ACTIVE: &str = "Session active";

/// Largest session-status body the verifier will read. The real answer is a
/// few dozen bytes; anything past this is rejected as malformed.
pub const MAX_SESSION_BODY_BYTES: usize = 16 * 1024;

/// Role
///
/// Opaque classifier returned by the backend. Only [`ADMIN_ROLE`] is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn member() -> Self {
        Self::new(MEMBER_ROLE)
    }

    pub fn admin() -> Self {
        Self::new(ADMIN_ROLE)
    }

    pub fn is_admin(&self) -> bool {
        self.0 == ADMIN_ROLE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// SessionStatus
///
/// Tri-state answer to "who is looking at this gate". `Unknown` is the initial
/// value of every gate mount and is never the result of a verification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Unknown,
    Authenticated(Role),
    Unauthenticated,
}

impl SessionStatus {
    pub fn is_unknown(&self) -> bool {
        matches!(self, SessionStatus::Unknown)
    }

    pub fn role(&self) -> Option<&Role> {
        match self {
            SessionStatus::Authenticated(role) => Some(role),
            _ => None,
        }
    }
}

/// SessionStatusBody
///
/// Success body of `GET /check-session-status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatusBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl SessionStatusBody {
    /// Interprets a decoded success body. Only the exact active-session message
    /// authenticates; a missing role defaults to the member role.
    pub fn into_status(self) -> SessionStatus {
        if self.message != SESSION_ACTIVE {
            return SessionStatus::Unauthenticated;
        }
        let role = self.role.map(Role::new).unwrap_or_else(Role::member);
        SessionStatus::Authenticated(role)
    }
}

// 1. SessionVerifier Contract
/// SessionVerifier
///
/// Asks the backend whether the current visitor has an active session. A
/// verifier never mutates shared state; it only reports to its caller.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// Performs one session check. No retries.
    async fn check(&self) -> Result<SessionStatus, VerifyError>;

    /// Like [`check`](Self::check), but fails closed: any error, or an answer
    /// that is still `Unknown`, becomes `Unauthenticated`.
    async fn verify(&self) -> SessionStatus {
        match self.check().await {
            Ok(SessionStatus::Unknown) => SessionStatus::Unauthenticated,
            Ok(status) => status,
            Err(e) => {
                tracing::debug!(error = %e, "session check failed; treating as unauthenticated");
                SessionStatus::Unauthenticated
            }
        }
    }
}

// 2. The Real Implementation (remote portal API)
/// HttpSessionVerifier
///
/// Queries the session status endpoint with the visitor's cookies attached.
#[derive(Clone)]
pub struct HttpSessionVerifier {
    client: reqwest::Client,
    endpoint: String,
    cookie: Option<String>,
}

impl HttpSessionVerifier {
    /// Builds a verifier against a full endpoint URL (see `AppConfig::session_endpoint`).
    /// The client is shared; timeouts are configured on it.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            cookie: None,
        }
    }

    /// Forwards the visitor's `Cookie` header with the check.
    pub fn with_cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie;
        self
    }
}

#[async_trait]
impl SessionVerifier for HttpSessionVerifier {
    async fn check(&self) -> Result<SessionStatus, VerifyError> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json");
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Status(status.as_u16()));
        }

        let bytes = read_capped(response, MAX_SESSION_BODY_BYTES).await?;
        let body: SessionStatusBody =
            serde_json::from_slice(&bytes).map_err(|e| VerifyError::Malformed(e.to_string()))?;
        Ok(body.into_status())
    }
}

/// Reads the body chunk by chunk and gives up as soon as it passes `limit`.
async fn read_capped(mut response: reqwest::Response, limit: usize) -> Result<Vec<u8>, VerifyError> {
    let too_large = || VerifyError::Malformed(format!("session body exceeds {limit} bytes"));

    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

// 3. The Mock Implementation (tests and local development)
/// MockSessionVerifier
///
/// Answers every check with a fixed status and counts how often it was asked.
#[derive(Clone)]
pub struct MockSessionVerifier {
    outcome: SessionStatus,
    calls: Arc<AtomicUsize>,
}

impl MockSessionVerifier {
    pub fn new(outcome: SessionStatus) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn authenticated(role: &str) -> Self {
        Self::new(SessionStatus::Authenticated(Role::new(role)))
    }

    pub fn unauthenticated() -> Self {
        Self::new(SessionStatus::Unauthenticated)
    }

    /// Number of checks performed so far, shared across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionVerifier for MockSessionVerifier {
    async fn check(&self) -> Result<SessionStatus, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome.clone())
    }
}
