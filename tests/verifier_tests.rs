use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use portal_shell::{
    error::VerifyError,
    session::{
        HttpSessionVerifier, MAX_SESSION_BODY_BYTES, Role, SessionStatus, SessionStatusBody,
        SessionVerifier,
    },
};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;

// --- Mock Session Backend ---

/// Mimics the portal API: the session cookie decides the answer.
async fn check_session_status(headers: HeaderMap) -> impl IntoResponse {
    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if !accepts_json {
        return (StatusCode::NOT_ACCEPTABLE, Json(json!({ "message": "json only" })));
    }

    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if cookie.contains("sid=admin") {
        (StatusCode::OK, Json(json!({ "message": "Session active", "role": "admin" })))
    } else if cookie.contains("sid=member") {
        (StatusCode::OK, Json(json!({ "message": "Session active", "role": "user" })))
    } else if cookie.contains("sid=roleless") {
        (StatusCode::OK, Json(json!({ "message": "Session active" })))
    } else if cookie.contains("sid=expired") {
        (StatusCode::OK, Json(json!({ "message": "Session expired" })))
    } else if cookie.contains("sid=broken") {
        (StatusCode::OK, Json(json!({ "unexpected": true })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "No active session" })))
    }
}

async fn spawn_backend() -> String {
    let router = Router::new()
        .route("/check-session-status", get(check_session_status))
        .route("/slow/check-session-status", get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "message": "Session active" }))
        }))
        .route("/html/check-session-status", get(|| async { "<html>login</html>" }))
        .route("/huge/check-session-status", get(|| async {
            let padding = "x".repeat(MAX_SESSION_BODY_BYTES);
            Json(json!({ "message": "Session active", "role": "admin", "padding": padding }))
        }))
        .route("/streamed/check-session-status", get(|| async {
            let chunks = (0..64).map(|_| {
                Ok::<_, std::io::Error>(axum::body::Bytes::from(vec![b' '; 1024]))
            });
            axum::body::Body::from_stream(futures::stream::iter(chunks))
        }));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

fn verifier(base: &str, cookie: Option<&str>) -> HttpSessionVerifier {
    HttpSessionVerifier::new(
        reqwest::Client::new(),
        format!("{}/check-session-status", base),
    )
    .with_cookie(cookie.map(str::to_string))
}

// --- Body Interpretation ---

#[test]
fn test_body_interpretation() {
    let body = |message: &str, role: Option<&str>| SessionStatusBody {
        message: message.to_string(),
        role: role.map(str::to_string),
    };

    assert_eq!(
        body("Session active", Some("admin")).into_status(),
        SessionStatus::Authenticated(Role::admin())
    );
    assert_eq!(
        body("Session active", None).into_status(),
        SessionStatus::Authenticated(Role::member())
    );
    assert_eq!(
        body("session active", Some("admin")).into_status(),
        SessionStatus::Unauthenticated
    );
    assert_eq!(body("", None).into_status(), SessionStatus::Unauthenticated);
}

// --- Against a Live Backend ---

#[tokio::test]
async fn test_admin_cookie_is_authenticated_as_admin() {
    let base = spawn_backend().await;
    let status = verifier(&base, Some("sid=admin")).verify().await;

    assert_eq!(status, SessionStatus::Authenticated(Role::admin()));
    assert!(status.role().is_some_and(Role::is_admin));
}

#[tokio::test]
async fn test_member_cookie_is_authenticated_as_member() {
    let base = spawn_backend().await;
    let status = verifier(&base, Some("theme=dark; sid=member")).verify().await;

    assert_eq!(status, SessionStatus::Authenticated(Role::member()));
}

#[tokio::test]
async fn test_missing_role_defaults_to_member() {
    let base = spawn_backend().await;
    let status = verifier(&base, Some("sid=roleless")).verify().await;

    assert_eq!(status, SessionStatus::Authenticated(Role::new("user")));
}

#[tokio::test]
async fn test_no_cookie_is_unauthenticated() {
    let base = spawn_backend().await;
    let verifier = verifier(&base, None);

    assert!(matches!(verifier.check().await, Err(VerifyError::Status(401))));
    assert_eq!(verifier.verify().await, SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn test_success_without_active_message_is_unauthenticated() {
    let base = spawn_backend().await;
    let verifier = verifier(&base, Some("sid=expired"));

    assert_eq!(
        verifier.check().await.expect("check succeeds"),
        SessionStatus::Unauthenticated
    );
}

#[tokio::test]
async fn test_malformed_bodies_are_unauthenticated() {
    let base = spawn_backend().await;

    let wrong_shape = verifier(&base, Some("sid=broken"));
    assert!(matches!(wrong_shape.check().await, Err(VerifyError::Malformed(_))));
    assert_eq!(wrong_shape.verify().await, SessionStatus::Unauthenticated);

    let html = HttpSessionVerifier::new(
        reqwest::Client::new(),
        format!("{}/html/check-session-status", base),
    );
    assert!(matches!(html.check().await, Err(VerifyError::Malformed(_))));
}

#[tokio::test]
async fn test_unreachable_backend_is_unauthenticated() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let verifier = verifier(&format!("http://127.0.0.1:{}", port), Some("sid=admin"));

    assert!(matches!(verifier.check().await, Err(VerifyError::Transport(_))));
    assert_eq!(verifier.verify().await, SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn test_timeout_is_unauthenticated() {
    let base = spawn_backend().await;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let verifier = HttpSessionVerifier::new(client, format!("{}/slow/check-session-status", base));

    assert_eq!(verifier.verify().await, SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn test_oversized_bodies_are_malformed() {
    let base = spawn_backend().await;

    // Declared length over the cap.
    let huge = HttpSessionVerifier::new(
        reqwest::Client::new(),
        format!("{}/huge/check-session-status", base),
    );
    assert!(matches!(huge.check().await, Err(VerifyError::Malformed(_))));
    assert_eq!(huge.verify().await, SessionStatus::Unauthenticated);

    // No declared length; the cap is hit while reading.
    let streamed = HttpSessionVerifier::new(
        reqwest::Client::new(),
        format!("{}/streamed/check-session-status", base),
    );
    assert!(matches!(streamed.check().await, Err(VerifyError::Malformed(_))));
}
