use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header::COOKIE},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::{
    AppState,
    boundary::FALLBACK_MESSAGE,
    routes::ViewId,
    session::HttpSessionVerifier,
    shell::{AppShell, Frame},
    store::MemoryStore,
    view::{Markup, escape_html},
};

/// navigate
///
/// [Fallback Route] Renders one portal navigation end to end.
///
/// *Mechanism*: The visitor's `Cookie` header is forwarded to an
/// `HttpSessionVerifier`, and a fresh `AppShell` is mounted on the request path.
/// `settle()` drives the shell until it produces a terminal frame (a view, a
/// redirect or the fallback), which `respond` maps onto HTTP. Because the shell
/// lives only as long as this request, the session is re-verified on every
/// navigation and never cached.
///
/// The gate is **fail-closed**: an unreachable backend, a timeout or an
/// unexpected body all end as a redirect to the login page.
///
/// If the client disconnects first, this future is dropped, which unmounts the
/// gate. The check's late result is then discarded.
pub async fn navigate(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let cookie = headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let verifier = HttpSessionVerifier::new(state.client.clone(), state.config.session_endpoint())
        .with_cookie(cookie);

    let mut shell = AppShell::new(
        state.routes.clone(),
        state.loader.clone(),
        Arc::new(verifier),
        Arc::new(MemoryStore::new()),
        uri.path(),
    );

    let frame = shell.settle().await;
    respond(frame)
}

/// respond
///
/// Maps a settled frame onto HTTP. Redirects use `303 See Other`, so the gated
/// URL never lands in the browser history.
pub fn respond(frame: Frame) -> Response {
    match frame {
        Frame::View { view, markup } => {
            let status = if view == ViewId::NotFound {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::OK
            };
            (status, Html(document(view.as_str(), &markup))).into_response()
        }
        Frame::Redirect { to, .. } => Redirect::to(to).into_response(),
        Frame::Fault { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(document("fault", &fallback_markup(message))),
        )
            .into_response(),
        // `settle` only returns terminal frames.
        Frame::Loading | Frame::Suspended => (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(document("fault", &fallback_markup(FALLBACK_MESSAGE))),
        )
            .into_response(),
    }
}

fn fallback_markup(message: &str) -> Markup {
    format!(
        r#"<main data-view="fault"><p role="alert">{}</p></main>"#,
        escape_html(message)
    )
}

fn document(view: &str, body: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>",
            r#"<html lang="en"><head><meta charset="utf-8">"#,
            r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#,
            "<title>Member Portal</title></head>",
            r#"<body><div id="root" data-route="{}">{}</div></body></html>"#
        ),
        view, body
    )
}
