use crate::{
    error::ViewFault,
    routes::{RouteParams, ViewId},
    session::SessionStatus,
    store::KeyValueStore,
};

/// Rendered HTML fragment for the routed region.
pub type Markup = String;

/// RenderContext
///
/// Everything a view may read while rendering.
pub struct RenderContext<'a> {
    /// Normalized location that matched.
    pub path: &'a str,
    pub params: &'a RouteParams,
    /// What the gate saw. `Unknown` on public routes, where no check runs.
    pub session: &'a SessionStatus,
    pub store: &'a dyn KeyValueStore,
}

/// View
///
/// A page component. Only ever instantiated once its route is authorized, and
/// only rendered beneath the Fault Containment Boundary.
pub trait View: Send + Sync {
    fn id(&self) -> ViewId;

    fn render(&self, ctx: &RenderContext<'_>) -> Result<Markup, ViewFault>;
}

/// Escapes text for inclusion in HTML content and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
