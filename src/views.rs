use std::sync::Arc;

use crate::{
    error::ViewFault,
    loader::{DeferredViewLoader, DeferredViewLoaderBuilder},
    routes::ViewId,
    store::RecentSearches,
    view::{Markup, RenderContext, View, escape_html},
};

/// PageView
///
/// The portal pages themselves are presentational and talk to the API from the
/// browser; the shell renders their mount point and heading.
pub struct PageView {
    id: ViewId,
    title: &'static str,
}

impl PageView {
    pub fn new(id: ViewId, title: &'static str) -> Self {
        Self { id, title }
    }
}

impl View for PageView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<Markup, ViewFault> {
        let mut markup = format!(
            r#"<main data-view="{}"><h1>{}</h1>"#,
            self.id,
            escape_html(self.title)
        );
        // Detail shapes (`/chat/:id`, `/profile/:id`) hand their id to the page.
        if let Some(id) = ctx.params.get("id") {
            markup.push_str(&format!(r#"<div data-id="{}"></div>"#, escape_html(id)));
        }
        if let Some(role) = ctx.session.role() {
            markup.push_str(&format!(
                r#"<p class="session">Signed in as {}</p>"#,
                escape_html(role.as_str())
            ));
        }
        markup.push_str("</main>");
        Ok(markup)
    }
}

/// CertificateLookupView
///
/// Public certificate verification. Remembers the ids looked up in this
/// session and lists them under the form.
pub struct CertificateLookupView;

impl View for CertificateLookupView {
    fn id(&self) -> ViewId {
        ViewId::CertificateLookup
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<Markup, ViewFault> {
        let history = RecentSearches::new(ctx.store);
        let recent = match ctx.params.get("id") {
            Some(id) => history.record(id),
            None => history.list(),
        };

        let mut markup = String::from(
            r#"<main data-view="certificate-lookup"><h1>Verify a certificate</h1>"#,
        );
        if let Some(id) = ctx.params.get("id") {
            markup.push_str(&format!(
                r#"<section data-certificate="{}"></section>"#,
                escape_html(id)
            ));
        }
        if !recent.is_empty() {
            markup.push_str(r#"<ul class="recent-searches">"#);
            for term in &recent {
                markup.push_str(&format!("<li>{}</li>", escape_html(term)));
            }
            markup.push_str("</ul>");
        }
        markup.push_str("</main>");
        Ok(markup)
    }
}

/// NotFoundView
pub struct NotFoundView;

impl View for NotFoundView {
    fn id(&self) -> ViewId {
        ViewId::NotFound
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<Markup, ViewFault> {
        Ok(format!(
            r#"<main data-view="not-found"><h1>Page not found</h1><p>Nothing lives at <code>{}</code>.</p></main>"#,
            escape_html(ctx.path)
        ))
    }
}

const PAGES: &[(ViewId, &str)] = &[
    (ViewId::Home, "Welcome"),
    (ViewId::Login, "Sign in"),
    (ViewId::Register, "Create an account"),
    (ViewId::AdminLogin, "Admin sign in"),
    (ViewId::AdminRegister, "Admin registration"),
    (ViewId::About, "About us"),
    (ViewId::Contact, "Contact"),
    (ViewId::Faq, "Frequently asked questions"),
    (ViewId::Privacy, "Privacy policy"),
    (ViewId::Events, "Events"),
    (ViewId::Dashboard, "Dashboard"),
    (ViewId::Notifications, "Notifications"),
    (ViewId::Members, "Members"),
    (ViewId::Projects, "Projects"),
    (ViewId::Chat, "Chat"),
    (ViewId::Profile, "Profile"),
    (ViewId::Settings, "Settings"),
    (ViewId::AdminDashboard, "Admin dashboard"),
    (ViewId::Issuer, "Certificate issuer"),
];

/// The portal's view registry. Nothing is constructed until first visit.
pub fn catalog() -> DeferredViewLoader {
    catalog_builder().build()
}

/// [`catalog`] before `build`, for callers that override individual views.
pub fn catalog_builder() -> DeferredViewLoaderBuilder {
    let builder = PAGES
        .iter()
        .fold(DeferredViewLoader::builder(), |builder, &(id, title)| {
            builder.register(id, move || async move {
                Ok(Arc::new(PageView::new(id, title)) as Arc<dyn View>)
            })
        });

    builder
        .register(ViewId::CertificateLookup, || async {
            Ok(Arc::new(CertificateLookupView) as Arc<dyn View>)
        })
        .register(ViewId::NotFound, || async {
            Ok(Arc::new(NotFoundView) as Arc<dyn View>)
        })
}
