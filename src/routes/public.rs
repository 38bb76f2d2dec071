use super::{Protection, RouteEntry, ViewId};

/// Public Route Table
///
/// Views any visitor may render, with or without a session. No gate is mounted
/// for these entries, so visiting them never issues a session check.
pub const PUBLIC_ROUTES: &[RouteEntry] = &[
    // Landing page.
    RouteEntry::new("/", ViewId::Home, Protection::None),
    // --- Identity flow ---
    // Login targets for failed gates. Must stay public or a failed gate would
    // redirect into another gate.
    RouteEntry::new("/login", ViewId::Login, Protection::None),
    RouteEntry::new("/register", ViewId::Register, Protection::None),
    RouteEntry::new("/admin-login", ViewId::AdminLogin, Protection::None),
    RouteEntry::new("/admin-register", ViewId::AdminRegister, Protection::None),
    // --- Informational pages ---
    RouteEntry::new("/about", ViewId::About, Protection::None),
    RouteEntry::new("/contact", ViewId::Contact, Protection::None),
    RouteEntry::new("/faq", ViewId::Faq, Protection::None),
    RouteEntry::new("/privacy", ViewId::Privacy, Protection::None),
    // Event listing is browsable before signing in.
    RouteEntry::new("/events", ViewId::Events, Protection::None),
    // Certificate lookup, with or without the certificate id in the path.
    RouteEntry::new("/verify-certificate", ViewId::CertificateLookup, Protection::None),
    RouteEntry::new(
        "/verify-certificate/:id",
        ViewId::CertificateLookup,
        Protection::None,
    ),
];
