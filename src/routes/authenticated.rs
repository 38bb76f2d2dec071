use super::{Protection, RouteEntry, ViewId};

/// Authenticated Route Table
///
/// Member features. Every entry is wrapped in an Authorization Gate with the
/// `User` requirement, so any verified session (admin or not) renders them and
/// anything else is bounced to `/login`.
pub const AUTHENTICATED_ROUTES: &[RouteEntry] = &[
    RouteEntry::new("/dashboard", ViewId::Dashboard, Protection::RequireUser),
    RouteEntry::new("/notifications", ViewId::Notifications, Protection::RequireUser),
    RouteEntry::new("/members", ViewId::Members, Protection::RequireUser),
    RouteEntry::new("/projects", ViewId::Projects, Protection::RequireUser),
    // --- Chat ---
    // The bare shape opens the conversation list, the `:id` shape a thread.
    RouteEntry::new("/chat", ViewId::Chat, Protection::RequireUser),
    RouteEntry::new("/chat/:id", ViewId::Chat, Protection::RequireUser),
    // --- Profile ---
    // Own profile, or another member's by id.
    RouteEntry::new("/profile", ViewId::Profile, Protection::RequireUser),
    RouteEntry::new("/profile/:id", ViewId::Profile, Protection::RequireUser),
    RouteEntry::new("/settings", ViewId::Settings, Protection::RequireUser),
];
