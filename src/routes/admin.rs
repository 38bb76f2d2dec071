use super::{Protection, RouteEntry, ViewId};

/// Admin Route Table
///
/// Views exclusive to sessions carrying the admin role. A visitor with no
/// session is sent to `/admin-login`; an authenticated non-admin is sent to
/// `/login` and never sees the admin view.
pub const ADMIN_ROUTES: &[RouteEntry] = &[
    // Moderation and statistics overview.
    RouteEntry::new("/admin-dashboard", ViewId::AdminDashboard, Protection::RequireAdmin),
    // Certificate issuing console.
    RouteEntry::new("/issuer", ViewId::Issuer, Protection::RequireAdmin),
];
