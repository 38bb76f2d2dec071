/// Route Table Module
///
/// Organizes the portal's navigable surface into access-segregated tables,
/// mirroring the three protection tiers a visitor can hit. Each table is a
/// fixed `const` slice; nothing registers routes at runtime.
use percent_encoding::percent_decode_str;
use std::{borrow::Cow, collections::BTreeMap, fmt};

/// Routes reachable without a session (landing, login, informational pages).
pub mod public;

/// Routes that require any verified member session.
pub mod authenticated;

/// Routes that require a verified session carrying the admin role.
pub mod admin;

/// Standard login page. Target of every failed `User` gate and of admin gates
/// reached by an authenticated non-admin.
pub const LOGIN_PATH: &str = "/login";

/// Admin login page. Target of `Admin` gates that find no session at all.
pub const ADMIN_LOGIN_PATH: &str = "/admin-login";

/// Protection
///
/// Which session states may render a route's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protection {
    None,
    RequireUser,
    RequireAdmin,
}

impl Protection {
    /// The gate requirement for this route, or `None` when the route is public
    /// and no gate (and no verification call) is mounted.
    pub fn requirement(self) -> Option<Requirement> {
        match self {
            Protection::None => None,
            Protection::RequireUser => Some(Requirement::User),
            Protection::RequireAdmin => Some(Requirement::Admin),
        }
    }
}

/// Requirement
///
/// The level an Authorization Gate enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    User,
    Admin,
}

impl Requirement {
    /// Where a visitor without a session is sent.
    pub fn login_path(self) -> &'static str {
        match self {
            Requirement::User => LOGIN_PATH,
            Requirement::Admin => ADMIN_LOGIN_PATH,
        }
    }
}

/// ViewId
///
/// Identifies a page component. The loader keys deferred view code by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewId {
    Home,
    Login,
    Register,
    AdminLogin,
    AdminRegister,
    About,
    Contact,
    Faq,
    Privacy,
    Events,
    CertificateLookup,
    Dashboard,
    Notifications,
    Members,
    Projects,
    Chat,
    Profile,
    Settings,
    AdminDashboard,
    Issuer,
    NotFound,
}

impl ViewId {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewId::Home => "home",
            ViewId::Login => "login",
            ViewId::Register => "register",
            ViewId::AdminLogin => "admin-login",
            ViewId::AdminRegister => "admin-register",
            ViewId::About => "about",
            ViewId::Contact => "contact",
            ViewId::Faq => "faq",
            ViewId::Privacy => "privacy",
            ViewId::Events => "events",
            ViewId::CertificateLookup => "certificate-lookup",
            ViewId::Dashboard => "dashboard",
            ViewId::Notifications => "notifications",
            ViewId::Members => "members",
            ViewId::Projects => "projects",
            ViewId::Chat => "chat",
            ViewId::Profile => "profile",
            ViewId::Settings => "settings",
            ViewId::AdminDashboard => "admin-dashboard",
            ViewId::Issuer => "issuer",
            ViewId::NotFound => "not-found",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RouteEntry
///
/// One immutable row of the route table: a path pattern, the view it mounts and
/// the protection it demands. `:name` segments capture a single path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub pattern: &'static str,
    pub view: ViewId,
    pub protection: Protection,
}

impl RouteEntry {
    pub const fn new(pattern: &'static str, view: ViewId, protection: Protection) -> Self {
        Self {
            pattern,
            view,
            protection,
        }
    }

    /// Matches normalized path segments against this pattern, returning the
    /// captured parameters on success.
    fn matches(&self, segments: &[&str]) -> Option<RouteParams> {
        let pattern: Vec<&str> = split_segments(self.pattern);
        if pattern.len() != segments.len() {
            return None;
        }

        let mut params = RouteParams::default();
        for (expected, actual) in pattern.iter().zip(segments) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.0.insert(name.to_string(), decode_segment(actual));
                }
                None if expected == actual => {}
                None => return None,
            }
        }
        Some(params)
    }
}

/// Captured values are percent-decoded. A segment that does not decode to UTF-8
/// is kept as written.
fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8()
        .map_or_else(|_| segment.to_string(), Cow::into_owned)
}

/// Fallback for every path no table matches. Unprotected.
pub const NOT_FOUND: RouteEntry = RouteEntry::new("*", ViewId::NotFound, Protection::None);

/// RouteParams
///
/// Values captured from `:name` segments of the matched pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// ResolvedRoute
///
/// The outcome of a lookup: the entry that won and what it captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub path: String,
    pub entry: &'static RouteEntry,
    pub params: RouteParams,
}

impl ResolvedRoute {
    pub fn view(&self) -> ViewId {
        self.entry.view
    }

    pub fn protection(&self) -> Protection {
        self.entry.protection
    }

    pub fn is_not_found(&self) -> bool {
        self.entry.view == ViewId::NotFound
    }
}

/// RouteTable
///
/// A pure lookup over the public, authenticated and admin tables, consulted
/// in that order. First match wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<&'static RouteEntry>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::portal()
    }
}

impl RouteTable {
    /// The portal's full route surface.
    pub fn portal() -> Self {
        let entries = public::PUBLIC_ROUTES
            .iter()
            .chain(authenticated::AUTHENTICATED_ROUTES)
            .chain(admin::ADMIN_ROUTES)
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> impl Iterator<Item = &'static RouteEntry> + '_ {
        self.entries.iter().copied()
    }

    /// Resolves a location to its entry. Query string and fragment are ignored,
    /// trailing slashes are insignificant, and unmatched paths resolve to
    /// [`NOT_FOUND`].
    pub fn resolve(&self, location: &str) -> ResolvedRoute {
        let path = normalize(location);
        let segments = split_segments(&path);

        for entry in self.entries.iter().copied() {
            if let Some(params) = entry.matches(&segments) {
                return ResolvedRoute {
                    path,
                    entry,
                    params,
                };
            }
        }

        ResolvedRoute {
            path,
            entry: &NOT_FOUND,
            params: RouteParams::default(),
        }
    }
}

fn normalize(location: &str) -> String {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    let segments = split_segments(&location[..end]);
    format!("/{}", segments.join("/"))
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
