//! Path classification for the request middleware.

/// Exact-match public paths.
pub const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/about",
    "/features",
    "/pricing",
    "/contact",
    "/privacy",
    "/terms",
    "/unauthorized",
    "/health",
    "/metrics",
];

/// Prefix-match public paths (auth flows). Matched on segment boundaries.
pub const PUBLIC_PREFIXES: &[&str] = &[
    "/auth",
    "/login",
    "/signup",
    "/forgot-password",
    "/reset-password",
];

pub const SUPER_ADMIN_PREFIXES: &[&str] = &["/superadmin"];

/// JSON API routes: answered with 401 instead of a login redirect.
pub const API_PREFIX: &str = "/api";

const STATIC_PREFIXES: &[&str] = &["/_next/", "/static/", "/assets/"];
const STATIC_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp", "ico"];

/// Slug segments left behind by unrendered route templates, raw or percent-encoded.
const PLACEHOLDER_SLUGS: &[&str] = &[
    "[orgSlug]",
    "[slug]",
    "%5BorgSlug%5D",
    "%5Bslug%5D",
    "undefined",
    "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass<'a> {
    /// Asset requests, never inspected
    Static,
    Public,
    SuperAdmin,
    /// `/app` itself: the org-selection screen
    AppRoot,
    /// `/app/new`: create an organization
    NewOrganization,
    /// `/app/{slug}/...`; `None` when the slug is a placeholder
    OrgScoped { org_slug: Option<&'a str> },
    /// `/api/...`; needs a session only
    Api,
    /// Any other path; needs a session only
    Protected,
}

impl PathClass<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            PathClass::Static => "static",
            PathClass::Public => "public",
            PathClass::SuperAdmin => "super_admin",
            PathClass::AppRoot => "app_root",
            PathClass::NewOrganization => "new_organization",
            PathClass::OrgScoped { .. } => "org_scoped",
            PathClass::Api => "api",
            PathClass::Protected => "protected",
        }
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.starts_with(&format!("{}/", prefix.trim_end_matches('/')))
}

fn is_static_asset(path: &str) -> bool {
    if path == "/favicon.ico" || STATIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return true;
    }
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    last_segment
        .rsplit_once('.')
        .is_some_and(|(_, ext)| STATIC_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

pub fn classify_path(path: &str) -> PathClass<'_> {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    if is_static_asset(path) {
        return PathClass::Static;
    }

    if PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| matches_prefix(path, p)) {
        return PathClass::Public;
    }

    if SUPER_ADMIN_PREFIXES.iter().any(|p| matches_prefix(path, p)) {
        return PathClass::SuperAdmin;
    }

    if path == "/app" {
        return PathClass::AppRoot;
    }

    if let Some(rest) = path.strip_prefix("/app/") {
        let slug = rest.split('/').next().unwrap_or_default();
        return match slug {
            "" => PathClass::AppRoot,
            "new" => PathClass::NewOrganization,
            s if PLACEHOLDER_SLUGS.contains(&s) => PathClass::OrgScoped { org_slug: None },
            s => PathClass::OrgScoped { org_slug: Some(s) },
        };
    }

    if matches_prefix(path, API_PREFIX) {
        return PathClass::Api;
    }

    PathClass::Protected
}
