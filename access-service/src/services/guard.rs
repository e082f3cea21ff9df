//! Route guards: resolution plus enforcement, returned as values.
//!
//! Checks run in a fixed ladder (session, organization, membership, policy)
//! and the first failing check decides the outcome.

use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;

use super::{permissions, resolve_context, AuthContext, Backend};
use service_core::error::AppError;

pub const LOGIN_PATH: &str = "/auth/login";
pub const ORG_SELECT_PATH: &str = "/app";
pub const UNAUTHORIZED_ERROR: &str = "unauthorized";

pub fn dashboard_path(org_slug: &str) -> String {
    format!("/app/{}/dashboard", urlencoding::encode(org_slug))
}

pub fn cases_path(org_slug: &str) -> String {
    format!("/app/{}/cases", urlencoding::encode(org_slug))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    Unauthenticated,
    NoOrganization,
    NotAMember,
    PermissionDenied,
    ProtectionAccessDenied,
    NotSuperAdmin,
}

/// Where to send a caller who failed a check, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub destination: String,
    pub reason: DenialReason,
    /// `error` query marker shown by the destination page
    pub error: Option<&'static str>,
    /// Path to return to after signing in
    pub return_to: Option<String>,
}

impl Denial {
    pub fn new(destination: impl Into<String>, reason: DenialReason) -> Self {
        Self {
            destination: destination.into(),
            reason,
            error: None,
            return_to: None,
        }
    }

    pub fn login(return_to: Option<&str>) -> Self {
        Self {
            return_to: return_to.map(str::to_string),
            ..Self::new(LOGIN_PATH, DenialReason::Unauthenticated)
        }
    }

    pub fn with_error(mut self, error: &'static str) -> Self {
        self.error = Some(error);
        self
    }

    /// Destination with its query string.
    pub fn location(&self) -> String {
        let mut params: Vec<String> = Vec::new();
        if let Some(return_to) = &self.return_to {
            params.push(format!("redirect={}", urlencoding::encode(return_to)));
        }
        if let Some(error) = self.error {
            params.push(format!("error={}", urlencoding::encode(error)));
        }

        if params.is_empty() {
            self.destination.clone()
        } else {
            format!("{}?{}", self.destination, params.join("&"))
        }
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        Redirect::temporary(&self.location()).into_response()
    }
}

#[derive(Debug, Clone)]
pub enum AuthorizationOutcome {
    Allowed(AuthContext),
    Denied(Denial),
}

impl AuthorizationOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthorizationOutcome::Allowed(_))
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            AuthorizationOutcome::Denied(denial) => Some(denial),
            AuthorizationOutcome::Allowed(_) => None,
        }
    }
}

pub async fn require_authenticated(
    backend: &dyn Backend,
    session_token: Option<&str>,
) -> Result<AuthorizationOutcome, AppError> {
    Ok(match resolve_context(backend, session_token, None).await? {
        Some(ctx) => AuthorizationOutcome::Allowed(ctx),
        None => AuthorizationOutcome::Denied(Denial::login(None)),
    })
}

/// Session, organization and membership rungs shared by every org guard.
async fn require_member(
    backend: &dyn Backend,
    session_token: Option<&str>,
    org_slug: &str,
) -> Result<Result<AuthContext, Denial>, AppError> {
    let Some(ctx) = resolve_context(backend, session_token, Some(org_slug)).await? else {
        return Ok(Err(Denial::login(None)));
    };

    if ctx.organization.is_none() {
        return Ok(Err(Denial::new(
            ORG_SELECT_PATH,
            DenialReason::NoOrganization,
        )));
    }

    if ctx.membership.is_none() {
        return Ok(Err(Denial::new(ORG_SELECT_PATH, DenialReason::NotAMember)));
    }

    Ok(Ok(ctx))
}

pub async fn require_permission(
    backend: &dyn Backend,
    session_token: Option<&str>,
    org_slug: &str,
    permission: &str,
) -> Result<AuthorizationOutcome, AppError> {
    let ctx = match require_member(backend, session_token, org_slug).await? {
        Ok(ctx) => ctx,
        Err(denial) => return Ok(AuthorizationOutcome::Denied(denial)),
    };

    if ctx.has_permission(permission) {
        return Ok(AuthorizationOutcome::Allowed(ctx));
    }

    tracing::info!(
        user_id = %ctx.identity.id,
        org_slug = %org_slug,
        permission = %permission,
        "Permission denied"
    );
    // A role tag outside the table cannot even read the dashboard.
    let destination = match ctx.role() {
        Some(_) => dashboard_path(org_slug),
        None => ORG_SELECT_PATH.to_string(),
    };
    Ok(AuthorizationOutcome::Denied(
        Denial::new(destination, DenialReason::PermissionDenied).with_error(UNAUTHORIZED_ERROR),
    ))
}

pub async fn require_protection_access(
    backend: &dyn Backend,
    session_token: Option<&str>,
    org_slug: &str,
) -> Result<AuthorizationOutcome, AppError> {
    let ctx = match require_member(backend, session_token, org_slug).await? {
        Ok(ctx) => ctx,
        Err(denial) => return Ok(AuthorizationOutcome::Denied(denial)),
    };

    if ctx.can_access_protection_cases() {
        return Ok(AuthorizationOutcome::Allowed(ctx));
    }

    tracing::info!(
        user_id = %ctx.identity.id,
        org_slug = %org_slug,
        "Protection case access denied"
    );
    Ok(AuthorizationOutcome::Denied(
        Denial::new(cases_path(org_slug), DenialReason::ProtectionAccessDenied)
            .with_error(UNAUTHORIZED_ERROR),
    ))
}

/// Side-effect-free check for conditional rendering. Missing context is `false`.
pub async fn check_permission(
    backend: &dyn Backend,
    session_token: Option<&str>,
    org_slug: &str,
    permission: &str,
) -> Result<bool, AppError> {
    let ctx = resolve_context(backend, session_token, Some(org_slug)).await?;
    Ok(ctx.is_some_and(|ctx| {
        ctx.membership
            .as_ref()
            .is_some_and(|m| permissions::has_permission(&m.role, permission))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_location_carries_return_path() {
        let denial = Denial::login(Some("/app/acme/finance?tab=budgets"));
        assert_eq!(
            denial.location(),
            "/auth/login?redirect=%2Fapp%2Facme%2Ffinance%3Ftab%3Dbudgets"
        );
    }

    #[test]
    fn dashboard_denial_location() {
        let denial = Denial::new(dashboard_path("acme"), DenialReason::PermissionDenied)
            .with_error(UNAUTHORIZED_ERROR);
        assert_eq!(denial.location(), "/app/acme/dashboard?error=unauthorized");
    }

    #[test]
    fn plain_destination_has_no_query() {
        let denial = Denial::new(ORG_SELECT_PATH, DenialReason::NotAMember);
        assert_eq!(denial.location(), "/app");
    }

    #[test]
    fn denial_renders_as_temporary_redirect() {
        let response = Denial::login(None).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(axum::http::header::LOCATION).unwrap(),
            "/auth/login"
        );
    }
}
