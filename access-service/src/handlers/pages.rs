//! Page endpoints. Each one runs its route guard and renders a JSON view
//! model for the page layer, or redirects on denial.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{effective_permissions, OrgSummary, RoleView};
use crate::middleware::Session;
use crate::models::{Identity, Profile};
use crate::services::{
    guard::dashboard_path, permissions, require_authenticated, require_permission,
    require_protection_access, AuthContext, AuthorizationOutcome,
};
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct MembershipOption {
    pub organization: OrgSummary,
    pub role: RoleView,
    pub dashboard: String,
}

#[derive(Debug, Serialize)]
pub struct OrgSelectionView {
    pub identity: Identity,
    pub profile: Option<Profile>,
    pub organizations: Vec<MembershipOption>,
}

#[derive(Debug, Serialize)]
pub struct OrgPageView {
    pub section: &'static str,
    pub organization: OrgSummary,
    pub role: RoleView,
    pub permissions: Vec<&'static str>,
    pub can_access_protection_cases: bool,
    pub branch_id: Option<uuid::Uuid>,
    pub default_currency: String,
    /// Month the organization's fiscal year starts in, `1..=12`
    pub fiscal_year_start_month: u8,
}

impl OrgPageView {
    fn new(section: &'static str, ctx: &AuthContext) -> Result<Self, AppError> {
        // Guards only allow a context with both organization and membership.
        let (Some(org), Some(membership)) = (&ctx.organization, &ctx.membership) else {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "Allowed context is missing organization or membership"
            )));
        };

        Ok(Self {
            section,
            organization: OrgSummary::from(org),
            role: RoleView::from_tag(&membership.role),
            permissions: effective_permissions(ctx),
            can_access_protection_cases: ctx.can_access_protection_cases(),
            branch_id: membership.branch_id,
            default_currency: org.settings.default_currency.clone(),
            fiscal_year_start_month: org.settings.fiscal_year_start(),
        })
    }
}

fn render(section: &'static str, outcome: AuthorizationOutcome) -> Result<Response, AppError> {
    match outcome {
        AuthorizationOutcome::Allowed(ctx) => {
            Ok(Json(OrgPageView::new(section, &ctx)?).into_response())
        }
        AuthorizationOutcome::Denied(denial) => Ok(denial.into_response()),
    }
}

/// Organization selection screen.
pub async fn org_selection(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let ctx = match require_authenticated(state.backend.as_ref(), session.token()).await? {
        AuthorizationOutcome::Allowed(ctx) => ctx,
        AuthorizationOutcome::Denied(denial) => return Ok(denial.into_response()),
    };

    let organizations = state
        .backend
        .list_active_memberships(ctx.identity.id)
        .await?
        .into_iter()
        .map(|(membership, org)| MembershipOption {
            dashboard: dashboard_path(&org.slug),
            organization: OrgSummary::from(&org),
            role: RoleView::from_tag(&membership.role),
        })
        .collect();

    Ok(Json(OrgSelectionView {
        identity: ctx.identity,
        profile: ctx.profile,
        organizations,
    })
    .into_response())
}

#[derive(Debug, Serialize)]
pub struct NewOrganizationView {
    pub identity: Identity,
    pub currencies: &'static [&'static str],
}

pub async fn new_organization(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    match require_authenticated(state.backend.as_ref(), session.token()).await? {
        AuthorizationOutcome::Allowed(ctx) => Ok(Json(NewOrganizationView {
            identity: ctx.identity,
            currencies: &["USD", "EUR", "GBP", "KES", "UGX", "ETB", "XOF"],
        })
        .into_response()),
        AuthorizationOutcome::Denied(denial) => Ok(denial.into_response()),
    }
}

pub async fn org_home(Path(org_slug): Path<String>) -> Redirect {
    Redirect::temporary(&dashboard_path(&org_slug))
}

pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    Path(org_slug): Path<String>,
) -> Result<Response, AppError> {
    let outcome = require_permission(
        state.backend.as_ref(),
        session.token(),
        &org_slug,
        "dashboard:read",
    )
    .await?;
    render("dashboard", outcome)
}

pub async fn cases(
    State(state): State<AppState>,
    session: Session,
    Path(org_slug): Path<String>,
) -> Result<Response, AppError> {
    let outcome =
        require_permission(state.backend.as_ref(), session.token(), &org_slug, "cases:read")
            .await?;
    render("cases", outcome)
}

pub async fn protection_cases(
    State(state): State<AppState>,
    session: Session,
    Path(org_slug): Path<String>,
) -> Result<Response, AppError> {
    let outcome =
        require_protection_access(state.backend.as_ref(), session.token(), &org_slug).await?;
    render("protection_cases", outcome)
}

pub async fn finance_approvals(
    State(state): State<AppState>,
    session: Session,
    Path(org_slug): Path<String>,
) -> Result<Response, AppError> {
    let outcome = require_permission(
        state.backend.as_ref(),
        session.token(),
        &org_slug,
        "finance:approve",
    )
    .await?;
    render("finance_approvals", outcome)
}

#[derive(Debug, Serialize)]
pub struct SuperAdminView {
    pub identity: Identity,
    pub roles: Vec<RoleView>,
}

/// Super-admin console landing. The middleware has already checked the role.
pub async fn super_admin_home(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    match require_authenticated(state.backend.as_ref(), session.token()).await? {
        AuthorizationOutcome::Allowed(ctx) => Ok(Json(SuperAdminView {
            identity: ctx.identity,
            roles: permissions::assignable_roles("super_admin")
                .into_iter()
                .map(RoleView::from)
                .collect(),
        })
        .into_response()),
        AuthorizationOutcome::Denied(denial) => Ok(denial.into_response()),
    }
}

#[derive(Debug, Deserialize)]
pub struct UnauthorizedQuery {
    pub error: Option<String>,
}

pub async fn unauthorized(Query(query): Query<UnauthorizedQuery>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "error": query.error.unwrap_or_else(|| "unauthorized".to_string()),
        "message": "You do not have access to this organization. Ask an administrator to invite you.",
    }))
}
