use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{effective_permissions, RoleView};
use crate::middleware::Session;
use crate::models::{PermissionToken, Role};
use crate::services::{check_permission, permissions, resolve_context, AuthContext};
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    #[serde(flatten)]
    pub context: AuthContext,
    pub role: Option<RoleView>,
    pub permissions: Vec<&'static str>,
    pub can_access_protection_cases: bool,
}

/// Resolved auth context for an organization. Absent org or membership is `null`.
pub async fn get_context(
    State(state): State<AppState>,
    session: Session,
    Path(org_slug): Path<String>,
) -> Result<Json<ContextResponse>, AppError> {
    let ctx = resolve_context(state.backend.as_ref(), session.token(), Some(&org_slug))
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("No valid session")))?;

    Ok(Json(ContextResponse {
        role: ctx.membership.as_ref().map(|m| RoleView::from_tag(&m.role)),
        permissions: effective_permissions(&ctx),
        can_access_protection_cases: ctx.can_access_protection_cases(),
        context: ctx,
    }))
}

fn validate_permission_token(token: &str) -> Result<(), ValidationError> {
    token
        .parse::<PermissionToken>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("permission_token"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PermissionCheckQuery {
    #[validate(length(min = 1, max = 128), custom(function = "validate_permission_token"))]
    pub permission: String,
}

#[derive(Debug, Serialize)]
pub struct PermissionCheckResponse {
    pub permission: String,
    pub allowed: bool,
}

pub async fn check(
    State(state): State<AppState>,
    session: Session,
    Path(org_slug): Path<String>,
    Query(query): Query<PermissionCheckQuery>,
) -> Result<Json<PermissionCheckResponse>, AppError> {
    query.validate()?;

    let allowed = check_permission(
        state.backend.as_ref(),
        session.token(),
        &org_slug,
        &query.permission,
    )
    .await?;

    Ok(Json(PermissionCheckResponse {
        permission: query.permission,
        allowed,
    }))
}

#[derive(Debug, Serialize)]
pub struct AssignableRolesResponse {
    pub acting_role: RoleView,
    pub roles: Vec<RoleView>,
}

pub async fn assignable_roles(
    State(state): State<AppState>,
    session: Session,
    Path(org_slug): Path<String>,
) -> Result<Json<AssignableRolesResponse>, AppError> {
    let ctx = resolve_context(state.backend.as_ref(), session.token(), Some(&org_slug))
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("No valid session")))?;

    let membership = ctx.membership.ok_or_else(|| {
        AppError::Forbidden(anyhow::anyhow!("Not a member of organization {}", org_slug))
    })?;

    Ok(Json(AssignableRolesResponse {
        roles: permissions::assignable_roles(&membership.role)
            .into_iter()
            .map(RoleView::from)
            .collect(),
        acting_role: RoleView::from_tag(&membership.role),
    }))
}

#[derive(Debug, Serialize)]
pub struct RoleDescription {
    #[serde(flatten)]
    pub role: RoleView,
    pub permissions: Vec<&'static str>,
    pub can_access_protection_cases: bool,
}

pub async fn list_roles() -> Json<Vec<RoleDescription>> {
    Json(
        Role::ALL
            .into_iter()
            .map(|role| RoleDescription {
                role: RoleView::from(role),
                permissions: permissions::permissions_of(role),
                can_access_protection_cases: permissions::can_access_protection_cases(
                    role.as_str(),
                ),
            })
            .collect(),
    )
}
