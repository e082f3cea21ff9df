//! Request middleware: runs before every handler and turns missing session,
//! organization or membership into redirects.
//!
//! Lookup failures caused by an unprovisioned schema let the request through;
//! other lookup failures follow the configured [`BackendErrorPolicy`].
//! Handlers still run their own guards, so this layer only does the coarse check.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;

use super::paths::{classify_path, PathClass};
use super::session::session_token;
use crate::config::{BackendErrorPolicy, TenancyMode};
use crate::models::Identity;
use crate::services::guard::{dashboard_path, ORG_SELECT_PATH};
use crate::services::{BackendError, Denial, DenialReason};
use crate::AppState;
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;

/// Landing page when the configured self-hosted organization rejects the caller.
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

enum Decision {
    Allow,
    Redirect(Denial),
    Unavailable(String),
}

pub async fn access_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let class = classify_path(&path);
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    if matches!(class, PathClass::Static | PathClass::Public) {
        return next.run(request).await;
    }

    let identity = match session_token(request.headers(), &state.config.session.cookie_name) {
        Some(token) => match state.backend.current_identity(&token).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Session lookup failed");
                None
            }
        },
        None => None,
    };

    let Some(identity) = identity else {
        if class == PathClass::Api {
            record(&class, "unauthorized");
            tracing::debug!(request_id = %request_id, path = %path, "No session on API route");
            return AppError::Unauthorized(anyhow::anyhow!("No valid session")).into_response();
        }

        record(&class, "login");
        let return_to = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or(path.as_str());
        tracing::debug!(request_id = %request_id, path = %path, "No session, redirecting to login");
        return Denial::login(Some(return_to)).into_response();
    };

    match decide(&state, &class, &identity).await {
        Decision::Allow => {
            record(&class, "allow");
            next.run(request).await
        }
        Decision::Redirect(denial) => {
            record(&class, "redirect");
            tracing::info!(
                request_id = %request_id,
                path = %path,
                user_id = %identity.id,
                reason = ?denial.reason,
                location = %denial.location(),
                "Request redirected"
            );
            denial.into_response()
        }
        Decision::Unavailable(reason) => {
            record(&class, "unavailable");
            tracing::warn!(request_id = %request_id, path = %path, "Access check unavailable");
            AppError::ServiceUnavailable(reason).into_response()
        }
    }
}

fn record(class: &PathClass<'_>, decision: &'static str) {
    counter!(
        "access_decisions_total",
        "class" => class.label(),
        "decision" => decision
    )
    .increment(1);
}

async fn decide(state: &AppState, class: &PathClass<'_>, identity: &Identity) -> Decision {
    let tenancy = &state.config.tenancy;

    match *class {
        PathClass::Static | PathClass::Public | PathClass::Api | PathClass::Protected => {
            Decision::Allow
        }
        PathClass::NewOrganization => Decision::Allow,
        PathClass::SuperAdmin => require_super_admin(state, identity).await,
        PathClass::AppRoot => match tenancy {
            TenancyMode::Saas => Decision::Allow,
            TenancyMode::SelfHosted { org_slug } => Decision::Redirect(Denial::new(
                dashboard_path(org_slug),
                DenialReason::NoOrganization,
            )),
        },
        PathClass::OrgScoped { org_slug: None } => Decision::Redirect(Denial::new(
            match tenancy {
                TenancyMode::Saas => ORG_SELECT_PATH.to_string(),
                TenancyMode::SelfHosted { org_slug } => dashboard_path(org_slug),
            },
            DenialReason::NoOrganization,
        )),
        PathClass::OrgScoped {
            org_slug: Some(slug),
        } => require_membership(state, identity, slug).await,
    }
}

/// Super-admin role checked directly against memberships. Lookup errors deny.
async fn require_super_admin(state: &AppState, identity: &Identity) -> Decision {
    match state.backend.has_super_admin_membership(identity.id).await {
        Ok(true) => Decision::Allow,
        Ok(false) => Decision::Redirect(Denial::new(ORG_SELECT_PATH, DenialReason::NotSuperAdmin)),
        Err(e) => {
            tracing::error!(user_id = %identity.id, error = %e, "Super-admin lookup failed");
            Decision::Redirect(Denial::new(ORG_SELECT_PATH, DenialReason::NotSuperAdmin))
        }
    }
}

async fn require_membership(state: &AppState, identity: &Identity, slug: &str) -> Decision {
    let org = match state.backend.fetch_org_by_slug(slug).await {
        Ok(Some(org)) => org,
        Ok(None) => return deny_org(state, slug, DenialReason::NoOrganization),
        Err(e) => return on_backend_error(state, slug, e),
    };

    match state
        .backend
        .fetch_active_membership(identity.id, org.id)
        .await
    {
        Ok(Some(membership)) if membership.is_active => Decision::Allow,
        Ok(_) => deny_org(state, slug, DenialReason::NotAMember),
        Err(e) => on_backend_error(state, slug, e),
    }
}

/// Org-selection redirect. The self-hosted default org has nowhere else to
/// send the caller, so it lands on the unauthorized page instead of looping.
fn deny_org(state: &AppState, slug: &str, reason: DenialReason) -> Decision {
    let denial = match state.config.tenancy.default_org_slug() {
        Some(default_slug) if default_slug == slug => {
            Denial::new(UNAUTHORIZED_PATH, reason).with_error("no_membership")
        }
        _ => Denial::new(ORG_SELECT_PATH, reason),
    };
    Decision::Redirect(denial)
}

fn on_backend_error(state: &AppState, slug: &str, err: BackendError) -> Decision {
    if err.is_relation_missing() {
        tracing::warn!(org_slug = %slug, error = %err, "Schema not provisioned, allowing request");
        return Decision::Allow;
    }

    match state.config.middleware.backend_error_policy {
        BackendErrorPolicy::FailOpen => {
            tracing::warn!(org_slug = %slug, error = %err, "Membership lookup failed, allowing request");
            Decision::Allow
        }
        BackendErrorPolicy::FailClosed => {
            tracing::error!(org_slug = %slug, error = %err, "Membership lookup failed, rejecting request");
            Decision::Unavailable(err.to_string())
        }
    }
}
