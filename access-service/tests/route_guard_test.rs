mod common;

use access_service::{
    models::{Membership, Role},
    services::{
        check_permission, require_authenticated, require_permission, require_protection_access,
        AuthorizationOutcome, DenialReason, InMemoryBackend,
    },
};
use common::{join, seed_org, sign_in};

fn denied_location(outcome: &AuthorizationOutcome) -> String {
    outcome
        .denial()
        .map(|d| d.location())
        .expect("expected a denial")
}

#[tokio::test]
async fn field_officer_cannot_approve_finance() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "field@example.org");
    let org = seed_org(&backend, "acme");
    join(&backend, &identity, &org, Role::FieldOfficer);

    let outcome = require_permission(&backend, Some(&token), "acme", "finance:approve")
        .await
        .unwrap();

    assert_eq!(denied_location(&outcome), "/app/acme/dashboard?error=unauthorized");
    assert_eq!(
        outcome.denial().map(|d| d.reason),
        Some(DenialReason::PermissionDenied)
    );
}

#[tokio::test]
async fn granted_permission_returns_context() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "finance@example.org");
    let org = seed_org(&backend, "acme");
    join(&backend, &identity, &org, Role::Finance);

    let outcome = require_permission(&backend, Some(&token), "acme", "finance:approve")
        .await
        .unwrap();

    match outcome {
        AuthorizationOutcome::Allowed(ctx) => {
            assert_eq!(ctx.identity.id, identity.id);
            assert_eq!(ctx.organization.map(|o| o.slug), Some("acme".to_string()));
        }
        AuthorizationOutcome::Denied(denial) => panic!("unexpected denial: {:?}", denial),
    }
}

#[tokio::test]
async fn guard_ladder_stops_at_first_failing_rung() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "viewer@example.org");
    let acme = seed_org(&backend, "acme");
    seed_org(&backend, "globex");
    join(&backend, &identity, &acme, Role::Viewer);

    // No session
    let outcome = require_permission(&backend, None, "acme", "dashboard:read")
        .await
        .unwrap();
    assert_eq!(denied_location(&outcome), "/auth/login");

    // Unknown organization
    let outcome = require_permission(&backend, Some(&token), "nowhere", "dashboard:read")
        .await
        .unwrap();
    assert_eq!(denied_location(&outcome), "/app");
    assert_eq!(
        outcome.denial().map(|d| d.reason),
        Some(DenialReason::NoOrganization)
    );

    // Not a member
    let outcome = require_permission(&backend, Some(&token), "globex", "dashboard:read")
        .await
        .unwrap();
    assert_eq!(denied_location(&outcome), "/app");
    assert_eq!(
        outcome.denial().map(|d| d.reason),
        Some(DenialReason::NotAMember)
    );

    // Member, permission granted
    let outcome = require_permission(&backend, Some(&token), "acme", "dashboard:read")
        .await
        .unwrap();
    assert!(outcome.is_allowed());
}

#[tokio::test]
async fn inactive_membership_is_not_a_member() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "former@example.org");
    let org = seed_org(&backend, "acme");
    backend.add_membership(Membership {
        is_active: false,
        ..Membership::new(identity.id, org.id, Role::OrgAdmin)
    });

    let outcome = require_permission(&backend, Some(&token), "acme", "dashboard:read")
        .await
        .unwrap();
    assert_eq!(denied_location(&outcome), "/app");
}

#[tokio::test]
async fn protection_cases_fall_back_to_case_list() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "pm@example.org");
    let org = seed_org(&backend, "acme");
    join(&backend, &identity, &org, Role::ProgramManager);

    let outcome = require_protection_access(&backend, Some(&token), "acme")
        .await
        .unwrap();

    assert_eq!(denied_location(&outcome), "/app/acme/cases?error=unauthorized");
    assert_eq!(
        outcome.denial().map(|d| d.reason),
        Some(DenialReason::ProtectionAccessDenied)
    );
}

#[tokio::test]
async fn auditor_may_open_protection_cases() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "auditor@example.org");
    let org = seed_org(&backend, "acme");
    join(&backend, &identity, &org, Role::Auditor);

    let outcome = require_protection_access(&backend, Some(&token), "acme")
        .await
        .unwrap();
    assert!(outcome.is_allowed());
}

#[tokio::test]
async fn require_authenticated_needs_only_a_session() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "new@example.org");

    let outcome = require_authenticated(&backend, Some(&token)).await.unwrap();
    match outcome {
        AuthorizationOutcome::Allowed(ctx) => assert_eq!(ctx.identity.id, identity.id),
        AuthorizationOutcome::Denied(denial) => panic!("unexpected denial: {:?}", denial),
    }

    let outcome = require_authenticated(&backend, None).await.unwrap();
    assert_eq!(denied_location(&outcome), "/auth/login");
    assert_eq!(
        outcome.denial().map(|d| d.reason),
        Some(DenialReason::Unauthenticated)
    );
}

#[tokio::test]
async fn check_permission_is_a_plain_boolean() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "hr@example.org");
    let org = seed_org(&backend, "acme");
    join(&backend, &identity, &org, Role::Hr);

    assert!(check_permission(&backend, Some(&token), "acme", "hr:write").await.unwrap());
    assert!(!check_permission(&backend, Some(&token), "acme", "finance:read").await.unwrap());
    assert!(!check_permission(&backend, None, "acme", "hr:write").await.unwrap());
    assert!(!check_permission(&backend, Some(&token), "globex", "hr:write").await.unwrap());
}

#[tokio::test]
async fn unknown_stored_role_holds_nothing() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "legacy@example.org");
    let org = seed_org(&backend, "acme");
    backend.add_membership(Membership {
        role: "regional_director".to_string(),
        ..Membership::new(identity.id, org.id, Role::Viewer)
    });

    let outcome = require_permission(&backend, Some(&token), "acme", "dashboard:read")
        .await
        .unwrap();
    assert_eq!(denied_location(&outcome), "/app?error=unauthorized");
    assert!(!check_permission(&backend, Some(&token), "acme", "dashboard:read").await.unwrap());
}

#[tokio::test]
async fn super_admin_membership_passes_every_permission() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "root@example.org");
    let org = seed_org(&backend, "acme");
    join(&backend, &identity, &org, Role::SuperAdmin);

    for permission in ["finance:approve", "cases:sensitive", "widgets:frobnicate"] {
        let outcome = require_permission(&backend, Some(&token), "acme", permission)
            .await
            .unwrap();
        assert!(outcome.is_allowed(), "{} should be allowed", permission);
    }
}

#[tokio::test]
async fn backend_failure_surfaces_as_error() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "viewer@example.org");
    let org = seed_org(&backend, "acme");
    join(&backend, &identity, &org, Role::Viewer);
    backend.set_unavailable(true);

    let result = require_permission(&backend, Some(&token), "acme", "dashboard:read").await;
    assert!(result.is_err());
}
