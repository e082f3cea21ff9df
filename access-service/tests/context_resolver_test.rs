mod common;

use access_service::{
    models::{Membership, Role},
    services::{resolve_context, InMemoryBackend},
};
use common::{join, seed_org, sign_in};

#[tokio::test]
async fn no_token_resolves_to_none() {
    let backend = InMemoryBackend::new();
    seed_org(&backend, "acme");

    let ctx = resolve_context(&backend, None, Some("acme")).await.unwrap();
    assert!(ctx.is_none());

    let ctx = resolve_context(&backend, Some(""), Some("acme")).await.unwrap();
    assert!(ctx.is_none());
}

#[tokio::test]
async fn unknown_token_resolves_to_none() {
    let backend = InMemoryBackend::new();
    let ctx = resolve_context(&backend, Some("forged"), None).await.unwrap();
    assert!(ctx.is_none());
}

#[tokio::test]
async fn without_slug_only_identity_and_profile_are_resolved() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "amina@example.org");
    let org = seed_org(&backend, "acme");
    join(&backend, &identity, &org, Role::OrgAdmin);

    let ctx = resolve_context(&backend, Some(&token), None)
        .await
        .unwrap()
        .expect("context for a valid session");

    assert_eq!(ctx.identity, identity);
    assert_eq!(ctx.profile.as_ref().map(|p| p.id), Some(identity.id));
    assert!(ctx.organization.is_none());
    assert!(ctx.membership.is_none());
}

#[tokio::test]
async fn unknown_org_yields_context_without_org_or_membership() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "amina@example.org");

    let ctx = resolve_context(&backend, Some(&token), Some("does-not-exist"))
        .await
        .expect("never an error for a missing org")
        .expect("context for a valid session");

    assert_eq!(ctx.identity.id, identity.id);
    assert!(ctx.organization.is_none());
    assert!(ctx.membership.is_none());
}

#[tokio::test]
async fn inactive_membership_is_treated_as_none() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "amina@example.org");
    let org = seed_org(&backend, "acme");
    backend.add_membership(Membership {
        is_active: false,
        ..Membership::new(identity.id, org.id, Role::Finance)
    });

    let ctx = resolve_context(&backend, Some(&token), Some("acme"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(ctx.organization.as_ref().map(|o| o.id), Some(org.id));
    assert!(ctx.membership.is_none());
    assert!(!ctx.has_permission("dashboard:read"));
}

#[tokio::test]
async fn active_membership_is_resolved() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "amina@example.org");
    let org = seed_org(&backend, "acme");
    join(&backend, &identity, &org, Role::ProtectionOfficer);

    let ctx = resolve_context(&backend, Some(&token), Some("acme"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(ctx.role(), Some(Role::ProtectionOfficer));
    assert!(ctx.has_permission("cases:sensitive"));
    assert!(!ctx.has_permission("finance:approve"));
    assert!(ctx.can_access_protection_cases());
}

#[tokio::test]
async fn membership_in_another_org_does_not_leak() {
    let backend = InMemoryBackend::new();
    let (identity, token) = sign_in(&backend, "amina@example.org");
    let acme = seed_org(&backend, "acme");
    seed_org(&backend, "globex");
    join(&backend, &identity, &acme, Role::OrgAdmin);

    let ctx = resolve_context(&backend, Some(&token), Some("globex"))
        .await
        .unwrap()
        .unwrap();

    assert!(ctx.organization.is_some());
    assert!(ctx.membership.is_none());
}

#[tokio::test]
async fn failed_profile_lookup_leaves_profile_empty() {
    let backend = InMemoryBackend::new();
    let (_, token) = sign_in(&backend, "amina@example.org");
    backend.drop_relation("profiles");

    let ctx = resolve_context(&backend, Some(&token), None)
        .await
        .unwrap()
        .unwrap();

    assert!(ctx.profile.is_none());
}

#[tokio::test]
async fn org_lookup_failure_propagates() {
    let backend = InMemoryBackend::new();
    let (_, token) = sign_in(&backend, "amina@example.org");
    seed_org(&backend, "acme");
    backend.drop_relation("orgs");

    let result = resolve_context(&backend, Some(&token), Some("acme")).await;
    assert!(result.is_err());
}
