//! Test helpers for access-service integration tests.
//!
//! Everything runs against the in-memory backend; no database is needed.

#![allow(dead_code)]

use access_service::{
    build_router,
    config::{
        AccessConfig, BackendErrorPolicy, DatabaseConfig, Environment, MiddlewareConfig,
        SecurityConfig, SessionConfig, TenancyMode,
    },
    models::{Identity, Membership, Organization, Profile, Role},
    services::InMemoryBackend,
    AppState,
};
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const COOKIE_NAME: &str = "access_token";

pub fn test_config(tenancy: TenancyMode, policy: BackendErrorPolicy) -> AccessConfig {
    AccessConfig {
        common: service_core::config::Config::default(),
        environment: Environment::Dev,
        service_name: "access-service-test".to_string(),
        service_version: "0.0.0-test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: "postgres://localhost/unused".to_string(),
            max_connections: 1,
            min_connections: 1,
            run_migrations: false,
            acquire_timeout_secs: 1,
        },
        session: SessionConfig {
            jwt_secret: "test-secret-at-least-16-bytes".to_string(),
            audience: "authenticated".to_string(),
            cookie_name: COOKIE_NAME.to_string(),
        },
        tenancy,
        middleware: MiddlewareConfig {
            backend_error_policy: policy,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    }
}

pub fn self_hosted(slug: &str) -> TenancyMode {
    TenancyMode::SelfHosted {
        org_slug: slug.to_string(),
    }
}

/// Test application: router plus a handle on the backend it reads from.
pub struct TestApp {
    pub backend: Arc<InMemoryBackend>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config(TenancyMode::Saas, BackendErrorPolicy::FailOpen))
    }

    pub fn with_config(config: AccessConfig) -> Self {
        let backend = Arc::new(InMemoryBackend::new());
        let state = AppState {
            config,
            backend: backend.clone(),
            metrics: None,
        };
        Self {
            backend,
            router: build_router(state),
        }
    }

    pub fn state(&self, config: AccessConfig) -> AppState {
        AppState {
            config,
            backend: self.backend.clone(),
            metrics: None,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(get_request(uri, token))
            .await
            .expect("request failed")
    }
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("{}={}", COOKIE_NAME, token));
    }
    builder.body(Body::empty()).expect("valid request")
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body read")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// Register a signed-in user and return `(identity, session token)`.
pub fn sign_in(backend: &InMemoryBackend, email: &str) -> (Identity, String) {
    let identity = Identity {
        id: Uuid::new_v4(),
        email: email.to_string(),
    };
    let token = format!("session-{}", identity.id);
    backend.add_session(&token, identity.clone());
    backend.add_profile(Profile {
        id: identity.id,
        full_name: Some(email.split('@').next().unwrap_or(email).to_string()),
        phone: None,
        avatar_url: None,
    });
    (identity, token)
}

pub fn seed_org(backend: &InMemoryBackend, slug: &str) -> Organization {
    let org = Organization::new(slug, format!("{} Relief", slug));
    backend.add_org(org.clone());
    org
}

pub fn join(backend: &InMemoryBackend, identity: &Identity, org: &Organization, role: Role) -> Membership {
    let membership = Membership::new(identity.id, org.id, role);
    backend.add_membership(membership.clone());
    membership
}
