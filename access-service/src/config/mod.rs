use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct AccessConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub tenancy: TenancyMode,
    pub middleware: MiddlewareConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub jwt_secret: String,
    pub audience: String,
    pub cookie_name: String,
}

/// Deployment shape: many tenants choosing an organization, or one fixed organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenancyMode {
    Saas,
    SelfHosted { org_slug: String },
}

impl TenancyMode {
    pub fn default_org_slug(&self) -> Option<&str> {
        match self {
            TenancyMode::Saas => None,
            TenancyMode::SelfHosted { org_slug } => Some(org_slug),
        }
    }
}

/// What the request middleware does when a lookup fails for a reason other
/// than a missing relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorPolicy {
    FailOpen,
    FailClosed,
}

#[derive(Debug, Clone)]
pub struct MiddlewareConfig {
    pub backend_error_policy: BackendErrorPolicy,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

impl AccessConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let tenancy = parse_tenancy(
            &get_env("APP_MODE", Some("saas"), is_prod)?,
            env::var("SELF_HOSTED_ORG_SLUG").ok(),
        )?;

        let config = AccessConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("access-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", "10", is_prod)?,
                min_connections: parse_env("DATABASE_MIN_CONNECTIONS", "1", is_prod)?,
                run_migrations: parse_env("DATABASE_RUN_MIGRATIONS", "false", is_prod)?,
                acquire_timeout_secs: parse_env("DATABASE_ACQUIRE_TIMEOUT_SECS", "10", is_prod)?,
            },
            session: SessionConfig {
                jwt_secret: get_env("SESSION_JWT_SECRET", None, true)?,
                audience: get_env("SESSION_JWT_AUDIENCE", Some("authenticated"), is_prod)?,
                cookie_name: get_env("SESSION_COOKIE_NAME", Some("access_token"), is_prod)?,
            },
            tenancy,
            middleware: MiddlewareConfig {
                backend_error_policy: get_env(
                    "MIDDLEWARE_BACKEND_ERROR_POLICY",
                    Some("fail_open"),
                    is_prod,
                )?
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            },
            security: SecurityConfig {
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.database.max_connections == 0
            || self.database.min_connections > self.database.max_connections
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "DATABASE_MIN_CONNECTIONS must not exceed a non-zero DATABASE_MAX_CONNECTIONS"
            )));
        }

        if self.database.acquire_timeout_secs == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0"
            )));
        }

        if self.session.jwt_secret.len() < 16 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SESSION_JWT_SECRET must be at least 16 bytes"
            )));
        }

        if self.environment == Environment::Prod {
            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }

            if self.middleware.backend_error_policy == BackendErrorPolicy::FailOpen {
                tracing::warn!(
                    "Middleware lets requests through on backend errors; set MIDDLEWARE_BACKEND_ERROR_POLICY=fail_closed to deny instead"
                );
            }
        }

        Ok(())
    }
}

fn parse_tenancy(mode: &str, self_hosted_slug: Option<String>) -> Result<TenancyMode, AppError> {
    match mode.to_lowercase().as_str() {
        "saas" => Ok(TenancyMode::Saas),
        "self_hosted" => {
            let org_slug = self_hosted_slug
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "SELF_HOSTED_ORG_SLUG is required when APP_MODE=self_hosted"
                    ))
                })?;
            Ok(TenancyMode::SelfHosted { org_slug })
        }
        other => Err(AppError::ConfigError(anyhow::anyhow!(
            "Invalid APP_MODE: {} (expected saas or self_hosted)",
            other
        ))),
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: &str, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key, Some(default), is_prod)?
        .parse()
        .map_err(|e: T::Err| AppError::ConfigError(anyhow::anyhow!("Invalid {}: {}", key, e)))
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

impl std::str::FromStr for BackendErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail_open" => Ok(BackendErrorPolicy::FailOpen),
            "fail_closed" => Ok(BackendErrorPolicy::FailClosed),
            _ => Err(format!("Invalid backend error policy: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saas_mode_needs_no_slug() {
        assert_eq!(parse_tenancy("saas", None).unwrap(), TenancyMode::Saas);
        assert_eq!(parse_tenancy("SaaS", Some("x".into())).unwrap(), TenancyMode::Saas);
    }

    #[test]
    fn self_hosted_requires_slug() {
        assert!(parse_tenancy("self_hosted", None).is_err());
        assert!(parse_tenancy("self_hosted", Some("  ".into())).is_err());
        assert_eq!(
            parse_tenancy("self_hosted", Some("default".into())).unwrap(),
            TenancyMode::SelfHosted {
                org_slug: "default".to_string()
            }
        );
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(parse_tenancy("hybrid", None).is_err());
    }

    #[test]
    fn policy_parses() {
        assert_eq!("fail_open".parse::<BackendErrorPolicy>(), Ok(BackendErrorPolicy::FailOpen));
        assert_eq!("FAIL_CLOSED".parse::<BackendErrorPolicy>(), Ok(BackendErrorPolicy::FailClosed));
        assert!("maybe".parse::<BackendErrorPolicy>().is_err());
    }
}
