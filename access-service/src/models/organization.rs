use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Organization-level settings, stored as a JSON column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgSettings {
    /// ISO 4217 currency code used for budgets and finance records
    pub default_currency: String,

    /// Month the fiscal year starts in (1 = January)
    pub fiscal_year_start_month: u8,

    /// Whether every member must enroll a second factor
    pub require_2fa: bool,

    /// Whether field devices may capture data offline
    pub allow_offline: bool,
}

impl Default for OrgSettings {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            fiscal_year_start_month: 1,
            require_2fa: false,
            allow_offline: false,
        }
    }
}

impl OrgSettings {
    /// Fiscal start month clamped into `1..=12`; bad stored values fall back to January.
    pub fn fiscal_year_start(&self) -> u8 {
        if (1..=12).contains(&self.fiscal_year_start_month) {
            self.fiscal_year_start_month
        } else {
            1
        }
    }
}

/// A tenant. Addressed in URLs by its unique `slug`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    #[sqlx(json)]
    pub settings: OrgSettings,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            slug: slug.into(),
            name: name.into(),
            settings: OrgSettings::default(),
            created_at: Utc::now(),
        }
    }
}
