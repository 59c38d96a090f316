use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Staff and account roles as the data API names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "admin-ccs-category")]
    AdminCcsCategory,
    #[serde(rename = "admin-ccs-sourcing")]
    AdminCcsSourcing,
    #[serde(rename = "admin-framework-manager")]
    AdminFrameworkManager,
    #[serde(rename = "admin-manager")]
    AdminManager,
    #[serde(rename = "admin-ccs-data-controller")]
    AdminCcsDataController,
    #[serde(rename = "buyer")]
    Buyer,
    #[serde(rename = "supplier")]
    Supplier,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::AdminCcsCategory => "admin-ccs-category",
            Role::AdminCcsSourcing => "admin-ccs-sourcing",
            Role::AdminFrameworkManager => "admin-framework-manager",
            Role::AdminManager => "admin-manager",
            Role::AdminCcsDataController => "admin-ccs-data-controller",
            Role::Buyer => "buyer",
            Role::Supplier => "supplier",
        }
    }

    /// Every staff role; the admin-user directory aggregates all of these.
    pub const ADMIN_ROLES: [Role; 5] = [
        Role::Admin,
        Role::AdminCcsCategory,
        Role::AdminCcsSourcing,
        Role::AdminFrameworkManager,
        Role::AdminCcsDataController,
    ];
}

impl std::str::FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "admin-ccs-category" => Ok(Role::AdminCcsCategory),
            "admin-ccs-sourcing" => Ok(Role::AdminCcsSourcing),
            "admin-framework-manager" => Ok(Role::AdminFrameworkManager),
            "admin-manager" => Ok(Role::AdminManager),
            "admin-ccs-data-controller" => Ok(Role::AdminCcsDataController),
            "buyer" => Ok(Role::Buyer),
            "supplier" => Ok(Role::Supplier),
            other => Err(ModelError::Validation(format!("unknown role: {other}"))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account as served by the data API's `users` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email_address: String,
    pub role: Role,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<UserSupplier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_in_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<DateTime<Utc>>,
}

/// Supplier association embedded in supplier users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSupplier {
    pub supplier_id: i64,
    pub name: String,
}

/// Partial update body for `update_user`; only present fields change.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(' ') {
        return Err(ModelError::Validation("invalid email address".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name must not be empty".into()));
    }
    Ok(())
}
