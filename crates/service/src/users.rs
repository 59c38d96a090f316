//! Assembly of user-facing account views and the admin-user directory.

use client::{ClientError, DataApi};
use models::{Role, User};
use serde::Serialize;

use crate::dates::{display_clock_time, display_short_date};

/// Fetch every staff account across the admin roles. The API filters by a
/// single role per request, so this is one paged walk per role.
pub async fn find_all_admin_users(api: &dyn DataApi) -> Result<Vec<User>, ClientError> {
    let mut users = Vec::new();
    for role in Role::ADMIN_ROLES {
        users.extend(api.find_users_iter(role).await?);
    }
    sort_admin_users(&mut users);
    Ok(users)
}

/// Active accounts first, alphabetical by name within each group.
pub fn sort_admin_users(users: &mut [User]) {
    users.sort_by(|a, b| {
        (!a.active, a.name.as_str()).cmp(&(!b.active, b.name.as_str()))
    });
}

/// What the account page shows for one user.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub user_id: i64,
    pub name: String,
    pub email_address: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
    pub last_login_time: Option<String>,
    pub last_login_day: Option<String>,
    pub last_password_change_time: Option<String>,
    pub last_password_change_day: Option<String>,
    pub locked: bool,
    pub active: bool,
}

impl AccountSummary {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            email_address: user.email_address.clone(),
            role: user.role,
            supplier_id: user.supplier.as_ref().map(|s| s.supplier_id),
            supplier_name: user.supplier.as_ref().map(|s| s.name.clone()),
            last_login_time: user.logged_in_at.map(display_clock_time),
            last_login_day: user.logged_in_at.map(display_short_date),
            last_password_change_time: user.password_changed_at.map(display_clock_time),
            last_password_change_day: user.password_changed_at.map(display_short_date),
            locked: user.locked,
            active: user.active,
        }
    }
}
