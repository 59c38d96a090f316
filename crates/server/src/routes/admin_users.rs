use axum::extract::{Path, RawForm, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use models::user::{validate_email, validate_name, UserUpdate};
use models::Role;
use service::forms::SubmittedForm;

use crate::auth::{require_any, CurrentUser};
use crate::errors::AppError;
use crate::flash::{self, Flash};
use crate::state::AppState;

const MANAGER_ROLES: [Role; 1] = [Role::AdminManager];

/// Roles a manager can invite, with their display labels.
const INVITE_ROLE_CHOICES: [(Role, &str); 4] = [
    (Role::AdminCcsCategory, "Category"),
    (Role::AdminFrameworkManager, "Framework Manager"),
    (Role::AdminCcsSourcing, "Sourcing"),
    (Role::Admin, "Support"),
];

/// Roles an existing admin user can be switched between.
const EDIT_ROLE_CHOICES: [(Role, &str); 3] = [
    (Role::AdminCcsCategory, "Category"),
    (Role::AdminCcsSourcing, "Sourcing"),
    (Role::Admin, "Support"),
];

#[derive(Debug, Serialize)]
struct FormError {
    field: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct RoleChoice {
    value: &'static str,
    label: &'static str,
}

fn choices(table: &[(Role, &'static str)]) -> Vec<RoleChoice> {
    table
        .iter()
        .map(|&(role, label)| RoleChoice { value: role.as_str(), label })
        .collect()
}

#[derive(Debug, Serialize)]
struct AdminUserRow {
    user_id: i64,
    name: String,
    email_address: String,
    role: Role,
    active: bool,
}

/// `GET /admin-users` — every admin account, active first.
pub async fn list_admin_users(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), AppError> {
    require_any(&user, &MANAGER_ROLES)?;
    let admin_users = service::users::find_all_admin_users(state.api.as_ref()).await?;
    let rows: Vec<AdminUserRow> = admin_users
        .iter()
        .map(|u| AdminUserRow {
            user_id: u.id,
            name: u.name.clone(),
            email_address: u.email_address.clone(),
            role: u.role,
            active: u.active,
        })
        .collect();
    let (jar, flashes) = flash::take(jar);
    Ok((
        jar,
        Json(serde_json::json!({"admin_users": rows, "flashes": flashes})),
    ))
}

/// `GET /admin-users/invite`
pub async fn invite_form(
    State(_state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    require_any(&user, &MANAGER_ROLES)?;
    Ok(Json(
        serde_json::json!({"role_choices": choices(&INVITE_ROLE_CHOICES)}),
    ))
}

/// `POST /admin-users/invite`
pub async fn invite_admin_user(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    RawForm(body): RawForm,
) -> Result<Response, AppError> {
    require_any(&user, &MANAGER_ROLES)?;
    let form = SubmittedForm::parse(&body);
    let email_address = form.first("email_address").unwrap_or_default().trim().to_string();
    let role_value = form.first("role").unwrap_or_default().trim().to_string();

    let mut errors: Vec<FormError> = Vec::new();
    if email_address.is_empty() {
        errors.push(FormError {
            field: "email_address",
            message: "You must provide an email address",
        });
    } else if validate_email(&email_address).is_err() {
        errors.push(FormError {
            field: "email_address",
            message: "Please enter a valid email address",
        });
    } else if !state.api.email_is_valid_for_admin_user(&email_address).await? {
        errors.push(FormError {
            field: "email_address",
            message: "The email address must belong to an approved domain",
        });
    }

    let role = role_value.parse::<Role>().ok().filter(|role| {
        INVITE_ROLE_CHOICES.iter().any(|(choice, _)| choice == role)
    });
    if role.is_none() {
        errors.push(FormError { field: "role", message: "You must choose a permission" });
    }

    let Some(role) = role.filter(|_| errors.is_empty()) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "errors": errors,
                "role_choices": choices(&INVITE_ROLE_CHOICES),
            })),
        )
            .into_response());
    };

    state
        .mailer
        .send_account_invite(&email_address, role, &user.name)
        .await?;
    let jar = flash::push(
        jar,
        Flash::message(format!("An invitation has been sent to {email_address}.")),
    );
    Ok((jar, Redirect::to("/admin-users")).into_response())
}

#[derive(Debug, Serialize)]
pub struct EditAdminUserView {
    user_id: i64,
    name: String,
    email_address: String,
    role: Role,
    active: bool,
    role_choices: Vec<RoleChoice>,
    errors: Vec<FormError>,
}

async fn load_admin_user(state: &AppState, user_id: i64) -> Result<models::User, AppError> {
    state
        .api
        .get_user(user_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// `GET /admin-users/:user_id/edit`
pub async fn edit_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
) -> Result<Json<EditAdminUserView>, AppError> {
    require_any(&user, &MANAGER_ROLES)?;
    let account = load_admin_user(&state, user_id).await?;
    Ok(Json(EditAdminUserView {
        user_id: account.id,
        name: account.name,
        email_address: account.email_address,
        role: account.role,
        active: account.active,
        role_choices: choices(&EDIT_ROLE_CHOICES),
        errors: Vec::new(),
    }))
}

/// `POST /admin-users/:user_id/edit`
pub async fn edit_admin_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
    jar: CookieJar,
    RawForm(body): RawForm,
) -> Result<Response, AppError> {
    require_any(&user, &MANAGER_ROLES)?;
    let account = load_admin_user(&state, user_id).await?;

    let form = SubmittedForm::parse(&body);
    let name = form.first("edit_admin_name").unwrap_or_default().trim().to_string();
    let role = form
        .first("edit_admin_permissions")
        .unwrap_or(account.role.as_str())
        .parse::<Role>()
        .ok()
        .filter(|role| EDIT_ROLE_CHOICES.iter().any(|(choice, _)| choice == role))
        .unwrap_or(account.role);
    let active = match form.first("edit_admin_status") {
        Some("True") => true,
        Some("False") => false,
        _ => account.active,
    };

    if validate_name(&name).is_err() {
        let view = EditAdminUserView {
            user_id: account.id,
            name,
            email_address: account.email_address,
            role,
            active,
            role_choices: choices(&EDIT_ROLE_CHOICES),
            errors: vec![FormError {
                field: "edit_admin_name",
                message: "You must provide a name.",
            }],
        };
        return Ok((StatusCode::BAD_REQUEST, Json(view)).into_response());
    }

    let update = UserUpdate {
        name: Some(name),
        role: Some(role),
        active: Some(active),
        ..Default::default()
    };
    state.api.update_user(user_id, &update, &user.email).await?;

    let jar = flash::push(
        jar,
        Flash::message(format!("{} has been updated.", account.email_address)),
    );
    Ok((jar, Redirect::to("/admin-users")).into_response())
}
