use axum::extract::{Path, Query, RawForm, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use models::user::UserUpdate;
use models::Role;
use service::forms::SubmittedForm;
use service::users::AccountSummary;

use crate::auth::{require_any, CurrentUser};
use crate::errors::AppError;
use crate::state::AppState;

const ACCOUNT_ROLES: [Role; 2] = [Role::Admin, Role::AdminCcsCategory];

#[derive(Debug, Deserialize)]
pub struct FindUserQuery {
    #[serde(default)]
    email_address: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserAccountView {
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<AccountSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

/// `GET /admin/users?email_address=...` — look up one account by email.
/// A missing parameter, a blank address and an unknown address all render
/// the same empty page with a 404.
pub async fn find_user_by_email(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<FindUserQuery>,
) -> Result<Response, AppError> {
    require_any(&user, &ACCOUNT_ROLES)?;

    let email = query.email_address.unwrap_or_default();
    let found = if email.trim().is_empty() {
        None
    } else {
        state.api.get_user_by_email(email.trim()).await?
    };

    match found {
        Some(account) => Ok(Json(UserAccountView {
            user: Some(AccountSummary::from_user(&account)),
            message: None,
        })
        .into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(UserAccountView {
                user: None,
                message: Some("Sorry, we couldn't find an account with that email address"),
            }),
        )
            .into_response()),
    }
}

fn return_target(form: &SubmittedForm, email: &str) -> String {
    match form.first("source").map(str::trim).filter(|s| !s.is_empty()) {
        Some(source) => source.to_string(),
        None => {
            let encoded: String = form_urlencoded::byte_serialize(email.as_bytes()).collect();
            format!("/admin/users?email_address={encoded}")
        }
    }
}

async fn set_user_flags(
    state: &AppState,
    actor: &CurrentUser,
    user_id: i64,
    update: UserUpdate,
    body: &[u8],
) -> Result<Redirect, AppError> {
    let form = SubmittedForm::parse(body);
    let updated = state.api.update_user(user_id, &update, &actor.email).await?;
    Ok(Redirect::to(&return_target(&form, &updated.email_address)))
}

/// `POST /admin/suppliers/users/:user_id/unlock`
pub async fn unlock_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
    RawForm(body): RawForm,
) -> Result<Redirect, AppError> {
    require_any(&user, &ACCOUNT_ROLES)?;
    let update = UserUpdate { locked: Some(false), ..Default::default() };
    set_user_flags(&state, &user, user_id, update, &body).await
}

/// `POST /admin/suppliers/users/:user_id/deactivate`
pub async fn deactivate_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
    RawForm(body): RawForm,
) -> Result<Redirect, AppError> {
    require_any(&user, &ACCOUNT_ROLES)?;
    let update = UserUpdate { active: Some(false), ..Default::default() };
    set_user_flags(&state, &user, user_id, update, &body).await
}
