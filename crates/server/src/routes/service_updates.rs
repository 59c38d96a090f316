use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use models::Role;
use service::audit_trail;
use service::diff::{service_diffs, QuestionDiff};

use crate::auth::{require_any, CurrentUser};
use crate::errors::AppError;
use crate::flash::{self, Flash};
use crate::state::AppState;

const REVIEW_ROLES: [Role; 1] = [Role::AdminCcsCategory];

#[derive(Debug, Serialize)]
pub struct ServiceUpdatesView {
    service_id: String,
    service_name: String,
    supplier_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    supplier_contact_email: Option<String>,
    edit_summary: String,
    /// "Changed on ..." for the oldest still-unapproved edit.
    #[serde(skip_serializing_if = "Option::is_none")]
    oldest_change: Option<String>,
    /// Event the approve form posts to; approving it approves everything
    /// before it.
    #[serde(skip_serializing_if = "Option::is_none")]
    approve_event_id: Option<u64>,
    diffs: Vec<QuestionDiff>,
    /// Edits exist but cancel out; there is nothing visible to review.
    all_reversed: bool,
    flashes: Vec<Flash>,
}

/// `GET /admin/services/:service_id/updates` — review pending edits.
pub async fn view_service_updates(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(service_id): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ServiceUpdatesView>), AppError> {
    require_any(&user, &REVIEW_ROLES)?;

    let doc = state
        .api
        .get_service(&service_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let edits = audit_trail::unapproved_edits(state.api.as_ref(), &service_id).await?;

    let diffs = match edits.oldest() {
        Some(oldest) => {
            let old_id = oldest.old_archived_service_id().ok_or_else(|| {
                AppError::BadRequest(format!(
                    "audit event {} has no archived service reference",
                    oldest.id
                ))
            })?;
            let old_doc = state.api.get_archived_service(&old_id).await?;
            let framework = doc.framework_slug().ok_or(AppError::NotFound)?;
            let lot = doc.lot().ok_or(AppError::NotFound)?;
            let sections = state.content.sections_for(framework, lot)?;
            service_diffs(&sections, &old_doc, &doc)
        }
        None => Vec::new(),
    };

    let (supplier_name, supplier_contact_email) = match doc.supplier_id() {
        Some(supplier_id) => {
            let supplier = state.api.get_supplier(supplier_id).await?;
            let email = supplier.contact_email().map(String::from);
            (supplier.name, email)
        }
        None => (doc.supplier_name().unwrap_or_default().to_string(), None),
    };

    let (jar, flashes) = flash::take(jar);
    let view = ServiceUpdatesView {
        service_id: doc.id().unwrap_or_else(|| service_id.clone()),
        service_name: doc.service_name().unwrap_or_default().to_string(),
        supplier_name,
        supplier_contact_email,
        edit_summary: edits.summary_message(),
        oldest_change: edits.oldest_change_message(),
        approve_event_id: edits.latest().map(|e| e.id),
        all_reversed: !edits.is_empty() && diffs.is_empty(),
        diffs,
        flashes,
    };
    Ok((jar, Json(view)))
}

/// `POST /admin/services/:service_id/updates/:event_id/approve`
pub async fn approve_service_update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((service_id, event_id)): Path<(String, u64)>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    require_any(&user, &REVIEW_ROLES)?;
    state
        .api
        .acknowledge_service_update_including_previous(&service_id, event_id, &user.email)
        .await?;
    let jar = flash::push(jar, Flash::message("The edits have been approved."));
    Ok((jar, Redirect::to(&format!("/admin/services/{service_id}/updates"))))
}
