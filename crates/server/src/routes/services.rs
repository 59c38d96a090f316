use axum::extract::{Path, Query, RawForm, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use client::AuditEventQuery;
use content::{QuestionType, Section};
use models::{AuditEventType, Role, ServiceDocument, ServiceStatus};
use service::forms::{FieldError, SectionForm, SubmittedForm};
use service::{payload, status};

use crate::auth::{require_any, CurrentUser};
use crate::errors::AppError;
use crate::flash::{self, Flash};
use crate::state::AppState;

const VIEW_ROLES: [Role; 2] = [Role::Admin, Role::AdminCcsCategory];
const EDIT_ROLES: [Role; 1] = [Role::AdminCcsCategory];

#[derive(Debug, Deserialize)]
pub struct FindServiceQuery {
    #[serde(default)]
    service_id: Option<String>,
}

/// `GET /admin/services?service_id=X` — jump straight to a service page.
pub async fn find_service(
    State(_state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<FindServiceQuery>,
) -> Result<Redirect, AppError> {
    require_any(&user, &VIEW_ROLES)?;
    match query.service_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Ok(Redirect::to(&format!("/admin/services/{id}"))),
        _ => Err(AppError::NotFound),
    }
}

#[derive(Debug, Deserialize)]
pub struct ViewServiceQuery {
    #[serde(default)]
    publish: Option<String>,
    #[serde(default)]
    remove: Option<String>,
}

#[derive(Debug, Serialize)]
struct QuestionView {
    id: String,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    answered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_text: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct SectionView {
    slug: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    edit_link: Option<String>,
    questions: Vec<QuestionView>,
}

#[derive(Debug, Serialize)]
struct ConfirmBanner {
    action: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ServiceView {
    service_id: String,
    service_name: String,
    supplier_id: Option<i64>,
    framework_slug: String,
    status_label: Option<&'static str>,
    sections: Vec<SectionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    removal_banner: Option<String>,
    can_publish: bool,
    can_remove: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    confirm: Option<ConfirmBanner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    view_service_link: Option<String>,
    service: ServiceDocument,
    flashes: Vec<Flash>,
}

fn truthy(param: Option<&str>) -> bool {
    matches!(param, Some("True") | Some("true"))
}

fn section_views(
    state: &AppState,
    service_id: &str,
    doc: &ServiceDocument,
) -> Vec<SectionView> {
    let (Some(framework), Some(lot)) = (doc.framework_slug(), doc.lot()) else {
        return Vec::new();
    };
    let Ok(sections) = state.content.sections_for(framework, lot) else {
        return Vec::new();
    };
    sections
        .into_iter()
        .map(|section| SectionView {
            slug: section.slug.clone(),
            name: section.name.clone(),
            edit_link: section
                .editable
                .then(|| format!("/admin/services/{service_id}/edit/{}", section.slug)),
            questions: section
                .questions
                .iter()
                .map(|question| {
                    if question.question_type == QuestionType::Multiquestion {
                        let answered =
                            question.leaves().iter().any(|leaf| doc.has_answer(&leaf.id));
                        QuestionView {
                            id: question.id.clone(),
                            label: question.label().to_string(),
                            value: None,
                            answered,
                            link: Some(format!(
                                "/admin/services/{service_id}/edit/{}/{}",
                                section.slug,
                                question.slug()
                            )),
                            link_text: Some(if answered { "Edit" } else { "Add" }),
                        }
                    } else {
                        QuestionView {
                            id: question.id.clone(),
                            label: question.label().to_string(),
                            value: doc.get(&question.id).cloned(),
                            answered: doc.has_answer(&question.id),
                            link: None,
                            link_text: None,
                        }
                    }
                })
                .collect(),
        })
        .collect()
}

/// `GET /admin/services/:service_id` — the service summary page.
pub async fn view_service(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(service_id): Path<String>,
    Query(query): Query<ViewServiceQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    require_any(&user, &VIEW_ROLES)?;

    let doc = match state.api.get_service(&service_id).await {
        Ok(Some(doc)) => doc,
        Ok(None) => return Err(AppError::NotFound),
        Err(err) if err.is_not_found() => {
            let jar = flash::push(
                jar,
                Flash::error(format!(
                    "Error trying to retrieve service with ID: {service_id}"
                )),
            );
            return Ok((jar, Redirect::to("/admin")).into_response());
        }
        Err(err) => return Err(err.into()),
    };

    let service_status = doc.status();
    let removal_banner = match service_status {
        Some(ServiceStatus::Published) | None => None,
        Some(_) => {
            let query = AuditEventQuery {
                object_id: Some(service_id.clone()),
                object_type: Some("services".to_string()),
                audit_type: Some(AuditEventType::UpdateServiceStatus),
                latest_first: Some(true),
                ..Default::default()
            };
            let page = state.api.find_audit_events(&query).await?;
            status::removal_banner(&page.events)
        }
    };

    let is_category = user.role == Role::AdminCcsCategory;
    let can_publish = is_category
        && matches!(
            service_status,
            Some(ServiceStatus::Disabled) | Some(ServiceStatus::Enabled)
        );
    let can_remove = is_category && service_status == Some(ServiceStatus::Published);

    let service_name = doc.service_name().unwrap_or_default().to_string();
    let confirm = if truthy(query.publish.as_deref()) && can_publish {
        Some(ConfirmBanner {
            action: "publish",
            message: format!("Are you sure you want to publish \u{2018}{service_name}\u{2019}?"),
        })
    } else if truthy(query.remove.as_deref()) && can_remove {
        Some(ConfirmBanner {
            action: "remove",
            message: format!("Are you sure you want to remove \u{2018}{service_name}\u{2019}?"),
        })
    } else {
        None
    };

    let view_service_link = (doc.framework_family() == Some("g-cloud")
        && service_status == Some(ServiceStatus::Published))
        .then(|| format!("/g-cloud/services/{service_id}"));

    let (jar, flashes) = flash::take(jar);
    let view = ServiceView {
        service_id: doc.id().unwrap_or_else(|| service_id.clone()),
        service_name,
        supplier_id: doc.supplier_id(),
        framework_slug: doc.framework_slug().unwrap_or_default().to_string(),
        status_label: service_status.map(ServiceStatus::label),
        sections: section_views(&state, &service_id, &doc),
        removal_banner,
        can_publish,
        can_remove,
        confirm,
        view_service_link,
        service: doc,
        flashes,
    };
    Ok((jar, Json(view)).into_response())
}

/// `POST /admin/services/status/:service_id` — publish or remove a service.
pub async fn update_service_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(service_id): Path<String>,
    jar: CookieJar,
    RawForm(body): RawForm,
) -> Result<(CookieJar, Redirect), AppError> {
    require_any(&user, &EDIT_ROLES)?;
    if state.api.get_service(&service_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let form = SubmittedForm::parse(&body);
    let requested = form.first("service_status").unwrap_or_default();
    let jar = match status::requested_status(requested) {
        Ok(new_status) => {
            state
                .api
                .update_service_status(&service_id, new_status, &user.email)
                .await?;
            flash::push(jar, Flash::message("status_updated"))
        }
        Err(_) => flash::push(jar, Flash::error("bad_status")),
    };
    Ok((jar, Redirect::to(&format!("/admin/services/{service_id}"))))
}

async fn service_and_section(
    state: &AppState,
    service_id: &str,
    section_slug: &str,
    question_slug: Option<&str>,
) -> Result<(ServiceDocument, Section), AppError> {
    let doc = state
        .api
        .get_service(service_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let framework = doc.framework_slug().ok_or(AppError::NotFound)?;
    let lot = doc.lot().ok_or(AppError::NotFound)?;
    let section = state.content.section(framework, lot, section_slug)?;
    let section = match question_slug {
        Some(slug) => section.subsection_for(slug).ok_or(AppError::NotFound)?,
        None => section.clone(),
    };
    Ok((doc, section))
}

#[derive(Debug, Serialize)]
pub struct EditView {
    service_id: String,
    service_name: String,
    return_link: String,
    form: SectionForm,
    errors: Vec<FieldError>,
}

fn edit_view(
    service_id: &str,
    doc: &ServiceDocument,
    form: SectionForm,
    errors: Vec<FieldError>,
) -> EditView {
    EditView {
        service_id: service_id.to_string(),
        service_name: doc.service_name().unwrap_or_default().to_string(),
        return_link: format!("/admin/services/{service_id}"),
        form,
        errors,
    }
}

async fn edit_section_inner(
    state: AppState,
    user: CurrentUser,
    service_id: String,
    section_slug: String,
    question_slug: Option<String>,
) -> Result<Json<EditView>, AppError> {
    require_any(&user, &EDIT_ROLES)?;
    let (doc, section) =
        service_and_section(&state, &service_id, &section_slug, question_slug.as_deref()).await?;
    let form = SectionForm::from_document(&section, &doc);
    Ok(Json(edit_view(&service_id, &doc, form, Vec::new())))
}

async fn update_section_inner(
    state: AppState,
    user: CurrentUser,
    service_id: String,
    section_slug: String,
    question_slug: Option<String>,
    body: axum::body::Bytes,
) -> Result<Response, AppError> {
    require_any(&user, &EDIT_ROLES)?;
    let (doc, section) =
        service_and_section(&state, &service_id, &section_slug, question_slug.as_deref()).await?;
    let submitted = SubmittedForm::parse(&body);

    let local_errors = service::forms::validate(&section, &submitted);
    if !local_errors.is_empty() {
        let form = SectionForm::from_submission(&section, &submitted, &local_errors);
        let view = edit_view(&service_id, &doc, form, local_errors);
        return Ok((StatusCode::BAD_REQUEST, Json(view)).into_response());
    }

    let update = payload::translate(&section, &submitted);
    if update.is_empty() {
        return Ok(Redirect::to(&format!("/admin/services/{service_id}")).into_response());
    }

    match state.api.update_service(&service_id, &update, &user.email).await {
        Ok(()) => Ok(Redirect::to(&format!("/admin/services/{service_id}")).into_response()),
        Err(client::ClientError::Validation(field_codes)) => {
            let errors = service::forms::api_errors(&section, &field_codes);
            let form = SectionForm::from_submission(&section, &submitted, &errors);
            let view = edit_view(&service_id, &doc, form, errors);
            Ok((StatusCode::BAD_REQUEST, Json(view)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /admin/services/:service_id/edit/:section`
pub async fn edit_section(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((service_id, section_slug)): Path<(String, String)>,
) -> Result<Json<EditView>, AppError> {
    edit_section_inner(state, user, service_id, section_slug, None).await
}

/// `GET /admin/services/:service_id/edit/:section/:question`
pub async fn edit_section_question(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((service_id, section_slug, question_slug)): Path<(String, String, String)>,
) -> Result<Json<EditView>, AppError> {
    edit_section_inner(state, user, service_id, section_slug, Some(question_slug)).await
}

/// `POST /admin/services/:service_id/edit/:section`
pub async fn update_section(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((service_id, section_slug)): Path<(String, String)>,
    RawForm(body): RawForm,
) -> Result<Response, AppError> {
    update_section_inner(state, user, service_id, section_slug, None, body).await
}

/// `POST /admin/services/:service_id/edit/:section/:question`
pub async fn update_section_question(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((service_id, section_slug, question_slug)): Path<(String, String, String)>,
    RawForm(body): RawForm,
) -> Result<Response, AppError> {
    update_section_inner(state, user, service_id, section_slug, Some(question_slug), body).await
}
