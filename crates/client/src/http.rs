use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde_json::{json, Map, Value};
use tracing::warn;

use async_trait::async_trait;
use configs::DataApiConfig;
use models::user::UserUpdate;
use models::{AuditEvent, Role, ServiceDocument, ServiceStatus, Supplier, User};

use crate::errors::ClientError;
use crate::{AuditEventPage, AuditEventQuery, DataApi, UserPage};

/// reqwest-backed data API client. Holds the base URL and a bearer token;
/// one instance is shared across the whole server.
#[derive(Debug, Clone)]
pub struct HttpDataApi {
    base_url: String,
    auth_token: String,
    client: reqwest::Client,
}

impl HttpDataApi {
    pub fn new(cfg: &DataApiConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            auth_token: cfg.auth_token.clone(),
            client,
        })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url).query(query);
        if !self.auth_token.is_empty() {
            req = req.bearer_auth(&self.auth_token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<Value>()
                .await
                .map_err(|e| ClientError::Parse(e.to_string()));
        }

        let body: Value = resp.json().await.unwrap_or(Value::Null);
        if status == StatusCode::BAD_REQUEST {
            if let Some(fields) = body.get("error").and_then(Value::as_object) {
                let map: BTreeMap<String, String> = fields
                    .iter()
                    .map(|(k, v)| {
                        (k.clone(), v.as_str().unwrap_or_default().to_string())
                    })
                    .collect();
                return Err(ClientError::Validation(map));
            }
        }
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unexpected response")
            .to_string();
        warn!(%url, status = status.as_u16(), %message, "data API error");
        Err(ClientError::Status { status: status.as_u16(), message })
    }

    /// Pull a named envelope (`services`, `users`, ...) out of a response.
    fn envelope<T: serde::de::DeserializeOwned>(
        body: Value,
        key: &str,
    ) -> Result<T, ClientError> {
        let inner = body
            .get(key)
            .cloned()
            .ok_or_else(|| ClientError::Parse(format!("missing `{key}` envelope")))?;
        serde_json::from_value(inner).map_err(|e| ClientError::Parse(e.to_string()))
    }

    fn next_page(body: &Value, current: u32) -> Option<u32> {
        body.get("links")
            .and_then(|links| links.get("next"))
            .map(|_| current + 1)
    }
}

fn not_found_to_none<T>(result: Result<T, ClientError>) -> Result<Option<T>, ClientError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl DataApi for HttpDataApi {
    async fn get_service(
        &self,
        service_id: &str,
    ) -> Result<Option<ServiceDocument>, ClientError> {
        let result = self
            .request(Method::GET, &format!("/services/{service_id}"), &[], None)
            .await
            .and_then(|body| Self::envelope(body, "services"));
        not_found_to_none(result)
    }

    async fn update_service(
        &self,
        service_id: &str,
        payload: &Map<String, Value>,
        updater: &str,
    ) -> Result<(), ClientError> {
        self.request(
            Method::POST,
            &format!("/services/{service_id}"),
            &[],
            Some(json!({"services": payload, "updated_by": updater})),
        )
        .await
        .map(|_| ())
    }

    async fn update_service_status(
        &self,
        service_id: &str,
        status: ServiceStatus,
        updater: &str,
    ) -> Result<(), ClientError> {
        self.request(
            Method::POST,
            &format!("/services/{service_id}/status/{}", status.as_str()),
            &[],
            Some(json!({"updated_by": updater})),
        )
        .await
        .map(|_| ())
    }

    async fn find_audit_events(
        &self,
        query: &AuditEventQuery,
    ) -> Result<AuditEventPage, ClientError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(object_id) = &query.object_id {
            params.push(("object-id", object_id.clone()));
        }
        if let Some(object_type) = &query.object_type {
            params.push(("object-type", object_type.clone()));
        }
        if let Some(audit_type) = query.audit_type {
            params.push(("audit-type", audit_type.as_str().to_string()));
        }
        if let Some(acknowledged) = query.acknowledged {
            params.push(("acknowledged", acknowledged.to_string()));
        }
        if let Some(latest_first) = query.latest_first {
            params.push(("latest_first", latest_first.to_string()));
        }
        let page = query.page.unwrap_or(1);
        params.push(("page", page.to_string()));

        let body = self
            .request(Method::GET, "/audit-events", &params, None)
            .await?;
        let events: Vec<AuditEvent> = Self::envelope(body.clone(), "auditEvents")?;
        Ok(AuditEventPage { events, next_page: Self::next_page(&body, page) })
    }

    async fn acknowledge_service_update_including_previous(
        &self,
        service_id: &str,
        audit_event_id: u64,
        updater: &str,
    ) -> Result<(), ClientError> {
        self.request(
            Method::POST,
            &format!("/services/{service_id}/updates/{audit_event_id}/acknowledge"),
            &[],
            Some(json!({"latest_audit_event_id": audit_event_id, "updated_by": updater})),
        )
        .await
        .map(|_| ())
    }

    async fn get_archived_service(
        &self,
        archived_service_id: &str,
    ) -> Result<ServiceDocument, ClientError> {
        self.request(
            Method::GET,
            &format!("/archived-services/{archived_service_id}"),
            &[],
            None,
        )
        .await
        .and_then(|body| Self::envelope(body, "services"))
    }

    async fn get_supplier(&self, supplier_id: i64) -> Result<Supplier, ClientError> {
        self.request(Method::GET, &format!("/suppliers/{supplier_id}"), &[], None)
            .await
            .and_then(|body| Self::envelope(body, "suppliers"))
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, ClientError> {
        let result = self
            .request(Method::GET, &format!("/users/{user_id}"), &[], None)
            .await
            .and_then(|body| Self::envelope(body, "users"));
        not_found_to_none(result)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, ClientError> {
        let result = self
            .request(
                Method::GET,
                "/users",
                &[("email_address", email.to_string())],
                None,
            )
            .await
            .and_then(|body| Self::envelope(body, "users"));
        not_found_to_none(result)
    }

    async fn update_user(
        &self,
        user_id: i64,
        update: &UserUpdate,
        updater: &str,
    ) -> Result<User, ClientError> {
        let body = serde_json::to_value(update).map_err(|e| ClientError::Parse(e.to_string()))?;
        self.request(
            Method::POST,
            &format!("/users/{user_id}"),
            &[],
            Some(json!({"users": body, "updated_by": updater})),
        )
        .await
        .and_then(|body| Self::envelope(body, "users"))
    }

    async fn find_users_page(&self, role: Role, page: u32) -> Result<UserPage, ClientError> {
        let params = [
            ("role", role.as_str().to_string()),
            ("page", page.to_string()),
        ];
        let body = self
            .request(Method::GET, "/users", &params, None)
            .await?;
        let users: Vec<User> = Self::envelope(body.clone(), "users")?;
        Ok(UserPage { users, next_page: Self::next_page(&body, page) })
    }

    async fn email_is_valid_for_admin_user(&self, email: &str) -> Result<bool, ClientError> {
        let body = self
            .request(
                Method::GET,
                "/users/valid-admin-email",
                &[("email_address", email.to_string())],
                None,
            )
            .await?;
        Ok(body.get("valid").and_then(Value::as_bool).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_carry_the_field_map() {
        let err = ClientError::Validation(BTreeMap::from([(
            "serviceFeatures".to_string(),
            "under_10_words".to_string(),
        )]));
        assert_eq!(err.status_code(), Some(400));
        assert!(!err.is_not_found());
    }

    #[test]
    fn envelope_rejects_missing_key() {
        let err =
            HttpDataApi::envelope::<ServiceDocument>(json!({"wrong": {}}), "services").unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[test]
    fn next_page_follows_links() {
        let with_next = json!({"links": {"self": "x", "next": "y"}});
        let last = json!({"links": {"self": "x"}});
        assert_eq!(HttpDataApi::next_page(&with_next, 3), Some(4));
        assert_eq!(HttpDataApi::next_page(&last, 3), None);
    }
}
