//! HTTP client for the marketplace data API.
//! - `DataApi` is the seam the rest of the application talks through;
//!   request handlers never build HTTP requests themselves.
//! - `HttpDataApi` is the reqwest implementation; tests substitute their
//!   own scripted implementations of the trait.

pub mod errors;
pub mod http;

pub use errors::ClientError;
pub use http::HttpDataApi;

use async_trait::async_trait;
use serde_json::{Map, Value};

use models::{AuditEvent, AuditEventType, Role, ServiceDocument, ServiceStatus, Supplier, User};
use models::user::UserUpdate;

/// Filter for the paged audit-event feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditEventQuery {
    pub object_id: Option<String>,
    pub object_type: Option<String>,
    pub audit_type: Option<AuditEventType>,
    pub acknowledged: Option<bool>,
    pub latest_first: Option<bool>,
    pub page: Option<u32>,
}

impl AuditEventQuery {
    /// Unacknowledged events of one type for one service.
    pub fn unacknowledged_for_service(service_id: &str, audit_type: AuditEventType) -> Self {
        Self {
            object_id: Some(service_id.to_string()),
            object_type: Some("services".to_string()),
            audit_type: Some(audit_type),
            acknowledged: Some(false),
            ..Default::default()
        }
    }
}

/// One page of the audit-event feed.
#[derive(Debug, Clone, Default)]
pub struct AuditEventPage {
    pub events: Vec<AuditEvent>,
    pub next_page: Option<u32>,
}

/// One page of the users feed.
#[derive(Debug, Clone, Default)]
pub struct UserPage {
    pub users: Vec<User>,
    pub next_page: Option<u32>,
}

/// The data API surface this application consumes. The API serializes all
/// writes itself, so every call here is a plain request/response exchange.
#[async_trait]
pub trait DataApi: Send + Sync {
    async fn get_service(&self, service_id: &str)
        -> Result<Option<ServiceDocument>, ClientError>;

    /// Partial update of a service document; `updater` is recorded in the
    /// audit trail by the API.
    async fn update_service(
        &self,
        service_id: &str,
        payload: &Map<String, Value>,
        updater: &str,
    ) -> Result<(), ClientError>;

    async fn update_service_status(
        &self,
        service_id: &str,
        status: ServiceStatus,
        updater: &str,
    ) -> Result<(), ClientError>;

    async fn find_audit_events(
        &self,
        query: &AuditEventQuery,
    ) -> Result<AuditEventPage, ClientError>;

    /// Acknowledge the given `update_service` event and every earlier one
    /// for the same service.
    async fn acknowledge_service_update_including_previous(
        &self,
        service_id: &str,
        audit_event_id: u64,
        updater: &str,
    ) -> Result<(), ClientError>;

    async fn get_archived_service(
        &self,
        archived_service_id: &str,
    ) -> Result<ServiceDocument, ClientError>;

    async fn get_supplier(&self, supplier_id: i64) -> Result<Supplier, ClientError>;

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, ClientError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, ClientError>;

    async fn update_user(
        &self,
        user_id: i64,
        update: &UserUpdate,
        updater: &str,
    ) -> Result<User, ClientError>;

    async fn find_users_page(&self, role: Role, page: u32) -> Result<UserPage, ClientError>;

    /// Walk the paged users feed for a role to exhaustion.
    async fn find_users_iter(&self, role: Role) -> Result<Vec<User>, ClientError> {
        let mut users = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.find_users_page(role, page).await?;
            users.extend(batch.users);
            match batch.next_page {
                Some(next) => page = next,
                None => break,
            }
        }
        Ok(users)
    }

    /// Approved-domain check for inviting admin users.
    async fn email_is_valid_for_admin_user(&self, email: &str) -> Result<bool, ClientError>;
}
