//! Shared harness for the integration tests: a scripted `DataApi`, a
//! recording mailer, and a helper that spawns the app on an ephemeral port.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use serde_json::{Map, Value};
use tokio::net::TcpListener;

use client::{AuditEventPage, AuditEventQuery, ClientError, DataApi, UserPage};
use content::{ContentStore, FrameworkContent};
use models::user::UserUpdate;
use models::{AuditEvent, Role, ServiceDocument, ServiceStatus, Supplier, User};
use server::routes::build_router;
use server::state::AppState;
use service::notify::{AccountMailer, NotifyError};

pub const SESSION_SECRET: &str = "test-secret";

/// Scripted stand-in for the data API. Fixtures go in, calls are recorded
/// for assertion.
#[derive(Default)]
pub struct StubApi {
    pub services: HashMap<String, ServiceDocument>,
    pub archived_services: HashMap<String, ServiceDocument>,
    /// Chronologically ascending.
    pub audit_events: Vec<AuditEvent>,
    pub audit_page_len: usize,
    pub suppliers: HashMap<i64, Supplier>,
    pub users_by_id: HashMap<i64, User>,
    pub users_by_email: HashMap<String, User>,
    pub users_by_role: HashMap<Role, Vec<User>>,
    pub admin_email_valid: bool,
    pub update_service_error: Option<BTreeMap<String, String>>,

    pub update_service_calls: Mutex<Vec<(String, Value, String)>>,
    pub update_status_calls: Mutex<Vec<(String, ServiceStatus, String)>>,
    pub update_user_calls: Mutex<Vec<(i64, Value, String)>>,
    pub acknowledge_calls: Mutex<Vec<(String, u64, String)>>,
    pub audit_event_queries: Mutex<Vec<AuditEventQuery>>,
}

impl StubApi {
    pub fn with_service(mut self, id: &str, doc: Value) -> Self {
        self.services.insert(id.to_string(), serde_json::from_value(doc).unwrap());
        self
    }

    pub fn with_archived_service(mut self, id: &str, doc: Value) -> Self {
        self.archived_services
            .insert(id.to_string(), serde_json::from_value(doc).unwrap());
        self
    }

    pub fn with_supplier(mut self, supplier: Value) -> Self {
        let supplier: Supplier = serde_json::from_value(supplier).unwrap();
        self.suppliers.insert(supplier.id, supplier);
        self
    }

    pub fn with_audit_events(mut self, events: Vec<Value>) -> Self {
        self.audit_events = events
            .into_iter()
            .map(|e| serde_json::from_value(e).unwrap())
            .collect();
        self
    }

    pub fn with_user(mut self, user: Value) -> Self {
        let user: User = serde_json::from_value(user).unwrap();
        self.users_by_id.insert(user.id, user.clone());
        self.users_by_email.insert(user.email_address.clone(), user.clone());
        self.users_by_role.entry(user.role).or_default().push(user);
        self
    }
}

#[async_trait]
impl DataApi for StubApi {
    async fn get_service(
        &self,
        service_id: &str,
    ) -> Result<Option<ServiceDocument>, ClientError> {
        Ok(self.services.get(service_id).cloned())
    }

    async fn update_service(
        &self,
        service_id: &str,
        payload: &Map<String, Value>,
        updater: &str,
    ) -> Result<(), ClientError> {
        self.update_service_calls.lock().unwrap().push((
            service_id.to_string(),
            Value::Object(payload.clone()),
            updater.to_string(),
        ));
        match &self.update_service_error {
            Some(fields) => Err(ClientError::Validation(fields.clone())),
            None => Ok(()),
        }
    }

    async fn update_service_status(
        &self,
        service_id: &str,
        status: ServiceStatus,
        updater: &str,
    ) -> Result<(), ClientError> {
        self.update_status_calls.lock().unwrap().push((
            service_id.to_string(),
            status,
            updater.to_string(),
        ));
        Ok(())
    }

    async fn find_audit_events(
        &self,
        query: &AuditEventQuery,
    ) -> Result<AuditEventPage, ClientError> {
        self.audit_event_queries.lock().unwrap().push(query.clone());
        let mut events: Vec<AuditEvent> = self
            .audit_events
            .iter()
            .filter(|e| query.audit_type.map(|t| e.event_type == t).unwrap_or(true))
            .filter(|e| query.acknowledged.map(|a| e.acknowledged == a).unwrap_or(true))
            .cloned()
            .collect();
        if query.latest_first == Some(true) {
            events.reverse();
        }
        let page_len = if self.audit_page_len == 0 { 100 } else { self.audit_page_len };
        let page = query.page.unwrap_or(1) as usize;
        let start = (page - 1) * page_len;
        let chunk: Vec<AuditEvent> = events.iter().skip(start).take(page_len).cloned().collect();
        let next_page = (start + page_len < events.len()).then(|| page as u32 + 1);
        Ok(AuditEventPage { events: chunk, next_page })
    }

    async fn acknowledge_service_update_including_previous(
        &self,
        service_id: &str,
        audit_event_id: u64,
        updater: &str,
    ) -> Result<(), ClientError> {
        self.acknowledge_calls.lock().unwrap().push((
            service_id.to_string(),
            audit_event_id,
            updater.to_string(),
        ));
        Ok(())
    }

    async fn get_archived_service(
        &self,
        archived_service_id: &str,
    ) -> Result<ServiceDocument, ClientError> {
        self.archived_services
            .get(archived_service_id)
            .cloned()
            .ok_or(ClientError::Status { status: 404, message: "not found".into() })
    }

    async fn get_supplier(&self, supplier_id: i64) -> Result<Supplier, ClientError> {
        self.suppliers
            .get(&supplier_id)
            .cloned()
            .ok_or(ClientError::Status { status: 404, message: "not found".into() })
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, ClientError> {
        Ok(self.users_by_id.get(&user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, ClientError> {
        Ok(self.users_by_email.get(email).cloned())
    }

    async fn update_user(
        &self,
        user_id: i64,
        update: &UserUpdate,
        updater: &str,
    ) -> Result<User, ClientError> {
        self.update_user_calls.lock().unwrap().push((
            user_id,
            serde_json::to_value(update).unwrap(),
            updater.to_string(),
        ));
        let mut user = self
            .users_by_id
            .get(&user_id)
            .cloned()
            .ok_or(ClientError::Status { status: 404, message: "not found".into() })?;
        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(active) = update.active {
            user.active = active;
        }
        if let Some(locked) = update.locked {
            user.locked = locked;
        }
        Ok(user)
    }

    async fn find_users_page(&self, role: Role, page: u32) -> Result<UserPage, ClientError> {
        let users = self.users_by_role.get(&role).cloned().unwrap_or_default();
        let page_len = 100;
        let start = (page as usize - 1) * page_len;
        let chunk: Vec<User> = users.iter().skip(start).take(page_len).cloned().collect();
        let next_page = (start + page_len < users.len()).then(|| page + 1);
        Ok(UserPage { users: chunk, next_page })
    }

    async fn email_is_valid_for_admin_user(&self, _email: &str) -> Result<bool, ClientError> {
        Ok(self.admin_email_valid)
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub invitations: Mutex<Vec<(String, Role, String)>>,
}

#[async_trait]
impl AccountMailer for RecordingMailer {
    async fn send_account_invite(
        &self,
        email_address: &str,
        role: Role,
        inviter_name: &str,
    ) -> Result<(), NotifyError> {
        self.invitations.lock().unwrap().push((
            email_address.to_string(),
            role,
            inviter_name.to_string(),
        ));
        Ok(())
    }
}

/// The same question sections the admin app ships for G-Cloud 9 and DOS 2,
/// cut down to what the tests exercise.
pub fn test_content() -> ContentStore {
    let g_cloud = FrameworkContent::from_toml_str(
        "g-cloud-9",
        r#"
        [[section]]
        slug = "service-description"
        name = "Service description"

        [[section.question]]
        id = "serviceName"
        label = "Service name"
        type = "text"

        [[section]]
        slug = "service-features-and-benefits"
        name = "Service features and benefits"

        [[section.question]]
        id = "serviceFeatures"
        label = "Service features"
        type = "list"
        [section.question.error_messages]
        under_10_words = "You can't write more than 10 words for each feature."

        [[section.question]]
        id = "serviceBenefits"
        label = "Service benefits"
        type = "list"
        [section.question.error_messages]
        under_10_words = "You can't write more than 10 words for each benefit."

        [[section]]
        slug = "documents"
        name = "Documents"

        [[section.question]]
        id = "pricingDocumentURL"
        label = "Pricing document"
        type = "upload"

        [[section.question]]
        id = "sfiaRateDocumentURL"
        label = "SFIA rate card"
        type = "upload"

        [[section.question]]
        id = "termsAndConditionsDocumentURL"
        label = "Terms and conditions document"
        type = "upload"

        [[section]]
        slug = "external-interface-protection"
        name = "External interface protection"

        [[section.question]]
        id = "onboardingGuidance"
        label = "Onboarding guidance provided"
        type = "boolean"
        [section.question.assurance]
        options = ["Service provider assertion", "Independent validation of assertion"]

        [[section.question]]
        id = "interconnectionMethods"
        label = "Interconnection methods"
        type = "checkboxes"
        options = ["PSN assured service", "Private WAN"]
        [section.question.assurance]
        options = ["Service provider assertion", "Independent validation of assertion"]
        "#,
    )
    .unwrap();

    let dos = FrameworkContent::from_toml_str(
        "digital-outcomes-and-specialists-2",
        r#"
        [[section]]
        slug = "individual-specialist-roles"
        name = "Individual specialist roles"
        lots = ["digital-specialists"]

        [[section.question]]
        id = "businessAnalyst"
        label = "Business analyst"
        type = "multiquestion"

        [[section.question.question]]
        id = "businessAnalystLocations"
        label = "Locations"
        type = "checkboxes"
        options = ["London", "Offsite", "Scotland", "Wales"]

        [[section.question.question]]
        id = "businessAnalystPriceMin"
        label = "Minimum day rate"
        type = "text"

        [[section.question.question]]
        id = "businessAnalystPriceMax"
        label = "Maximum day rate"
        type = "text"
        "#,
    )
    .unwrap();

    ContentStore::from_frameworks(vec![g_cloud, dos])
}

pub struct TestApp {
    pub base_url: String,
    pub api: Arc<StubApi>,
    pub mailer: Arc<RecordingMailer>,
}

pub async fn start_server(api: StubApi) -> TestApp {
    let api = Arc::new(api);
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState {
        api: api.clone(),
        content: Arc::new(test_content()),
        mailer: mailer.clone(),
        session_secret: SESSION_SECRET.to_string(),
    };
    let app: Router = build_router(state);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server error: {e}");
        }
    });
    TestApp {
        base_url: format!("http://{}:{}", addr.ip(), addr.port()),
        api,
        mailer,
    }
}

/// A signed session cookie for the given role, the way the login service
/// issues them.
pub fn session_cookie(role: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    let claims = server::auth::SessionClaims {
        sub: "test@example.com".to_string(),
        name: "A. Admin".to_string(),
        role: role.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SESSION_SECRET.as_bytes()),
    )
    .expect("sign session token");
    format!("dm_session={token}")
}

/// Client that keeps redirects visible instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("reqwest client")
}
