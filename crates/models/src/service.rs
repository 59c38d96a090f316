use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A service listing as the data API serves it: a JSON object mapping
/// question keys to answers. Answers are scalars, lists of strings, or
/// `{value, assurance}` composites; the questionnaire schema decides which.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceDocument(pub Map<String, Value>);

impl ServiceDocument {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Service ids are opaque; the API serves them as strings or numbers.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn framework_slug(&self) -> Option<&str> {
        self.str_field("frameworkSlug")
    }

    pub fn framework_family(&self) -> Option<&str> {
        self.str_field("frameworkFramework")
    }

    pub fn lot(&self) -> Option<&str> {
        self.str_field("lot")
    }

    pub fn service_name(&self) -> Option<&str> {
        self.str_field("serviceName")
    }

    pub fn supplier_name(&self) -> Option<&str> {
        self.str_field("supplierName")
    }

    pub fn supplier_id(&self) -> Option<i64> {
        self.0.get("supplierId").and_then(Value::as_i64)
    }

    pub fn status(&self) -> Option<ServiceStatus> {
        self.str_field("status").and_then(|s| s.parse().ok())
    }

    /// True when the question has a non-empty answer. Composites count as
    /// answered when their inner value is non-empty.
    pub fn has_answer(&self, key: &str) -> bool {
        fn non_empty(v: &Value) -> bool {
            match v {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                Value::Array(items) => items.iter().any(non_empty),
                Value::Object(map) => map.get("value").map(non_empty).unwrap_or(false),
                _ => true,
            }
        }
        self.0.get(key).map(non_empty).unwrap_or(false)
    }
}

/// Lifecycle state of a listing as stored by the data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Published,
    Enabled,
    Disabled,
}

impl ServiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Published => "published",
            ServiceStatus::Enabled => "enabled",
            ServiceStatus::Disabled => "disabled",
        }
    }

    /// The label staff see: published services are "Public", enabled ones
    /// are hidden from buyers ("Private"), disabled ones are "Removed".
    pub fn label(self) -> &'static str {
        match self {
            ServiceStatus::Published => "Public",
            ServiceStatus::Enabled => "Private",
            ServiceStatus::Disabled => "Removed",
        }
    }
}

impl std::str::FromStr for ServiceStatus {
    type Err = crate::errors::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(ServiceStatus::Published),
            "enabled" => Ok(ServiceStatus::Enabled),
            "disabled" => Ok(ServiceStatus::Disabled),
            other => Err(crate::errors::ModelError::Validation(format!(
                "unknown service status: {other}"
            ))),
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
