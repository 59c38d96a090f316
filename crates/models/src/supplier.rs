use serde::{Deserialize, Serialize};

/// A supplier record; only the fields the admin views read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub contact_information: Vec<ContactInformation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInformation {
    #[serde(default)]
    pub email: String,
}

impl Supplier {
    /// First listed contact email, if any.
    pub fn contact_email(&self) -> Option<&str> {
        self.contact_information
            .iter()
            .map(|c| c.email.as_str())
            .find(|e| !e.is_empty())
    }
}
