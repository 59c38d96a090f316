//! Account-creation email seam. Dispatch itself belongs to the platform's
//! notification service; the default implementation records the intent so
//! environments without that service still work.

use async_trait::async_trait;
use models::Role;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),
}

#[async_trait]
pub trait AccountMailer: Send + Sync {
    /// Send the invitation email that lets `email_address` create an
    /// account with the given role.
    async fn send_account_invite(
        &self,
        email_address: &str,
        role: Role,
        inviter_name: &str,
    ) -> Result<(), NotifyError>;
}

/// Records invitations in the log instead of dispatching them.
#[derive(Debug, Default, Clone)]
pub struct LoggingMailer;

#[async_trait]
impl AccountMailer for LoggingMailer {
    async fn send_account_invite(
        &self,
        email_address: &str,
        role: Role,
        inviter_name: &str,
    ) -> Result<(), NotifyError> {
        info!(%email_address, role = role.as_str(), %inviter_name, "account invitation requested");
        Ok(())
    }
}
