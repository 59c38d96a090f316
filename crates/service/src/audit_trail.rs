//! Unapproved-edit bookkeeping over the data API's paged audit feed.

use std::collections::HashSet;

use client::{AuditEventQuery, ClientError, DataApi};
use models::{AuditEvent, AuditEventType};

use crate::dates::{display_date, display_datetime};

/// Every unacknowledged `update_service` event for a service, oldest first.
#[derive(Debug, Clone, Default)]
pub struct UnapprovedEdits {
    pub events: Vec<AuditEvent>,
}

/// Walk the unacknowledged feed to exhaustion. Page size is the API's
/// choice; the walk is correct for any of them.
pub async fn unapproved_edits(
    api: &dyn DataApi,
    service_id: &str,
) -> Result<UnapprovedEdits, ClientError> {
    let mut query =
        AuditEventQuery::unacknowledged_for_service(service_id, AuditEventType::UpdateService);
    query.latest_first = Some(false);

    let mut events = Vec::new();
    loop {
        let page = api.find_audit_events(&query).await?;
        events.extend(page.events);
        match page.next_page {
            Some(next) => query.page = Some(next),
            None => break,
        }
    }
    Ok(UnapprovedEdits { events })
}

impl UnapprovedEdits {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Chronologically first unacknowledged event.
    pub fn oldest(&self) -> Option<&AuditEvent> {
        self.events.first()
    }

    /// Chronologically last unacknowledged event; approving it approves
    /// everything before it.
    pub fn latest(&self) -> Option<&AuditEvent> {
        self.events.last()
    }

    fn distinct_editors(&self) -> usize {
        self.events
            .iter()
            .map(|e| e.user.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// "Changed on Wednesday 3 February 2010 at 10:11am"
    pub fn oldest_change_message(&self) -> Option<String> {
        self.oldest()
            .map(|e| format!("Changed on {}", display_datetime(e.created_at)))
    }

    /// Who edited, condensed for the review page. When several users have
    /// edited, only the chronologically last event's user and date are named.
    pub fn summary_message(&self) -> String {
        let Some(latest) = self.latest() else {
            return "This service has no unapproved edits.".to_string();
        };
        let date = display_date(latest.created_at);
        if self.distinct_editors() == 1 {
            let count = self.events.len();
            let noun = if count == 1 { "edit" } else { "edits" };
            format!("{} made {count} {noun} on {date}.", latest.user)
        } else {
            format!(
                "More than one user has edited this service. \
                 The last user to edit this service was {} on {date}.",
                latest.user
            )
        }
    }
}
