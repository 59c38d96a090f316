//! Service status transitions requested from the admin UI.

use models::{AuditEvent, ServiceStatus};

use crate::dates::display_date;

/// Map the posted form value onto the API's status vocabulary. "private"
/// is not an accepted target; it is rejected before any API call is made.
pub fn requested_status(form_value: &str) -> Result<ServiceStatus, String> {
    match form_value {
        "removed" => Ok(ServiceStatus::Disabled),
        "public" => Ok(ServiceStatus::Published),
        other => Err(format!("Not a valid status: {other}")),
    }
}

/// Banner shown on removed/private services, built from the most recent
/// `update_service_status` audit event (feeds arrive newest-first).
pub fn removal_banner(events: &[AuditEvent]) -> Option<String> {
    let event = events.first()?;
    let verb = match event.new_status()?.as_str() {
        "disabled" => "Removed",
        "enabled" => "Made private",
        _ => return None,
    };
    Some(format!(
        "{verb} by {} on {}.",
        event.user,
        display_date(event.created_at)
    ))
}
