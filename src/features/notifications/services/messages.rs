//! Human-readable notification texts.
//!
//! Kept in one place so the wording stays consistent across the dispatch
//! wrappers and tests can pin it down.

use crate::features::reports::models::ReportStatus;

pub fn report_approved(title: &str) -> String {
    format!("Your report \"{title}\" has been approved and taken in charge")
}

pub fn report_rejected(title: &str, reason: &str) -> String {
    format!("Your report \"{title}\" was rejected: {reason}")
}

pub fn report_assigned(title: &str) -> String {
    format!("Report \"{title}\" has been assigned to you")
}

pub fn report_status_changed(title: &str, status: ReportStatus) -> String {
    let state = match status {
        ReportStatus::InProgress => "being worked on",
        ReportStatus::Suspended => "suspended",
        ReportStatus::Resolved => "resolved",
        ReportStatus::ExternalAssigned => "handed to an external maintainer",
        other => return format!("Report \"{title}\" moved to {other}"),
    };
    format!("Report \"{title}\" is now {state}")
}

pub fn message_received(title: &str, sender_name: &str) -> String {
    format!("New message from {sender_name} on report \"{title}\"")
}

pub fn internal_note_added(title: &str, author_name: &str) -> String {
    format!("New internal note from {author_name} on report \"{title}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_text_names_the_new_state() {
        let text = report_status_changed("Pothole on Via Roma", ReportStatus::Resolved);
        assert_eq!(text, "Report \"Pothole on Via Roma\" is now resolved");

        let text = report_status_changed("Pothole on Via Roma", ReportStatus::ExternalAssigned);
        assert!(text.contains("external maintainer"));
    }

    #[test]
    fn rejection_text_carries_the_reason() {
        let text = report_rejected("Dark alley", "duplicate of an open report");
        assert!(text.contains("duplicate of an open report"));
    }

    #[test]
    fn message_text_names_the_sender() {
        let text = message_received("Dark alley", "Paolo Riva");
        assert!(text.starts_with("New message from Paolo Riva"));
    }
}
