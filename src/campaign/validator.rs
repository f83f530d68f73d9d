// src/campaign/validator.rs
use tracing::warn;

use crate::models::Lead;

/// Pure predicate over a raw lead record: true iff Name, Company, and Email
/// are all present and non-empty and the email at least contains an "@".
/// No side effects beyond diagnostic logging.
pub fn validate_lead(lead: &Lead) -> bool {
    let mut missing = Vec::new();
    if is_blank(&lead.name) {
        missing.push("Name");
    }
    if is_blank(&lead.company) {
        missing.push("Company");
    }
    if is_blank(&lead.email) {
        missing.push("Email");
    }

    if !missing.is_empty() {
        warn!("Lead missing required fields: {}", missing.join(", "));
        return false;
    }

    let email = lead.email.as_deref().unwrap_or_default();
    if !email.contains('@') {
        warn!("Invalid email format for lead: {}", lead.display_name());
        return false;
    }

    true
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, |value| value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_complete_lead() {
        assert!(validate_lead(&Lead::new("John", "Acme", "john@acme.com")));
    }

    #[test]
    fn rejects_when_any_required_field_is_missing() {
        let complete = Lead::new("John", "Acme", "john@acme.com");

        let mut no_name = complete.clone();
        no_name.name = None;
        assert!(!validate_lead(&no_name));

        let mut no_company = complete.clone();
        no_company.company = Some(String::new());
        assert!(!validate_lead(&no_company));

        let mut no_email = complete.clone();
        no_email.email = Some("   ".to_string());
        assert!(!validate_lead(&no_email));
    }

    #[test]
    fn rejects_email_without_at_sign() {
        assert!(!validate_lead(&Lead::new("John", "Acme", "invalid")));
    }

    #[test]
    fn is_idempotent() {
        let lead = Lead::new("John", "Acme", "john@acme.com");
        assert_eq!(validate_lead(&lead), validate_lead(&lead));

        let bad = Lead::new("John", "Acme", "invalid");
        assert_eq!(validate_lead(&bad), validate_lead(&bad));
    }
}
