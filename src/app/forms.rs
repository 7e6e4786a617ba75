//! Form validation for the login, record and password dialogs

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::models::Resource;

/// Field name → message
pub type FieldErrors = BTreeMap<String, String>;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn validate_login(email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if email.trim().is_empty() {
        errors.insert("email".into(), "Email is required".into());
    }
    if password.is_empty() {
        errors.insert("password".into(), "Password is required".into());
    }
    errors
}

fn text<'a>(record: &'a Value, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("").trim()
}

fn require(errors: &mut FieldErrors, record: &Value, key: &str, message: &str) {
    let present = match record.get(key) {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    };
    if !present {
        errors.insert(key.to_string(), message.to_string());
    }
}

/// Required fields before a record is sent. `is_new` adds the rules that
/// only apply on create (the users password).
pub fn validate_record(resource: Resource, record: &Value, is_new: bool) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if !record.is_object() {
        errors.insert("record".into(), "Record must be a JSON object".into());
        return errors;
    }

    match resource {
        Resource::Users => {
            require(&mut errors, record, "userFirstName", "Profile Name is required");
            let email = text(record, "userEmail");
            if email.is_empty() {
                errors.insert("userEmail".into(), "Email is required".into());
            } else if !is_valid_email(email) {
                errors.insert("userEmail".into(), "Enter a valid email address".into());
            }
            if is_new {
                require(&mut errors, record, "userPass", "Password is required");
            }
            require(&mut errors, record, "userRoles", "Role is required");
        }
        Resource::Roles => require(&mut errors, record, "roleName", "Role Name is required"),
        Resource::Projects => {
            require(&mut errors, record, "title", "Title is required.");
            require(&mut errors, record, "country", "Country is required.");
        }
        Resource::Companies => {
            require(&mut errors, record, "companyName", "Company Name is required")
        }
        Resource::Contacts => require(&mut errors, record, "contactName", "Contact Name is required"),
    }
    errors
}

pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if current.is_empty() {
        errors.insert("currentPassword".into(), "Current password is required".into());
    }
    if new.is_empty() {
        errors.insert("newPassword".into(), "New password is required".into());
    } else if new != confirm {
        errors.insert(
            "confirmPassword".into(),
            "New password and confirmation do not match!".into(),
        );
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.de"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("@c.de"));
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = validate_login(" ", "");
        assert_eq!(errors["email"], "Email is required");
        assert_eq!(errors["password"], "Password is required");
        assert!(validate_login("a@b.c", "pw").is_empty());
    }

    #[test]
    fn test_user_rules() {
        let record = json!({"userFirstName": "", "userEmail": "nope", "userRoles": []});
        let errors = validate_record(Resource::Users, &record, true);
        assert_eq!(errors["userFirstName"], "Profile Name is required");
        assert_eq!(errors["userEmail"], "Enter a valid email address");
        assert_eq!(errors["userPass"], "Password is required");
        assert_eq!(errors["userRoles"], "Role is required");

        // password only required on create
        let record = json!({
            "userFirstName": "Ada",
            "userEmail": "ada@example.com",
            "userRoles": ["Admin"]
        });
        assert!(validate_record(Resource::Users, &record, false).is_empty());
    }

    #[test]
    fn test_project_and_role_rules() {
        let errors = validate_record(Resource::Projects, &json!({"title": "X"}), true);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["country"], "Country is required.");

        let errors = validate_record(Resource::Roles, &json!({}), true);
        assert_eq!(errors["roleName"], "Role Name is required");

        let errors = validate_record(Resource::Companies, &json!([]), true);
        assert!(errors.contains_key("record"));
    }

    #[test]
    fn test_password_confirmation() {
        let errors = validate_password_change("old", "new", "other");
        assert_eq!(errors["confirmPassword"], "New password and confirmation do not match!");
        assert!(validate_password_change("old", "new", "new").is_empty());
    }
}
