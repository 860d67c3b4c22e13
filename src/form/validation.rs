//! Field validators
//!
//! Stateless predicates that return `None` for a valid value or the message
//! to show next to the field.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use super::{FieldErrors, FieldKey, FormData};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Object particle (을/를) for a Korean label, chosen by its final syllable
///
/// Labels that don't end in a Hangul syllable get the neutral "을(를)".
pub fn object_particle(label: &str) -> &'static str {
    match label.trim_end().chars().last() {
        Some(c @ '\u{AC00}'..='\u{D7A3}') => {
            if (c as u32 - 0xAC00) % 28 == 0 {
                "를"
            } else {
                "을"
            }
        }
        _ => "을(를)",
    }
}

/// Whether `email` looks like `local@domain.tld`
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Non-empty (after trimming) text
pub fn validate_required(value: &str, label: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some(format!("{}{} 입력해주세요.", label, object_particle(label)));
    }
    None
}

/// Required email; the emptiness message wins over the format message
pub fn validate_email_format(email: &str) -> Option<String> {
    if email.trim().is_empty() {
        return Some("이메일을 입력해주세요.".to_string());
    }
    if !is_valid_email(email) {
        return Some("올바른 이메일 형식을 입력해주세요.".to_string());
    }
    None
}

/// A choice must be made
pub fn validate_select(value: &str, label: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some(format!("{}{} 선택해주세요.", label, object_particle(label)));
    }
    None
}

/// Optional absolute URL; empty is valid
pub fn validate_url(url: &str) -> Option<String> {
    if url.trim().is_empty() {
        return None;
    }
    match Url::parse(url) {
        Ok(_) => None,
        Err(_) => Some("올바른 URL 형식을 입력해주세요.".to_string()),
    }
}

/// Run every field's validator over `data`
pub fn validate(data: &FormData) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for key in FieldKey::ALL {
        let value = data.get(key);
        let message = match key {
            FieldKey::Name => validate_required(value, key.label()),
            FieldKey::Email => validate_email_format(value),
            FieldKey::Experience => validate_select(value, key.label()),
            FieldKey::Github => validate_url(value),
        };
        if let Some(message) = message {
            errors.insert(key, message);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_particle() {
        assert_eq!(object_particle("이름"), "을");
        assert_eq!(object_particle("경력 연차"), "를");
        assert_eq!(object_particle("name"), "을(를)");
        assert_eq!(object_particle(""), "을(를)");
    }

    #[test]
    fn test_required_messages() {
        assert_eq!(
            validate_required("  ", "이름").as_deref(),
            Some("이름을 입력해주세요.")
        );
        assert_eq!(validate_required("Kim", "이름"), None);
        assert_eq!(
            validate_select("", "경력 연차").as_deref(),
            Some("경력 연차를 선택해주세요.")
        );
    }

    #[test]
    fn test_email_required_before_format() {
        assert_eq!(
            validate_email_format("").as_deref(),
            Some("이메일을 입력해주세요.")
        );
        assert_eq!(
            validate_email_format("   ").as_deref(),
            Some("이메일을 입력해주세요.")
        );
        assert_eq!(
            validate_email_format("kim@").as_deref(),
            Some("올바른 이메일 형식을 입력해주세요.")
        );
        assert_eq!(validate_email_format("a@b.com"), None);
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email(" a@b.com"));
    }

    #[test]
    fn test_url_is_optional_but_checked() {
        assert_eq!(validate_url(""), None);
        assert_eq!(validate_url("https://github.com/kim"), None);
        assert_eq!(
            validate_url("github.com/kim").as_deref(),
            Some("올바른 URL 형식을 입력해주세요.")
        );
        assert!(validate_url("not a url").is_some());
    }

    #[test]
    fn test_validate_well_formed_is_empty() {
        let data = FormData {
            name: "Kim".to_string(),
            email: "a@b.com".to_string(),
            experience: "4-7년".to_string(),
            github: String::new(),
        };
        assert!(validate(&data).is_empty());
    }

    #[test]
    fn test_validate_empty_form() {
        let errors = validate(&FormData::default());
        assert_eq!(
            errors.keys().collect::<Vec<_>>(),
            vec![FieldKey::Name, FieldKey::Email, FieldKey::Experience]
        );
        assert_eq!(errors.get(FieldKey::Email), Some("이메일을 입력해주세요."));
        assert_eq!(errors.first(), Some(FieldKey::Name));
    }
}
