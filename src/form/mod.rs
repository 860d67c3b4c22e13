//! Form data model
//!
//! [`FormData`] holds what the user is typing, [`FieldErrors`] what is wrong
//! with it, and [`FormResult`] is the record handed to the caller once every
//! field validates. [`FormState`] combines the first two behind a reducer.

pub mod validation;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use validation::validate;

/// Options offered by the experience select, in display order
pub const EXPERIENCE_OPTIONS: [&str; 3] = ["0-3년", "4-7년", "8년 이상"];

/// Placeholder shown while no experience option is chosen
pub const EXPERIENCE_PLACEHOLDER: &str = "선택해주세요";

/// How a field is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Select,
    Url,
}

/// Form fields in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKey {
    Name,
    Email,
    Experience,
    Github,
}

impl FieldKey {
    pub const ALL: [FieldKey; 4] = [
        FieldKey::Name,
        FieldKey::Email,
        FieldKey::Experience,
        FieldKey::Github,
    ];

    /// Element id of the field's control
    pub fn element_id(&self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Email => "email",
            FieldKey::Experience => "experience",
            FieldKey::Github => "github",
        }
    }

    /// Element id of the inline alert carrying the field's error
    pub fn error_id(&self) -> String {
        format!("{}-error", self.element_id())
    }

    /// Noun used inside validation messages
    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::Name => "이름",
            FieldKey::Email => "이메일",
            FieldKey::Experience => "경력 연차",
            FieldKey::Github => "GitHub 링크",
        }
    }

    /// Visible label text next to the control
    pub fn display_label(&self) -> &'static str {
        match self {
            FieldKey::Name => "이름 / 닉네임 *",
            FieldKey::Email => "이메일 *",
            FieldKey::Experience => "FE 경력 연차 *",
            FieldKey::Github => "GitHub 링크 (선택)",
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            FieldKey::Experience => Some(EXPERIENCE_PLACEHOLDER),
            FieldKey::Github => Some("https://github.com/username"),
            _ => None,
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, FieldKey::Github)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldKey::Name => FieldKind::Text,
            FieldKey::Email => FieldKind::Email,
            FieldKey::Experience => FieldKind::Select,
            FieldKey::Github => FieldKind::Url,
        }
    }
}

/// Raw field values as typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub experience: String,
    pub github: String,
}

impl FormData {
    pub fn get(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::Name => &self.name,
            FieldKey::Email => &self.email,
            FieldKey::Experience => &self.experience,
            FieldKey::Github => &self.github,
        }
    }

    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        let slot = match key {
            FieldKey::Name => &mut self.name,
            FieldKey::Email => &mut self.email,
            FieldKey::Experience => &mut self.experience,
            FieldKey::Github => &mut self.github,
        };
        *slot = value.into();
    }
}

/// Per-field messages, ordered by declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<FieldKey, String>);

impl FieldErrors {
    pub fn insert(&mut self, key: FieldKey, message: impl Into<String>) {
        self.0.insert(key, message.into());
    }

    pub fn clear(&mut self, key: FieldKey) -> Option<String> {
        self.0.remove(&key)
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.0.contains_key(&key)
    }

    /// First failing field in declaration order
    pub fn first(&self) -> Option<FieldKey> {
        self.0.keys().next().copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.0.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Validated submission
///
/// Only obtainable through [`FormResult::try_from`], so a value of this type
/// always passed every validator. Deserializing goes through the same check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FormData")]
pub struct FormResult {
    name: String,
    email: String,
    experience: String,
    github: String,
}

impl FormResult {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn experience(&self) -> &str {
        &self.experience
    }

    pub fn github(&self) -> &str {
        &self.github
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", key.element_id(), message)?;
            first = false;
        }
        Ok(())
    }
}

impl TryFrom<FormData> for FormResult {
    type Error = FieldErrors;

    fn try_from(data: FormData) -> Result<Self, Self::Error> {
        let errors = validate(&data);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            name: data.name,
            email: data.email,
            experience: data.experience,
            github: data.github,
        })
    }
}

/// Values plus errors, updated through [`FormState::apply`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub data: FormData,
    pub errors: FieldErrors,
}

impl FormState {
    /// Set a field value; any error on that field is dropped immediately
    pub fn apply(mut self, key: FieldKey, value: impl Into<String>) -> Self {
        self.data.set(key, value);
        self.errors.clear(key);
        self
    }

    /// Replace the errors with a fresh validation pass
    pub fn validated(mut self) -> Self {
        self.errors = validate(&self.data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reducer_clears_only_changed_field() {
        let state = FormState::default().validated();
        assert!(state.errors.contains(FieldKey::Name));
        assert!(state.errors.contains(FieldKey::Email));

        let state = state.apply(FieldKey::Email, "x");
        assert!(!state.errors.contains(FieldKey::Email));
        assert!(state.errors.contains(FieldKey::Name));
        assert_eq!(state.data.email, "x");
    }

    #[test]
    fn test_form_result_requires_valid_data() {
        let err = FormResult::try_from(FormData::default()).unwrap_err();
        assert_eq!(err.len(), 3);

        let data = FormData {
            name: "Kim".into(),
            email: "a@b.com".into(),
            experience: "0-3년".into(),
            github: "https://github.com/kim".into(),
        };
        let result = FormResult::try_from(data).expect("valid");
        assert_eq!(result.name(), "Kim");
        assert_eq!(result.github(), "https://github.com/kim");
    }

    #[test]
    fn test_field_metadata() {
        assert_eq!(FieldKey::Email.error_id(), "email-error");
        assert!(FieldKey::Experience.is_required());
        assert!(!FieldKey::Github.is_required());
        assert_eq!(FieldKey::Experience.kind(), FieldKind::Select);
    }

    #[test]
    fn test_form_result_serializes_flat() {
        let data = FormData {
            name: "Kim".into(),
            email: "a@b.com".into(),
            experience: "8년 이상".into(),
            github: String::new(),
        };
        let result = FormResult::try_from(data).expect("valid");
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["email"], "a@b.com");
        assert_eq!(json["github"], "");
    }

    #[test]
    fn test_deserializing_runs_validation() {
        let invalid = serde_json::json!({
            "name": "",
            "email": "not-an-email",
            "experience": "0-3년",
            "github": ""
        });
        let err = serde_json::from_value::<FormResult>(invalid).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("name: 이름을 입력해주세요."), "{}", message);
        assert!(message.contains("올바른 이메일 형식을 입력해주세요."), "{}", message);

        let missing_github = serde_json::json!({
            "name": "Kim",
            "email": "a@b.com",
            "experience": "4-7년"
        });
        let result: FormResult = serde_json::from_value(missing_github).expect("valid");
        assert_eq!(result.github(), "");
    }
}
