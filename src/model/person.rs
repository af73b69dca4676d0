//! Person domain model and its field validation.
//!
//! # Invariants
//! - `name`, `surname` and `email` are never empty on a persisted person.
//! - `email` and a non-empty `jabber` hold syntactically valid addresses.
//! - Short text fields stay within `MAX_SHORT_TEXT` characters.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub type PersonId = i64;

pub const MAX_SHORT_TEXT: usize = 250;

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_INVALID_EMAIL: &str = "Enter a valid email address.";
pub const MSG_INVALID_DATE: &str = "Enter a valid date.";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("valid email regex")
});

/// Field name to error messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Append every message from `other`.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, messages)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Reference to a stored profile photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Path relative to the media root, e.g. `photo/ab12.jpg`.
    pub path: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// The tracked profile entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub surname: String,
    pub date_of_birth: NaiveDate,
    pub bio: String,
    pub email: String,
    pub jabber: String,
    pub skype_id: String,
    pub other: String,
    pub image: Option<ImageRef>,
}

impl Person {
    /// Checks the invariants required before any write.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text_fields(
            &mut errors,
            &self.name,
            &self.surname,
            &self.email,
            &self.jabber,
            &self.skype_id,
        );
        errors.into_result(())
    }

    /// Overwrite every editable text field with the draft's values.
    pub fn apply(&mut self, draft: PersonDraft) {
        self.name = draft.name;
        self.surname = draft.surname;
        self.date_of_birth = draft.date_of_birth;
        self.bio = draft.bio;
        self.email = draft.email;
        self.jabber = draft.jabber;
        self.skype_id = draft.skype_id;
        self.other = draft.other;
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.surname, self.name)
    }
}

/// Validated person fields, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDraft {
    pub name: String,
    pub surname: String,
    pub date_of_birth: NaiveDate,
    pub bio: String,
    pub email: String,
    pub jabber: String,
    pub skype_id: String,
    pub other: String,
}

/// Raw, untrusted person fields as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonForm {
    pub name: String,
    pub surname: String,
    pub date_of_birth: String,
    pub bio: String,
    pub email: String,
    pub jabber: String,
    pub skype_id: String,
    pub other: String,
}

impl PersonForm {
    /// Prefill a form from a stored person.
    pub fn from_person(person: &Person) -> Self {
        Self {
            name: person.name.clone(),
            surname: person.surname.clone(),
            date_of_birth: person.date_of_birth.format("%Y-%m-%d").to_string(),
            bio: person.bio.clone(),
            email: person.email.clone(),
            jabber: person.jabber.clone(),
            skype_id: person.skype_id.clone(),
            other: person.other.clone(),
        }
    }

    /// Assign a text field by its form name. Unknown names are ignored.
    pub fn set(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = value,
            "surname" => self.surname = value,
            "date_of_birth" => self.date_of_birth = value,
            "bio" => self.bio = value,
            "email" => self.email = value,
            "jabber" => self.jabber = value,
            "skype_id" => self.skype_id = value,
            "other" => self.other = value,
            _ => {}
        }
    }

    /// Validate and convert into a draft, or report every failing field.
    pub fn clean(&self) -> Result<PersonDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim().to_string();
        let surname = self.surname.trim().to_string();
        let email = self.email.trim().to_string();
        let jabber = self.jabber.trim().to_string();
        let skype_id = self.skype_id.trim().to_string();

        check_text_fields(&mut errors, &name, &surname, &email, &jabber, &skype_id);

        let raw_date = self.date_of_birth.trim();
        let date_of_birth = if raw_date.is_empty() {
            errors.add("date_of_birth", MSG_REQUIRED);
            None
        } else {
            match NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("date_of_birth", MSG_INVALID_DATE);
                    None
                }
            }
        };

        match date_of_birth {
            Some(date_of_birth) if errors.is_empty() => Ok(PersonDraft {
                name,
                surname,
                date_of_birth,
                bio: self.bio.clone(),
                email,
                jabber,
                skype_id,
                other: self.other.clone(),
            }),
            _ => Err(errors),
        }
    }
}

fn check_text_fields(
    errors: &mut FieldErrors,
    name: &str,
    surname: &str,
    email: &str,
    jabber: &str,
    skype_id: &str,
) {
    for (field, value) in [("name", name), ("surname", surname)] {
        if value.is_empty() {
            errors.add(field, MSG_REQUIRED);
        }
    }

    if email.is_empty() {
        errors.add("email", MSG_REQUIRED);
    } else if !is_valid_email(email) {
        errors.add("email", MSG_INVALID_EMAIL);
    }

    if !jabber.is_empty() && !is_valid_email(jabber) {
        errors.add("jabber", MSG_INVALID_EMAIL);
    }

    for (field, value) in [("name", name), ("surname", surname), ("skype_id", skype_id)] {
        let len = value.chars().count();
        if len > MAX_SHORT_TEXT {
            errors.add(
                field,
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    MAX_SHORT_TEXT, len
                ),
            );
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> PersonForm {
        PersonForm {
            name: "Aleks".into(),
            surname: "Woronow".into(),
            date_of_birth: "2015-01-02".into(),
            email: "woronow@yandex.ru".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_form_reports_required_fields() {
        let errors = PersonForm::default().clean().unwrap_err();

        assert_eq!(errors.get("name"), Some(&[MSG_REQUIRED.to_string()][..]));
        assert_eq!(errors.get("surname"), Some(&[MSG_REQUIRED.to_string()][..]));
        assert_eq!(errors.get("date_of_birth"), Some(&[MSG_REQUIRED.to_string()][..]));
        assert_eq!(errors.get("email"), Some(&[MSG_REQUIRED.to_string()][..]));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_invalid_email_and_date() {
        let mut form = valid_form();
        form.email = "woronowandex.ru".into();
        form.jabber = "42cc".into();
        form.date_of_birth = "sd".into();

        let errors = form.clean().unwrap_err();
        assert_eq!(errors.get("email").unwrap()[0], MSG_INVALID_EMAIL);
        assert_eq!(errors.get("jabber").unwrap()[0], MSG_INVALID_EMAIL);
        assert_eq!(errors.get("date_of_birth").unwrap()[0], MSG_INVALID_DATE);
    }

    #[test]
    fn test_valid_form_cleans() {
        let draft = valid_form().clean().unwrap();
        assert_eq!(draft.name, "Aleks");
        assert_eq!(draft.date_of_birth, NaiveDate::from_ymd_opt(2015, 1, 2).unwrap());
        assert!(draft.jabber.is_empty());
    }

    #[test]
    fn test_overlong_name() {
        let mut form = valid_form();
        form.name = "x".repeat(MAX_SHORT_TEXT + 1);

        let errors = form.clean().unwrap_err();
        assert!(errors.get("name").unwrap()[0].contains("at most 250"));
    }

    #[test]
    fn test_display_is_surname_then_name() {
        let person = Person {
            id: 1,
            name: "Aleks".into(),
            surname: "Woronow".into(),
            date_of_birth: NaiveDate::from_ymd_opt(2015, 8, 22).unwrap(),
            bio: String::new(),
            email: "aleks.woronow@yandex.ru".into(),
            jabber: "42cc@khavr.com".into(),
            skype_id: String::new(),
            other: String::new(),
            image: None,
        };
        assert_eq!(person.to_string(), "Woronow Aleks");
        assert!(person.validate().is_ok());
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let mut errors = FieldErrors::new();
        errors.add("email", MSG_REQUIRED);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"email": [MSG_REQUIRED]}));
    }
}
