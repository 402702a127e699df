use serde::Deserialize;

use crate::config::MIN_PASSWORD_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
    FullName,
    Url,
}

/// Problems found in a submitted form, keyed by field, plus an optional
/// message for the whole form.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    fields: Vec<(Field, &'static str)>,
    pub summary: Option<&'static str>,
}

impl ValidationErrors {
    fn add(&mut self, field: Field, message: &'static str) {
        self.fields.push((field, message));
    }

    pub fn for_field(&self, field: Field) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| *message)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.summary.is_none()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

#[derive(Deserialize, Default, Clone)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.username.is_empty() {
            errors.add(Field::Username, "The Login field cannot be empty");
        }
        let short_password = password_too_short(&self.password);
        if self.password.is_empty() || short_password {
            errors.add(
                Field::Password,
                "The Password field cannot be empty or the password is too short",
            );
        }
        if self.full_name.is_empty() {
            errors.add(Field::FullName, "The Full Name field cannot be empty.");
        }
        // Only worth a banner once the other fields are filled in
        if short_password && !self.username.is_empty() && !self.full_name.is_empty() {
            errors.summary = Some("The password must be at least 8 characters long.");
        }
        errors.into_result()
    }
}

#[derive(Deserialize, Default, Clone)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.username.is_empty() {
            errors.add(Field::Username, "The Login field cannot be empty");
        }
        if self.password.is_empty() {
            errors.add(Field::Password, "The Password field cannot be empty");
        }
        errors.into_result()
    }
}

#[derive(Deserialize, Default, Clone)]
pub struct ShortenForm {
    #[serde(default)]
    pub url: String,
}

impl ShortenForm {
    /// Returns the URL to submit, without surrounding whitespace.
    pub fn validate(&self) -> Result<&str, ValidationErrors> {
        let url = self.url.trim();
        if url.is_empty() {
            let mut errors = ValidationErrors::default();
            errors.add(Field::Url, "Please enter a URL.");
            return Err(errors);
        }
        Ok(url)
    }
}

fn password_too_short(password: &str) -> bool {
    !password.is_empty() && password.chars().count() < MIN_PASSWORD_LEN
}
