use serde::{Deserialize, Serialize};

use crate::forms::{max_chars, required, FieldErrors};

pub const USERNAME_TAKEN: &str = "Username taken. Please pick another";
pub const INVALID_CREDENTIALS: &str = "Invalid name/password";
pub const USERNAME_CONTROL_CHARS: &str = "Your username cannot contain control characters";
pub const USERNAME_DOTS: &str = "Your username cannot be only dots";

/// Submitted registration form. Secrets are never serialized back into a page.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub csrf_token: String,
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();

        if required(&mut errors, "username", &self.username, "Please enter your username") {
            max_chars(
                &mut errors,
                "username",
                &self.username,
                20,
                "You cannot use more than 20 characters for your username",
            );
            if self.username.chars().any(char::is_control) {
                errors.add("username", USERNAME_CONTROL_CHARS);
            }
            // "." and ".." would be collapsed out of the profile URL
            if self.username.chars().all(|c| c == '.') {
                errors.add("username", USERNAME_DOTS);
            }
        }
        required(&mut errors, "password", &self.password, "Please enter your password");
        required(&mut errors, "email", &self.email, "Please enter your email");
        if required(&mut errors, "first_name", &self.first_name, "Please enter your first name") {
            max_chars(
                &mut errors,
                "first_name",
                &self.first_name,
                30,
                "You cannot use more than 30 characters for your first name",
            );
        }
        if required(&mut errors, "last_name", &self.last_name, "Please enter your last name") {
            max_chars(
                &mut errors,
                "last_name",
                &self.last_name,
                30,
                "You cannot use more than 30 characters for your last name",
            );
        }

        errors.finish(Registration {
            username: self.username.clone(),
            password: self.password.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub csrf_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        required(&mut errors, "username", &self.username, "Please enter your username");
        required(&mut errors, "password", &self.password, "Please enter your password");
        errors.finish(Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> RegisterForm {
        RegisterForm {
            username: "alice".into(),
            password: "pw1".into(),
            email: "alice@example.com".into(),
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            csrf_token: String::new(),
        }
    }

    #[test]
    fn complete_registration_validates() {
        let reg = filled().validate().expect("valid form");
        assert_eq!(reg.username, "alice");
        assert_eq!(reg.password, "pw1");
    }

    #[test]
    fn every_missing_field_gets_its_own_message() {
        let errors = RegisterForm::default().validate().unwrap_err();
        assert_eq!(errors.get("username"), ["Please enter your username".to_string()]);
        assert_eq!(errors.get("password"), ["Please enter your password".to_string()]);
        assert_eq!(errors.get("email"), ["Please enter your email".to_string()]);
        assert_eq!(errors.get("first_name"), ["Please enter your first name".to_string()]);
        assert_eq!(errors.get("last_name"), ["Please enter your last name".to_string()]);
    }

    #[test]
    fn length_limits_apply_per_field() {
        let mut form = filled();
        form.username = "u".repeat(21);
        form.last_name = "l".repeat(31);
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get("username"),
            ["You cannot use more than 20 characters for your username".to_string()]
        );
        assert_eq!(
            errors.get("last_name"),
            ["You cannot use more than 30 characters for your last name".to_string()]
        );
        assert!(errors.get("first_name").is_empty());

        let mut at_limit = filled();
        at_limit.username = "u".repeat(20);
        at_limit.first_name = "f".repeat(30);
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn usernames_that_cannot_live_in_a_path_are_refused() {
        for bad in ["al\nice", "tab\there", "bell\u{7}"] {
            let mut form = filled();
            form.username = bad.into();
            let errors = form.validate().unwrap_err();
            assert_eq!(errors.get("username"), [USERNAME_CONTROL_CHARS.to_string()]);
        }
        for bad in [".", ".."] {
            let mut form = filled();
            form.username = bad.into();
            let errors = form.validate().unwrap_err();
            assert_eq!(errors.get("username"), [USERNAME_DOTS.to_string()]);
        }

        let mut punctuated = filled();
        punctuated.username = "a/b c?.d".into();
        assert!(punctuated.validate().is_ok());
    }

    #[test]
    fn serialized_form_omits_secrets() {
        let mut form = filled();
        form.csrf_token = "tok".into();
        let json = serde_json::to_string(&form).unwrap();
        assert!(json.contains("alice@example.com"));
        assert!(!json.contains("pw1"));
        assert!(!json.contains("tok"));
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = LoginForm {
            username: "alice".into(),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("username").is_empty());
        assert_eq!(errors.get("password"), ["Please enter your password".to_string()]);
    }
}
