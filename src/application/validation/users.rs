//! Credential forms: login, password change and admin account creation.

use super::{FieldErrors, Fields, FormData, is_valid_email};

pub const MIN_LOGIN_PASSWORD: usize = 8;
pub const MIN_NEW_PASSWORD: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub fn validate_login(form: &FormData) -> Result<LoginPayload, FieldErrors> {
    let mut fields = Fields::new(form);
    let email = fields.email("email").to_ascii_lowercase();
    let password = raw_password(form, "password");
    if password.chars().count() < MIN_LOGIN_PASSWORD {
        fields.fail(
            "password",
            format!("Password must be at least {MIN_LOGIN_PASSWORD} characters."),
        );
    }
    fields.finish(LoginPayload { email, password })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChangePayload {
    pub current_password: String,
    pub new_password: String,
}

pub fn validate_password_change(form: &FormData) -> Result<PasswordChangePayload, FieldErrors> {
    let mut fields = Fields::new(form);
    let current_password = raw_password(form, "currentPassword");
    let new_password = raw_password(form, "newPassword");
    let confirm_password = raw_password(form, "confirmPassword");

    if current_password.chars().count() < MIN_LOGIN_PASSWORD {
        fields.fail(
            "currentPassword",
            format!("Current password must be at least {MIN_LOGIN_PASSWORD} characters."),
        );
    }
    if new_password.chars().count() < MIN_NEW_PASSWORD {
        fields.fail(
            "newPassword",
            format!("New password must be at least {MIN_NEW_PASSWORD} characters."),
        );
    }
    if confirm_password.chars().count() < MIN_NEW_PASSWORD {
        fields.fail(
            "confirmPassword",
            format!("Confirm password must be at least {MIN_NEW_PASSWORD} characters."),
        );
    } else if new_password != confirm_password {
        fields.fail("confirmPassword", "Passwords do not match");
    }

    fields.finish(PasswordChangePayload {
        current_password,
        new_password,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserPayload {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

pub const NEW_USER_REQUIRED_MESSAGE: &str = "Email and a strong password are required.";

pub fn validate_new_user(form: &FormData) -> Result<NewUserPayload, FieldErrors> {
    let mut fields = Fields::new(form);
    let email = form.get("email").unwrap_or_default().trim().to_ascii_lowercase();
    let password = raw_password(form, "password");

    if !is_valid_email(&email) {
        fields.fail("email", NEW_USER_REQUIRED_MESSAGE);
    }
    if password.chars().count() < MIN_NEW_PASSWORD {
        fields.fail("password", NEW_USER_REQUIRED_MESSAGE);
    }
    let name = fields.optional_text("name");

    fields.finish(NewUserPayload {
        email,
        password,
        name,
    })
}

// Passwords are compared byte-for-byte, so surrounding whitespace is kept.
fn raw_password(form: &FormData, key: &str) -> String {
    form.get(key).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_lowercases_email() {
        let form = FormData::new()
            .with("email", " Admin@JDigital.Local ")
            .with("password", "correct horse");
        let payload = validate_login(&form).expect("valid");
        assert_eq!(payload.email, "admin@jdigital.local");
    }

    #[test]
    fn password_change_reports_mismatch_on_confirmation() {
        let form = FormData::new()
            .with("currentPassword", "old-password")
            .with("newPassword", "brand-new-password")
            .with("confirmPassword", "brand-new-passw0rd");
        let errors = validate_password_change(&form).unwrap_err();
        let first = errors.first().unwrap();
        assert_eq!(first.field, "confirmPassword");
        assert_eq!(first.message, "Passwords do not match");
    }

    #[test]
    fn new_user_requires_ten_character_password() {
        let form = FormData::new()
            .with("email", "staff@jdigital.local")
            .with("password", "short-pw");
        let errors = validate_new_user(&form).unwrap_err();
        assert_eq!(errors.first_message(), NEW_USER_REQUIRED_MESSAGE);

        let form = FormData::new()
            .with("email", "staff@jdigital.local")
            .with("password", "long-enough-pw");
        let payload = validate_new_user(&form).expect("valid");
        assert!(payload.name.is_none());
    }
}
