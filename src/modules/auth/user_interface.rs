// src/modules/auth/user_interface.rs
use std::io;

use log::{debug, warn};

use super::error::AuthError;
use super::session::SessionTracker;
use super::store::{CredentialStore, PublicUser};
use crate::modules::storage::{KeyValueStorage, StorageError};
use crate::modules::utils::io::{prompt_password, prompt_with_default};
use crate::modules::utils::logging::log_auth_event;
use crate::modules::utils::text::is_valid_email;
use crate::{MIN_PASSWORD_LENGTH, REMEMBERED_EMAIL_KEY};

/// Messages shown to the user when a form cannot be submitted
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Please enter your name")]
    MissingName,
    #[error("Please enter your email")]
    MissingEmail,
    #[error("Please enter a valid email")]
    InvalidEmail,
    #[error("Please enter a password")]
    MissingPassword,
    #[error("Password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Please fill in all fields")]
    MissingLoginFields,
    #[error("Please enter a valid email address")]
    InvalidLoginEmail,
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("Could not save session: {0}")]
    Storage(#[from] StorageError),
}

/// Values collected by the registration form
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Trim name and email the way the form fields are read
    pub fn new(name: &str, email: &str, password: &str, confirm_password: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        }
    }

    /// Checks run before the store is touched, first failure wins
    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.is_empty() {
            return Err(FormError::MissingName);
        }
        if self.email.is_empty() {
            return Err(FormError::MissingEmail);
        }
        if !is_valid_email(&self.email) {
            return Err(FormError::InvalidEmail);
        }
        if self.password.is_empty() {
            return Err(FormError::MissingPassword);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(FormError::PasswordTooShort);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(())
    }
}

/// Values collected by the login form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember: bool,
}

impl LoginForm {
    pub fn new(email: &str, password: &str, remember: bool) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
            remember,
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(FormError::MissingLoginFields);
        }
        if !is_valid_email(&self.email) {
            return Err(FormError::InvalidLoginEmail);
        }
        Ok(())
    }
}

/// Register the user and log them in
pub fn handle_registration(
    store: &CredentialStore<'_>,
    session: &SessionTracker<'_>,
    form: &RegistrationForm,
) -> Result<PublicUser, FormError> {
    form.validate()?;

    let user = match store.create(&form.name, &form.email, &form.password) {
        Ok(user) => user,
        Err(e) => {
            log_auth_event("register", &form.email, false, Some(&e.to_string()));
            return Err(e.into());
        }
    };

    let public = user.public();
    session.set_current(Some(&public))?;
    log_auth_event("register", &public.email, true, None);
    Ok(public)
}

/// Check the credentials, optionally remember the email, and start a session
pub fn handle_login(
    store: &CredentialStore<'_>,
    session: &SessionTracker<'_>,
    storage: &dyn KeyValueStorage,
    form: &LoginForm,
) -> Result<PublicUser, FormError> {
    form.validate()?;

    let user = match store.authenticate(&form.email, &form.password) {
        Ok(user) => user,
        Err(e) => {
            log_auth_event("login", &form.email, false, None);
            return Err(e.into());
        }
    };

    if form.remember {
        // Prefill is a convenience; a failed write must not block the login
        if let Err(e) = storage.set(REMEMBERED_EMAIL_KEY, &form.email) {
            warn!("Failed to remember email: {}", e);
        }
    }

    session.set_current(Some(&user))?;
    log_auth_event("login", &user.email, true, None);
    Ok(user)
}

/// End the current session, returning who was logged in
pub fn handle_logout(session: &SessionTracker<'_>) -> Result<Option<String>, StorageError> {
    let previous = session.get_current();
    session.clear()?;

    match &previous {
        // Reference-only sessions carry no email, so fall back to the id
        Some(record) => log_auth_event(
            "logout",
            record.email().unwrap_or(record.user_id()),
            true,
            None,
        ),
        None => debug!("Logout requested with no active session"),
    }
    Ok(previous.map(|record| record.user_id().to_string()))
}

/// Last email saved with "remember me", if any
pub fn remembered_email(storage: &dyn KeyValueStorage) -> Option<String> {
    storage
        .get(REMEMBERED_EMAIL_KEY)
        .filter(|email| !email.is_empty())
}

/// Fill in whatever the command line left out by prompting
pub fn collect_registration_form(
    name: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> io::Result<RegistrationForm> {
    let name = match name {
        Some(name) => name.to_string(),
        None => prompt_with_default("Name", None)?,
    };
    let email = match email {
        Some(email) => email.to_string(),
        None => prompt_with_default("Email", None)?,
    };
    let (password, confirm) = match password {
        Some(password) => (password.to_string(), password.to_string()),
        None => {
            let password = prompt_password("Password")?;
            let confirm = prompt_password("Confirm password")?;
            (password, confirm)
        }
    };
    Ok(RegistrationForm::new(&name, &email, &password, &confirm))
}

/// Prompt for missing login fields, offering the remembered email as default
pub fn collect_login_form(
    storage: &dyn KeyValueStorage,
    email: Option<&str>,
    password: Option<&str>,
    remember: bool,
) -> io::Result<LoginForm> {
    let email = match email {
        Some(email) => email.to_string(),
        None => prompt_with_default("Email", remembered_email(storage).as_deref())?,
    };
    let password = match password {
        Some(password) => password.to_string(),
        None => prompt_password("Password")?,
    };
    Ok(LoginForm::new(&email, &password, remember))
}
