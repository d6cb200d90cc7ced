//! Roles, credentials and the two-step login flow.
//!
//! ```text
//! Unauthenticated --email + submit--> EmailEntered --password + submit--> Authenticated
//! ```
//!
//! The password field is not in the DOM until the email step responds, so
//! the flow waits for it to become visible before filling it. If it never
//! appears the login fails with a single
//! [`PageKitError::AuthenticationFailed`].

use crate::locator::Locator;
use crate::result::{PageKitError, PageKitResult};
use crate::page::Page;
use crate::wait::{LoadState, WaitState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

// =============================================================================
// ROLES AND CREDENTIALS
// =============================================================================

/// Application role a session signs in as
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manager with access to the admin dashboard
    Admin,
    /// Learner
    Student,
}

impl Role {
    /// Every role
    pub const ALL: [Self; 2] = [Self::Admin, Self::Student];

    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
        }
    }

    /// Prefix of the environment variables holding this role's credentials
    #[must_use]
    pub fn env_prefix(&self) -> String {
        format!("PAGEKIT_{}", self.as_str().to_uppercase())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PageKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "manager" => Ok(Self::Admin),
            "student" => Ok(Self::Student),
            other => Err(PageKitError::ConfigError {
                message: format!("unknown role '{other}'"),
            }),
        }
    }
}

/// Email and password for one role
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Whether both fields are non-empty
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

/// Role to credentials mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialStore {
    entries: BTreeMap<Role, Credentials>,
}

impl CredentialStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a role's credentials
    #[must_use]
    pub fn with(mut self, role: Role, credentials: Credentials) -> Self {
        self.insert(role, credentials);
        self
    }

    /// Add or replace a role's credentials
    pub fn insert(&mut self, role: Role, credentials: Credentials) {
        let _ = self.entries.insert(role, credentials);
    }

    /// Credentials for `role`
    ///
    /// # Errors
    ///
    /// [`PageKitError::ConfigError`] when missing or incomplete.
    pub fn get(&self, role: Role) -> PageKitResult<&Credentials> {
        match self.entries.get(&role) {
            Some(credentials) if credentials.is_complete() => Ok(credentials),
            Some(_) => Err(PageKitError::ConfigError {
                message: format!("credentials for {role} are incomplete"),
            }),
            None => Err(PageKitError::ConfigError {
                message: format!(
                    "no credentials for {role}; set {prefix}_EMAIL and {prefix}_PASSWORD",
                    prefix = role.env_prefix()
                ),
            }),
        }
    }

    /// Roles with credentials
    #[must_use]
    pub fn roles(&self) -> Vec<Role> {
        self.entries.keys().copied().collect()
    }

    /// Copy with every password replaced, for printing
    #[must_use]
    pub fn redacted(&self) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(role, c)| {
                let password = if c.password.is_empty() { "" } else { "<redacted>" };
                (*role, Credentials::new(c.email.clone(), password))
            })
            .collect();
        Self { entries }
    }

    /// Overlay `<PREFIX>_EMAIL` / `<PREFIX>_PASSWORD` values from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for role in Role::ALL {
            let prefix = role.env_prefix();
            let email = lookup(&format!("{prefix}_EMAIL"));
            let password = lookup(&format!("{prefix}_PASSWORD"));
            if email.is_none() && password.is_none() {
                continue;
            }
            let entry = self
                .entries
                .entry(role)
                .or_insert_with(|| Credentials::new("", ""));
            if let Some(email) = email {
                entry.email = email;
            }
            if let Some(password) = password {
                entry.password = password;
            }
            debug!(%role, "credentials overridden from environment");
        }
    }
}

// =============================================================================
// LOGIN FLOW
// =============================================================================

/// Progress through the login flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    /// Nothing submitted
    #[default]
    Unauthenticated,
    /// Email submitted, password step pending
    EmailEntered,
    /// Password submitted and the landing page reached
    Authenticated,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unauthenticated => "unauthenticated",
            Self::EmailEntered => "email entered",
            Self::Authenticated => "authenticated",
        })
    }
}

/// Locators of a two-step login form
#[derive(Debug, Clone)]
pub struct LoginLocators {
    /// Email input
    pub email: Locator,
    /// Button submitting the email step
    pub email_submit: Locator,
    /// Password input, revealed by the email step
    pub password: Locator,
    /// Button submitting the password step
    pub password_submit: Locator,
    /// Optional error banner
    pub error_message: Option<Locator>,
}

/// Two-step login form driver
#[derive(Debug)]
pub struct LoginForm {
    page: Page,
    locators: LoginLocators,
    password_timeout: Duration,
    state: Mutex<AuthState>,
}

impl LoginForm {
    /// Form on `page`
    #[must_use]
    pub fn new(page: &Page, locators: LoginLocators) -> Self {
        Self {
            page: page.clone(),
            locators,
            password_timeout: page.timeouts().expect,
            state: Mutex::new(AuthState::Unauthenticated),
        }
    }

    /// Bound for the password field to appear
    #[must_use]
    pub const fn with_password_timeout(mut self, timeout: Duration) -> Self {
        self.password_timeout = timeout;
        self
    }

    /// Form locators
    #[must_use]
    pub fn locators(&self) -> &LoginLocators {
        &self.locators
    }

    /// Current progress
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.lock().map_or(AuthState::Unauthenticated, |s| *s)
    }

    fn set_state(&self, state: AuthState) {
        if let Ok(mut slot) = self.state.lock() {
            *slot = state;
        }
    }

    /// Fill the email and submit it
    ///
    /// # Errors
    ///
    /// Locator or engine errors.
    pub async fn enter_email(&self, email: &str) -> PageKitResult<()> {
        debug!(email, "enter email");
        self.locators.email.fill(email).await?;
        self.locators.email_submit.click().await?;
        self.set_state(AuthState::EmailEntered);
        Ok(())
    }

    /// Wait for the password field, then fill it
    ///
    /// # Errors
    ///
    /// [`PageKitError::AuthenticationFailed`] when the field never appears.
    pub async fn enter_password(&self, role: Role, password: &str) -> PageKitResult<()> {
        match self
            .locators
            .password
            .wait_for(WaitState::Visible, Some(self.password_timeout))
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_timeout() => {
                warn!(%role, "password step never appeared");
                let message = match self.error_message().await.ok().flatten() {
                    Some(text) => format!("password field did not appear: {text}"),
                    None => format!(
                        "password field did not appear within {}ms",
                        self.password_timeout.as_millis()
                    ),
                };
                return Err(PageKitError::AuthenticationFailed {
                    role: role.to_string(),
                    message,
                });
            }
            Err(e) => return Err(e),
        }
        self.locators.password.fill(password).await
    }

    /// Submit the password step
    ///
    /// # Errors
    ///
    /// Locator or engine errors.
    pub async fn submit(&self) -> PageKitResult<()> {
        self.locators.password_submit.click().await
    }

    /// Run the whole flow and wait for the landing page to load
    ///
    /// # Errors
    ///
    /// [`PageKitError::AuthenticationFailed`] or the first underlying error.
    pub async fn login(&self, role: Role, credentials: &Credentials) -> PageKitResult<()> {
        info!(%role, email = %credentials.email, "login");
        self.enter_email(&credentials.email).await?;
        self.enter_password(role, &credentials.password).await?;
        self.submit().await?;
        self.page.wait_for_load_state(LoadState::Load).await?;
        self.set_state(AuthState::Authenticated);
        info!(%role, url = %self.page.current_url(), "authenticated");
        Ok(())
    }

    /// Text of the visible error banner, if any
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn error_message(&self) -> PageKitResult<Option<String>> {
        let Some(banner) = &self.locators.error_message else {
            return Ok(None);
        };
        if banner.is_visible().await? {
            Ok(Some(banner.text_content().await?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod credential_tests {
        use super::*;

        #[test]
        fn test_role_parsing() {
            assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
            assert_eq!("manager".parse::<Role>().unwrap(), Role::Admin);
            assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
            assert!("guest".parse::<Role>().is_err());
            assert_eq!(Role::Student.env_prefix(), "PAGEKIT_STUDENT");
        }

        #[test]
        fn test_debug_redacts_password() {
            let credentials = Credentials::new("admin@example.com", "s3cret");
            let debug = format!("{credentials:?}");
            assert!(debug.contains("admin@example.com"));
            assert!(!debug.contains("s3cret"));
        }

        #[test]
        fn test_missing_credentials_name_env_vars() {
            let store = CredentialStore::new();
            let err = store.get(Role::Admin).unwrap_err();
            assert!(err.to_string().contains("PAGEKIT_ADMIN_EMAIL"));
        }

        #[test]
        fn test_env_overlay() {
            let mut store =
                CredentialStore::new().with(Role::Admin, Credentials::new("a@example.com", "pw"));
            store.apply_env(|name| match name {
                "PAGEKIT_ADMIN_PASSWORD" => Some("rotated".to_string()),
                "PAGEKIT_STUDENT_EMAIL" => Some("s@example.com".to_string()),
                _ => None,
            });
            assert_eq!(store.get(Role::Admin).unwrap().password, "rotated");
            assert_eq!(store.get(Role::Admin).unwrap().email, "a@example.com");
            // email without password stays incomplete
            assert!(store.get(Role::Student).is_err());
            assert_eq!(store.roles(), vec![Role::Admin, Role::Student]);
        }

        #[test]
        fn test_yaml_shape() {
            let store: CredentialStore = serde_yaml_ng::from_str(
                "admin:\n  email: a@example.com\n  password: pw\n",
            )
            .unwrap();
            assert_eq!(store.get(Role::Admin).unwrap().email, "a@example.com");
        }
    }

    mod flow_tests {
        use super::*;
        use crate::driver::{BrowserDriver, ContextDriver};
        use crate::mock::{MockAction, MockBrowser, MockRoute, MockSite};
        use crate::page::PageSettings;
        use crate::selector::AriaRole;
        use crate::wait::Timeouts;
        use url::Url;

        const LOGIN: &str = r#"<html><body>
            <input id="email-only" type="email">
            <button id="enter">Enter</button>
            <div data-fragment="password-step">
                <input type="password" aria-label="Password">
                <button id="login">Log in</button>
            </div>
            <div class="error-message" data-fragment="error">Unknown email</div>
        </body></html>"#;

        fn site() -> MockSite {
            MockSite::new()
                .account("admin@example.com", "pw", "/landing")
                .route(
                    MockRoute::html("/user/login", LOGIN)
                        .on_click(
                            "#enter",
                            MockAction::custom(|ctx| {
                                let email = ctx.value_of("#email-only").unwrap_or_default();
                                if ctx.has_account(&email) {
                                    ctx.show_after("password-step", Duration::from_millis(20));
                                } else {
                                    ctx.show("error");
                                }
                                Ok(())
                            }),
                        )
                        .on_click(
                            "#login",
                            MockAction::custom(|ctx| {
                                let email = ctx.value_of("#email-only").unwrap_or_default();
                                let password =
                                    ctx.value_of("input[type=password]").unwrap_or_default();
                                if let Some(account) = ctx.verify_credentials(&email, &password) {
                                    ctx.sign_in(account.email.clone());
                                    ctx.navigate(account.landing);
                                }
                                Ok(())
                            }),
                        ),
                )
                .route(MockRoute::html("/landing", "<html><body>Welcome</body></html>").protected())
        }

        async fn login_form() -> (MockBrowser, Page, LoginForm) {
            let browser = MockBrowser::new(site());
            let context = browser.new_context().await.unwrap();
            let settings = PageSettings::default()
                .with_base_url(Url::parse("https://lms.example.com/").unwrap())
                .with_timeouts(
                    Timeouts::default()
                        .with_expect(Duration::from_millis(150))
                        .with_action(Duration::from_millis(150))
                        .with_poll_interval(Duration::from_millis(10)),
                );
            let page = Page::new(context.new_page().await.unwrap(), settings);
            page.goto("/user/login").await.unwrap();
            let form = LoginForm::new(
                &page,
                LoginLocators {
                    email: page.locator("#email-only"),
                    email_submit: page.get_by_role(AriaRole::Button).named("Enter"),
                    password: page.get_by_role(AriaRole::Textbox).named("Password"),
                    password_submit: page.get_by_role(AriaRole::Button).named("Log in"),
                    error_message: Some(page.locator(".error-message")),
                },
            );
            (browser, page, form)
        }

        #[tokio::test]
        async fn test_successful_login_reaches_landing() {
            let (_browser, page, form) = login_form().await;
            assert_eq!(form.state(), AuthState::Unauthenticated);
            form.login(Role::Admin, &Credentials::new("admin@example.com", "pw"))
                .await
                .unwrap();
            assert_eq!(form.state(), AuthState::Authenticated);
            assert!(page.url_contains("/landing"));
        }

        #[tokio::test]
        async fn test_missing_password_step_is_one_auth_error() {
            let (_browser, _page, form) = login_form().await;
            let err = form
                .login(Role::Admin, &Credentials::new("nobody@example.com", "pw"))
                .await
                .unwrap_err();
            assert_eq!(form.state(), AuthState::EmailEntered);
            match err {
                PageKitError::AuthenticationFailed { role, message } => {
                    assert_eq!(role, "admin");
                    assert!(message.contains("Unknown email"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
