//! Login page and the sign-in procedure sessions use.

use crate::urls;
use pagekit::prelude::*;
use pagekit::{AuthState, LoginForm, LoginLocators, LoginProcedure};
use std::collections::BTreeMap;

/// Form locators of the Stormwind login page
#[must_use]
pub fn login_locators(page: &Page) -> LoginLocators {
    LoginLocators {
        email: page.locator("#email-only"),
        email_submit: page.get_by_role(AriaRole::Button).named("Enter"),
        password: page.get_by_role(AriaRole::Textbox).named("Password"),
        password_submit: page.get_by_role(AriaRole::Button).named("Log in"),
        error_message: Some(page.locator(".error-message")),
    }
}

/// How both roles sign in and where they land
#[must_use]
pub fn login_procedure() -> LoginProcedure {
    LoginProcedure {
        path: urls::LOGIN.to_string(),
        locators: login_locators,
        landing: BTreeMap::from([
            (Role::Admin, urls::admin::DASHBOARD_MARKER.to_string()),
            (Role::Student, urls::student::MY_CLASSROOM_MARKER.to_string()),
        ]),
    }
}

/// `/user/login`
#[derive(Debug)]
pub struct LoginPage {
    page: Page,
    form: LoginForm,
    /// `#email-only`
    pub email_input: Locator,
    /// "Enter" button of the email step
    pub enter_button: Locator,
    /// Password textbox, present once the email step answered
    pub password_input: Locator,
    /// "Log in" button
    pub login_button: Locator,
    /// Error banner
    pub error_message: Locator,
}

impl LoginPage {
    /// Login page over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let locators = login_locators(page);
        Self {
            page: page.clone(),
            email_input: locators.email.clone(),
            enter_button: locators.email_submit.clone(),
            password_input: locators.password.clone(),
            login_button: locators.password_submit.clone(),
            error_message: page.locator(".error-message"),
            form: LoginForm::new(page, locators),
        }
    }

    /// Sign in as `role`
    ///
    /// # Errors
    ///
    /// [`PageKitError::AuthenticationFailed`] when the password step never
    /// shows, or locator errors.
    pub async fn login(&self, role: Role, credentials: &Credentials) -> PageKitResult<()> {
        self.form.login(role, credentials).await
    }

    /// Fill the email and submit the first step
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn enter_email(&self, email: &str) -> PageKitResult<()> {
        self.form.enter_email(email).await
    }

    /// Wait for the password field and fill it
    ///
    /// # Errors
    ///
    /// [`PageKitError::AuthenticationFailed`] when the field never shows.
    pub async fn enter_password(&self, role: Role, password: &str) -> PageKitResult<()> {
        self.form.enter_password(role, password).await
    }

    /// Submit the password step
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_login(&self) -> PageKitResult<()> {
        self.form.submit().await
    }

    /// Progress through the two steps
    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        self.form.state()
    }

    /// Whether the error banner shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_error_message_displayed(&self) -> PageKitResult<bool> {
        self.error_message.is_visible().await
    }

    /// Banner text, if it shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn error_text(&self) -> PageKitResult<Option<String>> {
        self.form.error_message().await
    }

    /// Assert the banner shows `expected`
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] otherwise.
    pub async fn expect_error_message(&self, expected: &str) -> PageKitResult<()> {
        self.page.assert_visible(&self.error_message).await?;
        self.page
            .assert_text_contains(&self.error_message, expected)
            .await
    }
}

impl PageObject for LoginPage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::LOGIN
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::replica;

    #[tokio::test]
    async fn test_wrong_password_shows_banner() {
        let (_browser, page) = replica::blank_page().await;
        let login = LoginPage::new(&page);
        login.goto().await.unwrap();
        assert!(login.is_on_correct_url());
        login.enter_email(replica::STUDENT_EMAIL).await.unwrap();
        assert_eq!(login.auth_state(), AuthState::EmailEntered);
        login.enter_password(Role::Student, "nope").await.unwrap();
        login.click_login().await.unwrap();
        login
            .expect_error_message("Unrecognized username or password")
            .await
            .unwrap();
        assert!(page.url_contains(urls::LOGIN));
    }

    #[tokio::test]
    async fn test_unknown_email_never_reaches_password_step() {
        let (_browser, page) = replica::blank_page().await;
        let login = LoginPage::new(&page);
        login.goto().await.unwrap();
        let err = login
            .login(Role::Admin, &Credentials::new("nobody@stormwind.test", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, PageKitError::AuthenticationFailed { .. }));
        assert!(login.is_error_message_displayed().await.unwrap());
    }

    #[test]
    fn test_procedure_lands_each_role() {
        let procedure = login_procedure();
        assert_eq!(procedure.path, "/user/login");
        assert_eq!(procedure.landing.get(&Role::Admin).unwrap(), "/reporting/");
        assert_eq!(procedure.landing.get(&Role::Student).unwrap(), "my_classroom");
    }
}
