//! Authenticated browser sessions.
//!
//! A [`Session`] is one isolated browser context signed in as one [`Role`].
//! It only exists after the login flow reached its landing page. The
//! [`SessionLedger`] allows at most one live session per role; the lease is
//! released when the session is dropped.

use crate::auth::{Credentials, LoginForm, LoginLocators, Role};
use crate::driver::{BrowserDriver, ContextDriver};
use crate::page::{Page, PageSettings};
use crate::result::{PageKitError, PageKitResult};
use crate::wait::LoadState;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

// =============================================================================
// LEDGER
// =============================================================================

/// Tracks which roles currently hold a session
#[derive(Debug, Clone, Default)]
pub struct SessionLedger {
    active: Arc<Mutex<HashSet<Role>>>,
}

impl SessionLedger {
    /// Empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `role`
    ///
    /// # Errors
    ///
    /// [`PageKitError::InvalidState`] if `role` already holds a session.
    pub fn acquire(&self, role: Role) -> PageKitResult<SessionLease> {
        let mut active = self.active.lock().map_err(|_| PageKitError::InvalidState {
            message: "session ledger lock poisoned".to_string(),
        })?;
        if !active.insert(role) {
            return Err(PageKitError::InvalidState {
                message: format!("a {role} session is already active in this test"),
            });
        }
        Ok(SessionLease {
            role,
            ledger: self.clone(),
        })
    }

    /// Whether `role` holds a session
    #[must_use]
    pub fn is_active(&self, role: Role) -> bool {
        self.active.lock().is_ok_and(|a| a.contains(&role))
    }

    /// Number of live sessions
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.lock().map_or(0, |a| a.len())
    }

    fn release(&self, role: Role) {
        if let Ok(mut active) = self.active.lock() {
            let _ = active.remove(&role);
        }
    }
}

/// Reservation of one role in a [`SessionLedger`], released on drop
#[derive(Debug)]
pub struct SessionLease {
    role: Role,
    ledger: SessionLedger,
}

impl SessionLease {
    /// Reserved role
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.ledger.release(self.role);
    }
}

// =============================================================================
// LOGIN PROCEDURE
// =============================================================================

/// How an application signs in: where the form lives, how to find its
/// fields and where each role lands afterwards
#[derive(Clone)]
pub struct LoginProcedure {
    /// Path of the login page
    pub path: String,
    /// Builds the form locators for a page
    pub locators: fn(&Page) -> LoginLocators,
    /// URL substring proving a role reached its landing page
    pub landing: BTreeMap<Role, String>,
}

impl fmt::Debug for LoginProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginProcedure")
            .field("path", &self.path)
            .field("landing", &self.landing)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// One authenticated browser context for one role
pub struct Session {
    role: Role,
    credentials: Credentials,
    context: Arc<dyn ContextDriver>,
    page: Page,
    _lease: SessionLease,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("email", &self.credentials.email)
            .field("context", &self.context.id())
            .field("url", &self.page.current_url())
            .finish()
    }
}

impl Session {
    /// Open a fresh context and sign in as `role`
    ///
    /// # Errors
    ///
    /// [`PageKitError::InvalidState`] when `role` already holds a session,
    /// [`PageKitError::AuthenticationFailed`] when the login flow does not
    /// reach the landing page, or navigation and engine errors.
    pub async fn establish(
        browser: &dyn BrowserDriver,
        ledger: &SessionLedger,
        role: Role,
        credentials: &Credentials,
        settings: Arc<PageSettings>,
        procedure: &LoginProcedure,
    ) -> PageKitResult<Self> {
        let lease = ledger.acquire(role)?;
        let context = browser.new_context().await?;
        let page = match context.new_page().await {
            Ok(driver) => Page::with_settings(driver, settings),
            Err(e) => {
                discard(&context).await;
                return Err(e);
            }
        };
        if let Err(e) = sign_in(&page, role, credentials, procedure).await {
            discard(&context).await;
            return Err(e);
        }
        info!(%role, context = %context.id(), url = %page.current_url(), "session established");
        Ok(Self {
            role,
            credentials: credentials.clone(),
            context,
            page,
            _lease: lease,
        })
    }

    /// Signed-in role
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Credentials used to sign in
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Main page of the session
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    /// Browser context backing the session
    #[must_use]
    pub fn context(&self) -> &Arc<dyn ContextDriver> {
        &self.context
    }

    /// Whether the context was closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.context.is_closed()
    }

    /// Close the context and every page in it. The role stays reserved
    /// until the session is dropped.
    ///
    /// # Errors
    ///
    /// Engine errors while closing.
    pub async fn close(&self) -> PageKitResult<()> {
        info!(role = %self.role, context = %self.context.id(), "close session");
        self.context.close().await
    }
}

async fn sign_in(
    page: &Page,
    role: Role,
    credentials: &Credentials,
    procedure: &LoginProcedure,
) -> PageKitResult<()> {
    page.navigate(&procedure.path, LoadState::Load).await?;
    let form = LoginForm::new(page, (procedure.locators)(page));
    form.login(role, credentials).await?;
    let Some(marker) = procedure.landing.get(&role) else {
        return Ok(());
    };
    match page.wait_for_url_contains(marker).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_timeout() => {
            let banner = form.error_message().await.ok().flatten();
            Err(PageKitError::AuthenticationFailed {
                role: role.to_string(),
                message: match banner {
                    Some(text) => format!("landing page not reached: {text}"),
                    None => format!(
                        "landing page {marker:?} not reached, still at {}",
                        page.current_url()
                    ),
                },
            })
        }
        Err(e) => Err(e),
    }
}

async fn discard(context: &Arc<dyn ContextDriver>) {
    if let Err(e) = context.close().await {
        warn!(context = %context.id(), error = %e, "failed to close context after failed login");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod ledger_tests {
        use super::*;

        #[test]
        fn test_one_session_per_role() {
            let ledger = SessionLedger::new();
            let admin = ledger.acquire(Role::Admin).unwrap();
            assert!(ledger.acquire(Role::Admin).is_err());
            let _student = ledger.acquire(Role::Student).unwrap();
            assert_eq!(ledger.active_count(), 2);
            drop(admin);
            assert!(!ledger.is_active(Role::Admin));
            assert!(ledger.acquire(Role::Admin).is_ok());
        }
    }

    mod establish_tests {
        use super::*;
        use crate::mock::{MockAction, MockBrowser, MockRoute, MockSite};
        use crate::selector::AriaRole;
        use crate::wait::Timeouts;
        use std::time::Duration;
        use url::Url;

        fn site() -> MockSite {
            MockSite::new()
                .account("admin@example.com", "pw", "/admin/dashboard")
                .route(
                    MockRoute::html(
                        "/user/login",
                        r#"<html><body>
                            <input id="email" type="email"><button id="next">Enter</button>
                            <div data-fragment="pw">
                                <input id="password" type="password" aria-label="Password">
                                <button id="go">Log in</button>
                            </div>
                        </body></html>"#,
                    )
                    .on_click("#next", MockAction::Show("pw".into()))
                    .on_click(
                        "#go",
                        MockAction::custom(|ctx| {
                            let email = ctx.value_of("#email").unwrap_or_default();
                            let password = ctx.value_of("#password").unwrap_or_default();
                            if let Some(account) = ctx.verify_credentials(&email, &password) {
                                ctx.sign_in(account.email.clone());
                                ctx.navigate(account.landing);
                            }
                            Ok(())
                        }),
                    ),
                )
                .route(
                    MockRoute::html("/admin/dashboard", "<html><body>Dashboard</body></html>")
                        .protected(),
                )
        }

        fn locators(page: &Page) -> LoginLocators {
            LoginLocators {
                email: page.locator("#email"),
                email_submit: page.get_by_role(AriaRole::Button).named("Enter"),
                password: page.get_by_role(AriaRole::Textbox).named("Password"),
                password_submit: page.get_by_role(AriaRole::Button).named("Log in"),
                error_message: None,
            }
        }

        fn procedure() -> LoginProcedure {
            LoginProcedure {
                path: "/user/login".to_string(),
                locators,
                landing: BTreeMap::from([(Role::Admin, "/admin/dashboard".to_string())]),
            }
        }

        fn settings() -> Arc<PageSettings> {
            Arc::new(
                PageSettings::default()
                    .with_base_url(Url::parse("https://lms.example.com/").unwrap())
                    .with_timeouts(
                        Timeouts::default()
                            .with_expect(Duration::from_millis(100))
                            .with_action(Duration::from_millis(100))
                            .with_navigation(Duration::from_millis(200))
                            .with_poll_interval(Duration::from_millis(10)),
                    ),
            )
        }

        #[tokio::test]
        async fn test_establish_and_close() {
            let browser = MockBrowser::new(site());
            let ledger = SessionLedger::new();
            let session = Session::establish(
                &browser,
                &ledger,
                Role::Admin,
                &Credentials::new("admin@example.com", "pw"),
                settings(),
                &procedure(),
            )
            .await
            .unwrap();
            assert!(session.page().url_contains("/admin/dashboard"));
            assert!(ledger.is_active(Role::Admin));
            let second = Session::establish(
                &browser,
                &ledger,
                Role::Admin,
                &Credentials::new("admin@example.com", "pw"),
                settings(),
                &procedure(),
            )
            .await;
            assert!(matches!(second, Err(PageKitError::InvalidState { .. })));
            session.close().await.unwrap();
            assert!(session.is_closed());
            drop(session);
            assert!(!ledger.is_active(Role::Admin));
        }

        #[tokio::test]
        async fn test_wrong_password_never_lands() {
            let browser = MockBrowser::new(site());
            let ledger = SessionLedger::new();
            let err = Session::establish(
                &browser,
                &ledger,
                Role::Admin,
                &Credentials::new("admin@example.com", "wrong"),
                settings(),
                &procedure(),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, PageKitError::AuthenticationFailed { .. }));
            assert!(!ledger.is_active(Role::Admin));
        }
    }
}
