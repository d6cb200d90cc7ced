//! Offline replica of the Stormwind LMS for the in-memory engine.
//!
//! Serves the pages the suite visits, with the markup its locators expect:
//! the two-step login, the admin reporting and management screens, the
//! student catalogue pages, and the partner newsletter and feedback board
//! on their own hosts. Server-side state (learning path status, enrolments)
//! lives in the site's store, so it survives reloads the way the real
//! backend's data does.
//!
//! ```no_run
//! # async fn demo() -> pagekit::PageKitResult<()> {
//! use pagekit::prelude::*;
//!
//! let browser = stormwind::replica::browser();
//! let page = stormwind::replica::open_page(&browser).await?;
//! page.goto("/user/login").await?;
//! # Ok(())
//! # }
//! ```

mod admin;
mod auth;
pub mod chrome;
mod external;
mod student;

use crate::urls;
use pagekit::mock::{MockBrowser, MockSite};
use pagekit::prelude::*;
use pagekit::{PageSettings, Timeouts};
use std::time::Duration;
use url::Url;

/// Manager account
pub const ADMIN_EMAIL: &str = "santiago.manager@stormwind.test";
/// Manager password
pub const ADMIN_PASSWORD: &str = "manager-pass";
/// Student account
pub const STUDENT_EMAIL: &str = "maria.lopez@stormwind.test";
/// Student password
pub const STUDENT_PASSWORD: &str = "student-pass";

/// Origin the replica answers on
pub const BASE_URL: &str = "https://test-spectre.pantheonsite.io/";

/// Store list of published learning paths
pub const ACTIVE_PATHS: &str = "active_paths";
/// Store list of archived learning paths
pub const ARCHIVED_PATHS: &str = "archived_paths";
/// Store list of courses the student enrolled in
pub const ENROLLED_COURSES: &str = "enrolled_courses";

/// Credentials of both replica accounts
#[must_use]
pub fn credentials() -> CredentialStore {
    CredentialStore::new()
        .with(Role::Admin, Credentials::new(ADMIN_EMAIL, ADMIN_PASSWORD))
        .with(Role::Student, Credentials::new(STUDENT_EMAIL, STUDENT_PASSWORD))
}

/// The whole site, freshly seeded
#[must_use]
pub fn site() -> MockSite {
    let site = external::routes(MockSite::new());
    let site = auth::routes(site);
    let site = admin::routes(site);
    let site = student::routes(site);
    chrome::install(site)
        .account(ADMIN_EMAIL, ADMIN_PASSWORD, urls::admin::DASHBOARD)
        .account(STUDENT_EMAIL, STUDENT_PASSWORD, urls::student::MY_CLASSROOM)
        .login_path(urls::LOGIN)
        .seed_list(
            ACTIVE_PATHS,
            &["Mobile Manager Active LP", "Mobile Manager Archived LP"],
        )
        .seed_list(ARCHIVED_PATHS, &[])
}

/// Browser over a fresh replica
#[must_use]
pub fn browser() -> MockBrowser {
    MockBrowser::new(site())
}

/// Page settings tuned for the replica: short waits, fast polling
#[must_use]
pub fn settings() -> PageSettings {
    let settings = PageSettings::default().with_timeouts(
        Timeouts::default()
            .with_expect(Duration::from_millis(400))
            .with_action(Duration::from_millis(400))
            .with_navigation(Duration::from_secs(2))
            .with_poll_interval(Duration::from_millis(10)),
    );
    match Url::parse(BASE_URL) {
        Ok(base) => settings.with_base_url(base),
        Err(_) => settings,
    }
}

/// Blank page in a new context of `browser`
///
/// # Errors
///
/// Engine errors.
pub async fn open_page(browser: &dyn BrowserDriver) -> PageKitResult<Page> {
    let context = browser.new_context().await?;
    Ok(Page::new(context.new_page().await?, settings()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) async fn blank_page() -> (MockBrowser, Page) {
    let browser = browser();
    let page = open_page(&browser).await.unwrap();
    (browser, page)
}

/// Signed-in page for `role`, landed on its home screen
#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) async fn signed_in_page(role: Role) -> (MockBrowser, Page) {
    let (browser, page) = blank_page().await;
    let credentials = credentials();
    let form = pagekit::LoginForm::new(&page, crate::login::login_locators(&page));
    page.goto(urls::LOGIN).await.unwrap();
    form.login(role, credentials.get(role).unwrap()).await.unwrap();
    (browser, page)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accounts_land_on_role_home() {
        let site = site();
        let landings: Vec<_> = site
            .accounts()
            .iter()
            .map(|a| (a.email.as_str(), a.landing.as_str()))
            .collect();
        assert_eq!(
            landings,
            [
                (ADMIN_EMAIL, urls::admin::DASHBOARD),
                (STUDENT_EMAIL, urls::student::MY_CLASSROOM)
            ]
        );
    }

    #[test]
    fn test_store_is_seeded() {
        let site = site();
        let store = site.store().unwrap();
        assert_eq!(store.list(ACTIVE_PATHS).len(), 2);
        assert!(store.list(ARCHIVED_PATHS).is_empty());
    }

    #[test]
    fn test_protected_pages_redirect_to_login() {
        let site = site();
        let url = Url::parse(BASE_URL).unwrap().join(urls::admin::DASHBOARD).unwrap();
        let rendered = site.render(&url, None).unwrap();
        assert_eq!(rendered.url.path(), urls::LOGIN);
    }

    #[tokio::test]
    async fn test_student_sign_in_lands_on_classroom() {
        let (_browser, page) = signed_in_page(Role::Student).await;
        assert!(page.url_contains(urls::student::MY_CLASSROOM_MARKER));
    }

    #[tokio::test]
    async fn test_admin_sign_in_lands_on_reporting() {
        let (_browser, page) = signed_in_page(Role::Admin).await;
        assert!(page.url_contains(urls::admin::DASHBOARD_MARKER));
    }
}
