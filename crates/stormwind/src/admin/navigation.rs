//! Admin navigation: the student bar plus the admin link, course search and
//! the `#admin-shortcuts` sub-navigation.

use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};

/// Navigation shown to team managers
#[derive(Debug, Clone)]
pub struct AdminNavigation {
    page: Page,
    /// Brand logo
    pub logo: Locator,
    /// "My Classroom"
    pub my_classroom_link: Locator,
    /// "Courses"
    pub courses_link: Locator,
    /// "Learning Paths"
    pub learning_paths_link: Locator,
    /// "Skills Assessments"
    pub skills_assessments_link: Locator,
    /// "Leaderboard"
    pub leaderboard_link: Locator,
    /// Link into the admin area
    pub admin_link: Locator,
    /// Course search box
    pub search_input: Locator,
    /// `#admin-shortcuts`
    pub admin_sub_nav: Locator,
    /// Sub-nav: Dashboard
    pub dashboard_tab: Locator,
    /// Sub-nav: Skills Assessments Data
    pub skills_assessments_data_tab: Locator,
    /// Sub-nav: Due Dates
    pub due_dates_tab: Locator,
    /// Sub-nav: Add Users
    pub add_users_tab: Locator,
    /// Sub-nav: Manage Learning Paths
    pub manage_learning_paths_tab: Locator,
}

impl AdminNavigation {
    /// Navigation over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let link = |name: &str| page.get_by_role(AriaRole::Link).named(name);
        let admin_sub_nav = page.locator("#admin-shortcuts");
        let tab = |text: &str| admin_sub_nav.locator("a").has_text(text);
        Self {
            page: page.clone(),
            logo: page.locator(".navbar-brand, .logo").first(),
            my_classroom_link: link("My Classroom"),
            courses_link: link("Courses").first(),
            learning_paths_link: link("Learning Paths").first(),
            skills_assessments_link: page
                .get_by_role(AriaRole::Link)
                .named(TextMatch::regex_ci(r"skills?\s*assessments"))
                .first(),
            leaderboard_link: link("Leaderboard"),
            admin_link: page.locator("li.main-menu-admin-link a.nav-link"),
            search_input: page.get_by_placeholder("Search for a course"),
            dashboard_tab: tab("Dashboard"),
            skills_assessments_data_tab: tab("Skills Assessments Data"),
            due_dates_tab: tab("Due Dates"),
            add_users_tab: tab("Add Users"),
            manage_learning_paths_tab: tab("Manage Learning Paths"),
            admin_sub_nav,
        }
    }

    async fn follow(&self, link: &Locator) -> PageKitResult<()> {
        link.click().await?;
        self.page.wait_for_load_state(LoadState::Load).await
    }

    /// Enter the admin area
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_to_admin(&self) -> PageKitResult<()> {
        self.follow(&self.admin_link).await
    }

    /// Open the reporting dashboard from the sub-nav
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_to_dashboard(&self) -> PageKitResult<()> {
        self.follow(&self.dashboard_tab).await
    }

    /// Open learning path management from the sub-nav
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_to_manage_learning_paths(&self) -> PageKitResult<()> {
        self.follow(&self.manage_learning_paths_tab).await
    }

    /// Search the course catalogue
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn search_course(&self, term: &str) -> PageKitResult<()> {
        self.search_input.fill(term).await?;
        self.search_input.press("Enter").await?;
        self.page.wait_for_load_state(LoadState::Load).await
    }

    /// Assert the main bar, including the admin link
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_main_nav_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("admin navigation", &self.page)
            .all_visible([
                &self.my_classroom_link,
                &self.courses_link,
                &self.learning_paths_link,
                &self.skills_assessments_link,
                &self.leaderboard_link,
                &self.admin_link,
            ])
            .verify()
            .await
    }

    /// Assert the five sub-nav shortcuts
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_admin_sub_nav_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("admin sub-navigation", &self.page)
            .all_visible([
                &self.dashboard_tab,
                &self.skills_assessments_data_tab,
                &self.due_dates_tab,
                &self.add_users_tab,
                &self.manage_learning_paths_tab,
            ])
            .verify()
            .await
    }

    /// Main bar and sub-nav
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_all_navigation_visible(&self) -> PageKitResult<()> {
        self.expect_main_nav_visible().await?;
        self.expect_admin_sub_nav_visible().await
    }
}
