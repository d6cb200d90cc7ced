//! Main navigation bar and sidebar every student page carries.

use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};

/// Top navigation plus the sidebar shortcuts
#[derive(Debug, Clone)]
pub struct StudentNavigation {
    page: Page,
    /// "My Classroom"
    pub my_classroom_link: Locator,
    /// "Courses"; the footer repeats it, the bar comes first
    pub courses_link: Locator,
    /// "Learning Paths"
    pub learning_paths_link: Locator,
    /// "Skill Assessments" / "Skills Assessments"
    pub skills_assessments_link: Locator,
    /// "Leaderboard"
    pub leaderboard_link: Locator,
    /// Sidebar "Webinars"
    pub sidebar_webinars: Locator,
    /// Sidebar "Newsletter" (new tab)
    pub sidebar_newsletter: Locator,
    /// Sidebar "Live Course Calendar" (new tab)
    pub sidebar_live_course_calendar: Locator,
    /// Sidebar "My Live Schedule" (modal)
    pub sidebar_my_live_schedule: Locator,
    /// Sidebar "Contact Support" (modal)
    pub sidebar_contact_support: Locator,
    /// Sidebar "Send Ideas" (new tab)
    pub sidebar_send_ideas: Locator,
}

impl StudentNavigation {
    /// Navigation over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let link = |name: &str| page.get_by_role(AriaRole::Link).named(name);
        Self {
            page: page.clone(),
            my_classroom_link: link("My Classroom"),
            courses_link: link("Courses").first(),
            learning_paths_link: link("Learning Paths").first(),
            skills_assessments_link: page
                .get_by_role(AriaRole::Link)
                .named(TextMatch::regex_ci(r"skills?\s*assessments"))
                .first(),
            leaderboard_link: link("Leaderboard"),
            sidebar_webinars: link("Webinars").first(),
            sidebar_newsletter: link("Newsletter").first(),
            sidebar_live_course_calendar: link("Live Course Calendar").first(),
            sidebar_my_live_schedule: link("My Live Schedule")
                .or(&page.get_by_label("Live Schedule")),
            sidebar_contact_support: link("Contact Support").first(),
            sidebar_send_ideas: link("Send Ideas").first(),
        }
    }

    /// Page the bar belongs to
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    async fn follow(&self, link: &Locator, readiness: LoadState) -> PageKitResult<()> {
        link.click().await?;
        self.page.wait_for_load_state(readiness).await
    }

    /// Open My Classroom
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_to_my_classroom(&self) -> PageKitResult<()> {
        self.follow(&self.my_classroom_link, LoadState::Load).await
    }

    /// Open the course catalogue
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_to_courses(&self) -> PageKitResult<()> {
        self.follow(&self.courses_link, LoadState::DomContentLoaded)
            .await
    }

    /// Open the learning path catalogue
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_to_learning_paths(&self) -> PageKitResult<()> {
        self.follow(&self.learning_paths_link, LoadState::Load).await
    }

    /// Open the skills assessment catalogue
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_to_skills_assessments(&self) -> PageKitResult<()> {
        self.follow(&self.skills_assessments_link, LoadState::Load)
            .await
    }

    /// Open the leaderboard
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_to_leaderboard(&self) -> PageKitResult<()> {
        self.follow(&self.leaderboard_link, LoadState::Load).await
    }

    /// Open the webinar listing from the sidebar
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn click_webinars(&self) -> PageKitResult<()> {
        self.follow(&self.sidebar_webinars, LoadState::Load).await
    }

    /// Click "My Live Schedule"; the modal opens in place
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_my_live_schedule(&self) -> PageKitResult<()> {
        self.sidebar_my_live_schedule.click().await
    }

    /// Assert the five main links show
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_main_nav_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("main navigation", &self.page)
            .all_visible([
                &self.my_classroom_link,
                &self.courses_link,
                &self.learning_paths_link,
                &self.skills_assessments_link,
                &self.leaderboard_link,
            ])
            .verify()
            .await
    }

    /// Assert the sidebar shortcuts show
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_sidebar_links_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("sidebar", &self.page)
            .all_visible([
                &self.sidebar_webinars,
                &self.sidebar_newsletter,
                &self.sidebar_live_course_calendar,
                &self.sidebar_contact_support,
                &self.sidebar_send_ideas,
            ])
            .verify()
            .await
    }
}
