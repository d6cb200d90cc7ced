//! My Classroom, the student landing page.

use crate::student::{StudentFooter, StudentNavigation};
use crate::urls;
use pagekit::prelude::*;
use pagekit::SectionCheck;

/// `/my_classroom`
#[derive(Debug, Clone)]
pub struct StudentMyClassroom {
    page: Page,
    /// Navigation and sidebar
    pub navigation: StudentNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// "Welcome back, ..."
    pub welcome_message: Locator,
    /// Courses tab
    pub courses_tab: Locator,
    /// Learning Paths tab
    pub learning_paths_tab: Locator,
    /// Skills Assessment tab
    pub skills_assessment_tab: Locator,
    /// `.courses-list`
    pub courses_list: Locator,
    /// `.course-card`
    pub course_cards: Locator,
}

impl StudentMyClassroom {
    /// Classroom over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let tab = |name: &str| page.get_by_role(AriaRole::Tab).named(name);
        Self {
            page: page.clone(),
            navigation: StudentNavigation::new(page),
            footer: StudentFooter::new(page),
            welcome_message: page.get_by_text(TextMatch::regex("Welcome back,")),
            courses_tab: tab("Courses"),
            learning_paths_tab: tab("Learning Paths"),
            skills_assessment_tab: tab("Skills Assessment"),
            courses_list: page.locator(".courses-list"),
            course_cards: page.locator(".course-card"),
        }
    }

    /// Reach the classroom through the navigation bar
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_from_nav(&self) -> PageKitResult<()> {
        self.navigation.navigate_to_my_classroom().await
    }

    /// Switch to the Courses tab
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_courses_tab(&self) -> PageKitResult<()> {
        self.courses_tab.click().await
    }

    /// Switch to the Learning Paths tab
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_learning_paths_tab(&self) -> PageKitResult<()> {
        self.learning_paths_tab.click().await
    }

    /// Switch to the Skills Assessment tab
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_skills_assessment_tab(&self) -> PageKitResult<()> {
        self.skills_assessment_tab.click().await
    }

    /// Number of course cards
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn courses_count(&self) -> PageKitResult<usize> {
        self.course_cards.count().await
    }

    /// Card of `course`
    #[must_use]
    pub fn course_card(&self, course: &str) -> Locator {
        self.course_cards.has_text(course)
    }

    /// Press Enroll on the card of `course`
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn enroll_in_course(&self, course: &str) -> PageKitResult<()> {
        self.course_card(course)
            .get_by_role(AriaRole::Button)
            .named(TextMatch::regex_ci("enroll"))
            .click()
            .await
    }

    /// Assert the greeting
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_welcome_message_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.welcome_message).await
    }

    /// Assert the three content tabs
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_tabs_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("classroom tabs", &self.page)
            .all_visible([
                &self.courses_tab,
                &self.learning_paths_tab,
                &self.skills_assessment_tab,
            ])
            .verify()
            .await
    }

    /// Assert the sidebar shortcuts
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_sidebar_links_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_sidebar_links_visible().await
    }

    /// Assert every footer link
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_all_footer_links_visible(&self) -> PageKitResult<()> {
        self.footer.expect_all_footer_links_visible().await
    }
}

impl PageObject for StudentMyClassroom {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::student::MY_CLASSROOM
    }

    fn url_marker(&self) -> &str {
        urls::student::MY_CLASSROOM_MARKER
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
