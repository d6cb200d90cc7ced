//! Course page as managers see it: the student view plus "+ Assign Course".

use crate::admin::{AdminNavigation, AssignCourseModal};
use crate::student::StudentFooter;
use crate::urls;
use pagekit::prelude::*;
use pagekit::TextMatch;

/// `/:category/:subcategory/:course`
#[derive(Debug)]
pub struct AdminCourseDetails {
    page: Page,
    /// Admin navigation
    pub navigation: AdminNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// Assign-course modal
    pub assign_course_modal: AssignCourseModal,
    /// `.course-hero`
    pub hero_banner: Locator,
    /// Course title
    pub hero_title: Locator,
    /// Difficulty in the hero
    pub hero_level: Locator,
    /// Duration in the hero
    pub hero_duration: Locator,
    /// "+ Assign Course"
    pub assign_course_button: Locator,
    /// "Overview" heading
    pub overview_heading: Locator,
}

impl AdminCourseDetails {
    /// Course page over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let hero_banner = page.locator(".course-hero").first();
        let assign_course_button = page.locator("button.js-assign-course");
        Self {
            page: page.clone(),
            navigation: AdminNavigation::new(page),
            footer: StudentFooter::new(page),
            assign_course_modal: AssignCourseModal::new(page, assign_course_button.clone()),
            hero_title: hero_banner.locator("h1").first(),
            hero_level: hero_banner
                .get_by_text(TextMatch::regex_ci("beginner|intermediate|advanced"))
                .first(),
            hero_duration: hero_banner
                .get_by_text(TextMatch::regex_ci(r"\d+\s*(hour|min)"))
                .first(),
            overview_heading: page.get_by_role(AriaRole::Heading).named("Overview"),
            hero_banner,
            assign_course_button,
        }
    }

    /// Open the PL-300 course the assign flow uses
    ///
    /// # Errors
    ///
    /// Navigation errors.
    pub async fn goto_pl300_course(&self) -> PageKitResult<()> {
        self.page
            .navigate(urls::admin::PL300_COURSE, LoadState::Load)
            .await
    }

    /// Open the assign-course modal
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never shows.
    pub async fn click_assign_course(&self) -> PageKitResult<()> {
        self.assign_course_modal.open().await
    }

    /// Assert the main bar
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_navigation_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_main_nav_visible().await
    }

    /// Assert the course title
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_hero_title_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.hero_title).await
    }

    /// Assert the manager-only button
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_assign_course_button_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.assign_course_button).await
    }

    /// Assert the Overview heading
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_overview_section_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.overview_heading).await
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

impl PageObject for AdminCourseDetails {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::admin::PL300_COURSE
    }

    fn url_marker(&self) -> &str {
        urls::admin::PL300_MARKER
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
