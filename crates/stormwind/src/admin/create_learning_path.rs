//! Learning path creation form. The suite only inspects it and leaves
//! through "Cancel", so no path is ever created.

use crate::admin::AdminNavigation;
use crate::student::StudentFooter;
use crate::urls;
use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};

/// Substring of the creation form URL
const CREATE_MARKER: &str = "/learning-path/create";

/// `/team/learning-path/create`
#[derive(Debug)]
pub struct AdminCreateLearningPath {
    page: Page,
    /// Admin navigation
    pub navigation: AdminNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// "Back" link
    pub back_link: Locator,
    /// "Creating a new Learning Path" heading
    pub page_title: Locator,
    /// `#btn-save-draft`
    pub save_as_draft_btn: Locator,
    /// "Cancel" link
    pub cancel_btn: Locator,
    /// Publish link
    pub publish_btn: Locator,
    /// `#btn-how-does-it-work`
    pub how_does_it_work_link: Locator,
    /// `#learning-path-title`
    pub title_input: Locator,
    /// `#learning-path-description`
    pub description_textarea: Locator,
    /// Group multiselect toggle
    pub select_groups_dropdown: Locator,
    /// "Learning Path" tab
    pub learning_path_tab: Locator,
    /// "Students" tab
    pub students_tab: Locator,
    /// `input.search-course-term`
    pub course_search_input: Locator,
    /// Hint shown while the path has no course
    pub empty_state_message: Locator,
    /// "N course(s)"
    pub course_count: Locator,
    /// "N hour(s)"
    pub hours_count: Locator,
}

impl AdminCreateLearningPath {
    /// Creation form over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let go_back = |text: &str| {
            page.locator("a.btn-secondary.goback")
                .has_text(TextMatch::exact(text))
        };
        Self {
            page: page.clone(),
            navigation: AdminNavigation::new(page),
            footer: StudentFooter::new(page),
            back_link: go_back("Back"),
            page_title: page
                .get_by_role(AriaRole::Heading)
                .named("Creating a new Learning Path"),
            save_as_draft_btn: page.locator("#btn-save-draft"),
            cancel_btn: go_back("Cancel"),
            publish_btn: page.locator(r#"a.btn-primary.btn-save[data-action="publish"]"#),
            how_does_it_work_link: page.locator("#btn-how-does-it-work"),
            title_input: page.locator("#learning-path-title"),
            description_textarea: page.locator("#learning-path-description"),
            select_groups_dropdown: page.locator("button.multiselect.dropdown-toggle"),
            learning_path_tab: page.locator("a.tab").has_text(TextMatch::exact("Learning Path")),
            students_tab: page.locator("a.tab").has_text(TextMatch::regex("Students")),
            course_search_input: page.locator("input.search-course-term"),
            empty_state_message: page
                .get_by_text("Search for a course to start building your Learning Path."),
            course_count: page.get_by_text(TextMatch::regex(r"\d+ course\(s\)")),
            hours_count: page.get_by_text(TextMatch::regex(r"\d+ hour\(s\)")),
        }
    }

    /// Leave the form without saving
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn click_cancel(&self) -> PageKitResult<()> {
        self.cancel_btn.click().await?;
        self.page.wait_for_load_state(LoadState::Load).await
    }

    /// Whether the page is back on learning path management
    #[must_use]
    pub fn is_on_manage_learning_paths_page(&self) -> bool {
        self.page.url_contains(urls::admin::LEARNING_PATHS_MARKER)
            && !self.page.url_contains(CREATE_MARKER)
    }

    /// Assert the main bar
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_navigation_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_main_nav_visible().await
    }

    /// Assert the admin shortcuts
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_admin_sub_nav_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_admin_sub_nav_visible().await
    }

    /// Assert the heading
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_page_title_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.page_title).await
    }

    /// Assert "Save as Draft", "Cancel" and "Publish"
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_action_buttons_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("learning path actions", &self.page)
            .all_visible([&self.save_as_draft_btn, &self.cancel_btn, &self.publish_btn])
            .verify()
            .await
    }

    /// Assert "How does it work?"
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_how_does_it_work_link_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.how_does_it_work_link).await
    }

    /// Assert title, description and group fields
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_form_fields_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("learning path form", &self.page)
            .all_visible([
                &self.title_input,
                &self.description_textarea,
                &self.select_groups_dropdown,
            ])
            .verify()
            .await
    }

    /// Assert both tabs
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_tabs_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("learning path tabs", &self.page)
            .all_visible([&self.learning_path_tab, &self.students_tab])
            .verify()
            .await
    }

    /// Assert the course search and its empty state
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_course_search_section_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("course search", &self.page)
            .all_visible([&self.course_search_input, &self.empty_state_message])
            .verify()
            .await
    }

    /// Assert the course and hour counters
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_stats_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("learning path stats", &self.page)
            .all_visible([&self.course_count, &self.hours_count])
            .verify()
            .await
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

impl PageObject for AdminCreateLearningPath {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::admin::CREATE_LEARNING_PATH
    }

    fn url_marker(&self) -> &str {
        CREATE_MARKER
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
