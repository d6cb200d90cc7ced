//! Course administration: the course table with its edit and delete actions.

use crate::admin::AdminNavigation;
use crate::urls;
use pagekit::prelude::*;
use pagekit::TextMatch;
use tracing::info;

/// `/admin/courses`
#[derive(Debug)]
pub struct AdminCourses {
    page: Page,
    /// Admin navigation
    pub navigation: AdminNavigation,
    /// "Courses" heading
    pub courses_title: Locator,
    /// "Create Course"
    pub create_course_button: Locator,
    /// `table.courses-table`
    pub courses_table: Locator,
    /// Table search box
    pub search_input: Locator,
    /// Creation dialog
    pub create_modal: Modal,
}

impl AdminCourses {
    /// Course administration over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let create_course_button = page
            .get_by_role(AriaRole::Button)
            .named(TextMatch::regex_ci("create course"));
        let create_root = page
            .get_by_role(AriaRole::Dialog)
            .has(&page.get_by_role(AriaRole::Heading).named("New Course"));
        Self {
            page: page.clone(),
            navigation: AdminNavigation::new(page),
            courses_title: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::exact("Courses")),
            courses_table: page.locator("table.courses-table"),
            search_input: page
                .locator("#main-content")
                .get_by_placeholder(TextMatch::regex_ci("search")),
            create_modal: Modal::new("create course", page, create_root.clone())
                .opened_by(create_course_button.clone())
                .closed_by(create_root.get_by_role(AriaRole::Button).named("Cancel")),
            create_course_button,
        }
    }

    /// Row whose text contains `name`
    #[must_use]
    pub fn course_row(&self, name: &str) -> Locator {
        self.page.locator("table.courses-table tr").has_text(name)
    }

    fn row_button(&self, name: &str, action: &str) -> Locator {
        self.course_row(name)
            .get_by_role(AriaRole::Button)
            .named(TextMatch::regex_ci(action))
    }

    /// Type into the table search
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn search_course(&self, name: &str) -> PageKitResult<()> {
        self.search_input.fill(name).await
    }

    /// Open the creation dialog
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never shows.
    pub async fn click_create_course(&self) -> PageKitResult<()> {
        self.create_modal.open().await
    }

    /// Open the editor of `name`
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn edit_course(&self, name: &str) -> PageKitResult<()> {
        info!(course = name, "editing course");
        self.row_button(name, "edit").click().await?;
        self.page.wait_for_load_state(LoadState::Load).await
    }

    /// Ask to delete `name`; the confirmation stays on the page
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn delete_course(&self, name: &str) -> PageKitResult<()> {
        info!(course = name, "deleting course");
        self.row_button(name, "delete").click().await
    }

    /// Whether the heading shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_courses_page_displayed(&self) -> PageKitResult<bool> {
        self.courses_title.is_visible().await
    }

    /// Assert the heading
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_courses_page_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.courses_title).await
    }
}

impl PageObject for AdminCourses {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::admin::COURSES
    }

    fn url_marker(&self) -> &str {
        urls::admin::COURSES_MARKER
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
