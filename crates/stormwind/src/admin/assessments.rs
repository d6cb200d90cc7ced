//! Assessment administration.

use crate::admin::AdminNavigation;
use crate::urls;
use pagekit::prelude::*;
use pagekit::TextMatch;

/// `/admin/assessments`
#[derive(Debug)]
pub struct AdminAssessments {
    page: Page,
    /// Admin navigation
    pub navigation: AdminNavigation,
    /// Heading mentioning assessments
    pub assessments_title: Locator,
    /// "Create Assessment"
    pub create_assessment_button: Locator,
    /// `table.assessments-table`
    pub assessments_table: Locator,
    /// Table search box; the navigation carries its own course search
    pub search_input: Locator,
    /// Creation dialog
    pub create_modal: Modal,
}

impl AdminAssessments {
    /// Assessments page over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let create_assessment_button = page
            .get_by_role(AriaRole::Button)
            .named(TextMatch::regex_ci("create assessment"));
        let create_root = page
            .get_by_role(AriaRole::Dialog)
            .has(&page.get_by_role(AriaRole::Heading).named("New Assessment"));
        Self {
            page: page.clone(),
            navigation: AdminNavigation::new(page),
            assessments_title: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::regex_ci("assessments")),
            assessments_table: page.locator("table.assessments-table"),
            search_input: page
                .locator(".assessments-filter")
                .get_by_placeholder(TextMatch::regex_ci("search")),
            create_modal: Modal::new("create assessment", page, create_root.clone())
                .opened_by(create_assessment_button.clone())
                .closed_by(create_root.get_by_role(AriaRole::Button).named("Cancel")),
            create_assessment_button,
        }
    }

    /// Row whose text contains `name`
    #[must_use]
    pub fn assessment_row(&self, name: &str) -> Locator {
        self.page.locator("tr").has_text(name)
    }

    /// Type into the table search
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn search_assessment(&self, name: &str) -> PageKitResult<()> {
        self.search_input.fill(name).await
    }

    /// Open the details of `name`
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn view_assessment(&self, name: &str) -> PageKitResult<()> {
        self.assessment_row(name)
            .get_by_role(AriaRole::Button)
            .named(TextMatch::regex_ci("view"))
            .click()
            .await?;
        self.page.wait_for_load_state(LoadState::Load).await
    }

    /// Whether the heading shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_assessments_page_displayed(&self) -> PageKitResult<bool> {
        self.assessments_title.is_visible().await
    }

    /// Assert the heading
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_assessments_page_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.assessments_title).await
    }
}

impl PageObject for AdminAssessments {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::admin::ASSESSMENTS
    }

    fn url_marker(&self) -> &str {
        urls::admin::ASSESSMENTS_MARKER
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
