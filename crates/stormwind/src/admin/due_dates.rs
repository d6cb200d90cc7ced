//! Due date report: completion gauges, the assign-due-date dialog and the
//! table of every due date in the team.

use crate::admin::AdminNavigation;
use crate::student::StudentFooter;
use crate::urls;
use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};
use tracing::info;

/// Table columns, in order
pub const COLUMN_HEADERS: [&str; 5] = [
    "Course",
    "Due Date",
    "Students Assigned",
    "Students Completed",
    "Percentage Completed",
];

/// `/team/:team/due-date/:company`
#[derive(Debug)]
pub struct AdminDueDates {
    page: Page,
    /// Admin navigation
    pub navigation: AdminNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// "Due Dates" heading
    pub page_title: Locator,
    /// "Total due dates"
    pub total_due_dates_label: Locator,
    /// Gauge caption "Completed"
    pub completed_label: Locator,
    /// Gauge caption "In Progress"
    pub in_progress_label: Locator,
    /// Gauge caption "Overdue"
    pub overdue_label: Locator,
    /// `#manager-course-search`
    pub search_course_input: Locator,
    /// `#btn-create-duedate`
    pub assign_due_date_btn: Locator,
    /// "All Due Dates" heading
    pub all_due_dates_heading: Locator,
    /// Search box above the table
    pub search_course_or_student_input: Locator,
    /// One header per [`COLUMN_HEADERS`] entry
    pub column_headers: Vec<Locator>,
    /// The due date table
    pub due_dates_table: Locator,
    /// Dialog the assign button opens
    pub assign_modal: Modal,
}

impl AdminDueDates {
    /// Due date report over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let gauge = |caption: &str| {
            page.locator(".progress-gauge__percentage-complete span.font-size-sm")
                .has_text(TextMatch::exact(caption))
                .first()
        };
        let assign_due_date_btn = page.locator("#btn-create-duedate");
        let assign_root = page.locator("#assign-due-date-modal");
        Self {
            page: page.clone(),
            navigation: AdminNavigation::new(page),
            footer: StudentFooter::new(page),
            page_title: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::exact("Due Dates")),
            total_due_dates_label: page.get_by_text("Total due dates"),
            completed_label: gauge("Completed"),
            in_progress_label: gauge("In Progress"),
            overdue_label: gauge("Overdue"),
            search_course_input: page.locator("#manager-course-search"),
            all_due_dates_heading: page.get_by_role(AriaRole::Heading).named("All Due Dates"),
            search_course_or_student_input: page.locator("#manager-due-date-div input.search-term"),
            column_headers: COLUMN_HEADERS
                .iter()
                .map(|name| {
                    page.get_by_role(AriaRole::Columnheader)
                        .named(TextMatch::exact(*name))
                })
                .collect(),
            due_dates_table: page.locator("table").first(),
            assign_modal: Modal::new("assign due date", page, assign_root.clone())
                .opened_by(assign_due_date_btn.clone())
                .closed_by(assign_root.locator("button.close")),
            assign_due_date_btn,
        }
    }

    /// Table row whose text contains `text`
    #[must_use]
    pub fn due_date_row(&self, text: &str) -> Locator {
        self.page
            .locator("#manager-due-date-div tbody tr")
            .has_text(text)
    }

    /// Open the assign-due-date dialog
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never shows.
    pub async fn click_assign_due_date(&self) -> PageKitResult<()> {
        self.assign_modal.open().await
    }

    /// Type into the course search of the summary
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn search_course(&self, text: &str) -> PageKitResult<()> {
        self.search_course_input.fill(text).await
    }

    /// Filter the table by course or student
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn search_course_or_student(&self, text: &str) -> PageKitResult<()> {
        info!(filter = text, "filtering due dates");
        self.search_course_or_student_input.fill(text).await
    }

    /// Whether the heading shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_due_dates_page_displayed(&self) -> PageKitResult<bool> {
        self.page_title.is_visible().await
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

    /// Assert the gauges, the course search and the assign button
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_summary_section_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("due date summary", &self.page)
            .all_visible([
                &self.total_due_dates_label,
                &self.completed_label,
                &self.in_progress_label,
                &self.overdue_label,
                &self.search_course_input,
                &self.assign_due_date_btn,
            ])
            .verify()
            .await
    }

    /// Assert the table section and its columns
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_all_due_dates_section_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("all due dates", &self.page)
            .all_visible([
                &self.all_due_dates_heading,
                &self.search_course_or_student_input,
                &self.due_dates_table,
            ])
            .all_visible(&self.column_headers)
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

    /// Assert the whole page, top to bottom
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_due_dates_page_complete(&self) -> PageKitResult<()> {
        self.expect_navigation_visible().await?;
        self.expect_admin_sub_nav_visible().await?;
        self.expect_page_title_visible().await?;
        self.expect_summary_section_visible().await?;
        self.expect_all_due_dates_section_visible().await?;
        self.expect_all_footer_links_visible().await
    }
}

impl PageObject for AdminDueDates {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::admin::DUE_DATES
    }

    fn url_marker(&self) -> &str {
        urls::admin::DUE_DATES_MARKER
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_distinct() {
        let mut sorted = COLUMN_HEADERS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), COLUMN_HEADERS.len());
    }
}
