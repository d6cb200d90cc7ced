//! "Assign Course" modal managers open from a course page.
//!
//! Each student row carries a checkbox and a due-date field. Setting a date
//! for a student who already has one raises a warning; submitting a student
//! whose license does not cover the course raises an error.

use pagekit::prelude::*;
use pagekit::SectionCheck;
use std::time::Duration;
use tracing::debug;

/// Pause after searching or submitting while the list re-renders, capped at
/// a tenth of the expect timeout
const RESULTS_SETTLE: Duration = Duration::from_millis(500);

/// Due date in the format the date inputs take
#[must_use]
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// The modal and its per-student controls
#[derive(Debug)]
pub struct AssignCourseModal {
    page: Page,
    settle: Duration,
    modal: Modal,
    /// `#assign-course-modal`
    pub root: Locator,
    /// "Assign Course" heading
    pub title: Locator,
    /// Close button
    pub close_button: Locator,
    /// Student search
    pub search_input: Locator,
    /// Existing due date warning
    pub warning_message: Locator,
    /// License error
    pub error_message: Locator,
    /// Submit button
    pub assign_course_button: Locator,
}

impl AssignCourseModal {
    /// Modal opened by `trigger` on `page`
    #[must_use]
    pub fn new(page: &Page, trigger: Locator) -> Self {
        let root = page.locator("#assign-course-modal");
        let close_button = root.locator("button.close");
        Self {
            page: page.clone(),
            settle: RESULTS_SETTLE.min(page.timeouts().expect / 10),
            modal: Modal::new("assign course", page, root.clone())
                .opened_by(trigger)
                .closed_by(close_button.clone()),
            title: root.get_by_role(AriaRole::Heading).named("Assign Course"),
            search_input: root
                .locator(r#"input[type="search"], input[type="text"]"#)
                .first(),
            warning_message: page.locator("#discover-assign-already-exist"),
            error_message: page.locator("#discover-add-course-message-invalid"),
            assign_course_button: root.locator("button.add-assign-course"),
            close_button,
            root,
        }
    }

    /// Underlying state machine
    #[must_use]
    pub const fn modal(&self) -> &Modal {
        &self.modal
    }

    /// Row of `student`
    #[must_use]
    pub fn student_row(&self, student: &str) -> Locator {
        self.root
            .locator(".student-assign-container")
            .has_text(student)
    }

    /// Checkbox of `student`
    #[must_use]
    pub fn student_checkbox(&self, student: &str) -> Locator {
        self.student_row(student).locator(r#"input[type="checkbox"]"#)
    }

    /// Due-date input of `student`
    #[must_use]
    pub fn student_date_input(&self, student: &str) -> Locator {
        self.student_row(student).locator(r#"input[type="date"]"#)
    }

    /// Open through the course page's button
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never shows.
    pub async fn open(&self) -> PageKitResult<()> {
        self.modal.open().await
    }

    /// Close through the header button
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never hides.
    pub async fn close(&self) -> PageKitResult<()> {
        self.modal.close().await
    }

    /// Whether the modal shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_open(&self) -> PageKitResult<bool> {
        self.modal.is_open().await
    }

    /// Filter the student list
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn search_students(&self, term: &str) -> PageKitResult<()> {
        debug!(term, "searching students");
        self.search_input.fill(term).await?;
        self.page.wait_for_timeout(self.settle).await;
        Ok(())
    }

    /// Tick `student`
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn select_student(&self, student: &str) -> PageKitResult<()> {
        self.student_checkbox(student).check().await
    }

    /// Untick `student`
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn deselect_student(&self, student: &str) -> PageKitResult<()> {
        self.student_checkbox(student).uncheck().await
    }

    /// Set the due date of `student` (`YYYY-MM-DD`)
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn set_student_due_date(&self, student: &str, date: &str) -> PageKitResult<()> {
        self.student_date_input(student).fill(date).await
    }

    /// Set the due date of `student` to today
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn set_student_due_date_to_today(&self, student: &str) -> PageKitResult<()> {
        self.set_student_due_date(student, &today()).await
    }

    /// Empty the due date of `student`
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn clear_student_due_date(&self, student: &str) -> PageKitResult<()> {
        self.student_date_input(student).clear().await
    }

    /// Submit the selection
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_assign_course(&self) -> PageKitResult<()> {
        self.assign_course_button.click().await?;
        self.page.wait_for_timeout(self.settle).await;
        Ok(())
    }

    /// Whether the due date warning shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_warning_message_visible(&self) -> PageKitResult<bool> {
        self.warning_message.is_visible().await
    }

    /// Whether the license error shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_error_message_visible(&self) -> PageKitResult<bool> {
        self.error_message.is_visible().await
    }

    /// Warning text
    ///
    /// # Errors
    ///
    /// [`PageKitError::LocatorNotFound`] when it is absent.
    pub async fn warning_message_text(&self) -> PageKitResult<String> {
        self.warning_message.text_content().await
    }

    /// Error text
    ///
    /// # Errors
    ///
    /// [`PageKitError::LocatorNotFound`] when it is absent.
    pub async fn error_message_text(&self) -> PageKitResult<String> {
        self.error_message.text_content().await
    }

    /// Assert the root and its title
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_modal_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("assign course modal", &self.page)
            .all_visible([&self.root, &self.title])
            .verify()
            .await
    }

    /// Assert the warning shows, naming `student`
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] otherwise.
    pub async fn expect_warning_message_visible(&self, student: &str) -> PageKitResult<()> {
        self.page.assert_visible(&self.warning_message).await?;
        self.page
            .assert_text_contains(&self.warning_message, student)
            .await
    }

    /// Assert the warning is gone
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] otherwise.
    pub async fn expect_warning_message_hidden(&self) -> PageKitResult<()> {
        self.page.assert_hidden(&self.warning_message).await
    }

    /// Assert the license error shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] otherwise.
    pub async fn expect_error_message_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.error_message).await
    }

    /// Assert the license error is gone
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] otherwise.
    pub async fn expect_error_message_hidden(&self) -> PageKitResult<()> {
        self.page.assert_hidden(&self.error_message).await
    }

    /// Assert a row for `student` shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] otherwise.
    pub async fn expect_student_visible(&self, student: &str) -> PageKitResult<()> {
        self.page.assert_visible(&self.student_row(student)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_today_is_iso_date() {
        let date = today();
        assert_eq!(date.len(), 10);
        assert_eq!(date.as_bytes()[4], b'-');
        assert_eq!(date.as_bytes()[7], b'-');
        assert!(chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok());
    }
}
