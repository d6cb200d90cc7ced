//! "My Live Schedule" dialog.

use crate::student::StudentNavigation;
use pagekit::prelude::*;

/// Upcoming live sessions of the signed-in student
#[derive(Debug)]
pub struct LiveScheduleModal {
    page: Page,
    modal: Modal,
    /// "Live Schedule" heading
    pub title: Locator,
    /// Empty-state message
    pub no_sessions_message: Locator,
    /// Close button
    pub close_button: Locator,
}

impl LiveScheduleModal {
    /// Dialog on `page`, opened from the sidebar link
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let title = page.get_by_role(AriaRole::Heading).named("Live Schedule");
        let root = page.get_by_role(AriaRole::Dialog).has(&title);
        let close_button = root.locator("button").first();
        let trigger = StudentNavigation::new(page).sidebar_my_live_schedule;
        Self {
            page: page.clone(),
            modal: Modal::new("live schedule", page, root)
                .opened_by(trigger)
                .closed_by(close_button.clone()),
            no_sessions_message: page.get_by_text("You have no upcoming live sessions scheduled."),
            title,
            close_button,
        }
    }

    /// Underlying state machine
    #[must_use]
    pub const fn modal(&self) -> &Modal {
        &self.modal
    }

    /// Click "My Live Schedule" and wait for the dialog
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never shows.
    pub async fn open_modal(&self) -> PageKitResult<()> {
        self.modal.open().await
    }

    /// Close and wait for the dialog to go
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never hides.
    pub async fn close_modal(&self) -> PageKitResult<()> {
        self.modal.close().await
    }

    /// Whether the dialog shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_modal_open(&self) -> PageKitResult<bool> {
        self.modal.is_open().await
    }

    /// The dialog opens in place over the classroom
    #[must_use]
    pub fn is_on_my_classroom_url(&self) -> bool {
        self.page
            .url_contains(crate::urls::student::MY_CLASSROOM_MARKER)
    }

    /// Assert the dialog and its title
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] for the first missing part.
    pub async fn verify_modal_opened(&self) -> PageKitResult<()> {
        self.page.assert_visible(self.modal.root()).await?;
        self.page.assert_visible(&self.title).await
    }

    /// Assert the empty state
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_no_sessions_message_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.no_sessions_message).await
    }

    /// Assert the dialog is gone
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] otherwise.
    pub async fn expect_modal_closed(&self) -> PageKitResult<()> {
        self.page.assert_hidden(self.modal.root()).await
    }
}
