//! "Contact Support" dialog opened from the sidebar.

use crate::student::StudentNavigation;
use pagekit::prelude::*;
use pagekit::SectionCheck;

/// Support request dialog
#[derive(Debug)]
pub struct ContactSupportModal {
    page: Page,
    modal: Modal,
    /// "Contact Support" heading
    pub title: Locator,
    /// "Hi, how can we help you?"
    pub subtitle: Locator,
    /// Message box
    pub message_textbox: Locator,
    /// "Request" button
    pub request_button: Locator,
    /// Header close button
    pub close_button: Locator,
}

impl ContactSupportModal {
    /// Dialog on `page`, opened from the sidebar link
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let title = page
            .get_by_role(AriaRole::Heading)
            .named("Contact Support");
        let root = page.get_by_role(AriaRole::Dialog).has(&title);
        let close_button = root.locator("button").first();
        let trigger = StudentNavigation::new(page).sidebar_contact_support;
        Self {
            page: page.clone(),
            modal: Modal::new("contact support", page, root.clone())
                .opened_by(trigger)
                .closed_by(close_button.clone()),
            subtitle: page.get_by_text("Hi, how can we help you?"),
            message_textbox: page
                .get_by_role(AriaRole::Textbox)
                .named("Hi, how can we help you?"),
            request_button: root
                .locator("div")
                .has_text(TextMatch::regex("^Request$"))
                .first(),
            title,
            close_button,
        }
    }

    /// Page the dialog opens on
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    /// Underlying state machine
    #[must_use]
    pub const fn modal(&self) -> &Modal {
        &self.modal
    }

    /// Click the sidebar link and wait for the dialog
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

    /// Type a message
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn fill_message(&self, text: &str) -> PageKitResult<()> {
        self.message_textbox.fill(text).await
    }

    /// Press "Request"
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_request(&self) -> PageKitResult<()> {
        self.request_button.click().await
    }

    /// Type a message and send it
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn submit_support_request(&self, message: &str) -> PageKitResult<()> {
        self.fill_message(message).await?;
        self.click_request().await
    }

    /// Whether the dialog shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_modal_open(&self) -> PageKitResult<bool> {
        self.modal.is_open().await
    }

    /// Assert the dialog and its form
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn verify_modal_opened(&self) -> PageKitResult<()> {
        SectionCheck::new("contact support", &self.page)
            .all_visible([
                self.modal.root(),
                &self.title,
                &self.subtitle,
                &self.message_textbox,
                &self.request_button,
            ])
            .verify()
            .await
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
