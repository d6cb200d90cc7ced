//! Newsletter sign-up on the partner site, opened in a new tab.

use crate::student::{open_in_new_tab, StudentNavigation};
use crate::urls::external;
use pagekit::prelude::*;

/// Newsletter tab
#[derive(Debug, Clone)]
pub struct StudentNewsletter {
    page: Page,
}

impl StudentNewsletter {
    /// Newsletter over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self { page: page.clone() }
    }

    /// Click the sidebar link on the opener and adopt the tab it opens
    ///
    /// # Errors
    ///
    /// [`PageKitError::Timeout`] when no tab opens.
    pub async fn open_from_sidebar(navigation: &StudentNavigation) -> PageKitResult<Self> {
        let tab = open_in_new_tab(navigation.page(), &navigation.sidebar_newsletter).await?;
        Ok(Self::new(&tab))
    }

    /// On the partner host
    #[must_use]
    pub fn is_on_correct_domain(&self) -> bool {
        self.page.url_contains(external::NEWSLETTER_HOST)
    }

    /// On the newsletter page
    #[must_use]
    pub fn is_newsletter_url(&self) -> bool {
        self.page.url_contains("newsletter")
    }

    /// Both URL checks
    #[must_use]
    pub fn verify_newsletter_page_opened(&self) -> bool {
        self.is_on_correct_domain() && self.is_newsletter_url()
    }

    /// Close the tab; the opener stays as it was
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn close_tab(&self) -> PageKitResult<()> {
        self.page.close().await
    }
}

impl PageObject for StudentNewsletter {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        external::NEWSLETTER
    }

    fn url_marker(&self) -> &str {
        external::NEWSLETTER_HOST
    }

    fn load_state(&self) -> LoadState {
        LoadState::DomContentLoaded
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
