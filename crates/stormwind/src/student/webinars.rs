//! Upcoming webinars.

use crate::student::{StudentFooter, StudentNavigation};
use crate::urls;
use pagekit::prelude::*;
use pagekit::SectionCheck;

/// `/webinar`
#[derive(Debug, Clone)]
pub struct StudentWebinars {
    page: Page,
    /// Navigation and sidebar
    pub navigation: StudentNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// Page title
    pub page_title: Locator,
    /// Search box
    pub search_input: Locator,
    /// Cards with artwork
    pub webinar_cards: Locator,
}

impl StudentWebinars {
    /// Listing over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            navigation: StudentNavigation::new(page),
            footer: StudentFooter::new(page),
            page_title: page
                .get_by_text(TextMatch::regex_ci("Explore upcoming Stormwind webinars"))
                .first(),
            search_input: page.get_by_placeholder("Search for a webinar"),
            webinar_cards: page.locator(".webinar-card").has(&page.locator("img")),
        }
    }

    /// Reach the listing from the sidebar
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_from_sidebar(&self) -> PageKitResult<()> {
        self.navigation.click_webinars().await
    }

    /// Search and wait for the results page
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn search_webinar(&self, term: &str) -> PageKitResult<()> {
        self.search_input.fill(term).await?;
        self.search_input.press("Enter").await?;
        self.page.wait_for_load_state(LoadState::Load).await
    }

    /// Empty the search box
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn clear_search(&self) -> PageKitResult<()> {
        self.search_input.clear().await
    }

    /// Number of cards
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn webinar_cards_count(&self) -> PageKitResult<usize> {
        self.webinar_cards.count().await
    }

    /// Card whose text contains `title`
    #[must_use]
    pub fn webinar_card(&self, title: &str) -> Locator {
        self.webinar_cards.has_text(title)
    }

    /// Title of the first card
    ///
    /// # Errors
    ///
    /// [`PageKitError::LocatorNotFound`] when there are no cards.
    pub async fn first_webinar_title(&self) -> PageKitResult<String> {
        self.webinar_cards
            .first()
            .locator("h3, h4, .title")
            .first()
            .text_content()
            .await
    }

    /// Assert the title and search box
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_page_loaded(&self) -> PageKitResult<()> {
        SectionCheck::new("webinars", &self.page)
            .all_visible([&self.page_title, &self.search_input])
            .verify()
            .await
    }

    /// Assert at least one card shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when none does.
    pub async fn expect_webinar_cards_visible(&self) -> PageKitResult<()> {
        self.page
            .assert_count_at_least(&self.webinar_cards, 1)
            .await
    }
}

impl PageObject for StudentWebinars {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::student::WEBINARS
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
