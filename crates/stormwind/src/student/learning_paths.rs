//! Learning path catalogue: filters, client-side search and the path preview.

use crate::student::{StudentFooter, StudentNavigation};
use crate::urls;
use pagekit::prelude::*;
use pagekit::SectionCheck;

/// Preview shown when a learning path card is clicked
#[derive(Debug)]
pub struct LearningPathModal {
    page: Page,
    modal: Modal,
    /// Displayed `.learning-path-preview`
    pub root: Locator,
    /// `.modal-title`
    pub title: Locator,
    /// "N courses"
    pub courses_count: Locator,
    /// "N hours"
    pub duration: Locator,
    /// "See Learning Path"
    pub see_learning_path_link: Locator,
    /// "Remove from classroom"
    pub remove_from_classroom_link: Locator,
    /// Close link
    pub close_button: Locator,
}

impl LearningPathModal {
    /// Preview on `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let root = page.locator(".learning-path-preview").visible(true);
        let close_button = root.locator(r#"a[aria-label="Close"][data-dismiss="modal"]"#);
        Self {
            page: page.clone(),
            modal: Modal::new("learning path", page, root.clone()).closed_by(close_button.clone()),
            title: root.locator(".modal-title").first(),
            courses_count: root.locator(r#"[class*="difficulty"]"#).has_text("courses"),
            duration: root.locator(r#"[class*="duration"]"#).has_text("hours"),
            see_learning_path_link: root
                .get_by_role(AriaRole::Link)
                .named("See Learning Path"),
            remove_from_classroom_link: root
                .get_by_role(AriaRole::Link)
                .named(TextMatch::regex_ci("remove from classroom")),
            close_button,
            root,
        }
    }

    /// Underlying state machine
    #[must_use]
    pub const fn modal(&self) -> &Modal {
        &self.modal
    }

    /// Click `toggle` and wait for a preview to show
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when none shows.
    pub async fn open_from(&self, toggle: &Locator) -> PageKitResult<()> {
        let toggle = toggle.clone();
        self.modal
            .open_with(|| async move { toggle.click().await })
            .await
    }

    /// Close with the X link
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never hides.
    pub async fn close(&self) -> PageKitResult<()> {
        self.modal.close().await
    }

    /// Whether a preview shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AmbiguousLocator`] if several show at once.
    pub async fn is_open(&self) -> PageKitResult<bool> {
        self.modal.is_open().await
    }

    /// Title text
    ///
    /// # Errors
    ///
    /// [`PageKitError::LocatorNotFound`] while closed.
    pub async fn title_text(&self) -> PageKitResult<String> {
        self.title.text_content().await
    }

    /// Assert every part of the preview, with `expected_title`
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_all_elements_visible(&self, expected_title: &str) -> PageKitResult<()> {
        SectionCheck::new("learning path preview", &self.page)
            .visible(&self.root)
            .text(&self.title, expected_title)
            .all_visible([
                &self.courses_count,
                &self.duration,
                &self.see_learning_path_link,
                &self.remove_from_classroom_link,
                &self.close_button,
            ])
            .verify()
            .await
    }

    /// Assert no preview shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] otherwise.
    pub async fn expect_hidden(&self) -> PageKitResult<()> {
        self.page.assert_hidden(&self.root).await
    }
}

/// `/learningpaths`
#[derive(Debug)]
pub struct StudentLearningPaths {
    page: Page,
    /// Navigation and sidebar
    pub navigation: StudentNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// Catalogue heading
    pub page_heading: Locator,
    /// Topic multiselect
    pub topic_dropdown: Locator,
    /// `#filter-duration`
    pub path_size_dropdown: Locator,
    /// `input.search-term`
    pub search_input: Locator,
    /// `.learning-path-card--condensed`
    pub learning_path_cards: Locator,
    /// Preview modal
    pub preview: LearningPathModal,
}

impl StudentLearningPaths {
    /// Catalogue over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            navigation: StudentNavigation::new(page),
            footer: StudentFooter::new(page),
            page_heading: page
                .get_by_text("Browse our catalog to find the best Learning Path for you."),
            topic_dropdown: page.locator(r#"button[title="Topic"]"#),
            path_size_dropdown: page.locator("#filter-duration"),
            search_input: page.locator("input.search-term"),
            learning_path_cards: page.locator(".learning-path-card--condensed"),
            preview: LearningPathModal::new(page),
        }
    }

    /// Reach the catalogue through the navigation bar
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_from_nav(&self) -> PageKitResult<()> {
        self.navigation.navigate_to_learning_paths().await
    }

    /// Whether the heading shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_learning_paths_page_displayed(&self) -> PageKitResult<bool> {
        self.page_heading.is_visible().await
    }

    /// Pick `topic` from the Topic multiselect
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn select_topic(&self, topic: &str) -> PageKitResult<()> {
        self.topic_dropdown.click().await?;
        self.page
            .get_by_role(AriaRole::Option)
            .named(TextMatch::exact(topic))
            .click()
            .await
    }

    /// Pick a path size
    ///
    /// # Errors
    ///
    /// [`PageKitError::PageError`] when no option matches.
    pub async fn select_path_size(&self, size: &str) -> PageKitResult<()> {
        self.path_size_dropdown.select_option(size).await
    }

    /// Type into the search box; cards filter as you type
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn search_learning_path(&self, name: &str) -> PageKitResult<()> {
        self.search_input.click().await?;
        self.search_input.fill(name).await
    }

    /// Empty the search box
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn clear_search(&self) -> PageKitResult<()> {
        self.search_input.clear().await
    }

    /// Number of displayed cards
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn visible_paths_count(&self) -> PageKitResult<usize> {
        self.learning_path_cards.visible(true).count().await
    }

    /// Title of the card for `name`
    #[must_use]
    pub fn learning_path_card(&self, name: &str) -> Locator {
        self.page
            .locator(".learning-path-card__title")
            .has_text(name)
    }

    /// Whether the card for `name` shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AmbiguousLocator`] if several cards match.
    pub async fn is_learning_path_card_visible(&self, name: &str) -> PageKitResult<bool> {
        self.learning_path_card(name).is_visible().await
    }

    /// Open the preview of `name`
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never shows.
    pub async fn open_learning_path_modal(&self, name: &str) -> PageKitResult<()> {
        let toggle = self.page.locator("button.modal-toggle").has_text(name);
        self.preview.open_from(&toggle).await
    }

    /// Close the preview
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never hides.
    pub async fn close_modal(&self) -> PageKitResult<()> {
        self.preview.close().await
    }

    /// Assert the heading, both filters and the search box
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_all_filters_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("learning path filters", &self.page)
            .all_visible([
                &self.page_heading,
                &self.topic_dropdown,
                &self.path_size_dropdown,
                &self.search_input,
            ])
            .verify()
            .await
    }

    /// Assert at least one card shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when none does.
    pub async fn expect_learning_path_cards_visible(&self) -> PageKitResult<()> {
        self.page
            .assert_count_at_least(&self.learning_path_cards, 1)
            .await
    }

    /// Assert the card for `name` shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] otherwise.
    pub async fn expect_learning_path_card_visible(&self, name: &str) -> PageKitResult<()> {
        self.page
            .assert_visible(&self.learning_path_card(name))
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

impl PageObject for StudentLearningPaths {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::student::LEARNING_PATHS
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
