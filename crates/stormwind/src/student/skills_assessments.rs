//! Skills assessment catalogue and the course-preview modal its cards open.

use crate::student::{StudentFooter, StudentNavigation};
use crate::urls;
use pagekit::prelude::*;
use pagekit::SectionCheck;
use tracing::info;

/// Preview shown when a catalogue card is clicked
///
/// Every card owns a preview in the DOM; the root is whichever one shows.
#[derive(Debug)]
pub struct CoursePreviewModal {
    page: Page,
    modal: Modal,
    /// Displayed `.course-preview-modal`
    pub root: Locator,
    /// `h5#modalLabel`
    pub title: Locator,
    /// Difficulty line
    pub level: Locator,
    /// Duration line
    pub duration: Locator,
    /// "Overview" heading
    pub overview_heading: Locator,
    /// "Learn more" link
    pub learn_more_link: Locator,
    /// "Add to classroom" button
    pub add_to_classroom_button: Locator,
    /// Close link
    pub close_button: Locator,
}

impl CoursePreviewModal {
    /// Preview on `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let root = page.locator(".course-preview-modal").visible(true);
        let close_button = root.locator(r#"a[data-dismiss="modal"][aria-label="Close"]"#);
        Self {
            page: page.clone(),
            modal: Modal::new("course preview", page, root.clone()).closed_by(close_button.clone()),
            title: root.locator("h5#modalLabel"),
            level: root
                .locator(".dif-time")
                .has_text(TextMatch::regex_ci("beginner|intermediate|advanced")),
            duration: root
                .locator(".dif-time")
                .has_text(TextMatch::regex("hour|minute")),
            overview_heading: root.locator("h5").has_text("Overview"),
            learn_more_link: root.locator("a.text-learn-more-preview"),
            add_to_classroom_button: root.locator("button.js-course-flag.btn-primary"),
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
        SectionCheck::new("course preview", &self.page)
            .visible(&self.root)
            .text(&self.title, expected_title)
            .all_visible([
                &self.level,
                &self.duration,
                &self.overview_heading,
                &self.learn_more_link,
                &self.add_to_classroom_button,
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

/// `/skillsassessment`
#[derive(Debug)]
pub struct StudentSkillsAssessments {
    page: Page,
    /// Navigation and sidebar
    pub navigation: StudentNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// Catalogue heading
    pub page_heading: Locator,
    /// Search box
    pub search_input: Locator,
    /// `.course-card--condensed`
    pub assessment_cards: Locator,
    /// Preview modal
    pub preview: CoursePreviewModal,
}

impl StudentSkillsAssessments {
    /// Catalogue over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            navigation: StudentNavigation::new(page),
            footer: StudentFooter::new(page),
            page_heading: page.get_by_text("Explore Stormwind Skills Assessments."),
            search_input: page.locator(r#"input[placeholder="Search for a skills assessment"]"#),
            assessment_cards: page.locator(".course-card--condensed"),
            preview: CoursePreviewModal::new(page),
        }
    }

    /// Reach the catalogue through the navigation bar
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_from_nav(&self) -> PageKitResult<()> {
        self.navigation.navigate_to_skills_assessments().await
    }

    /// Whether the heading shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_skills_assessments_page_displayed(&self) -> PageKitResult<bool> {
        self.page_heading.is_visible().await
    }

    /// Whether the search box shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_search_input_visible(&self) -> PageKitResult<bool> {
        self.search_input.is_visible().await
    }

    /// Search the catalogue and wait for the results page
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn search_assessment(&self, name: &str) -> PageKitResult<()> {
        info!(assessment = name, "searching assessments");
        self.search_input.click().await?;
        self.search_input.fill(name).await?;
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

    /// Current search text
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn search_value(&self) -> PageKitResult<String> {
        self.search_input.input_value().await
    }

    /// Number of cards
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn assessments_count(&self) -> PageKitResult<usize> {
        self.assessment_cards.count().await
    }

    /// Title of the card for `name`
    #[must_use]
    pub fn assessment_card(&self, name: &str) -> Locator {
        self.page.locator(".course-card__title").has_text(name)
    }

    /// Whether the card for `name` shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AmbiguousLocator`] if several cards match.
    pub async fn is_assessment_card_visible(&self, name: &str) -> PageKitResult<bool> {
        self.assessment_card(name).is_visible().await
    }

    /// Open the preview of `name`
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never shows.
    pub async fn open_assessment_modal(&self, name: &str) -> PageKitResult<()> {
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

    /// Assert at least one card shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when the catalogue is empty.
    pub async fn expect_assessment_cards_visible(&self) -> PageKitResult<()> {
        self.page
            .assert_count_at_least(&self.assessment_cards, 1)
            .await
    }

    /// Assert the card for `name` shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] otherwise.
    pub async fn expect_assessment_card_visible(&self, name: &str) -> PageKitResult<()> {
        self.page.assert_visible(&self.assessment_card(name)).await
    }

    /// Assert the heading and search box
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_page_metadata_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("skills assessments", &self.page)
            .url_contains(urls::student::SKILLS_ASSESSMENTS)
            .all_visible([&self.page_heading, &self.search_input])
            .verify()
            .await
    }

    /// Assert the main bar
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_navigation_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_main_nav_visible().await
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

impl PageObject for StudentSkillsAssessments {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::student::SKILLS_ASSESSMENTS
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
