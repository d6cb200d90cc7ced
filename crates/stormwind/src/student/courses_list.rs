//! Topic landing page: subcategory chips, filters, course cards and the
//! preview a card title opens.

use crate::student::{CoursePreviewModal, StudentFooter, StudentNavigation};
use crate::urls;
use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};
use tracing::info;

/// Chips of the Cybersecurity topic, "All" first
pub const CYBERSECURITY_CHIPS: [&str; 10] = [
    "All",
    "CompTIA",
    "Cyber Range",
    "EC-Council",
    "ISC2",
    "Microsoft",
    "PM",
    "Palo Alto",
    "SonicWall",
    "Webinars",
];

/// Filter toggles of the sidebar
pub const FILTERS: [&str; 5] = [
    "Difficulty",
    "Job Role",
    "Instructor",
    "Course Type",
    "Certification-Based",
];

/// Substring every topic landing URL contains
const TOPIC_MARKER: &str = "/courses/";

/// `/courses/:topic`
#[derive(Debug)]
pub struct StudentCoursesList {
    page: Page,
    /// Navigation and sidebar
    pub navigation: StudentNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// Breadcrumb link back to the topics
    pub breadcrumb_courses: Locator,
    /// Topic heading
    pub page_heading: Locator,
    /// "What do you want to learn today?"
    pub search_input: Locator,
    /// `ul.topic-card__tags`
    pub chips_container: Locator,
    /// `li.topic-card__tag`
    pub chips: Locator,
    /// "Filters" heading
    pub filters_heading: Locator,
    /// One toggle per [`FILTERS`] entry
    pub filters: Vec<Locator>,
    /// `.course-card`
    pub course_cards: Locator,
    /// Card title links, each opening a preview
    pub course_title_links: Locator,
    /// Preview modal
    pub preview: CoursePreviewModal,
    /// "By: ..." line of the displayed preview
    pub preview_instructor: Locator,
}

impl StudentCoursesList {
    /// Topic landing page over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let preview = CoursePreviewModal::new(page);
        Self {
            page: page.clone(),
            navigation: StudentNavigation::new(page),
            footer: StudentFooter::new(page),
            breadcrumb_courses: page
                .locator("#main_container")
                .get_by_role(AriaRole::Link)
                .named(TextMatch::exact("Courses")),
            page_heading: page.locator("h1"),
            search_input: page.get_by_placeholder("What do you want to learn today?"),
            chips_container: page.locator("ul.topic-card__tags"),
            chips: page.locator("li.topic-card__tag"),
            filters_heading: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::exact("Filters")),
            filters: FILTERS
                .iter()
                .map(|name| {
                    page.locator("button.filter-toggle")
                        .has_text(TextMatch::exact(*name))
                })
                .collect(),
            course_cards: page.locator(".course-card"),
            course_title_links: page.locator("a.course-meta__title"),
            preview_instructor: preview.root.get_by_text("By:"),
            preview,
        }
    }

    /// Chip labelled `name`
    #[must_use]
    pub fn chip(&self, name: &str) -> Locator {
        self.chips.has_text(TextMatch::exact(name))
    }

    /// Chip labelled `name`, only while it is the active one
    #[must_use]
    pub fn active_chip(&self, name: &str) -> Locator {
        self.page
            .locator("li.topic-card__tag.active")
            .has_text(TextMatch::exact(name))
    }

    /// Title link of the card for `title`
    #[must_use]
    pub fn course_title_link(&self, title: &str) -> Locator {
        self.course_title_links.has_text(TextMatch::exact(title))
    }

    /// Narrow the cards to one subcategory
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn click_chip(&self, name: &str) -> PageKitResult<()> {
        info!(chip = name, "filtering topic");
        self.chip(name).click().await?;
        self.page.wait_for_load_state(LoadState::Load).await
    }

    /// Whether `name` is the active chip
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_chip_active(&self, name: &str) -> PageKitResult<bool> {
        self.active_chip(name).is_visible().await
    }

    /// Number of displayed course cards
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn course_cards_count(&self) -> PageKitResult<usize> {
        let cards = self.course_cards.all().await?;
        Ok(cards.iter().filter(|c| c.visible).count())
    }

    /// Open the preview of `title` from its card
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never shows.
    pub async fn open_course_preview(&self, title: &str) -> PageKitResult<()> {
        info!(course = title, "opening course preview");
        self.preview.open_from(&self.course_title_link(title)).await
    }

    /// Close the preview
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never hides.
    pub async fn close_course_preview(&self) -> PageKitResult<()> {
        self.preview.close().await
    }

    /// Assert the heading names `topic`
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_page_heading(&self, topic: &str) -> PageKitResult<()> {
        SectionCheck::new("topic heading", &self.page)
            .url_contains(TOPIC_MARKER)
            .text(&self.page_heading, topic)
            .verify()
            .await
    }

    /// Assert the breadcrumb link
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_breadcrumb_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.breadcrumb_courses).await
    }

    /// Assert the search box
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_search_input_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.search_input).await
    }

    /// Assert the chip row
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_chips_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.chips_container).await
    }

    /// Assert every [`CYBERSECURITY_CHIPS`] entry, "All" by its id
    ///
    /// # Errors
    ///
    /// The first missing chip.
    pub async fn expect_all_cybersecurity_chips_visible(&self) -> PageKitResult<()> {
        let all = self.page.locator(r#"li.topic-card__tag[data-id="all"]"#);
        let named: Vec<Locator> = CYBERSECURITY_CHIPS
            .iter()
            .skip(1)
            .map(|name| self.chip(name))
            .collect();
        SectionCheck::new("cybersecurity chips", &self.page)
            .visible(&all)
            .all_visible(&named)
            .verify()
            .await
    }

    /// Assert the "Filters" heading
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_filters_heading_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.filters_heading).await
    }

    /// Assert every [`FILTERS`] toggle
    ///
    /// # Errors
    ///
    /// The first missing filter.
    pub async fn expect_all_filters_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("course filters", &self.page)
            .all_visible(&self.filters)
            .verify()
            .await
    }

    /// Assert at least one card shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when the list is empty.
    pub async fn expect_course_cards_visible(&self) -> PageKitResult<()> {
        self.page.assert_count_at_least(&self.course_cards, 1).await
    }

    /// Assert `name` is the active chip
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] otherwise.
    pub async fn expect_chip_active(&self, name: &str) -> PageKitResult<()> {
        self.page.assert_visible(&self.active_chip(name)).await
    }

    /// Assert the open preview describes `title`, instructor included
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_course_preview(&self, title: &str) -> PageKitResult<()> {
        self.preview.expect_all_elements_visible(title).await?;
        self.page.assert_visible(&self.preview_instructor).await
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

impl PageObject for StudentCoursesList {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::student::CYBERSECURITY_COURSES
    }

    fn url_marker(&self) -> &str {
        TOPIC_MARKER
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
