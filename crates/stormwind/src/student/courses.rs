//! Topic categories the "Courses" link opens.

use crate::student::{StudentFooter, StudentNavigation};
use crate::urls;
use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};
use tracing::info;

/// Every topic card, in page order
pub const TOPICS: [&str; 11] = [
    "Artificial Intelligence (AI)",
    "Cloud",
    "Cybersecurity",
    "Desktop Applications",
    "DevOps",
    "Development",
    "Information Technology (IT)",
    "Project Management",
    "Ranges",
    "Security Awareness",
    "Skills Assessments",
];

/// `/topics`
#[derive(Debug)]
pub struct StudentCourses {
    page: Page,
    /// Navigation and sidebar
    pub navigation: StudentNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// "Courses" heading
    pub page_heading: Locator,
    /// `#topics-container`
    pub topics_container: Locator,
    /// `.topic-card`
    pub topic_cards: Locator,
    /// One title link per [`TOPICS`] entry
    pub topic_links: Vec<Locator>,
}

impl StudentCourses {
    /// Topic page over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            navigation: StudentNavigation::new(page),
            footer: StudentFooter::new(page),
            page_heading: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::exact("Courses")),
            topics_container: page.locator("#topics-container"),
            topic_cards: page.locator(".topic-card"),
            topic_links: TOPICS.iter().map(|name| topic_link(page, name)).collect(),
        }
    }

    /// Title link of the `name` card
    #[must_use]
    pub fn topic_link(&self, name: &str) -> Locator {
        topic_link(&self.page, name)
    }

    /// Reach the topics through the navigation bar
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_from_nav(&self) -> PageKitResult<()> {
        self.navigation.navigate_to_courses().await
    }

    /// Open the landing page of `name`
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn click_topic_card(&self, name: &str) -> PageKitResult<()> {
        info!(topic = name, "opening topic");
        self.topic_link(name).click().await?;
        self.page.wait_for_load_state(LoadState::Load).await
    }

    /// Number of topic cards
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn topic_cards_count(&self) -> PageKitResult<usize> {
        self.topic_cards.count().await
    }

    /// Whether the heading shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_courses_page_displayed(&self) -> PageKitResult<bool> {
        self.page_heading.is_visible().await
    }

    /// Assert the heading
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_page_heading_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.page_heading).await
    }

    /// Assert the main bar
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_navigation_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_main_nav_visible().await
    }

    /// Assert the card grid
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_topics_container_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.topics_container).await
    }

    /// Assert at least one card shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when the grid is empty.
    pub async fn expect_topic_cards_visible(&self) -> PageKitResult<()> {
        self.page.assert_count_at_least(&self.topic_cards, 1).await
    }

    /// Assert every [`TOPICS`] card
    ///
    /// # Errors
    ///
    /// The first missing topic.
    pub async fn expect_all_topic_categories_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("topic categories", &self.page)
            .all_visible(&self.topic_links)
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
}

fn topic_link(page: &Page, name: &str) -> Locator {
    page.locator(".topic-card__title a")
        .has_text(TextMatch::exact(name))
}

impl PageObject for StudentCourses {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::student::TOPICS
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_names_are_distinct() {
        let mut sorted = TOPICS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), TOPICS.len());
    }
}
