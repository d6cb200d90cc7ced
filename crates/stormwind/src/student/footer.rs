//! Site footer, shared by student and admin pages.

use pagekit::prelude::*;
use pagekit::SectionCheck;

/// Links inside `#footer`
#[derive(Debug, Clone)]
pub struct StudentFooter {
    page: Page,
    /// `#footer`
    pub footer: Locator,
    /// Explore: Courses
    pub explore_courses: Locator,
    /// Explore: Learning Paths
    pub explore_learning_paths: Locator,
    /// Explore: Skill Assessments
    pub explore_skill_assessments: Locator,
    /// Explore: Webinars
    pub explore_webinars: Locator,
    /// Explore: Live Course Calendar
    pub explore_live_course_calendar: Locator,
    /// Contact: Support
    pub contact_support: Locator,
    /// Contact: Send Ideas
    pub contact_send_ideas: Locator,
    /// Contact: Newsletter
    pub contact_newsletter: Locator,
    /// About: Terms of Use
    pub about_terms_of_use: Locator,
    /// About: Privacy Policy
    pub about_privacy_policy: Locator,
}

impl StudentFooter {
    /// Footer over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let footer = page.locator("#footer");
        let link = |name: &str| footer.get_by_role(AriaRole::Link).named(name);
        Self {
            page: page.clone(),
            explore_courses: link("Courses"),
            explore_learning_paths: link("Learning Paths"),
            explore_skill_assessments: link("Skill Assessments"),
            explore_webinars: link("Webinars"),
            explore_live_course_calendar: link("Live Course Calendar"),
            contact_support: link("Support"),
            contact_send_ideas: link("Send Ideas"),
            contact_newsletter: link("Newsletter"),
            about_terms_of_use: link("Terms of Use"),
            about_privacy_policy: link("Privacy Policy"),
            footer,
        }
    }

    /// Whether the footer shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_footer_visible(&self) -> PageKitResult<bool> {
        self.footer.is_visible().await
    }

    /// Scroll the footer into view
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn scroll_to_footer(&self) -> PageKitResult<()> {
        self.footer.scroll_into_view().await
    }

    /// Follow Explore: Courses
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn click_explore_courses(&self) -> PageKitResult<()> {
        self.explore_courses.click().await?;
        self.page.wait_for_load_state(LoadState::Load).await
    }

    /// Assert the Explore column
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_explore_links_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("footer explore", &self.page)
            .all_visible([
                &self.explore_courses,
                &self.explore_learning_paths,
                &self.explore_skill_assessments,
                &self.explore_webinars,
                &self.explore_live_course_calendar,
            ])
            .verify()
            .await
    }

    /// Assert the Contact column
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_contact_links_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("footer contact", &self.page)
            .all_visible([
                &self.contact_support,
                &self.contact_send_ideas,
                &self.contact_newsletter,
            ])
            .verify()
            .await
    }

    /// Assert the About column
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_about_links_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("footer about", &self.page)
            .all_visible([&self.about_terms_of_use, &self.about_privacy_policy])
            .verify()
            .await
    }

    /// Assert every footer link
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_all_footer_links_visible(&self) -> PageKitResult<()> {
        self.scroll_to_footer().await?;
        self.expect_explore_links_visible().await?;
        self.expect_contact_links_visible().await?;
        self.expect_about_links_visible().await
    }
}
