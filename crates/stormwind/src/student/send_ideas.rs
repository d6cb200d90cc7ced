//! Feedback board ("Send Ideas"), opened in a new tab.

use crate::student::{open_in_new_tab, StudentNavigation};
use crate::urls::external;
use pagekit::prelude::*;
use pagekit::SectionCheck;

/// Feedback board tab
#[derive(Debug, Clone)]
pub struct StudentSendIdeas {
    page: Page,
    /// Header: Send Ideas
    pub send_ideas_nav: Locator,
    /// Header: Updates
    pub updates_nav: Locator,
    /// Header: Roadmap
    pub roadmap_nav: Locator,
    /// "Hi there" heading
    pub main_heading: Locator,
    /// Feedback subtitle
    pub subtitle: Locator,
    /// Post search
    pub search_input: Locator,
    /// "Create a Post"
    pub create_post_button: Locator,
    /// Category: All Categories
    pub all_categories_filter: Locator,
    /// Category: Feature Idea
    pub feature_idea_category: Locator,
    /// Category: Bug
    pub bug_category: Locator,
    /// Category: Content Idea
    pub content_idea_category: Locator,
}

impl StudentSendIdeas {
    /// Board over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let link = |name: &str| page.get_by_role(AriaRole::Link).named(name);
        Self {
            page: page.clone(),
            send_ideas_nav: link("Send Ideas"),
            updates_nav: link("Updates"),
            roadmap_nav: link("Roadmap"),
            main_heading: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::regex_ci("hi there")),
            subtitle: page
                .locator("h2")
                .has_text(TextMatch::regex_ci("share your feedback")),
            search_input: page.get_by_placeholder("Search..."),
            create_post_button: page
                .get_by_role(AriaRole::Button)
                .named(TextMatch::regex_ci("create a post")),
            all_categories_filter: page.get_by_text("All Categories"),
            feature_idea_category: page.get_by_text("Feature Idea").last(),
            bug_category: page.get_by_text(TextMatch::exact("Bug")),
            content_idea_category: page.get_by_text("Content Idea").last(),
        }
    }

    /// Click the sidebar link on the opener and adopt the tab it opens
    ///
    /// # Errors
    ///
    /// [`PageKitError::Timeout`] when no tab opens.
    pub async fn open_from_sidebar(navigation: &StudentNavigation) -> PageKitResult<Self> {
        let tab = open_in_new_tab(navigation.page(), &navigation.sidebar_send_ideas).await?;
        Ok(Self::new(&tab))
    }

    /// On the feedback host
    #[must_use]
    pub fn is_on_send_ideas_page(&self) -> bool {
        self.page.url_contains(external::FEEDBACK_HOST)
    }

    /// Assert the three header links
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_header_nav_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("feedback header", &self.page)
            .all_visible([&self.send_ideas_nav, &self.updates_nav, &self.roadmap_nav])
            .verify()
            .await
    }

    /// Assert the four category filters
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_categories_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("feedback categories", &self.page)
            .all_visible([
                &self.all_categories_filter,
                &self.feature_idea_category,
                &self.bug_category,
                &self.content_idea_category,
            ])
            .verify()
            .await
    }

    /// Assert the header, headings, search and create button
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn verify_page_loaded(&self) -> PageKitResult<()> {
        self.expect_header_nav_visible().await?;
        SectionCheck::new("feedback board", &self.page)
            .all_visible([
                &self.main_heading,
                &self.subtitle,
                &self.search_input,
                &self.create_post_button,
            ])
            .verify()
            .await
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

impl PageObject for StudentSendIdeas {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        external::SEND_IDEAS
    }

    fn url_marker(&self) -> &str {
        external::FEEDBACK_HOST
    }

    fn load_state(&self) -> LoadState {
        LoadState::DomContentLoaded
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
