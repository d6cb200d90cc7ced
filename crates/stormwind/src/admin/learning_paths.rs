//! Learning path management: active and archived tables with archive and
//! publish actions.

use crate::admin::AdminNavigation;
use crate::student::StudentFooter;
use crate::urls;
use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};
use std::time::Duration;
use tracing::info;

/// Pause after archive / publish while the tables re-render, capped at a
/// fifth of the expect timeout
const TABLE_SETTLE: Duration = Duration::from_millis(1_000);

/// `/team/learning-path`
#[derive(Debug, Clone)]
pub struct ManageLearningPaths {
    page: Page,
    settle: Duration,
    /// Admin navigation
    pub navigation: AdminNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// "Learning Paths" heading
    pub page_title: Locator,
    /// Link to the creation form
    pub create_path_btn: Locator,
    /// "Active Paths" heading
    pub active_paths_heading: Locator,
    /// Search box of the active table
    pub active_paths_search_input: Locator,
    /// Active paths table
    pub active_paths_table: Locator,
    /// "Archived Paths" heading
    pub archived_paths_heading: Locator,
    /// Archived paths table
    pub archived_paths_table: Locator,
}

impl ManageLearningPaths {
    /// Management page over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            settle: TABLE_SETTLE.min(page.timeouts().expect / 5),
            navigation: AdminNavigation::new(page),
            footer: StudentFooter::new(page),
            page_title: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::exact("Learning Paths")),
            create_path_btn: page.locator(&format!(
                r#"a[href="{}"]"#,
                urls::admin::CREATE_LEARNING_PATH
            )),
            active_paths_heading: page.get_by_role(AriaRole::Heading).named("Active Paths"),
            active_paths_search_input: page.get_by_placeholder("Search for a Learning Path"),
            active_paths_table: page.locator("#manager-learning-path-div table").first(),
            archived_paths_heading: page.get_by_role(AriaRole::Heading).named("Archived Paths"),
            archived_paths_table: page
                .locator("#manager-learning-path-archived-div table")
                .first(),
        }
    }

    /// Row of `name` in the active table
    #[must_use]
    pub fn active_path_row(&self, name: &str) -> Locator {
        self.page
            .locator("#manager-learning-path-div tr")
            .has_text(name)
    }

    /// Row of `name` in the archived table
    #[must_use]
    pub fn archived_path_row(&self, name: &str) -> Locator {
        self.page
            .locator("#manager-learning-path-archived-div tr")
            .has_text(name)
    }

    /// Archive button of an active row
    #[must_use]
    pub fn archive_button(&self, name: &str) -> Locator {
        self.active_path_row(name).locator("a.btn-archive")
    }

    /// Report button of an active row
    #[must_use]
    pub fn report_button(&self, name: &str) -> Locator {
        self.active_path_row(name).locator("a.btn-report")
    }

    /// Edit button of an active row
    #[must_use]
    pub fn edit_button(&self, name: &str) -> Locator {
        self.active_path_row(name).locator("a.btn-edit")
    }

    /// Publish button of an archived row
    #[must_use]
    pub fn publish_button(&self, name: &str) -> Locator {
        self.archived_path_row(name).locator("a.btn-unarchive")
    }

    /// Open the creation form
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn click_create_path(&self) -> PageKitResult<()> {
        self.create_path_btn.click().await?;
        self.page.wait_for_load_state(LoadState::Load).await
    }

    /// Archive `name`
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_archive(&self, name: &str) -> PageKitResult<()> {
        info!(learning_path = name, "archive");
        self.archive_button(name).click().await?;
        self.page.wait_for_timeout(self.settle).await;
        Ok(())
    }

    /// Publish `name` again
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_publish(&self, name: &str) -> PageKitResult<()> {
        info!(learning_path = name, "publish");
        self.publish_button(name).click().await?;
        self.page.wait_for_timeout(self.settle).await;
        Ok(())
    }

    /// Whether `name` is listed as active
    ///
    /// # Errors
    ///
    /// [`PageKitError::AmbiguousLocator`] if the name matches several rows.
    pub async fn is_in_active_paths(&self, name: &str) -> PageKitResult<bool> {
        self.active_path_row(name).is_visible().await
    }

    /// Whether `name` is listed as archived
    ///
    /// # Errors
    ///
    /// [`PageKitError::AmbiguousLocator`] if the name matches several rows.
    pub async fn is_in_archived_paths(&self, name: &str) -> PageKitResult<bool> {
        self.archived_path_row(name).is_visible().await
    }

    /// Assert the title, create button and both table sections
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_page_metadata_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("learning path management", &self.page)
            .url_contains(urls::admin::LEARNING_PATHS_MARKER)
            .all_visible([
                &self.page_title,
                &self.create_path_btn,
                &self.active_paths_heading,
                &self.active_paths_search_input,
                &self.active_paths_table,
                &self.archived_paths_heading,
            ])
            .verify()
            .await
    }

    /// Assert `name` is active with its three row actions
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_in_active_paths_with_buttons(&self, name: &str) -> PageKitResult<()> {
        SectionCheck::new(format!("active path {name}"), &self.page)
            .all_visible([
                &self.active_path_row(name),
                &self.archive_button(name),
                &self.report_button(name),
                &self.edit_button(name),
            ])
            .verify()
            .await
    }

    /// Assert `name` sits in the archived table only
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_only_archived(&self, name: &str) -> PageKitResult<()> {
        SectionCheck::new(format!("archived path {name}"), &self.page)
            .visible(&self.archived_path_row(name))
            .hidden(&self.active_path_row(name))
            .verify()
            .await
    }

    /// Assert `name` sits in the active table only
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_only_active(&self, name: &str) -> PageKitResult<()> {
        SectionCheck::new(format!("active path {name}"), &self.page)
            .visible(&self.active_path_row(name))
            .hidden(&self.archived_path_row(name))
            .verify()
            .await
    }
}

impl PageObject for ManageLearningPaths {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::admin::MANAGE_LEARNING_PATHS
    }

    fn url_marker(&self) -> &str {
        urls::admin::LEARNING_PATHS_MARKER
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
