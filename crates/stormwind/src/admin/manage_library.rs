//! Content library administration: the library table, category filter and
//! the upload form.

use crate::admin::AdminNavigation;
use crate::urls;
use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};
use tracing::debug;

/// `/admin/manage-library`
#[derive(Debug)]
pub struct AdminManageLibrary {
    page: Page,
    /// Admin navigation
    pub navigation: AdminNavigation,
    /// "Manage Library" heading
    pub library_title: Locator,
    /// "Add Content"
    pub add_content_button: Locator,
    /// `table.library-table`
    pub library_table: Locator,
    /// Table search box
    pub search_input: Locator,
    /// `select[name="category"]`
    pub category_filter: Locator,
    /// "Upload"
    pub upload_button: Locator,
    /// File picker of the upload form
    pub file_input: Locator,
    /// Dialog "Add Content" opens
    pub add_content_modal: Modal,
}

impl AdminManageLibrary {
    /// Library page over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let add_content_button = page
            .get_by_role(AriaRole::Button)
            .named(TextMatch::regex_ci("add content"));
        let add_root = page
            .get_by_role(AriaRole::Dialog)
            .has(&page.get_by_role(AriaRole::Heading).named("New Content"));
        Self {
            page: page.clone(),
            navigation: AdminNavigation::new(page),
            library_title: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::regex_ci("manage library")),
            library_table: page.locator("table.library-table"),
            search_input: page
                .locator("#main-content")
                .get_by_placeholder(TextMatch::regex_ci("search")),
            category_filter: page.locator(r#"select[name="category"]"#),
            upload_button: page
                .get_by_role(AriaRole::Button)
                .named(TextMatch::regex_ci("upload")),
            file_input: page.locator(r#"input[type="file"]"#),
            add_content_modal: Modal::new("add content", page, add_root.clone())
                .opened_by(add_content_button.clone())
                .closed_by(add_root.get_by_role(AriaRole::Button).named("Cancel")),
            add_content_button,
        }
    }

    /// Library row whose text contains `title`
    #[must_use]
    pub fn content_row(&self, title: &str) -> Locator {
        self.page.locator("table.library-table tbody tr").has_text(title)
    }

    /// Type into the table search
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn search_content(&self, title: &str) -> PageKitResult<()> {
        self.search_input.fill(title).await
    }

    /// Narrow the table to one category, by option value or label
    ///
    /// # Errors
    ///
    /// Locator errors, or no such option.
    pub async fn select_category(&self, category: &str) -> PageKitResult<()> {
        debug!(category, "filtering library");
        self.category_filter.select_option(category).await
    }

    /// Open the "Add Content" dialog
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never shows.
    pub async fn click_add_content(&self) -> PageKitResult<()> {
        self.add_content_modal.open().await
    }

    /// Whether the heading shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_manage_library_page_displayed(&self) -> PageKitResult<bool> {
        self.library_title.is_visible().await
    }

    /// Assert the heading
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_manage_library_page_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.library_title).await
    }

    /// Assert the upload form
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_upload_controls_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("library upload", &self.page)
            .all_visible([&self.file_input, &self.upload_button])
            .verify()
            .await
    }
}

impl PageObject for AdminManageLibrary {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::admin::MANAGE_LIBRARY
    }

    fn url_marker(&self) -> &str {
        urls::admin::MANAGE_LIBRARY_MARKER
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
