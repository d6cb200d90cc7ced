//! Team leaderboard: podium, ranking table and the export-chart modal.

use crate::student::{StudentFooter, StudentNavigation};
use crate::urls;
use pagekit::prelude::*;
use pagekit::SectionCheck;

/// Ranking table columns, in display order
const COLUMN_HEADERS: [&str; 8] = [
    "rank",
    "student name",
    "total course time",
    "time spent.*recorded",
    "time spent.*live",
    "courses completed",
    "courses registered",
    "top course",
];

/// `/leaderboard`
#[derive(Debug)]
pub struct StudentLeaderboard {
    page: Page,
    /// Navigation and sidebar
    pub navigation: StudentNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// `div.leaderboard`
    pub leaderboard_container: Locator,
    /// Opens the export modal
    pub export_chart_button: Locator,
    /// `#leaderboard-highlights`
    pub highlights: Locator,
    /// Podium cards
    pub podium_cards: Locator,
    /// First place
    pub first_place_card: Locator,
    /// Second place
    pub second_place_card: Locator,
    /// Third place
    pub third_place_card: Locator,
    /// Rank badges on the podium
    pub rank_badges: Locator,
    /// Ranking table
    pub leaderboard_table: Locator,
    /// Ranking headers, in display order
    pub column_headers: Vec<Locator>,
    /// Body rows
    pub table_rows: Locator,
    /// Pagination: next
    pub next_page_link: Locator,
    /// Pagination: last
    pub last_page_link: Locator,
    /// Export modal
    pub export_modal: Modal,
    /// Export modal title
    pub export_modal_title: Locator,
    /// Export modal close button
    pub export_modal_close_button: Locator,
    /// "EXPORT CHART" inside the modal
    pub export_modal_export_button: Locator,
}

impl StudentLeaderboard {
    /// Leaderboard over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let podium_cards = page.locator(".highlighted-student");
        let export_chart_button = page.locator("button#btn-export-open-modal");
        let export_root = page.locator(".modal").visible(true);
        let export_modal_close_button =
            export_root.locator(r#"button.close[data-dismiss="modal"]"#);
        Self {
            page: page.clone(),
            navigation: StudentNavigation::new(page),
            footer: StudentFooter::new(page),
            leaderboard_container: page.locator("div.leaderboard"),
            highlights: page.locator("#leaderboard-highlights"),
            first_place_card: podium_cards.first(),
            second_place_card: podium_cards.nth(1),
            third_place_card: podium_cards.nth(2),
            rank_badges: page.locator(".highlighted-student__rank"),
            leaderboard_table: page.locator("table").first(),
            column_headers: COLUMN_HEADERS
                .iter()
                .map(|name| {
                    page.get_by_role(AriaRole::Columnheader)
                        .named(TextMatch::regex_ci(*name))
                })
                .collect(),
            table_rows: page.locator("table tbody tr"),
            next_page_link: page
                .get_by_role(AriaRole::Link)
                .named(TextMatch::regex_ci("next")),
            last_page_link: page
                .get_by_role(AriaRole::Link)
                .named(TextMatch::regex_ci("last")),
            export_modal: Modal::new("export chart", page, export_root.clone())
                .opened_by(export_chart_button.clone())
                .closed_by(export_modal_close_button.clone()),
            export_modal_title: export_root.locator(".modal-title"),
            export_modal_export_button: export_root.locator("button").has_text("EXPORT CHART"),
            export_modal_close_button,
            export_chart_button,
            podium_cards,
        }
    }

    /// Reach the leaderboard through the navigation bar
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn navigate_from_nav(&self) -> PageKitResult<()> {
        self.navigation.navigate_to_leaderboard().await
    }

    /// Whether the board shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_leaderboard_page_displayed(&self) -> PageKitResult<bool> {
        self.leaderboard_container.is_visible().await
    }

    /// Open the export modal
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never shows.
    pub async fn click_export_chart(&self) -> PageKitResult<()> {
        self.export_modal.open().await
    }

    /// Close the export modal
    ///
    /// # Errors
    ///
    /// [`PageKitError::ModalTransition`] when it never hides.
    pub async fn close_export_modal(&self) -> PageKitResult<()> {
        self.export_modal.close().await
    }

    /// Whether the export modal shows
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn is_export_modal_visible(&self) -> PageKitResult<bool> {
        self.export_modal.is_open().await
    }

    /// Podium size
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn podium_cards_count(&self) -> PageKitResult<usize> {
        self.podium_cards.count().await
    }

    /// Body row count
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn table_rows_count(&self) -> PageKitResult<usize> {
        self.table_rows.count().await
    }

    /// Assert the board and its export button
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_page_heading_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("leaderboard", &self.page)
            .all_visible([&self.leaderboard_container, &self.export_chart_button])
            .verify()
            .await
    }

    /// Assert the three podium places
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_all_podium_cards_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("podium", &self.page)
            .all_visible([
                &self.highlights,
                &self.first_place_card,
                &self.second_place_card,
                &self.third_place_card,
            ])
            .count_at_least(&self.rank_badges, 3)
            .verify()
            .await
    }

    /// Assert the table and every column header
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_all_table_headers_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("ranking table", &self.page)
            .visible(&self.leaderboard_table)
            .all_visible(&self.column_headers)
            .verify()
            .await
    }

    /// Assert the table has at least one row
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is empty.
    pub async fn expect_table_has_rows(&self) -> PageKitResult<()> {
        self.page.assert_count_at_least(&self.table_rows, 1).await
    }

    /// Assert the open export modal
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_export_modal_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("export chart modal", &self.page)
            .all_visible([
                self.export_modal.root(),
                &self.export_modal_title,
                &self.export_modal_close_button,
                &self.export_modal_export_button,
            ])
            .verify()
            .await
    }

    /// Assert the export modal is gone
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] otherwise.
    pub async fn expect_export_modal_hidden(&self) -> PageKitResult<()> {
        self.page.assert_hidden(self.export_modal.root()).await
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

impl PageObject for StudentLeaderboard {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::student::LEADERBOARD
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
