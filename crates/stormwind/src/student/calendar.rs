//! Live course calendar, opened from the sidebar in a new tab.

use crate::student::{open_in_new_tab, StudentFooter, StudentNavigation};
use crate::urls;
use pagekit::prelude::*;
use pagekit::SectionCheck;

/// Calendar tab
#[derive(Debug, Clone)]
pub struct StudentLiveCourseCalendar {
    page: Page,
    /// Navigation of the calendar tab
    pub navigation: StudentNavigation,
    /// Footer of the calendar tab
    pub footer: StudentFooter,
    /// "Today"
    pub today_button: Locator,
    /// Previous month
    pub previous_button: Locator,
    /// Next month
    pub next_button: Locator,
    /// "December 2025"
    pub month_year_heading: Locator,
    /// Day header row, found through "SUN"
    pub calendar_grid: Locator,
}

impl StudentLiveCourseCalendar {
    /// Calendar over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let arrow = |class: &str| {
            page.locator("button")
                .has(&page.locator(&format!(r#"[class*="{class}"]"#)))
        };
        Self {
            page: page.clone(),
            navigation: StudentNavigation::new(page),
            footer: StudentFooter::new(page),
            today_button: page.get_by_role(AriaRole::Button).named("Today"),
            previous_button: arrow("chevron-left").first(),
            next_button: arrow("chevron-right").last(),
            month_year_heading: page
                .get_by_text(TextMatch::regex(r"^[A-Z][a-z]+ \d{4}$"))
                .first(),
            calendar_grid: page.get_by_text("SUN").first(),
        }
    }

    /// Click the sidebar link on the opener and adopt the tab it opens
    ///
    /// # Errors
    ///
    /// [`PageKitError::Timeout`] when no tab opens.
    pub async fn open_from_sidebar(navigation: &StudentNavigation) -> PageKitResult<Self> {
        let tab = open_in_new_tab(navigation.page(), &navigation.sidebar_live_course_calendar)
            .await?;
        Ok(Self::new(&tab))
    }

    /// Jump to the current month
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_today(&self) -> PageKitResult<()> {
        self.today_button.click().await
    }

    /// Previous month
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_previous(&self) -> PageKitResult<()> {
        self.previous_button.click().await
    }

    /// Next month
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_next(&self) -> PageKitResult<()> {
        self.next_button.click().await
    }

    /// Assert the controls, the grid and the main bar
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn verify_calendar_page_elements(&self) -> PageKitResult<()> {
        SectionCheck::new("live course calendar", &self.page)
            .all_visible([&self.today_button, &self.calendar_grid])
            .verify()
            .await?;
        self.navigation.expect_main_nav_visible().await
    }

    /// Assert the footer's Explore column
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_footer_visible(&self) -> PageKitResult<()> {
        self.footer.scroll_to_footer().await?;
        self.footer.expect_explore_links_visible().await
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

impl PageObject for StudentLiveCourseCalendar {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::student::LIVE_COURSE_CALENDAR
    }

    fn url_marker(&self) -> &str {
        urls::student::CALENDAR_MARKER
    }

    fn load_state(&self) -> LoadState {
        LoadState::DomContentLoaded
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
