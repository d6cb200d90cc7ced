//! Team reporting dashboard.

use crate::admin::AdminNavigation;
use crate::student::StudentFooter;
use crate::urls;
use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};

/// `/team/:team/reporting/:report`
#[derive(Debug, Clone)]
pub struct AdminDashboard {
    page: Page,
    /// Admin navigation
    pub navigation: AdminNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// "Dashboard" heading
    pub dashboard_title: Locator,
    /// `#manager-team-report`
    pub licenses_section: Locator,
    /// "Licenses" heading
    pub licenses_heading: Locator,
    /// `.card-licenses`
    pub licenses_card: Locator,
    /// "Total Licenses"
    pub total_licenses_label: Locator,
    /// "Available Licenses"
    pub available_licenses_label: Locator,
    /// "Students Assigned"
    pub students_assigned_label: Locator,
    /// Opens the license export modal
    pub receive_licenses_report_btn: Locator,
    /// "Team Activity" heading
    pub team_activity_heading: Locator,
    /// "Total Hours Trained"
    pub total_hours_trained_label: Locator,
    /// "Total Courses Completed"
    pub total_courses_completed_label: Locator,
    /// Resend onboarding email
    pub resend_welcome_email_btn: Locator,
    /// "Receive Activity Report"
    pub receive_activity_report_btn: Locator,
    /// "Students Information" heading
    pub student_info_heading: Locator,
    /// `#search-term`
    pub student_search_input: Locator,
    /// Invite users into a group
    pub add_user_btn: Locator,
    /// Students table
    pub student_table: Locator,
    /// Pagination: Next
    pub pagination_next: Locator,
    /// Pagination: Last
    pub pagination_last: Locator,
}

impl AdminDashboard {
    /// Dashboard over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let heading = |name: &str| page.get_by_role(AriaRole::Heading).named(name);
        Self {
            page: page.clone(),
            navigation: AdminNavigation::new(page),
            footer: StudentFooter::new(page),
            dashboard_title: heading("Dashboard"),
            licenses_section: page.locator("#manager-team-report"),
            licenses_heading: heading("Licenses"),
            licenses_card: page.locator(".card-licenses"),
            total_licenses_label: page.get_by_text("Total Licenses"),
            available_licenses_label: page.get_by_text(TextMatch::exact("Available Licenses")),
            students_assigned_label: page.get_by_text(TextMatch::exact("Students Assigned")),
            receive_licenses_report_btn: page
                .locator(r##"button[data-target="#manager-export-license-modal"]"##),
            team_activity_heading: heading("Team Activity"),
            total_hours_trained_label: page.get_by_text("Total Hours Trained"),
            total_courses_completed_label: page.get_by_text("Total Courses Completed"),
            resend_welcome_email_btn: page.locator(r#"a[href*="resend-onboarding-email"]"#),
            receive_activity_report_btn: page
                .get_by_role(AriaRole::Button)
                .named(TextMatch::regex_ci("Receive Activity Report")),
            student_info_heading: heading("Students Information"),
            student_search_input: page.locator("#search-term"),
            add_user_btn: page.locator(r#"a[href*="invitations?group="]"#),
            student_table: page.locator("table").first(),
            pagination_next: page.get_by_role(AriaRole::Link).named(TextMatch::exact("Next")),
            pagination_last: page.get_by_role(AriaRole::Link).named(TextMatch::exact("Last")),
        }
    }

    /// Assert the Licenses block
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_licenses_section_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("licenses", &self.page)
            .all_visible([
                &self.licenses_heading,
                &self.licenses_card,
                &self.total_licenses_label,
                &self.available_licenses_label,
                &self.students_assigned_label,
                &self.receive_licenses_report_btn,
            ])
            .verify()
            .await
    }

    /// Assert the Team Activity block
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_team_activity_section_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("team activity", &self.page)
            .all_visible([
                &self.team_activity_heading,
                &self.total_hours_trained_label,
                &self.total_courses_completed_label,
                &self.resend_welcome_email_btn,
                &self.receive_activity_report_btn,
            ])
            .verify()
            .await
    }

    /// Assert the Students Information block
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_student_info_section_visible(&self) -> PageKitResult<()> {
        self.student_table.scroll_into_view().await?;
        SectionCheck::new("students information", &self.page)
            .all_visible([
                &self.student_info_heading,
                &self.student_search_input,
                &self.add_user_btn,
                &self.student_table,
            ])
            .verify()
            .await
    }

    /// Assert the heading
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is not visible.
    pub async fn expect_dashboard_title_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.dashboard_title).await
    }

    /// Every section of the dashboard, top to bottom
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_dashboard_page_complete(&self) -> PageKitResult<()> {
        self.navigation.expect_main_nav_visible().await?;
        self.navigation.expect_admin_sub_nav_visible().await?;
        self.expect_dashboard_title_visible().await?;
        self.expect_licenses_section_visible().await?;
        self.expect_team_activity_section_visible().await?;
        self.expect_student_info_section_visible().await?;
        self.footer.expect_all_footer_links_visible().await
    }
}

impl PageObject for AdminDashboard {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::admin::DASHBOARD
    }

    fn url_marker(&self) -> &str {
        urls::admin::DASHBOARD_MARKER
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
