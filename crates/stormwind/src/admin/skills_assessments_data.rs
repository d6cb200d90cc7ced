//! Skills assessment report: the most popular assessment and the per
//! assessment engagement table.

use crate::admin::AdminNavigation;
use crate::student::StudentFooter;
use crate::urls;
use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};

/// Table columns, in order
pub const COLUMN_HEADERS: [&str; 4] = [
    "Skill Assessment",
    "Last Engagement",
    "Students Registered",
    "Students Completed",
];

/// `/team/:team/skills-assessment/:company`
#[derive(Debug)]
pub struct AdminSkillsAssessmentsData {
    page: Page,
    /// Admin navigation
    pub navigation: AdminNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// `h1.page-title`
    pub page_title: Locator,
    /// Link to the student catalogue
    pub view_skills_assessments_btn: Locator,
    /// "Most Popular Skills Assessment"
    pub most_popular_label: Locator,
    /// Average score caption
    pub average_score_label: Locator,
    /// Total completed caption
    pub total_completed_label: Locator,
    /// "Skills Assessment Details" heading
    pub details_heading: Locator,
    /// Table search box
    pub search_input: Locator,
    /// One header per [`COLUMN_HEADERS`] entry
    pub column_headers: Vec<Locator>,
    /// The engagement table
    pub assessments_table: Locator,
}

impl AdminSkillsAssessmentsData {
    /// Report over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            navigation: AdminNavigation::new(page),
            footer: StudentFooter::new(page),
            page_title: page.locator("h1.page-title"),
            view_skills_assessments_btn: page.locator(&format!(
                r#"a.btn.btn-outline-dark[href="{}"]"#,
                urls::student::SKILLS_ASSESSMENTS
            )),
            most_popular_label: page.get_by_text("Most Popular Skills Assessment"),
            average_score_label: page.locator(".average-score-description span"),
            total_completed_label: page.locator(".total-completed-description span"),
            details_heading: page
                .get_by_role(AriaRole::Heading)
                .named("Skills Assessment Details"),
            search_input: page
                .get_by_role(AriaRole::Textbox)
                .named(TextMatch::exact("Search")),
            column_headers: COLUMN_HEADERS
                .iter()
                .map(|name| {
                    page.get_by_role(AriaRole::Columnheader)
                        .named(TextMatch::exact(*name))
                })
                .collect(),
            assessments_table: page.locator("table").first(),
        }
    }

    /// Table row whose text contains `name`
    #[must_use]
    pub fn assessment_row(&self, name: &str) -> Locator {
        self.page.locator("table tbody tr").has_text(name)
    }

    /// Filter the table
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn search_assessment(&self, text: &str) -> PageKitResult<()> {
        self.search_input.fill(text).await
    }

    /// Assert the main bar
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_navigation_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_main_nav_visible().await
    }

    /// Assert the admin shortcuts
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_admin_sub_nav_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_admin_sub_nav_visible().await
    }

    /// Assert the heading
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_page_title_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.page_title).await
    }

    /// Assert the link to the student catalogue
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_view_skills_assessments_btn_visible(&self) -> PageKitResult<()> {
        self.page
            .assert_visible(&self.view_skills_assessments_btn)
            .await
    }

    /// Assert the most popular card and its two captions
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_most_popular_section_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("most popular assessment", &self.page)
            .all_visible([
                &self.most_popular_label,
                &self.average_score_label,
                &self.total_completed_label,
            ])
            .verify()
            .await
    }

    /// Assert the details heading, search box, columns and table
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_details_section_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("assessment details", &self.page)
            .all_visible([&self.details_heading, &self.search_input])
            .all_visible(&self.column_headers)
            .visible(&self.assessments_table)
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

    /// Assert the whole page, top to bottom
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_skills_assessments_data_page_complete(&self) -> PageKitResult<()> {
        self.expect_navigation_visible().await?;
        self.expect_admin_sub_nav_visible().await?;
        self.expect_page_title_visible().await?;
        self.expect_view_skills_assessments_btn_visible().await?;
        self.expect_most_popular_section_visible().await?;
        self.expect_details_section_visible().await?;
        self.expect_all_footer_links_visible().await
    }
}

impl PageObject for AdminSkillsAssessmentsData {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::admin::SKILLS_ASSESSMENTS_DATA
    }

    fn url_marker(&self) -> &str {
        urls::admin::SKILLS_ASSESSMENTS_DATA_MARKER
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
