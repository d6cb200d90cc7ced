//! Lesson player of a started course: header, table of contents with
//! expandable modules, supplements and mentoring.

use crate::student::{StudentFooter, StudentNavigation};
use crate::urls;
use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};
use std::time::Duration;
use tracing::info;

/// Modules of "Microsoft Azure for .NET Developers", in TOC order
pub const MODULE_NAMES: [&str; 13] = [
    "Introduction",
    "Get Started with Microsoft Azure",
    "Azure Resource Manager",
    "Azure App Service",
    "Azure SQL",
    "Azure Cosmos DB",
    "Azure Storage Accounts",
    "Azure Service Bus",
    "Azure Functions (Serverless Solutions)",
    "Azure Virtual Machines",
    "Azure Containers",
    "Microsoft Azure Active Directory",
    "Conclusion",
];

/// Pause after a module toggles open, capped at a fifth of the expect
/// timeout
const MODULE_SETTLE: Duration = Duration::from_millis(500);

/// `/replay/:course/:lesson`
#[derive(Debug)]
pub struct StudentCourseLessons {
    page: Page,
    settle: Duration,
    /// Navigation and sidebar
    pub navigation: StudentNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// `.learning-object__header`
    pub page_header: Locator,
    /// "INTRODUCTION"
    pub introduction_label: Locator,
    /// "Course Overview" lesson title
    pub course_overview_heading: Locator,
    /// Course title heading
    pub course_title: Locator,
    /// `.learning-object__table-of-contents`
    pub table_of_contents: Locator,
    /// "Table of content"
    pub toc_heading: Locator,
    /// Lesson entries of the TOC
    pub lesson_items: Locator,
    /// Play icons of the lesson entries
    pub lesson_play_icons: Locator,
    /// Lesson titles
    pub lesson_titles: Locator,
    /// Lesson durations
    pub lesson_durations: Locator,
    /// "Supplements" heading
    pub supplements_heading: Locator,
    /// GitHub repository of the course
    pub supplements_github_link: Locator,
    /// "REQUEST MENTORING"
    pub request_mentoring_btn: Locator,
}

impl StudentCourseLessons {
    /// Lesson player over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let toc = page.locator(".learning-object__table-of-contents");
        Self {
            page: page.clone(),
            settle: MODULE_SETTLE.min(page.timeouts().expect / 5),
            navigation: StudentNavigation::new(page),
            footer: StudentFooter::new(page),
            page_header: page.locator(".learning-object__header"),
            introduction_label: page.get_by_text(TextMatch::exact("INTRODUCTION")),
            course_overview_heading: page
                .locator("#learning-object__title")
                .has_text("Course Overview"),
            course_title: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::exact("Microsoft Azure for .NET Developers")),
            toc_heading: toc.locator("h2").has_text("Table of content"),
            lesson_items: toc.locator("li.list-group-item"),
            lesson_play_icons: toc.locator("i.fal.fa-play-circle"),
            lesson_titles: toc.locator("h4.lesson_title"),
            lesson_durations: toc.locator("span.lesson_duration"),
            table_of_contents: toc,
            supplements_heading: page.locator(".course-supplements h2").has_text("Supplements"),
            supplements_github_link: page.get_by_text("Microsoft Azure for .NET Developers GitHub"),
            request_mentoring_btn: page.locator("a.request-mentoring-button"),
        }
    }

    /// Reach the player through "Resume" on the course details page
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn resume_from_course_details(&self) -> PageKitResult<()> {
        self.page.goto(urls::student::AZURE_DOTNET_COURSE).await?;
        self.page
            .get_by_role(AriaRole::Link)
            .named(TextMatch::regex_ci("resume"))
            .click()
            .await?;
        self.page.wait_for_load_state(LoadState::Load).await
    }

    /// Whether the player shows the course overview lesson
    #[must_use]
    pub fn is_on_lessons_page(&self) -> bool {
        self.page.url_contains(urls::student::AZURE_DOTNET_LESSONS)
    }

    /// [`MODULE_NAMES`] entries the TOC does not mention
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn missing_modules(&self) -> PageKitResult<Vec<&'static str>> {
        let toc = self.table_of_contents.text_content().await?;
        Ok(MODULE_NAMES
            .iter()
            .copied()
            .filter(|name| !toc.contains(name))
            .collect())
    }

    /// Expand module `name` in the TOC
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_module(&self, name: &str) -> PageKitResult<()> {
        info!(module = name, "expanding module");
        self.table_of_contents
            .locator("button.section-title")
            .has_text(TextMatch::exact(name))
            .click()
            .await?;
        self.page.wait_for_timeout(self.settle).await;
        Ok(())
    }

    /// Lesson entries currently shown
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn visible_lessons_count(&self) -> PageKitResult<usize> {
        let lessons = self.lesson_items.all().await?;
        Ok(lessons.iter().filter(|l| l.visible).count())
    }

    /// Assert the main bar
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_navigation_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_main_nav_visible().await
    }

    /// Assert the lesson header and the course title
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_page_header_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("lesson header", &self.page)
            .all_visible([
                &self.page_header,
                &self.introduction_label,
                &self.course_overview_heading,
                &self.course_title,
            ])
            .verify()
            .await
    }

    /// Assert the TOC and its heading
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_toc_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("table of contents", &self.page)
            .all_visible([&self.table_of_contents, &self.toc_heading])
            .verify()
            .await
    }

    /// Assert the TOC names every [`MODULE_NAMES`] entry
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] listing the missing modules.
    pub async fn expect_all_modules_in_toc(&self) -> PageKitResult<()> {
        let missing = self.missing_modules().await?;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PageKitError::AssertionFailed {
                message: format!("modules missing from the table of contents: {missing:?}"),
            })
        }
    }

    /// Assert an expanded module shows lessons, each with a play icon,
    /// title and duration
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_lessons_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("module lessons", &self.page)
            .count_at_least(&self.lesson_items, 1)
            .count_at_least(&self.lesson_play_icons, 1)
            .count_at_least(&self.lesson_titles, 1)
            .count_at_least(&self.lesson_durations, 1)
            .verify()
            .await
    }

    /// Assert supplements, the GitHub link and mentoring
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_supplements_section_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("lesson supplements", &self.page)
            .all_visible([
                &self.supplements_heading,
                &self.supplements_github_link,
                &self.request_mentoring_btn,
            ])
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

    /// Assert the whole player, top to bottom
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_lessons_page_complete(&self) -> PageKitResult<()> {
        self.expect_navigation_visible().await?;
        self.expect_page_header_visible().await?;
        self.expect_toc_visible().await?;
        self.expect_all_modules_in_toc().await?;
        self.expect_supplements_section_visible().await?;
        self.expect_all_footer_links_visible().await
    }
}

impl PageObject for StudentCourseLessons {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::student::AZURE_DOTNET_LESSONS
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
