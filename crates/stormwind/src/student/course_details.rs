//! Course details of "Coding with AI (Copilot)" and its add/remove flow.

use crate::student::{StudentFooter, StudentNavigation};
use crate::urls;
use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch, WaitState};
use tracing::info;

/// Modules and their lessons, in page order
pub const MODULES: [(&str, &[&str]); 3] = [
    (
        "Getting Started with Copilot",
        &[
            "Tools, Models & Copilot Setup",
            "Vibe Coding with Bolt",
            "Copilot Basics",
            "Copilot Edit & Agent Modes",
        ],
    ),
    (
        "Context and Project Application",
        &[
            "Context",
            "Making a Next.js Site with Copilot",
            "Instruction Files",
            "The Importance of Git",
        ],
    ),
    (
        "Server Setup, Features, and Wrap-Up",
        &["MCP Servers", "Adding a Feature List", "Final Thoughts"],
    ),
];

/// Supplement links
pub const SUPPLEMENTS: [&str; 4] = [
    "Download VS Code",
    "Copilot Plans",
    "VS Code Copilot Documentation",
    "VS Code Copilot Models",
];

/// `/stormwind-developer/ai-and-chatgpt/coding-ai-copilot`
#[derive(Debug)]
pub struct StudentCourseDetails {
    page: Page,
    /// Navigation and sidebar
    pub navigation: StudentNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// "AI AND CHATGPT"
    pub hero_category: Locator,
    /// Course title heading
    pub hero_title: Locator,
    /// "Beginner"
    pub hero_level: Locator,
    /// "1 hour"
    pub hero_duration: Locator,
    /// "By: Shaun Pelling"
    pub hero_instructor: Locator,
    /// Shown while the course is not in the classroom
    pub add_to_classroom_btn: Locator,
    /// "N% complete", once added
    pub progress_complete: Locator,
    /// "START", once added
    pub start_btn: Locator,
    /// Removes the course again
    pub checkmark_btn: Locator,
    /// "Overview" heading
    pub overview_heading: Locator,
    /// Overview paragraph
    pub overview_text: Locator,
    /// "Modules" heading
    pub modules_heading: Locator,
    /// "Supplements" heading
    pub supplements_heading: Locator,
}

impl StudentCourseDetails {
    /// Course page over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let hero = page.locator(".course-hero");
        Self {
            page: page.clone(),
            navigation: StudentNavigation::new(page),
            footer: StudentFooter::new(page),
            hero_category: hero.get_by_text(TextMatch::exact("AI AND CHATGPT")),
            hero_title: hero
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::exact("Coding with AI (Copilot)")),
            hero_level: hero.get_by_text(TextMatch::exact("Beginner")),
            hero_duration: hero.get_by_text(TextMatch::exact("1 hour")),
            hero_instructor: hero.get_by_text("By: Shaun Pelling"),
            add_to_classroom_btn: page
                .get_by_role(AriaRole::Button)
                .named(TextMatch::regex_ci("add to classroom")),
            progress_complete: page.get_by_text(TextMatch::regex(r"\d+% complete")),
            start_btn: page
                .get_by_role(AriaRole::Link)
                .named(TextMatch::regex_ci("^start")),
            checkmark_btn: page.locator("button.btn-circle.js-course-flag"),
            overview_heading: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::exact("Overview")),
            overview_text: page
                .locator("p")
                .has_text(TextMatch::regex(r"Coding with AI \(Copilot\) introduces learners")),
            modules_heading: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::exact("Modules")),
            supplements_heading: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::regex("Supplements")),
        }
    }

    /// Heading of module `name`
    #[must_use]
    pub fn module_heading(&self, name: &str) -> Locator {
        self.page
            .get_by_role(AriaRole::Heading)
            .named(TextMatch::exact(name))
    }

    /// Lesson titled `name`
    #[must_use]
    pub fn lesson(&self, name: &str) -> Locator {
        self.page.get_by_text(TextMatch::exact(name))
    }

    /// Take the course out of the classroom if an earlier run left it there
    ///
    /// # Errors
    ///
    /// Locator errors, or [`PageKitError::Timeout`] when the add button
    /// never comes back.
    pub async fn remove_if_added(&self) -> PageKitResult<()> {
        if self.start_btn.is_visible().await? {
            info!("course already in classroom, removing");
            self.click_checkmark_button().await?;
            self.wait_for_add_to_classroom_button().await?;
        }
        Ok(())
    }

    /// Add the course to the classroom
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_add_to_classroom(&self) -> PageKitResult<()> {
        info!("adding course to classroom");
        self.add_to_classroom_btn.click().await
    }

    /// Wait until the course shows as added
    ///
    /// # Errors
    ///
    /// [`PageKitError::Timeout`] when "START" never shows.
    pub async fn wait_for_start_button(&self) -> PageKitResult<()> {
        self.start_btn.wait_for(WaitState::Visible, None).await
    }

    /// Open the first lesson
    ///
    /// # Errors
    ///
    /// Locator or navigation errors.
    pub async fn click_start_button(&self) -> PageKitResult<()> {
        self.start_btn.click().await?;
        self.page.wait_for_load_state(LoadState::Load).await
    }

    /// Remove the course from the classroom
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_checkmark_button(&self) -> PageKitResult<()> {
        info!("removing course from classroom");
        self.checkmark_btn.click().await
    }

    /// Wait until the course shows as not added
    ///
    /// # Errors
    ///
    /// [`PageKitError::Timeout`] when the add button never shows.
    pub async fn wait_for_add_to_classroom_button(&self) -> PageKitResult<()> {
        self.add_to_classroom_btn
            .wait_for(WaitState::Visible, None)
            .await
    }

    /// Assert the main bar
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_navigation_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_main_nav_visible().await
    }

    /// Assert category, title, level, duration, instructor and the add button
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_hero_banner_complete(&self) -> PageKitResult<()> {
        SectionCheck::new("course hero", &self.page)
            .all_visible([
                &self.hero_category,
                &self.hero_title,
                &self.hero_level,
                &self.hero_duration,
                &self.hero_instructor,
                &self.add_to_classroom_btn,
            ])
            .verify()
            .await
    }

    /// Assert the add button
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_add_to_classroom_btn_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.add_to_classroom_btn).await
    }

    /// Assert the overview heading and paragraph
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_overview_section_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("course overview", &self.page)
            .all_visible([&self.overview_heading, &self.overview_text])
            .verify()
            .await
    }

    /// Assert the "Modules" heading and every module with its lessons
    ///
    /// # Errors
    ///
    /// The first missing module or lesson.
    pub async fn expect_all_modules_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.modules_heading).await?;
        for (module, lessons) in MODULES {
            let lessons: Vec<Locator> = lessons.iter().map(|l| self.lesson(l)).collect();
            SectionCheck::new(module, &self.page)
                .visible(&self.module_heading(module))
                .all_visible(&lessons)
                .verify()
                .await?;
        }
        Ok(())
    }

    /// Assert the supplements heading and every [`SUPPLEMENTS`] link
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_supplements_section_visible(&self) -> PageKitResult<()> {
        let links: Vec<Locator> = SUPPLEMENTS.iter().map(|s| self.lesson(s)).collect();
        SectionCheck::new("course supplements", &self.page)
            .visible(&self.supplements_heading)
            .all_visible(&links)
            .verify()
            .await
    }

    /// Assert progress, "START" and the checkmark
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_course_added_to_classroom(&self) -> PageKitResult<()> {
        SectionCheck::new("course in classroom", &self.page)
            .all_visible([&self.progress_complete, &self.start_btn, &self.checkmark_btn])
            .hidden(&self.add_to_classroom_btn)
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

impl PageObject for StudentCourseDetails {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::student::COPILOT_COURSE
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lessons_are_unique_across_modules() {
        let mut lessons: Vec<&str> = MODULES.iter().flat_map(|(_, l)| l.iter().copied()).collect();
        let total = lessons.len();
        lessons.sort_unstable();
        lessons.dedup();
        assert_eq!(lessons.len(), total);
        assert_eq!(total, 11);
    }
}
