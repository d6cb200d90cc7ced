//! Course details of "Python Foundations": the hero, the Storm AI tutor and
//! the supplements panel.

use crate::student::{StudentFooter, StudentNavigation};
use crate::urls;
use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};

/// Supplements the course ships
pub const SUPPLEMENTS: [&str; 2] = ["Class Slides", "Python Foundations Code Samples"];

/// `/stormwind-developer/python/python-foundations`
#[derive(Debug)]
pub struct StudentCourseDetailsSupplements {
    page: Page,
    /// Navigation and sidebar
    pub navigation: StudentNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// "Python" category
    pub hero_category: Locator,
    /// Course title heading
    pub hero_title: Locator,
    /// "Beginner"
    pub hero_level: Locator,
    /// "10 hours"
    pub hero_duration: Locator,
    /// "By: Edem Francois"
    pub hero_instructor: Locator,
    /// "ADD TO CLASSROOM"
    pub add_to_classroom_btn: Locator,
    /// Preview link of the hero
    pub view_preview_btn: Locator,
    /// `#stormAIButton`
    pub storm_ai_tutor_btn: Locator,
    /// Tutor caption
    pub storm_ai_tutor_text: Locator,
    /// `.course-supplements`
    pub supplements_container: Locator,
    /// Panel heading
    pub supplements_heading: Locator,
    /// Number next to the heading
    pub supplements_counter: Locator,
    /// One entry per [`SUPPLEMENTS`] item
    pub supplement_links: Vec<Locator>,
    /// "Overview" heading
    pub overview_heading: Locator,
    /// `h5.overview` "Modules"
    pub modules_heading: Locator,
}

impl StudentCourseDetailsSupplements {
    /// Course page over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let hero = page.locator(".course-hero");
        let supplements = page.locator(".course-supplements");
        Self {
            page: page.clone(),
            navigation: StudentNavigation::new(page),
            footer: StudentFooter::new(page),
            hero_category: page
                .locator(".letter-spacing-lg")
                .has_text(TextMatch::exact("Python")),
            hero_title: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::exact("Python Foundations"))
                .first(),
            hero_level: hero.get_by_text(TextMatch::exact("Beginner")),
            hero_duration: hero.get_by_text(TextMatch::exact("10 hours")),
            hero_instructor: hero.get_by_text("By: Edem Francois"),
            add_to_classroom_btn: page
                .get_by_role(AriaRole::Button)
                .named(TextMatch::regex_ci("add to classroom")),
            view_preview_btn: page.locator("a.js-course-preview-link"),
            storm_ai_tutor_btn: page.locator("#stormAIButton"),
            storm_ai_tutor_text: page.locator(".storm-ai-text"),
            supplements_heading: supplements.locator("h6"),
            supplements_counter: supplements.locator(".supplements-counter"),
            supplement_links: SUPPLEMENTS
                .iter()
                .map(|name| {
                    supplements
                        .locator("li.list-group-item")
                        .has_text(TextMatch::exact(*name))
                })
                .collect(),
            supplements_container: supplements,
            overview_heading: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::exact("Overview")),
            modules_heading: page.locator("h5.overview").has_text("Modules"),
        }
    }

    /// Number the counter shows
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when the counter holds no number.
    pub async fn supplements_count(&self) -> PageKitResult<usize> {
        let text = self.supplements_counter.text_content().await?;
        parse_count(&text).ok_or_else(|| PageKitError::AssertionFailed {
            message: format!("supplements counter is not a number: {text:?}"),
        })
    }

    /// Assert the main bar
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_navigation_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_main_nav_visible().await
    }

    /// Assert the hero, its add button and the preview link
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
                &self.view_preview_btn,
            ])
            .verify()
            .await
    }

    /// Assert the tutor button and caption
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_storm_ai_tutor_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("storm ai tutor", &self.page)
            .all_visible([&self.storm_ai_tutor_btn, &self.storm_ai_tutor_text])
            .verify()
            .await
    }

    /// Assert the panel, its counter and every [`SUPPLEMENTS`] entry
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_all_supplements_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("course supplements", &self.page)
            .all_visible([
                &self.supplements_container,
                &self.supplements_heading,
                &self.supplements_counter,
            ])
            .all_visible(&self.supplement_links)
            .verify()
            .await
    }

    /// Assert "Overview" and "Modules"
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_overview_and_modules_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("course outline", &self.page)
            .all_visible([&self.overview_heading, &self.modules_heading])
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

/// Leading digits of `text`, surrounding whitespace ignored
fn parse_count(text: &str) -> Option<usize> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

impl PageObject for StudentCourseDetailsSupplements {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::student::PYTHON_FOUNDATIONS_COURSE
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_reads_leading_digits() {
        assert_eq!(parse_count(" 2 "), Some(2));
        assert_eq!(parse_count("12 files"), Some(12));
        assert_eq!(parse_count("none"), None);
        assert_eq!(parse_count(""), None);
    }
}
