//! Quick student suites: navigation, sidebar dialogs, catalogues, the
//! course supplements panel and the partner tabs.

use super::ensure;
use crate::fixtures::{
    STUDENT_CONTACT_SUPPORT_MODAL, STUDENT_COURSE_DETAILS_SUPPLEMENTS, STUDENT_LEARNING_PATHS,
    STUDENT_MY_CLASSROOM, STUDENT_NAVIGATION, STUDENT_NEWSLETTER, STUDENT_WEBINARS,
};
use crate::student::{
    ContactSupportModal, StudentCourseDetailsSupplements, StudentLearningPaths,
    StudentMyClassroom, StudentNavigation, StudentNewsletter, StudentWebinars,
};
use crate::urls;
use pagekit::prelude::*;
use std::sync::Arc;

const NAVIGATION: &str = "student/navigation";
const CONTACT_SUPPORT: &str = "student/contact-support-modal";
const LEARNING_PATHS: &str = "student/learning-paths";
const NEWSLETTER: &str = "student/newsletter";
const WEBINARS: &str = "student/webinars";
const COURSE_SUPPLEMENTS: &str = "student/course-details-supplements";

/// Path the student searches for in the learning path catalogue
pub(crate) const SANTIAGO_TEST_PATH: &str = "Learning Path Santiago Test 1";

pub(super) fn catalogue() -> ScenarioCatalogue {
    let mut catalogue = navigation();
    catalogue.extend(contact_support());
    catalogue.extend(learning_paths());
    catalogue.extend(newsletter());
    catalogue.extend(webinars());
    catalogue.extend(course_supplements());
    catalogue
}

async fn classroom(scope: &FixtureScope) -> PageKitResult<Arc<StudentMyClassroom>> {
    let classroom = scope.get::<StudentMyClassroom>(STUDENT_MY_CLASSROOM).await?;
    classroom.navigate_from_nav().await?;
    Ok(classroom)
}

macro_rules! follows_link {
    ($name:expr, $method:ident, $marker:expr) => {
        Scenario::new(NAVIGATION, $name, |scope| async move {
            let navigation = scope.get::<StudentNavigation>(STUDENT_NAVIGATION).await?;
            navigation.$method().await?;
            navigation.page().assert_url_contains($marker).await
        })
        .uses(&[STUDENT_NAVIGATION])
    };
}

fn navigation() -> ScenarioCatalogue {
    ScenarioCatalogue::new()
        .with(
            Scenario::new(NAVIGATION, "should display main navigation tabs", |scope| async move {
                let navigation = scope.get::<StudentNavigation>(STUDENT_NAVIGATION).await?;
                navigation.expect_main_nav_visible().await
            })
            .uses(&[STUDENT_NAVIGATION]),
        )
        .with(follows_link!(
            "should navigate to My Classroom",
            navigate_to_my_classroom,
            urls::student::MY_CLASSROOM_MARKER
        ))
        .with(follows_link!(
            "should navigate to Courses",
            navigate_to_courses,
            urls::student::TOPICS
        ))
        .with(follows_link!(
            "should navigate to Learning Paths",
            navigate_to_learning_paths,
            "learningpaths"
        ))
        .with(follows_link!(
            "should navigate to Skills Assessments",
            navigate_to_skills_assessments,
            "assessment"
        ))
        .with(follows_link!(
            "should navigate to Leaderboard",
            navigate_to_leaderboard,
            "leaderboard"
        ))
        .with(
            Scenario::new(NAVIGATION, "should display sidebar links", |scope| async move {
                let navigation = scope.get::<StudentNavigation>(STUDENT_NAVIGATION).await?;
                navigation.expect_sidebar_links_visible().await
            })
            .uses(&[STUDENT_NAVIGATION]),
        )
}

fn contact_support() -> ScenarioCatalogue {
    ScenarioCatalogue::new()
        .with(
            Scenario::new(
                CONTACT_SUPPORT,
                "should remain on same page when clicking Contact Support",
                |scope| async move {
                    let classroom = classroom(&scope).await?;
                    let dialog = scope
                        .get::<ContactSupportModal>(STUDENT_CONTACT_SUPPORT_MODAL)
                        .await?;
                    let before = classroom.page().current_url();
                    dialog.open_modal().await?;
                    let after = classroom.page().current_url();
                    ensure(before == after, format!("URL changed from {before} to {after}"))
                },
            )
            .uses(&[STUDENT_MY_CLASSROOM, STUDENT_CONTACT_SUPPORT_MODAL]),
        )
        .with(
            Scenario::new(
                CONTACT_SUPPORT,
                "should open modal with title and subtitle",
                |scope| async move {
                    classroom(&scope).await?;
                    let dialog = scope
                        .get::<ContactSupportModal>(STUDENT_CONTACT_SUPPORT_MODAL)
                        .await?;
                    dialog.open_modal().await?;
                    let page = dialog.page();
                    page.assert_visible(&dialog.title).await?;
                    page.assert_visible(&dialog.subtitle).await
                },
            )
            .uses(&[STUDENT_MY_CLASSROOM, STUDENT_CONTACT_SUPPORT_MODAL]),
        )
        .with(
            Scenario::new(
                CONTACT_SUPPORT,
                "should allow entering text in the message textbox",
                |scope| async move {
                    classroom(&scope).await?;
                    let dialog = scope
                        .get::<ContactSupportModal>(STUDENT_CONTACT_SUPPORT_MODAL)
                        .await?;
                    dialog.open_modal().await?;
                    dialog.fill_message("testing text").await?;
                    dialog
                        .page()
                        .assert_value(&dialog.message_textbox, "testing text")
                        .await
                },
            )
            .uses(&[STUDENT_MY_CLASSROOM, STUDENT_CONTACT_SUPPORT_MODAL]),
        )
        .with(
            Scenario::new(
                CONTACT_SUPPORT,
                "should verify all modal elements are displayed",
                |scope| async move {
                    classroom(&scope).await?;
                    let dialog = scope
                        .get::<ContactSupportModal>(STUDENT_CONTACT_SUPPORT_MODAL)
                        .await?;
                    dialog.open_modal().await?;
                    dialog.verify_modal_opened().await
                },
            )
            .uses(&[STUDENT_MY_CLASSROOM, STUDENT_CONTACT_SUPPORT_MODAL]),
        )
        .with(
            Scenario::new(
                CONTACT_SUPPORT,
                "should close modal when clicking close button",
                |scope| async move {
                    classroom(&scope).await?;
                    let dialog = scope
                        .get::<ContactSupportModal>(STUDENT_CONTACT_SUPPORT_MODAL)
                        .await?;
                    dialog.open_modal().await?;
                    dialog.close_modal().await?;
                    dialog.expect_modal_closed().await
                },
            )
            .uses(&[STUDENT_MY_CLASSROOM, STUDENT_CONTACT_SUPPORT_MODAL]),
        )
}

fn learning_paths() -> ScenarioCatalogue {
    ScenarioCatalogue::new().with(
        Scenario::new(
            LEARNING_PATHS,
            "should validate Learning Paths page elements, search, modal and footer",
            |scope| async move {
                let paths = scope
                    .get::<StudentLearningPaths>(STUDENT_LEARNING_PATHS)
                    .await?;
                paths.goto().await?;
                ensure(
                    paths.is_on_correct_url(),
                    format!("unexpected URL {}", paths.page().current_url()),
                )?;
                paths.expect_all_filters_visible().await?;
                paths.expect_learning_path_cards_visible().await?;
                paths.search_learning_path(SANTIAGO_TEST_PATH).await?;
                paths
                    .page()
                    .assert_value(&paths.search_input, SANTIAGO_TEST_PATH)
                    .await?;
                paths
                    .expect_learning_path_card_visible(SANTIAGO_TEST_PATH)
                    .await?;
                paths.open_learning_path_modal(SANTIAGO_TEST_PATH).await?;
                paths
                    .preview
                    .expect_all_elements_visible(SANTIAGO_TEST_PATH)
                    .await?;
                paths.close_modal().await?;
                paths.preview.expect_hidden().await?;
                paths.expect_all_footer_links_visible().await
            },
        )
        .uses(&[STUDENT_LEARNING_PATHS]),
    )
}

fn newsletter() -> ScenarioCatalogue {
    ScenarioCatalogue::new()
        .with(
            Scenario::new(NEWSLETTER, "should open newsletter in new tab", |scope| async move {
                let newsletter = scope.get::<StudentNewsletter>(STUDENT_NEWSLETTER).await?;
                let navigation = scope.get::<StudentNavigation>(STUDENT_NAVIGATION).await?;
                navigation.navigate_to_my_classroom().await?;
                let tab = StudentNewsletter::open_from_sidebar(&navigation).await?;
                ensure(tab.is_on_correct_domain(), "newsletter is not on the partner host")?;
                ensure(tab.is_newsletter_url(), "newsletter URL is wrong")?;
                tab.close_tab().await?;
                ensure(
                    newsletter.page().url_contains(urls::student::MY_CLASSROOM_MARKER),
                    "opener left My Classroom",
                )
            })
            .uses(&[STUDENT_NEWSLETTER, STUDENT_NAVIGATION]),
        )
        .with(
            Scenario::new(
                NEWSLETTER,
                "should open newsletter from sidebar link",
                |scope| async move {
                    let classroom = classroom(&scope).await?;
                    let tab = StudentNewsletter::open_from_sidebar(&classroom.navigation).await?;
                    ensure(
                        tab.verify_newsletter_page_opened(),
                        format!("unexpected newsletter URL {}", tab.page().current_url()),
                    )?;
                    tab.close_tab().await
                },
            )
            .uses(&[STUDENT_MY_CLASSROOM]),
        )
}

async fn open_webinars(scope: &FixtureScope) -> PageKitResult<Arc<StudentWebinars>> {
    let webinars = scope.get::<StudentWebinars>(STUDENT_WEBINARS).await?;
    webinars.goto().await?;
    Ok(webinars)
}

fn webinars() -> ScenarioCatalogue {
    ScenarioCatalogue::new()
        .with(
            Scenario::new(
                WEBINARS,
                "should display webinars page with correct title",
                |scope| async move {
                    let webinars = open_webinars(&scope).await?;
                    webinars.page().assert_visible(&webinars.page_title).await
                },
            )
            .uses(&[STUDENT_WEBINARS]),
        )
        .with(
            Scenario::new(WEBINARS, "should be on correct URL", |scope| async move {
                let webinars = open_webinars(&scope).await?;
                ensure(
                    webinars.is_on_correct_url(),
                    format!("unexpected URL {}", webinars.page().current_url()),
                )
            })
            .uses(&[STUDENT_WEBINARS]),
        )
        .with(
            Scenario::new(WEBINARS, "should display search input", |scope| async move {
                let webinars = open_webinars(&scope).await?;
                webinars.expect_page_loaded().await
            })
            .uses(&[STUDENT_WEBINARS]),
        )
        .with(
            Scenario::new(WEBINARS, "should display webinar cards", |scope| async move {
                let webinars = open_webinars(&scope).await?;
                webinars.expect_webinar_cards_visible().await
            })
            .uses(&[STUDENT_WEBINARS]),
        )
        .with(
            Scenario::new(WEBINARS, "should allow searching for webinars", |scope| async move {
                let webinars = open_webinars(&scope).await?;
                webinars.search_webinar("Microsoft").await?;
                webinars.page().assert_visible(&webinars.page_title).await?;
                let title = webinars.first_webinar_title().await?;
                ensure(
                    title.to_lowercase().contains("microsoft"),
                    format!("first result {title:?} does not mention Microsoft"),
                )
            })
            .uses(&[STUDENT_WEBINARS]),
        )
        .with(
            Scenario::new(
                WEBINARS,
                "should navigate to webinars from sidebar",
                |scope| async move {
                    let classroom = classroom(&scope).await?;
                    classroom.navigation.click_webinars().await?;
                    classroom
                        .page()
                        .assert_url_contains(urls::student::WEBINARS)
                        .await
                },
            )
            .uses(&[STUDENT_MY_CLASSROOM]),
        )
}

fn course_supplements() -> ScenarioCatalogue {
    ScenarioCatalogue::new().with(
        Scenario::new(
            COURSE_SUPPLEMENTS,
            "should validate course banner, buttons, supplements section, and Storm AI Tutor",
            |scope| async move {
                let course = scope
                    .get::<StudentCourseDetailsSupplements>(STUDENT_COURSE_DETAILS_SUPPLEMENTS)
                    .await?;
                course.goto().await?;
                ensure(
                    course.is_on_correct_url(),
                    format!("unexpected URL {}", course.page().current_url()),
                )?;
                course.expect_navigation_visible().await?;
                course.expect_hero_banner_complete().await?;
                course.expect_storm_ai_tutor_visible().await?;
                course.expect_all_supplements_visible().await?;
                let count = course.supplements_count().await?;
                ensure(count == 2, format!("expected 2 supplements, counter shows {count}"))?;
                course.expect_overview_and_modules_visible().await?;
                course.expect_all_footer_links_visible().await
            },
        )
        .uses(&[STUDENT_COURSE_DETAILS_SUPPLEMENTS]),
    )
}
