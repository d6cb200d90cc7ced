//! Long walkthroughs, tagged `nightly`.
//!
//! Each one drives a whole screen end to end: the page chrome, the main
//! interaction, the dialog it opens and the footer. The learning path and
//! course details walkthroughs change server state and put it back before
//! they end.

use super::{ensure, NIGHTLY};
use crate::admin::{
    AdminAddUsers, AdminCourseDetails, AdminDashboard, AdminDueDates, ManageLearningPaths,
};
use crate::fixtures::{
    ADMIN_ADD_USERS, ADMIN_COURSE_DETAILS, ADMIN_DASHBOARD, ADMIN_DUE_DATES,
    ADMIN_MANAGE_LEARNING_PATHS, STUDENT_COURSES, STUDENT_COURSES_LIST, STUDENT_COURSE_DETAILS,
    STUDENT_COURSE_LESSONS, STUDENT_LEADERBOARD, STUDENT_LIVE_COURSE_CALENDAR,
    STUDENT_LIVE_SCHEDULE_MODAL, STUDENT_MY_CLASSROOM, STUDENT_NAVIGATION, STUDENT_SEND_IDEAS,
    STUDENT_SKILLS_ASSESSMENTS,
};
use crate::student::{
    LiveScheduleModal, StudentCourseDetails, StudentCourseLessons, StudentCourses,
    StudentCoursesList, StudentLeaderboard, StudentLiveCourseCalendar, StudentMyClassroom,
    StudentNavigation, StudentSendIdeas, StudentSkillsAssessments,
};
use crate::urls;
use pagekit::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const WALKTHROUGH_TIMEOUT: Duration = Duration::from_secs(180);

/// Learning path the archive round trip moves
pub(crate) const ROUND_TRIP_PATH: &str = "Mobile Manager Archived LP";
/// Student who already has a PL-300 due date
pub(crate) const SCHEDULED_STUDENT: &str = "Santiago Manager";
/// Student outside the course license
pub(crate) const UNLICENSED_STUDENT: &str = "Santiago contact 1";
/// Assessment the skills walkthrough searches for
pub(crate) const HARDWARE_ASSESSMENT: &str = "Computer Hardware Support";
/// Topic the catalogue walkthrough drills into
pub(crate) const CATALOGUE_TOPIC: &str = "Cybersecurity";
/// Subcategory chip of [`CATALOGUE_TOPIC`]
pub(crate) const CATALOGUE_CHIP: &str = "Palo Alto";
/// Course whose preview the catalogue walkthrough opens
pub(crate) const PREVIEWED_COURSE: &str = "Palo Alto Firewall Administration";
/// Module the lesson player expands
pub(crate) const EXPANDED_MODULE: &str = "Get Started with Microsoft Azure";

fn walkthrough<F, Fut>(suite: &str, name: &str, body: F) -> Scenario
where
    F: Fn(FixtureScope) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = PageKitResult<()>> + Send + 'static,
{
    Scenario::new(suite, name, body)
        .tagged(&[NIGHTLY])
        .with_timeout(WALKTHROUGH_TIMEOUT)
}

pub(super) fn catalogue() -> ScenarioCatalogue {
    let mut catalogue = admin();
    catalogue.extend(calendar());
    catalogue.extend(live_schedule());
    catalogue.extend(send_ideas());
    catalogue.extend(student());
    catalogue.extend(courses());
    catalogue
}

fn admin() -> ScenarioCatalogue {
    ScenarioCatalogue::new()
        .with(
            walkthrough(
                "admin/dashboard",
                "should display every dashboard section",
                |scope| async move {
                    let dashboard = scope.get::<AdminDashboard>(ADMIN_DASHBOARD).await?;
                    dashboard.goto().await?;
                    dashboard.expect_dashboard_page_complete().await
                },
            )
            .uses(&[ADMIN_DASHBOARD]),
        )
        .with(
            walkthrough(
                "admin/manage-learning-paths",
                "should archive and publish a learning path",
                |scope| async move {
                    let paths = scope
                        .get::<ManageLearningPaths>(ADMIN_MANAGE_LEARNING_PATHS)
                        .await?;
                    paths.goto().await?;
                    paths.expect_page_metadata_visible().await?;
                    paths
                        .expect_in_active_paths_with_buttons(ROUND_TRIP_PATH)
                        .await?;

                    paths.click_archive(ROUND_TRIP_PATH).await?;
                    paths.expect_only_archived(ROUND_TRIP_PATH).await?;

                    paths.click_publish(ROUND_TRIP_PATH).await?;
                    paths.expect_only_active(ROUND_TRIP_PATH).await?;
                    paths.footer.expect_all_footer_links_visible().await
                },
            )
            .uses(&[ADMIN_MANAGE_LEARNING_PATHS]),
        )
        .with(
            walkthrough(
                "admin/course-details",
                "should warn about due dates and reject unlicensed students",
                |scope| async move {
                    let course = scope
                        .get::<AdminCourseDetails>(ADMIN_COURSE_DETAILS)
                        .await?;
                    course.goto_pl300_course().await?;
                    course.expect_navigation_visible().await?;
                    course.expect_hero_title_visible().await?;
                    course.expect_assign_course_button_visible().await?;
                    course.expect_overview_section_visible().await?;

                    course.click_assign_course().await?;
                    let dialog = &course.assign_course_modal;
                    dialog.expect_modal_visible().await?;

                    dialog.search_students("santi").await?;
                    dialog.select_student(SCHEDULED_STUDENT).await?;
                    dialog.set_student_due_date_to_today(SCHEDULED_STUDENT).await?;
                    dialog.expect_warning_message_visible(SCHEDULED_STUDENT).await?;
                    let warning = dialog.warning_message_text().await?;
                    ensure(
                        warning.contains("already have a due date"),
                        format!("unexpected warning {warning:?}"),
                    )?;
                    dialog.clear_student_due_date(SCHEDULED_STUDENT).await?;
                    dialog.expect_warning_message_hidden().await?;
                    dialog.deselect_student(SCHEDULED_STUDENT).await?;

                    dialog.search_students("Santiago contact").await?;
                    dialog.select_student(UNLICENSED_STUDENT).await?;
                    dialog.click_assign_course().await?;
                    dialog.expect_error_message_visible().await?;
                    let error = dialog.error_message_text().await?;
                    ensure(
                        error.contains("cannot be assigned")
                            && error.contains("not included in the license"),
                        format!("unexpected error {error:?}"),
                    )?;
                    course.expect_all_footer_links_visible().await
                },
            )
            .uses(&[ADMIN_COURSE_DETAILS]),
        )
        .with(
            walkthrough(
                "admin/add-users",
                "should display the invitation form and add a row",
                |scope| async move {
                    let users = scope.get::<AdminAddUsers>(ADMIN_ADD_USERS).await?;
                    users.goto().await?;
                    users.expect_add_users_page_complete().await?;
                    let before = users.invitation_rows().await?;
                    users.click_add_row().await?;
                    let after = users.invitation_rows().await?;
                    ensure(
                        after == before + 1,
                        format!("expected {} invitation rows, found {after}", before + 1),
                    )
                },
            )
            .uses(&[ADMIN_ADD_USERS]),
        )
        .with(
            walkthrough(
                "admin/due-dates",
                "should display every due dates section",
                |scope| async move {
                    let due_dates = scope.get::<AdminDueDates>(ADMIN_DUE_DATES).await?;
                    due_dates.goto().await?;
                    due_dates.expect_due_dates_page_complete().await
                },
            )
            .uses(&[ADMIN_DUE_DATES]),
        )
}

/// Open the calendar tab from the classroom sidebar
async fn open_calendar(
    scope: &FixtureScope,
) -> PageKitResult<(Arc<StudentLiveCourseCalendar>, StudentLiveCourseCalendar)> {
    let opener = scope
        .get::<StudentLiveCourseCalendar>(STUDENT_LIVE_COURSE_CALENDAR)
        .await?;
    opener.navigation.navigate_to_my_classroom().await?;
    let tab = StudentLiveCourseCalendar::open_from_sidebar(&opener.navigation).await?;
    tab.page().wait_for_load_state(LoadState::DomContentLoaded).await?;
    Ok((opener, tab))
}

async fn step_month(
    calendar: &StudentLiveCourseCalendar,
    step: impl std::future::Future<Output = PageKitResult<()>>,
) -> PageKitResult<()> {
    let before = calendar.month_year_heading.text_content().await?;
    step.await?;
    calendar
        .page()
        .wait_for_load_state(LoadState::DomContentLoaded)
        .await?;
    let after = calendar.month_year_heading.text_content().await?;
    ensure(
        before != after,
        format!("calendar stayed on {}", before.trim()),
    )
}

fn calendar() -> ScenarioCatalogue {
    const SUITE: &str = "student/live-course-calendar";
    ScenarioCatalogue::new()
        .with(
            walkthrough(SUITE, "should open calendar in new tab", |scope| async move {
                let (opener, tab) = open_calendar(&scope).await?;
                ensure(
                    tab.is_on_correct_url(),
                    format!("unexpected calendar URL {}", tab.page().current_url()),
                )?;
                tab.close_tab().await?;
                ensure(
                    opener.page().url_contains(urls::student::MY_CLASSROOM_MARKER),
                    "opener left My Classroom",
                )
            })
            .uses(&[STUDENT_LIVE_COURSE_CALENDAR]),
        )
        .with(
            walkthrough(SUITE, "should display calendar page elements", |scope| async move {
                let (_, tab) = open_calendar(&scope).await?;
                tab.verify_calendar_page_elements().await?;
                tab.close_tab().await
            })
            .uses(&[STUDENT_LIVE_COURSE_CALENDAR]),
        )
        .with(
            walkthrough(SUITE, "should return to the current month", |scope| async move {
                let (_, tab) = open_calendar(&scope).await?;
                let current = tab.month_year_heading.text_content().await?;
                tab.click_next().await?;
                tab.click_today().await?;
                tab.page()
                    .assert_text_contains(&tab.month_year_heading, current.trim())
                    .await?;
                tab.close_tab().await
            })
            .uses(&[STUDENT_LIVE_COURSE_CALENDAR]),
        )
        .with(
            walkthrough(SUITE, "should step between months", |scope| async move {
                let (_, tab) = open_calendar(&scope).await?;
                step_month(&tab, tab.click_previous()).await?;
                step_month(&tab, tab.click_next()).await?;
                step_month(&tab, tab.click_next()).await?;
                tab.close_tab().await
            })
            .uses(&[STUDENT_LIVE_COURSE_CALENDAR]),
        )
        .with(
            walkthrough(SUITE, "should display footer", |scope| async move {
                let (_, tab) = open_calendar(&scope).await?;
                tab.expect_footer_visible().await?;
                tab.close_tab().await
            })
            .uses(&[STUDENT_LIVE_COURSE_CALENDAR]),
        )
}

async fn open_live_schedule(
    scope: &FixtureScope,
) -> PageKitResult<Arc<LiveScheduleModal>> {
    let classroom = scope.get::<StudentMyClassroom>(STUDENT_MY_CLASSROOM).await?;
    classroom.navigate_from_nav().await?;
    let dialog = scope
        .get::<LiveScheduleModal>(STUDENT_LIVE_SCHEDULE_MODAL)
        .await?;
    dialog.open_modal().await?;
    Ok(dialog)
}

fn live_schedule() -> ScenarioCatalogue {
    const SUITE: &str = "student/live-schedule-modal";
    ScenarioCatalogue::new()
        .with(
            walkthrough(SUITE, "should stay on My Classroom", |scope| async move {
                let dialog = open_live_schedule(&scope).await?;
                ensure(
                    dialog.is_on_my_classroom_url(),
                    "opening the schedule navigated away",
                )
            })
            .uses(&[STUDENT_MY_CLASSROOM, STUDENT_LIVE_SCHEDULE_MODAL]),
        )
        .with(
            walkthrough(SUITE, "should open the schedule dialog", |scope| async move {
                let dialog = open_live_schedule(&scope).await?;
                dialog.verify_modal_opened().await
            })
            .uses(&[STUDENT_MY_CLASSROOM, STUDENT_LIVE_SCHEDULE_MODAL]),
        )
        .with(
            walkthrough(SUITE, "should show the empty schedule", |scope| async move {
                let dialog = open_live_schedule(&scope).await?;
                dialog.expect_no_sessions_message_visible().await
            })
            .uses(&[STUDENT_MY_CLASSROOM, STUDENT_LIVE_SCHEDULE_MODAL]),
        )
        .with(
            walkthrough(SUITE, "should close the schedule dialog", |scope| async move {
                let dialog = open_live_schedule(&scope).await?;
                dialog.close_modal().await?;
                dialog.expect_modal_closed().await?;
                ensure(!dialog.is_modal_open().await?, "dialog still reports open")
            })
            .uses(&[STUDENT_MY_CLASSROOM, STUDENT_LIVE_SCHEDULE_MODAL]),
        )
}

async fn open_send_ideas(
    scope: &FixtureScope,
) -> PageKitResult<(Arc<StudentSendIdeas>, StudentSendIdeas)> {
    let opener = scope.get::<StudentSendIdeas>(STUDENT_SEND_IDEAS).await?;
    let navigation = scope.get::<StudentNavigation>(STUDENT_NAVIGATION).await?;
    navigation.navigate_to_my_classroom().await?;
    let tab = StudentSendIdeas::open_from_sidebar(&navigation).await?;
    Ok((opener, tab))
}

fn send_ideas() -> ScenarioCatalogue {
    const SUITE: &str = "student/send-ideas";
    ScenarioCatalogue::new()
        .with(
            walkthrough(SUITE, "should open the feedback board in new tab", |scope| async move {
                let (opener, tab) = open_send_ideas(&scope).await?;
                ensure(
                    tab.is_on_send_ideas_page(),
                    format!("unexpected feedback URL {}", tab.page().current_url()),
                )?;
                tab.verify_page_loaded().await?;
                tab.close_tab().await?;
                ensure(
                    opener.page().url_contains(urls::student::MY_CLASSROOM_MARKER),
                    "opener left My Classroom",
                )
            })
            .uses(&[STUDENT_SEND_IDEAS, STUDENT_NAVIGATION]),
        )
        .with(
            walkthrough(SUITE, "should list the feedback categories", |scope| async move {
                let (_, tab) = open_send_ideas(&scope).await?;
                tab.expect_header_nav_visible().await?;
                tab.expect_categories_visible().await?;
                tab.close_tab().await
            })
            .uses(&[STUDENT_SEND_IDEAS, STUDENT_NAVIGATION]),
        )
}

fn student() -> ScenarioCatalogue {
    ScenarioCatalogue::new()
        .with(
            walkthrough(
                "student/my-classroom",
                "should validate My Classroom tabs, sidebar and footer",
                |scope| async move {
                    let classroom = scope.get::<StudentMyClassroom>(STUDENT_MY_CLASSROOM).await?;
                    classroom.navigate_from_nav().await?;
                    classroom.expect_welcome_message_visible().await?;
                    classroom.expect_tabs_visible().await?;
                    classroom.click_learning_paths_tab().await?;
                    classroom.click_skills_assessment_tab().await?;
                    classroom.click_courses_tab().await?;
                    classroom.expect_sidebar_links_visible().await?;
                    classroom.expect_all_footer_links_visible().await
                },
            )
            .uses(&[STUDENT_MY_CLASSROOM]),
        )
        .with(
            walkthrough(
                "student/leaderboard",
                "should validate leaderboard podium, table and export dialog",
                |scope| async move {
                    let leaderboard = scope
                        .get::<StudentLeaderboard>(STUDENT_LEADERBOARD)
                        .await?;
                    leaderboard.navigate_from_nav().await?;
                    leaderboard
                        .page()
                        .assert_url_contains(urls::student::LEADERBOARD)
                        .await?;
                    leaderboard.expect_page_heading_visible().await?;
                    leaderboard.expect_all_podium_cards_visible().await?;
                    let podium = leaderboard.podium_cards_count().await?;
                    ensure(podium == 3, format!("expected 3 podium cards, found {podium}"))?;
                    leaderboard.expect_all_table_headers_visible().await?;
                    leaderboard.expect_table_has_rows().await?;

                    leaderboard.click_export_chart().await?;
                    leaderboard.expect_export_modal_visible().await?;
                    leaderboard.close_export_modal().await?;
                    leaderboard.expect_export_modal_hidden().await?;
                    leaderboard.expect_all_footer_links_visible().await
                },
            )
            .uses(&[STUDENT_LEADERBOARD]),
        )
        .with(
            walkthrough(
                "student/skills-assessments",
                "should search and preview a skills assessment",
                |scope| async move {
                    let skills = scope
                        .get::<StudentSkillsAssessments>(STUDENT_SKILLS_ASSESSMENTS)
                        .await?;
                    skills.goto().await?;
                    skills.expect_page_metadata_visible().await?;
                    skills.expect_navigation_visible().await?;
                    skills.expect_assessment_cards_visible().await?;

                    skills.search_assessment(HARDWARE_ASSESSMENT).await?;
                    let value = skills.search_value().await?;
                    ensure(
                        value == HARDWARE_ASSESSMENT,
                        format!("search box holds {value:?}"),
                    )?;
                    skills
                        .expect_assessment_card_visible(HARDWARE_ASSESSMENT)
                        .await?;

                    skills.open_assessment_modal(HARDWARE_ASSESSMENT).await?;
                    skills
                        .preview
                        .expect_all_elements_visible(HARDWARE_ASSESSMENT)
                        .await?;
                    skills.close_modal().await?;
                    skills.preview.expect_hidden().await?;
                    skills.expect_all_footer_links_visible().await
                },
            )
            .uses(&[STUDENT_SKILLS_ASSESSMENTS]),
        )
}

fn courses() -> ScenarioCatalogue {
    ScenarioCatalogue::new()
        .with(
            walkthrough(
                "student/courses",
                "should drill from topics into a filtered course preview",
                |scope| async move {
                    let topics = scope.get::<StudentCourses>(STUDENT_COURSES).await?;
                    topics.navigate_from_nav().await?;
                    ensure(
                        topics.is_on_correct_url(),
                        format!("unexpected topics URL {}", topics.page().current_url()),
                    )?;
                    topics.expect_page_heading_visible().await?;
                    topics.expect_topics_container_visible().await?;
                    topics.expect_topic_cards_visible().await?;
                    topics.expect_all_topic_categories_visible().await?;
                    topics.click_topic_card(CATALOGUE_TOPIC).await?;

                    let list = scope.get::<StudentCoursesList>(STUDENT_COURSES_LIST).await?;
                    list.expect_page_heading(CATALOGUE_TOPIC).await?;
                    list.expect_breadcrumb_visible().await?;
                    list.expect_search_input_visible().await?;
                    list.expect_chips_visible().await?;
                    list.expect_all_cybersecurity_chips_visible().await?;
                    list.expect_filters_heading_visible().await?;
                    list.expect_all_filters_visible().await?;
                    list.expect_course_cards_visible().await?;
                    let all = list.course_cards_count().await?;

                    list.click_chip(CATALOGUE_CHIP).await?;
                    list.expect_chip_active(CATALOGUE_CHIP).await?;
                    let narrowed = list.course_cards_count().await?;
                    ensure(
                        narrowed > 0 && narrowed < all,
                        format!("{CATALOGUE_CHIP} left {narrowed} of {all} cards"),
                    )?;

                    list.open_course_preview(PREVIEWED_COURSE).await?;
                    list.expect_course_preview(PREVIEWED_COURSE).await?;
                    list.close_course_preview().await?;
                    list.preview.expect_hidden().await?;
                    list.expect_all_footer_links_visible().await
                },
            )
            .uses(&[STUDENT_COURSES, STUDENT_COURSES_LIST]),
        )
        .with(
            walkthrough(
                "student/course-details",
                "should add the course to the classroom and remove it again",
                |scope| async move {
                    let course = scope
                        .get::<StudentCourseDetails>(STUDENT_COURSE_DETAILS)
                        .await?;
                    course.goto().await?;
                    course.remove_if_added().await?;
                    course.expect_navigation_visible().await?;
                    course.expect_hero_banner_complete().await?;
                    course.expect_overview_section_visible().await?;
                    course.expect_all_modules_visible().await?;
                    course.expect_supplements_section_visible().await?;

                    course.click_add_to_classroom().await?;
                    course.wait_for_start_button().await?;
                    course.expect_course_added_to_classroom().await?;

                    course.click_checkmark_button().await?;
                    course.wait_for_add_to_classroom_button().await?;
                    course.expect_add_to_classroom_btn_visible().await?;
                    course.expect_all_footer_links_visible().await
                },
            )
            .uses(&[STUDENT_COURSE_DETAILS]),
        )
        .with(
            walkthrough(
                "student/course-lessons",
                "should resume the course and expand a module",
                |scope| async move {
                    let player = scope
                        .get::<StudentCourseLessons>(STUDENT_COURSE_LESSONS)
                        .await?;
                    player.resume_from_course_details().await?;
                    ensure(
                        player.is_on_lessons_page(),
                        format!("unexpected lesson URL {}", player.page().current_url()),
                    )?;
                    player.expect_navigation_visible().await?;
                    player.expect_page_header_visible().await?;
                    player.expect_toc_visible().await?;
                    player.expect_all_modules_in_toc().await?;

                    player.click_module(EXPANDED_MODULE).await?;
                    player.expect_lessons_visible().await?;
                    let shown = player.visible_lessons_count().await?;
                    ensure(shown > 0, format!("{EXPANDED_MODULE} shows no lessons"))?;
                    player.expect_supplements_section_visible().await?;
                    player.expect_all_footer_links_visible().await
                },
            )
            .uses(&[STUDENT_COURSE_LESSONS]),
        )
}
