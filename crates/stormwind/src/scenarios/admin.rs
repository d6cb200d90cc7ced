//! Quick admin suites: dashboard, navigation, assessments, courses, the
//! content library, due dates, learning path creation and the skills
//! assessment report.

use super::ensure;
use crate::admin::{
    AdminAssessments, AdminCourses, AdminCreateLearningPath, AdminDashboard, AdminDueDates,
    AdminManageLibrary, AdminNavigation, AdminSkillsAssessmentsData, ManageLearningPaths,
};
use crate::fixtures::{
    ADMIN_ASSESSMENTS, ADMIN_COURSES, ADMIN_CREATE_LEARNING_PATH, ADMIN_DASHBOARD,
    ADMIN_DUE_DATES, ADMIN_MANAGE_LEARNING_PATHS, ADMIN_MANAGE_LIBRARY, ADMIN_NAVIGATION,
    ADMIN_PAGE, ADMIN_SKILLS_ASSESSMENTS_DATA,
};
use crate::urls;
use pagekit::prelude::*;

const DASHBOARD: &str = "admin/dashboard";
const NAVIGATION: &str = "admin/navigation";
const ASSESSMENTS: &str = "admin/assessments";
const COURSES: &str = "admin/courses";
const MANAGE_LIBRARY: &str = "admin/manage-library";
const DUE_DATES: &str = "admin/due-dates";
const CREATE_LEARNING_PATH: &str = "admin/create-learning-path";
const SKILLS_ASSESSMENTS_DATA: &str = "admin/skills-assessments-data";

pub(super) fn catalogue() -> ScenarioCatalogue {
    let mut catalogue = overview();
    catalogue.extend(courses());
    catalogue.extend(manage_library());
    catalogue.extend(due_dates());
    catalogue.extend(reports());
    catalogue
}

fn overview() -> ScenarioCatalogue {
    ScenarioCatalogue::new()
        .with(
            Scenario::new(DASHBOARD, "should display admin dashboard correctly", |scope| async move {
                let dashboard = scope.get::<AdminDashboard>(ADMIN_DASHBOARD).await?;
                dashboard.goto().await?;
                dashboard.expect_dashboard_title_visible().await
            })
            .uses(&[ADMIN_DASHBOARD]),
        )
        .with(
            Scenario::new(DASHBOARD, "should be on the correct dashboard URL", |scope| async move {
                let dashboard = scope.get::<AdminDashboard>(ADMIN_DASHBOARD).await?;
                ensure(
                    dashboard.is_on_correct_url(),
                    format!("expected a reporting URL, got {}", dashboard.page().current_url()),
                )
            })
            .uses(&[ADMIN_DASHBOARD]),
        )
        .with(
            Scenario::new(DASHBOARD, "should display licenses section", |scope| async move {
                let dashboard = scope.get::<AdminDashboard>(ADMIN_DASHBOARD).await?;
                dashboard.goto().await?;
                dashboard.expect_licenses_section_visible().await
            })
            .uses(&[ADMIN_DASHBOARD]),
        )
        .with(
            Scenario::new(NAVIGATION, "should display admin navigation", |scope| async move {
                let navigation = scope.get::<AdminNavigation>(ADMIN_NAVIGATION).await?;
                navigation.expect_all_navigation_visible().await
            })
            .uses(&[ADMIN_NAVIGATION]),
        )
        .with(
            Scenario::new(
                NAVIGATION,
                "should navigate to Manage Learning Paths",
                |scope| async move {
                    let navigation = scope.get::<AdminNavigation>(ADMIN_NAVIGATION).await?;
                    let page = scope.get::<Page>(ADMIN_PAGE).await?;
                    navigation.navigate_to_manage_learning_paths().await?;
                    page.assert_url_contains(urls::admin::LEARNING_PATHS_MARKER).await
                },
            )
            .uses(&[ADMIN_NAVIGATION, ADMIN_PAGE]),
        )
        .with(
            Scenario::new(NAVIGATION, "should search courses from the bar", |scope| async move {
                let navigation = scope.get::<AdminNavigation>(ADMIN_NAVIGATION).await?;
                let page = scope.get::<Page>(ADMIN_PAGE).await?;
                navigation.search_course("PL-300").await?;
                page.assert_url_contains(urls::student::COURSES).await
            })
            .uses(&[ADMIN_NAVIGATION, ADMIN_PAGE]),
        )
        .with(
            Scenario::new(ASSESSMENTS, "should display assessments page correctly", |scope| async move {
                let assessments = open::<AdminAssessments>(&scope, ADMIN_ASSESSMENTS).await?;
                ensure(
                    assessments.is_assessments_page_displayed().await?,
                    "assessments heading is not visible",
                )
            })
            .uses(&[ADMIN_ASSESSMENTS]),
        )
        .with(
            Scenario::new(ASSESSMENTS, "should be on the correct assessments URL", |scope| async move {
                let assessments = open::<AdminAssessments>(&scope, ADMIN_ASSESSMENTS).await?;
                ensure(
                    assessments.is_on_correct_url(),
                    format!("unexpected URL {}", assessments.page().current_url()),
                )
            })
            .uses(&[ADMIN_ASSESSMENTS]),
        )
        .with(
            Scenario::new(ASSESSMENTS, "should display create assessment button", |scope| async move {
                let assessments = open::<AdminAssessments>(&scope, ADMIN_ASSESSMENTS).await?;
                assessments
                    .page()
                    .assert_visible(&assessments.create_assessment_button)
                    .await
            })
            .uses(&[ADMIN_ASSESSMENTS]),
        )
        .with(
            Scenario::new(ASSESSMENTS, "should allow searching for assessments", |scope| async move {
                let assessments = open::<AdminAssessments>(&scope, ADMIN_ASSESSMENTS).await?;
                assessments.search_assessment("Test Assessment").await?;
                assessments
                    .page()
                    .assert_value(&assessments.search_input, "Test Assessment")
                    .await
            })
            .uses(&[ADMIN_ASSESSMENTS]),
        )
        .with(
            Scenario::new(
                ASSESSMENTS,
                "should open create assessment modal when create button is clicked",
                |scope| async move {
                    let assessments = open::<AdminAssessments>(&scope, ADMIN_ASSESSMENTS).await?;
                    assessments.create_modal.open().await?;
                    assessments.create_modal.close().await
                },
            )
            .uses(&[ADMIN_ASSESSMENTS]),
        )
        .with(
            Scenario::new(ASSESSMENTS, "should display assessments table", |scope| async move {
                let assessments = open::<AdminAssessments>(&scope, ADMIN_ASSESSMENTS).await?;
                assessments
                    .page()
                    .assert_visible(&assessments.assessments_table)
                    .await
            })
            .uses(&[ADMIN_ASSESSMENTS]),
        )
        .with(
            Scenario::new(ASSESSMENTS, "should allow viewing assessment details", |scope| async move {
                let assessments = open::<AdminAssessments>(&scope, ADMIN_ASSESSMENTS).await?;
                assessments.view_assessment("Network+ Fundamentals").await?;
                assessments
                    .page()
                    .assert_url_contains("/admin/assessments/")
                    .await
            })
            .uses(&[ADMIN_ASSESSMENTS]),
        )
}

fn courses() -> ScenarioCatalogue {
    ScenarioCatalogue::new()
        .with(
            Scenario::new(COURSES, "should display courses page correctly", |scope| async move {
                let courses = open::<AdminCourses>(&scope, ADMIN_COURSES).await?;
                ensure(
                    courses.is_courses_page_displayed().await?,
                    "courses heading is not visible",
                )
            })
            .uses(&[ADMIN_COURSES]),
        )
        .with(
            Scenario::new(COURSES, "should be on the correct courses URL", |scope| async move {
                let courses = open::<AdminCourses>(&scope, ADMIN_COURSES).await?;
                ensure(
                    courses.is_on_correct_url(),
                    format!("unexpected URL {}", courses.page().current_url()),
                )
            })
            .uses(&[ADMIN_COURSES]),
        )
        .with(
            Scenario::new(COURSES, "should display create course button", |scope| async move {
                let courses = open::<AdminCourses>(&scope, ADMIN_COURSES).await?;
                courses
                    .page()
                    .assert_visible(&courses.create_course_button)
                    .await
            })
            .uses(&[ADMIN_COURSES]),
        )
        .with(
            Scenario::new(COURSES, "should allow searching for courses", |scope| async move {
                let courses = open::<AdminCourses>(&scope, ADMIN_COURSES).await?;
                courses.search_course("Test Course").await?;
                courses
                    .page()
                    .assert_value(&courses.search_input, "Test Course")
                    .await
            })
            .uses(&[ADMIN_COURSES]),
        )
        .with(
            Scenario::new(
                COURSES,
                "should open create course modal when create button is clicked",
                |scope| async move {
                    let courses = open::<AdminCourses>(&scope, ADMIN_COURSES).await?;
                    courses.click_create_course().await?;
                    courses.create_modal.close().await
                },
            )
            .uses(&[ADMIN_COURSES]),
        )
        .with(
            Scenario::new(COURSES, "should display courses table", |scope| async move {
                let courses = open::<AdminCourses>(&scope, ADMIN_COURSES).await?;
                courses.page().assert_visible(&courses.courses_table).await
            })
            .uses(&[ADMIN_COURSES]),
        )
}

fn manage_library() -> ScenarioCatalogue {
    ScenarioCatalogue::new()
        .with(
            Scenario::new(
                MANAGE_LIBRARY,
                "should display manage library page correctly",
                |scope| async move {
                    let library = open::<AdminManageLibrary>(&scope, ADMIN_MANAGE_LIBRARY).await?;
                    ensure(
                        library.is_manage_library_page_displayed().await?,
                        "library heading is not visible",
                    )
                },
            )
            .uses(&[ADMIN_MANAGE_LIBRARY]),
        )
        .with(
            Scenario::new(
                MANAGE_LIBRARY,
                "should be on the correct manage library URL",
                |scope| async move {
                    let library = open::<AdminManageLibrary>(&scope, ADMIN_MANAGE_LIBRARY).await?;
                    ensure(
                        library.is_on_correct_url(),
                        format!("unexpected URL {}", library.page().current_url()),
                    )
                },
            )
            .uses(&[ADMIN_MANAGE_LIBRARY]),
        )
        .with(
            Scenario::new(MANAGE_LIBRARY, "should display add content button", |scope| async move {
                let library = open::<AdminManageLibrary>(&scope, ADMIN_MANAGE_LIBRARY).await?;
                library
                    .page()
                    .assert_visible(&library.add_content_button)
                    .await
            })
            .uses(&[ADMIN_MANAGE_LIBRARY]),
        )
        .with(
            Scenario::new(
                MANAGE_LIBRARY,
                "should allow searching for library content",
                |scope| async move {
                    let library = open::<AdminManageLibrary>(&scope, ADMIN_MANAGE_LIBRARY).await?;
                    library.search_content("Test Content").await?;
                    library
                        .page()
                        .assert_value(&library.search_input, "Test Content")
                        .await
                },
            )
            .uses(&[ADMIN_MANAGE_LIBRARY]),
        )
        .with(
            Scenario::new(MANAGE_LIBRARY, "should allow filtering by category", |scope| async move {
                let library = open::<AdminManageLibrary>(&scope, ADMIN_MANAGE_LIBRARY).await?;
                library.select_category("videos").await?;
                library
                    .page()
                    .assert_value(&library.category_filter, "videos")
                    .await
            })
            .uses(&[ADMIN_MANAGE_LIBRARY]),
        )
        .with(
            Scenario::new(
                MANAGE_LIBRARY,
                "should open add content modal when add button is clicked",
                |scope| async move {
                    let library = open::<AdminManageLibrary>(&scope, ADMIN_MANAGE_LIBRARY).await?;
                    library.click_add_content().await?;
                    library.add_content_modal.close().await
                },
            )
            .uses(&[ADMIN_MANAGE_LIBRARY]),
        )
        .with(
            Scenario::new(MANAGE_LIBRARY, "should display library table", |scope| async move {
                let library = open::<AdminManageLibrary>(&scope, ADMIN_MANAGE_LIBRARY).await?;
                library.page().assert_visible(&library.library_table).await
            })
            .uses(&[ADMIN_MANAGE_LIBRARY]),
        )
}

fn due_dates() -> ScenarioCatalogue {
    ScenarioCatalogue::new()
        .with(
            Scenario::new(DUE_DATES, "should display due dates page correctly", |scope| async move {
                let due_dates = open::<AdminDueDates>(&scope, ADMIN_DUE_DATES).await?;
                ensure(
                    due_dates.is_due_dates_page_displayed().await?,
                    "due dates heading is not visible",
                )
            })
            .uses(&[ADMIN_DUE_DATES]),
        )
        .with(
            Scenario::new(DUE_DATES, "should be on the correct due dates URL", |scope| async move {
                let due_dates = open::<AdminDueDates>(&scope, ADMIN_DUE_DATES).await?;
                ensure(
                    due_dates.is_on_correct_url(),
                    format!("unexpected URL {}", due_dates.page().current_url()),
                )
            })
            .uses(&[ADMIN_DUE_DATES]),
        )
        .with(
            Scenario::new(DUE_DATES, "should display assign due date button", |scope| async move {
                let due_dates = open::<AdminDueDates>(&scope, ADMIN_DUE_DATES).await?;
                due_dates
                    .page()
                    .assert_visible(&due_dates.assign_due_date_btn)
                    .await
            })
            .uses(&[ADMIN_DUE_DATES]),
        )
        .with(
            Scenario::new(DUE_DATES, "should allow filtering due dates", |scope| async move {
                let due_dates = open::<AdminDueDates>(&scope, ADMIN_DUE_DATES).await?;
                due_dates.search_course_or_student("PL-300").await?;
                due_dates
                    .page()
                    .assert_value(&due_dates.search_course_or_student_input, "PL-300")
                    .await
            })
            .uses(&[ADMIN_DUE_DATES]),
        )
        .with(
            Scenario::new(
                DUE_DATES,
                "should open assign due date modal when assign button is clicked",
                |scope| async move {
                    let due_dates = open::<AdminDueDates>(&scope, ADMIN_DUE_DATES).await?;
                    due_dates.click_assign_due_date().await?;
                    due_dates.assign_modal.close().await
                },
            )
            .uses(&[ADMIN_DUE_DATES]),
        )
        .with(
            Scenario::new(DUE_DATES, "should display due dates table", |scope| async move {
                let due_dates = open::<AdminDueDates>(&scope, ADMIN_DUE_DATES).await?;
                due_dates
                    .page()
                    .assert_visible(&due_dates.due_dates_table)
                    .await
            })
            .uses(&[ADMIN_DUE_DATES]),
        )
}

fn reports() -> ScenarioCatalogue {
    ScenarioCatalogue::new()
        .with(
            Scenario::new(
                CREATE_LEARNING_PATH,
                "should validate create learning path page metadata and cancel",
                |scope| async move {
                    let manage =
                        open::<ManageLearningPaths>(&scope, ADMIN_MANAGE_LEARNING_PATHS).await?;
                    let create = scope
                        .get::<AdminCreateLearningPath>(ADMIN_CREATE_LEARNING_PATH)
                        .await?;
                    manage.click_create_path().await?;
                    ensure(
                        create.is_on_correct_url(),
                        format!("expected the creation form, got {}", create.page().current_url()),
                    )?;
                    create.expect_navigation_visible().await?;
                    create.expect_admin_sub_nav_visible().await?;
                    create.expect_page_title_visible().await?;
                    create.expect_action_buttons_visible().await?;
                    create.expect_how_does_it_work_link_visible().await?;
                    create.expect_form_fields_visible().await?;
                    create.expect_tabs_visible().await?;
                    create.expect_course_search_section_visible().await?;
                    create.expect_stats_visible().await?;
                    create.expect_all_footer_links_visible().await?;
                    create.click_cancel().await?;
                    ensure(
                        create.is_on_manage_learning_paths_page(),
                        "cancel should return to learning path management",
                    )
                },
            )
            .uses(&[ADMIN_MANAGE_LEARNING_PATHS, ADMIN_CREATE_LEARNING_PATH]),
        )
        .with(
            Scenario::new(
                SKILLS_ASSESSMENTS_DATA,
                "should validate complete skills assessments data page metadata",
                |scope| async move {
                    let report =
                        open::<AdminSkillsAssessmentsData>(&scope, ADMIN_SKILLS_ASSESSMENTS_DATA)
                            .await?;
                    ensure(
                        report.is_on_correct_url(),
                        format!("unexpected URL {}", report.page().current_url()),
                    )?;
                    report.expect_skills_assessments_data_page_complete().await
                },
            )
            .uses(&[ADMIN_SKILLS_ASSESSMENTS_DATA]),
        )
}

/// Fetch the page object `name` and load its page
async fn open<T: PageObject + 'static>(
    scope: &FixtureScope,
    name: &str,
) -> PageKitResult<std::sync::Arc<T>> {
    let page_object = scope.get::<T>(name).await?;
    page_object.goto().await?;
    Ok(page_object)
}
