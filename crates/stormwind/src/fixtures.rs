//! Fixture graph of the Stormwind suite.
//!
//! Five fixtures are external and handed in by the runner for every attempt:
//! the configuration, the (recording) browser, the credential store, a fresh
//! session ledger and the page settings. Everything else is built lazily on
//! first request:
//!
//! ```text
//! browser ─┬─► loginPage
//!          ├─► adminSession ──► adminPage ──► admin page objects
//!          └─► studentSession ─► studentPage ─► student page objects
//! ```
//!
//! Sessions are closed at teardown, which also closes any tab a test opened
//! in that session's context.

use crate::admin::{
    AdminAddUsers, AdminAssessments, AdminCourseDetails, AdminCourses, AdminCreateLearningPath,
    AdminDashboard, AdminDueDates, AdminManageLibrary, AdminNavigation,
    AdminSkillsAssessmentsData, ManageLearningPaths,
};
use crate::login::{login_procedure, LoginPage};
use crate::student::{
    ContactSupportModal, LiveScheduleModal, StudentCourseDetails,
    StudentCourseDetailsSupplements, StudentCourseLessons, StudentCourses, StudentCoursesList,
    StudentFooter, StudentLeaderboard, StudentLearningPaths, StudentLiveCourseCalendar,
    StudentMyClassroom, StudentNavigation, StudentNewsletter, StudentSendIdeas,
    StudentSkillsAssessments, StudentWebinars,
};
use pagekit::prelude::*;
use pagekit::runner::AttemptEnv;
use pagekit::{FixtureGraphBuilder, PageSettings, SuiteConfig};
use std::sync::Arc;
use tracing::debug;

/// Effective [`SuiteConfig`]
pub const CONFIG: &str = "config";
/// `Arc<dyn BrowserDriver>` of the attempt
pub const BROWSER: &str = "browser";
/// [`CredentialStore`] of both roles
pub const CREDENTIALS: &str = "credentials";
/// Per-test [`SessionLedger`]
pub const SESSION_LEDGER: &str = "sessionLedger";
/// Shared [`PageSettings`]
pub const PAGE_SETTINGS: &str = "pageSettings";

/// Login form in an anonymous context
pub const LOGIN_PAGE: &str = "loginPage";
/// Signed-in manager session
pub const ADMIN_SESSION: &str = "adminSession";
/// Signed-in student session
pub const STUDENT_SESSION: &str = "studentSession";
/// Main page of the manager session
pub const ADMIN_PAGE: &str = "adminPage";
/// Main page of the student session
pub const STUDENT_PAGE: &str = "studentPage";

/// Admin navigation bar
pub const ADMIN_NAVIGATION: &str = "adminNavigation";
/// Reporting dashboard
pub const ADMIN_DASHBOARD: &str = "adminDashboard";
/// Learning path management
pub const ADMIN_MANAGE_LEARNING_PATHS: &str = "adminManageLearningPaths";
/// Assessment administration
pub const ADMIN_ASSESSMENTS: &str = "adminAssessments";
/// Course page with the assign-course modal
pub const ADMIN_COURSE_DETAILS: &str = "adminCourseDetails";
/// Learning path creation form
pub const ADMIN_CREATE_LEARNING_PATH: &str = "adminCreateLearningPath";
/// Course administration
pub const ADMIN_COURSES: &str = "adminCourses";
/// Content library administration
pub const ADMIN_MANAGE_LIBRARY: &str = "adminManageLibrary";
/// Due date report
pub const ADMIN_DUE_DATES: &str = "adminDueDates";
/// Skills assessment report
pub const ADMIN_SKILLS_ASSESSMENTS_DATA: &str = "adminSkillsAssessmentsData";
/// Invitation form
pub const ADMIN_ADD_USERS: &str = "adminAddUsers";

/// Student navigation bar and sidebar
pub const STUDENT_NAVIGATION: &str = "studentNavigation";
/// Footer
pub const STUDENT_FOOTER: &str = "studentFooter";
/// My Classroom
pub const STUDENT_MY_CLASSROOM: &str = "studentMyClassroom";
/// Topic categories
pub const STUDENT_COURSES: &str = "studentCourses";
/// Topic landing page
pub const STUDENT_COURSES_LIST: &str = "studentCoursesList";
/// Course details with the add/remove flow
pub const STUDENT_COURSE_DETAILS: &str = "studentCourseDetails";
/// Course details with supplements
pub const STUDENT_COURSE_DETAILS_SUPPLEMENTS: &str = "studentCourseDetailsSupplements";
/// Lesson player
pub const STUDENT_COURSE_LESSONS: &str = "studentCourseLessons";
/// Learning path catalogue
pub const STUDENT_LEARNING_PATHS: &str = "studentLearningPaths";
/// Skills assessment catalogue
pub const STUDENT_SKILLS_ASSESSMENTS: &str = "studentSkillsAssessments";
/// Leaderboard
pub const STUDENT_LEADERBOARD: &str = "studentLeaderboard";
/// Webinars
pub const STUDENT_WEBINARS: &str = "studentWebinars";
/// Newsletter tab
pub const STUDENT_NEWSLETTER: &str = "studentNewsletter";
/// Live course calendar tab
pub const STUDENT_LIVE_COURSE_CALENDAR: &str = "studentLiveCourseCalendar";
/// Live schedule dialog
pub const STUDENT_LIVE_SCHEDULE_MODAL: &str = "studentLiveScheduleModal";
/// Contact support dialog
pub const STUDENT_CONTACT_SUPPORT_MODAL: &str = "studentContactSupportModal";
/// Feedback board tab
pub const STUDENT_SEND_IDEAS: &str = "studentSendIdeas";

/// Declare `name` as a page object built over the page fixture `source`
fn on_page<T>(
    builder: FixtureGraphBuilder,
    name: &str,
    source: &'static str,
    build: fn(&Page) -> T,
) -> FixtureGraphBuilder
where
    T: Send + Sync + 'static,
{
    builder.fixture(name, &[source], move |deps| async move {
        let page = deps.get::<Page>(source)?;
        Ok::<_, PageKitError>(build(&page))
    })
}

async fn establish(deps: FixtureDeps, role: Role) -> PageKitResult<Session> {
    let browser = deps.get::<Arc<dyn BrowserDriver>>(BROWSER)?;
    let ledger = deps.get::<SessionLedger>(SESSION_LEDGER)?;
    let credentials = deps.get::<CredentialStore>(CREDENTIALS)?;
    let settings = deps.get::<PageSettings>(PAGE_SETTINGS)?;
    Session::establish(
        &**browser,
        &ledger,
        role,
        credentials.get(role)?,
        settings,
        &login_procedure(),
    )
    .await
}

async fn close_session(session: Arc<Session>) -> PageKitResult<()> {
    if session.is_closed() {
        return Ok(());
    }
    session.close().await
}

/// The whole graph, validated
///
/// # Errors
///
/// [`PageKitError::FixtureCycle`] or [`PageKitError::UnknownFixture`] if a
/// declaration is broken.
pub fn graph() -> PageKitResult<FixtureGraph> {
    let builder = FixtureGraph::builder()
        .external(CONFIG)
        .external(BROWSER)
        .external(CREDENTIALS)
        .external(SESSION_LEDGER)
        .external(PAGE_SETTINGS)
        .fixture_with_teardown(
            LOGIN_PAGE,
            &[BROWSER, PAGE_SETTINGS],
            |deps| async move {
                let browser = deps.get::<Arc<dyn BrowserDriver>>(BROWSER)?;
                let settings = deps.get::<PageSettings>(PAGE_SETTINGS)?;
                let context = browser.new_context().await?;
                let page = Page::with_settings(context.new_page().await?, settings);
                Ok::<_, PageKitError>(LoginPage::new(&page))
            },
            |login: Arc<LoginPage>| async move {
                debug!("close login page");
                login.page().close().await
            },
        )
        .fixture_with_teardown(
            ADMIN_SESSION,
            &[BROWSER, SESSION_LEDGER, CREDENTIALS, PAGE_SETTINGS],
            |deps| establish(deps, Role::Admin),
            close_session,
        )
        .fixture_with_teardown(
            STUDENT_SESSION,
            &[BROWSER, SESSION_LEDGER, CREDENTIALS, PAGE_SETTINGS],
            |deps| establish(deps, Role::Student),
            close_session,
        )
        .fixture(ADMIN_PAGE, &[ADMIN_SESSION], |deps| async move {
            let session = deps.get::<Session>(ADMIN_SESSION)?;
            Ok::<_, PageKitError>(session.page().clone())
        })
        .fixture(STUDENT_PAGE, &[STUDENT_SESSION], |deps| async move {
            let session = deps.get::<Session>(STUDENT_SESSION)?;
            Ok::<_, PageKitError>(session.page().clone())
        });

    let builder = on_page(builder, ADMIN_NAVIGATION, ADMIN_PAGE, AdminNavigation::new);
    let builder = on_page(builder, ADMIN_DASHBOARD, ADMIN_PAGE, AdminDashboard::new);
    let builder = on_page(
        builder,
        ADMIN_MANAGE_LEARNING_PATHS,
        ADMIN_PAGE,
        ManageLearningPaths::new,
    );
    let builder = on_page(builder, ADMIN_ASSESSMENTS, ADMIN_PAGE, AdminAssessments::new);
    let builder = on_page(builder, ADMIN_COURSE_DETAILS, ADMIN_PAGE, AdminCourseDetails::new);
    let builder = on_page(
        builder,
        ADMIN_CREATE_LEARNING_PATH,
        ADMIN_PAGE,
        AdminCreateLearningPath::new,
    );
    let builder = on_page(builder, ADMIN_COURSES, ADMIN_PAGE, AdminCourses::new);
    let builder = on_page(builder, ADMIN_MANAGE_LIBRARY, ADMIN_PAGE, AdminManageLibrary::new);
    let builder = on_page(builder, ADMIN_DUE_DATES, ADMIN_PAGE, AdminDueDates::new);
    let builder = on_page(
        builder,
        ADMIN_SKILLS_ASSESSMENTS_DATA,
        ADMIN_PAGE,
        AdminSkillsAssessmentsData::new,
    );
    let builder = on_page(builder, ADMIN_ADD_USERS, ADMIN_PAGE, AdminAddUsers::new);

    let builder = on_page(builder, STUDENT_NAVIGATION, STUDENT_PAGE, StudentNavigation::new);
    let builder = on_page(builder, STUDENT_FOOTER, STUDENT_PAGE, StudentFooter::new);
    let builder = on_page(builder, STUDENT_MY_CLASSROOM, STUDENT_PAGE, StudentMyClassroom::new);
    let builder = on_page(builder, STUDENT_COURSES, STUDENT_PAGE, StudentCourses::new);
    let builder = on_page(builder, STUDENT_COURSES_LIST, STUDENT_PAGE, StudentCoursesList::new);
    let builder = on_page(
        builder,
        STUDENT_COURSE_DETAILS,
        STUDENT_PAGE,
        StudentCourseDetails::new,
    );
    let builder = on_page(
        builder,
        STUDENT_COURSE_DETAILS_SUPPLEMENTS,
        STUDENT_PAGE,
        StudentCourseDetailsSupplements::new,
    );
    let builder = on_page(
        builder,
        STUDENT_COURSE_LESSONS,
        STUDENT_PAGE,
        StudentCourseLessons::new,
    );
    let builder = on_page(
        builder,
        STUDENT_LEARNING_PATHS,
        STUDENT_PAGE,
        StudentLearningPaths::new,
    );
    let builder = on_page(
        builder,
        STUDENT_SKILLS_ASSESSMENTS,
        STUDENT_PAGE,
        StudentSkillsAssessments::new,
    );
    let builder = on_page(builder, STUDENT_LEADERBOARD, STUDENT_PAGE, StudentLeaderboard::new);
    let builder = on_page(builder, STUDENT_WEBINARS, STUDENT_PAGE, StudentWebinars::new);
    let builder = on_page(builder, STUDENT_NEWSLETTER, STUDENT_PAGE, StudentNewsletter::new);
    let builder = on_page(
        builder,
        STUDENT_LIVE_COURSE_CALENDAR,
        STUDENT_PAGE,
        StudentLiveCourseCalendar::new,
    );
    let builder = on_page(
        builder,
        STUDENT_LIVE_SCHEDULE_MODAL,
        STUDENT_PAGE,
        LiveScheduleModal::new,
    );
    let builder = on_page(
        builder,
        STUDENT_CONTACT_SUPPORT_MODAL,
        STUDENT_PAGE,
        ContactSupportModal::new,
    );
    let builder = on_page(builder, STUDENT_SEND_IDEAS, STUDENT_PAGE, StudentSendIdeas::new);

    builder.build()
}

/// Supply the external fixtures of one attempt
///
/// # Errors
///
/// [`PageKitError::UnknownFixture`] when `scope` belongs to another graph.
pub fn provide_externals(
    scope: &FixtureScope,
    env: &AttemptEnv,
    config: &Arc<SuiteConfig>,
    settings: &Arc<PageSettings>,
) -> PageKitResult<()> {
    scope.provide_shared(CONFIG, Arc::clone(config))?;
    scope.provide(BROWSER, Arc::clone(&env.browser))?;
    scope.provide(CREDENTIALS, config.credentials.clone())?;
    scope.provide(SESSION_LEDGER, SessionLedger::new())?;
    scope.provide_shared(PAGE_SETTINGS, Arc::clone(settings))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::replica;
    use pagekit::FixtureKind;

    fn scope() -> FixtureScope {
        let graph = Arc::new(graph().unwrap());
        let scope = graph.scope();
        let config = Arc::new(SuiteConfig {
            base_url: replica::BASE_URL.to_string(),
            credentials: replica::credentials(),
            ..SuiteConfig::default()
        });
        let env = AttemptEnv {
            title: "fixtures > scope".to_string(),
            attempt: 1,
            browser: Arc::new(replica::browser()),
        };
        provide_externals(&scope, &env, &config, &Arc::new(replica::settings())).unwrap();
        scope
    }

    mod graph_tests {
        use super::*;

        #[test]
        fn test_graph_builds_without_cycles() {
            let graph = graph().unwrap();
            assert_eq!(graph.kind(BROWSER), Some(FixtureKind::External));
            assert_eq!(graph.kind(ADMIN_SESSION), Some(FixtureKind::Factory));
            assert!(graph.contains(STUDENT_SEND_IDEAS));
        }

        #[test]
        fn test_course_and_report_pages_are_registered() {
            let graph = graph().unwrap();
            for name in [
                ADMIN_CREATE_LEARNING_PATH,
                ADMIN_COURSES,
                ADMIN_MANAGE_LIBRARY,
                ADMIN_DUE_DATES,
                ADMIN_SKILLS_ASSESSMENTS_DATA,
                ADMIN_ADD_USERS,
            ] {
                let order = graph.resolution_order(name).unwrap();
                assert!(order.iter().any(|n| n == ADMIN_PAGE), "{name}");
            }
            for name in [
                STUDENT_COURSES,
                STUDENT_COURSES_LIST,
                STUDENT_COURSE_DETAILS,
                STUDENT_COURSE_DETAILS_SUPPLEMENTS,
                STUDENT_COURSE_LESSONS,
            ] {
                let order = graph.resolution_order(name).unwrap();
                assert!(order.iter().any(|n| n == STUDENT_PAGE), "{name}");
            }
        }

        #[test]
        fn test_page_objects_resolve_through_their_session() {
            let graph = graph().unwrap();
            let order = graph.resolution_order(ADMIN_DASHBOARD).unwrap();
            let position = |name: &str| order.iter().position(|n| n == name).unwrap();
            assert!(position(ADMIN_SESSION) < position(ADMIN_PAGE));
            assert!(position(ADMIN_PAGE) < position(ADMIN_DASHBOARD));
            assert!(!order.iter().any(|n| n == STUDENT_SESSION));
        }
    }

    mod scope_tests {
        use super::*;

        #[tokio::test]
        async fn test_student_fixture_signs_in_once() {
            let scope = scope();
            let classroom = scope
                .get::<StudentMyClassroom>(STUDENT_MY_CLASSROOM)
                .await
                .unwrap();
            let leaderboard = scope
                .get::<StudentLeaderboard>(STUDENT_LEADERBOARD)
                .await
                .unwrap();
            assert_eq!(classroom.page().id(), leaderboard.page().id());
            let ledger = scope.get::<SessionLedger>(SESSION_LEDGER).await.unwrap();
            assert_eq!(ledger.active_count(), 1);
            assert!(ledger.is_active(Role::Student));
            scope.teardown().await.unwrap();
        }

        #[tokio::test]
        async fn test_teardown_closes_sessions() {
            let scope = scope();
            let session = scope.get::<Session>(ADMIN_SESSION).await.unwrap();
            assert!(!session.is_closed());
            scope.teardown().await.unwrap();
            assert!(session.is_closed());
        }

        #[tokio::test]
        async fn test_login_page_is_anonymous() {
            let scope = scope();
            let login = scope.get::<LoginPage>(LOGIN_PAGE).await.unwrap();
            login.goto().await.unwrap();
            assert!(login.is_on_correct_url());
            let ledger = scope.get::<SessionLedger>(SESSION_LEDGER).await.unwrap();
            assert_eq!(ledger.active_count(), 0);
            scope.teardown().await.unwrap();
        }
    }
}
