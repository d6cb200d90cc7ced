//! Page object behaviour against the offline replica: navigation, dialogs,
//! new tabs and sign-in gating.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pagekit::prelude::*;
use pagekit::runner::AttemptEnv;
use pagekit::SuiteConfig;
use std::sync::Arc;
use stormwind::admin::ManageLearningPaths;
use stormwind::fixtures::{self, *};
use stormwind::student::{
    ContactSupportModal, StudentLeaderboard, StudentMyClassroom, StudentNavigation,
    StudentNewsletter, StudentSkillsAssessments,
};
use stormwind::{replica, suite, urls};

fn scope() -> FixtureScope {
    let graph = Arc::new(fixtures::graph().unwrap());
    let scope = graph.scope();
    let config = Arc::new(suite::replica_config(&SuiteConfig::default()));
    let env = AttemptEnv {
        title: "page objects".to_string(),
        attempt: 1,
        browser: Arc::new(replica::browser()),
    };
    fixtures::provide_externals(&scope, &env, &config, &Arc::new(replica::settings())).unwrap();
    scope
}

mod navigation_tests {
    use super::*;

    #[tokio::test]
    async fn test_following_a_link_twice_lands_on_the_same_url() {
        let scope = scope();
        let navigation = scope
            .get::<StudentNavigation>(STUDENT_NAVIGATION)
            .await
            .unwrap();
        navigation.navigate_to_leaderboard().await.unwrap();
        let first = navigation.page().current_url();
        navigation.navigate_to_leaderboard().await.unwrap();
        assert_eq!(navigation.page().current_url(), first);
        assert!(first.contains(urls::student::LEADERBOARD));
        scope.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn test_goto_twice_is_idempotent() {
        let scope = scope();
        let leaderboard = scope
            .get::<StudentLeaderboard>(STUDENT_LEADERBOARD)
            .await
            .unwrap();
        leaderboard.goto().await.unwrap();
        let rows = leaderboard.table_rows_count().await.unwrap();
        leaderboard.goto().await.unwrap();
        assert!(leaderboard.is_on_correct_url());
        assert_eq!(leaderboard.table_rows_count().await.unwrap(), rows);
        scope.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn test_leaderboard_shows_every_column_header() {
        let scope = scope();
        let leaderboard = scope
            .get::<StudentLeaderboard>(STUDENT_LEADERBOARD)
            .await
            .unwrap();
        leaderboard.goto().await.unwrap();
        leaderboard.expect_all_table_headers_visible().await.unwrap();
        scope.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn test_locators_resolve_the_same_after_reload() {
        let scope = scope();
        let skills = scope
            .get::<StudentSkillsAssessments>(STUDENT_SKILLS_ASSESSMENTS)
            .await
            .unwrap();
        skills.goto().await.unwrap();
        let before = skills.assessment_card("Computer Hardware Support");
        let described = before.description();
        skills.page().goto(urls::student::SKILLS_ASSESSMENTS).await.unwrap();
        let after = skills.assessment_card("Computer Hardware Support");
        assert_eq!(after.description(), described);
        assert!(after.is_visible().await.unwrap());
        scope.teardown().await.unwrap();
    }
}

mod modal_tests {
    use super::*;

    #[tokio::test]
    async fn test_contact_support_opens_and_closes_repeatedly() {
        let scope = scope();
        let classroom = scope
            .get::<StudentMyClassroom>(STUDENT_MY_CLASSROOM)
            .await
            .unwrap();
        classroom.navigate_from_nav().await.unwrap();
        let dialog = scope
            .get::<ContactSupportModal>(STUDENT_CONTACT_SUPPORT_MODAL)
            .await
            .unwrap();
        for _ in 0..2 {
            dialog.open_modal().await.unwrap();
            assert!(dialog.is_modal_open().await.unwrap());
            dialog.close_modal().await.unwrap();
            assert!(!dialog.is_modal_open().await.unwrap());
        }
        assert!(classroom.is_on_correct_url());
        scope.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn test_contact_support_reopens_after_reload() {
        let scope = scope();
        let classroom = scope
            .get::<StudentMyClassroom>(STUDENT_MY_CLASSROOM)
            .await
            .unwrap();
        classroom.navigate_from_nav().await.unwrap();
        let dialog = scope
            .get::<ContactSupportModal>(STUDENT_CONTACT_SUPPORT_MODAL)
            .await
            .unwrap();
        dialog.open_modal().await.unwrap();

        classroom.page().goto(urls::student::MY_CLASSROOM).await.unwrap();
        assert!(!dialog.is_modal_open().await.unwrap());

        dialog.open_modal().await.unwrap();
        assert!(dialog.is_modal_open().await.unwrap());
        dialog.close_modal().await.unwrap();
        assert!(!dialog.is_modal_open().await.unwrap());
        scope.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn test_support_message_is_kept_while_open() {
        let scope = scope();
        let classroom = scope
            .get::<StudentMyClassroom>(STUDENT_MY_CLASSROOM)
            .await
            .unwrap();
        classroom.navigate_from_nav().await.unwrap();
        let dialog = scope
            .get::<ContactSupportModal>(STUDENT_CONTACT_SUPPORT_MODAL)
            .await
            .unwrap();
        dialog.open_modal().await.unwrap();
        dialog.fill_message("need a hand with PL-300").await.unwrap();
        assert_eq!(
            dialog.message_textbox.input_value().await.unwrap(),
            "need a hand with PL-300"
        );
        scope.teardown().await.unwrap();
    }
}

mod tab_tests {
    use super::*;

    #[tokio::test]
    async fn test_new_tab_leaves_opener_untouched() {
        let scope = scope();
        let navigation = scope
            .get::<StudentNavigation>(STUDENT_NAVIGATION)
            .await
            .unwrap();
        navigation.navigate_to_my_classroom().await.unwrap();
        let opener_url = navigation.page().current_url();

        let tab = StudentNewsletter::open_from_sidebar(&navigation).await.unwrap();
        assert_ne!(tab.page().id(), navigation.page().id());
        assert!(tab.verify_newsletter_page_opened());
        assert_eq!(navigation.page().current_url(), opener_url);

        tab.close_tab().await.unwrap();
        assert_eq!(navigation.page().current_url(), opener_url);
        navigation.expect_main_nav_visible().await.unwrap();
        scope.teardown().await.unwrap();
    }
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_signed_out_page_is_sent_to_login() {
        let browser = replica::browser();
        let page = replica::open_page(&browser).await.unwrap();
        page.goto(urls::student::MY_CLASSROOM).await.unwrap();
        assert!(page.url_contains(urls::LOGIN));

        let classroom = StudentMyClassroom::new(&page);
        assert!(classroom.expect_welcome_message_visible().await.is_err());
    }

    #[tokio::test]
    async fn test_sessions_of_both_roles_are_isolated() {
        let scope = scope();
        let admin = scope.get::<Page>(ADMIN_PAGE).await.unwrap();
        let student = scope.get::<Page>(STUDENT_PAGE).await.unwrap();
        assert!(admin.url_contains(urls::admin::DASHBOARD_MARKER));
        assert!(student.url_contains(urls::student::MY_CLASSROOM_MARKER));

        let ledger = scope.get::<SessionLedger>(SESSION_LEDGER).await.unwrap();
        assert_eq!(ledger.active_count(), 2);
        scope.teardown().await.unwrap();
        assert_eq!(ledger.active_count(), 0);
    }
}

mod state_tests {
    use super::*;

    #[tokio::test]
    async fn test_archive_survives_reload_and_publish_restores() {
        let scope = scope();
        let paths = scope
            .get::<ManageLearningPaths>(ADMIN_MANAGE_LEARNING_PATHS)
            .await
            .unwrap();
        let name = "Mobile Manager Active LP";
        paths.goto().await.unwrap();
        paths.click_archive(name).await.unwrap();
        paths.goto().await.unwrap();
        assert!(paths.is_in_archived_paths(name).await.unwrap());
        assert!(!paths.is_in_active_paths(name).await.unwrap());

        paths.click_publish(name).await.unwrap();
        paths.goto().await.unwrap();
        paths.expect_only_active(name).await.unwrap();
        scope.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn test_skills_search_keeps_the_query() {
        let scope = scope();
        let skills = scope
            .get::<StudentSkillsAssessments>(STUDENT_SKILLS_ASSESSMENTS)
            .await
            .unwrap();
        skills.goto().await.unwrap();
        skills.search_assessment("Security").await.unwrap();
        assert_eq!(skills.search_value().await.unwrap(), "Security");
        assert!(skills.page().url_contains("search=Security"));
        assert!(!skills
            .is_assessment_card_visible("Computer Hardware Support")
            .await
            .unwrap());
        scope.teardown().await.unwrap();
    }
}
