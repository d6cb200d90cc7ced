//! Student screens, plus the navigation and footer admin pages reuse.

mod calendar;
mod contact_support;
mod course_details;
mod course_lessons;
mod course_supplements;
mod courses;
mod courses_list;
mod footer;
mod leaderboard;
mod learning_paths;
mod live_schedule;
mod my_classroom;
mod navigation;
mod newsletter;
mod send_ideas;
mod skills_assessments;
mod webinars;

pub use calendar::StudentLiveCourseCalendar;
pub use contact_support::ContactSupportModal;
pub use course_details::StudentCourseDetails;
pub use course_lessons::StudentCourseLessons;
pub use course_supplements::StudentCourseDetailsSupplements;
pub use courses::StudentCourses;
pub use courses_list::StudentCoursesList;
pub use footer::StudentFooter;
pub use leaderboard::StudentLeaderboard;
pub use learning_paths::{LearningPathModal, StudentLearningPaths};
pub use live_schedule::LiveScheduleModal;
pub use my_classroom::StudentMyClassroom;
pub use navigation::StudentNavigation;
pub use newsletter::StudentNewsletter;
pub use send_ideas::StudentSendIdeas;
pub use skills_assessments::{CoursePreviewModal, StudentSkillsAssessments};
pub use webinars::StudentWebinars;

use pagekit::{LoadState, Locator, Page, PageKitResult};
use tracing::info;

/// Click `link` on `opener` and return the tab it opens, once its DOM is
/// parsed. The listener is in place before the click.
pub(crate) async fn open_in_new_tab(opener: &Page, link: &Locator) -> PageKitResult<Page> {
    let link = link.clone();
    let tab = opener
        .expect_popup(
            || async move { link.click().await },
            LoadState::DomContentLoaded,
        )
        .await?;
    info!(opener = %opener.id(), url = %tab.current_url(), "new tab");
    Ok(tab)
}
