//! Team manager screens.

mod add_users;
mod assessments;
mod assign_course;
mod course_details;
mod courses;
mod create_learning_path;
mod dashboard;
mod due_dates;
mod learning_paths;
mod manage_library;
mod navigation;
mod skills_assessments_data;

pub use add_users::AdminAddUsers;
pub use assessments::AdminAssessments;
pub use assign_course::{today, AssignCourseModal};
pub use course_details::AdminCourseDetails;
pub use courses::AdminCourses;
pub use create_learning_path::AdminCreateLearningPath;
pub use dashboard::AdminDashboard;
pub use due_dates::AdminDueDates;
pub use learning_paths::ManageLearningPaths;
pub use manage_library::AdminManageLibrary;
pub use navigation::AdminNavigation;
pub use skills_assessments_data::AdminSkillsAssessmentsData;
