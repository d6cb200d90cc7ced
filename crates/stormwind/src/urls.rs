//! Paths and external addresses of the Stormwind LMS.
//!
//! Paths are relative to the configured base URL. The admin pages belong to
//! the team-reporting UI; older `/admin/*` variants of the same screens are
//! not covered.

/// Two-step login form
pub const LOGIN: &str = "/user/login";
/// Ends the session and returns to the login form
pub const LOGOUT: &str = "/user/logout";

/// Admin (team manager) screens
pub mod admin {
    /// Team reporting dashboard of the QA team
    pub const DASHBOARD: &str = "/team/19126/reporting/145164";
    /// Substring every reporting dashboard URL contains
    pub const DASHBOARD_MARKER: &str = "/reporting/";
    /// Learning path management
    pub const MANAGE_LEARNING_PATHS: &str = "/team/learning-path";
    /// Substring of the learning path management URL
    pub const LEARNING_PATHS_MARKER: &str = "/learning-path";
    /// Learning path creation form
    pub const CREATE_LEARNING_PATH: &str = "/team/learning-path/create";
    /// Assessment administration
    pub const ASSESSMENTS: &str = "/admin/assessments";
    /// Substring of the assessments URL
    pub const ASSESSMENTS_MARKER: &str = "assessments";
    /// Course administration
    pub const COURSES: &str = "/admin/courses";
    /// Substring of the course administration URL
    pub const COURSES_MARKER: &str = "courses";
    /// Content library administration
    pub const MANAGE_LIBRARY: &str = "/admin/manage-library";
    /// Substring of the library URL
    pub const MANAGE_LIBRARY_MARKER: &str = "manage-library";
    /// Due date report of the QA team
    pub const DUE_DATES: &str = "/team/19126/due-date/145164";
    /// Substring every due date report URL contains
    pub const DUE_DATES_MARKER: &str = "/due-date/";
    /// Skills assessment report of the QA team
    pub const SKILLS_ASSESSMENTS_DATA: &str = "/team/19126/skills-assessment/145164";
    /// Substring every skills assessment report URL contains
    pub const SKILLS_ASSESSMENTS_DATA_MARKER: &str = "/skills-assessment/";
    /// Invitation form of the QA team
    pub const ADD_USERS: &str = "/setup/team/145164/invitations?group=19126";
    /// Substring of the invitation form URL
    pub const ADD_USERS_MARKER: &str = "/invitations";
    /// Course the assign-course flow runs against
    pub const PL300_COURSE: &str =
        "/microsoft-it/microsoft-power-platform/pl-300-microsoft-power-bi-data-analyst#no-back";
    /// Substring of the PL-300 course URL
    pub const PL300_MARKER: &str = "pl-300-microsoft-power-bi-data-analyst";
}

/// Student screens
pub mod student {
    /// Landing page after a student signs in
    pub const MY_CLASSROOM: &str = "/my_classroom";
    /// Substring of the classroom URL
    pub const MY_CLASSROOM_MARKER: &str = "my_classroom";
    /// Course search results; topic landing pages live below it
    pub const COURSES: &str = "/courses";
    /// Topic categories the "Courses" link opens
    pub const TOPICS: &str = "/topics";
    /// Cybersecurity topic landing page
    pub const CYBERSECURITY_COURSES: &str = "/courses/170394";
    /// Course details of "Coding with AI (Copilot)"
    pub const COPILOT_COURSE: &str = "/stormwind-developer/ai-and-chatgpt/coding-ai-copilot";
    /// Course details of "Python Foundations", which carries supplements
    pub const PYTHON_FOUNDATIONS_COURSE: &str = "/stormwind-developer/python/python-foundations";
    /// Course details of "Microsoft Azure for .NET Developers", already started
    pub const AZURE_DOTNET_COURSE: &str =
        "/stormwind-developer/microsoft-net-development/microsoft-azure-net-developers";
    /// Lesson player of the Azure course, opened by "Resume"
    pub const AZURE_DOTNET_LESSONS: &str = "/replay/106477/course-overview";
    /// Learning path catalogue
    pub const LEARNING_PATHS: &str = "/learningpaths";
    /// Skills assessment catalogue
    pub const SKILLS_ASSESSMENTS: &str = "/skillsassessment";
    /// Leaderboard
    pub const LEADERBOARD: &str = "/leaderboard";
    /// Webinar listing
    pub const WEBINARS: &str = "/webinar";
    /// Live course calendar, opened in a new tab
    pub const LIVE_COURSE_CALENDAR: &str = "/live-course-calendar";
    /// Substring of the calendar URL
    pub const CALENDAR_MARKER: &str = "calendar";
}

/// Sites outside the LMS the sidebar opens in new tabs
pub mod external {
    /// Newsletter host
    pub const NEWSLETTER_HOST: &str = "partners.stormwind.com";
    /// Newsletter sign-up page
    pub const NEWSLETTER: &str = "https://partners.stormwind.com/newsletter";
    /// Feedback board host
    pub const FEEDBACK_HOST: &str = "feedback.stormwindstudios.com";
    /// Feedback board home
    pub const SEND_IDEAS: &str = "https://feedback.stormwindstudios.com/";
}
