//! Manager screens: reporting dashboard and the team reports, learning path
//! management and creation, the course and library administration, the
//! invitation form and the course page with its assign-course modal.

use crate::replica::chrome::{admin_page, escape, filter_items, with_course_search};
use crate::replica::{ACTIVE_PATHS, ARCHIVED_PATHS};
use crate::urls::{admin, student};
use pagekit::mock::{ActionContext, LoadTiming, MockAction, MockRoute, MockSite, RenderContext};
use pagekit::PageKitResult;
use std::fmt::Write as _;
use std::time::Duration;

/// Assessment catalogue: (slug, name, kind, questions)
const ASSESSMENTS: &[(&str, &str, &str, u32)] = &[
    ("comptia-a-core-1", "CompTIA A+ Core 1", "Certification practice", 90),
    ("network-fundamentals", "Network+ Fundamentals", "Skills check", 45),
    ("security-practice-exam", "Security+ Practice Exam", "Certification practice", 90),
    ("azure-administrator", "Azure Administrator Readiness", "Skills check", 60),
];

/// Students the manager can assign: (name, licensed for the course, already
/// has a due date)
const ASSIGNABLE: &[(&str, bool, bool)] = &[
    ("Santiago Manager", true, true),
    ("Santiago contact 1", false, false),
    ("Santiago contact 2", false, false),
    ("Maria Lopez", true, false),
];

/// Courses reachable through `/microsoft-it/:category/:course`
const COURSES: &[Course] = &[Course {
    slug: "pl-300-microsoft-power-bi-data-analyst",
    title: "PL-300: Microsoft Power BI Data Analyst",
    level: "Intermediate",
    duration: "12 hours",
    overview: "Prepare for the PL-300 exam: model, visualize and analyze data with Power BI.",
}];

struct Course {
    slug: &'static str,
    title: &'static str,
    level: &'static str,
    duration: &'static str,
    overview: &'static str,
}

/// Course administration table: (slug, name, status)
const ADMIN_COURSES: &[(&str, &str, &str)] = &[
    ("introduction-to-networking", "Introduction to Networking", "Published"),
    ("windows-server-2022", "Windows Server 2022 Administration", "Published"),
    ("test-course-draft", "Test Course Draft", "Draft"),
];

/// Library content: (slug, title, category value)
const LIBRARY: &[(&str, &str, &str)] = &[
    ("subnetting-walkthrough", "Subnetting Walkthrough", "videos"),
    ("powershell-cheat-sheet", "PowerShell Cheat Sheet", "documents"),
    ("azure-vnet-lab", "Azure Virtual Network Lab", "labs"),
    ("firewall-rules-explained", "Firewall Rules Explained", "videos"),
];

/// Library category select: (value, label)
const LIBRARY_CATEGORIES: &[(&str, &str)] = &[
    ("", "All categories"),
    ("videos", "Videos"),
    ("documents", "Documents"),
    ("labs", "Labs"),
];

/// Team due dates: (slug, course, due date, assigned, completed)
const DUE_DATE_ROWS: &[(&str, &str, &str, u32, u32)] = &[
    ("pl-300", "PL-300: Microsoft Power BI Data Analyst", "12/15/2026", 4, 1),
    ("az-104", "AZ-104: Microsoft Azure Administrator", "01/20/2027", 3, 3),
    ("security-plus", "CompTIA Security+ (SY0-701)", "10/01/2026", 2, 0),
];

/// Students each due date row names, for the course-or-student search
const DUE_DATE_STUDENTS: &[(&str, &[&str])] = &[
    ("pl-300", &["Santiago Manager", "Maria Lopez"]),
    ("az-104", &["Maria Lopez"]),
    ("security-plus", &["Santiago contact 1"]),
];

/// Skills assessment engagement: (slug, name, last engagement, registered,
/// completed)
const SKILLS_DATA: &[(&str, &str, &str, u32, u32)] = &[
    ("computer-hardware-support", "Computer Hardware Support", "10/14/2026", 8, 6),
    ("networking-essentials", "Networking Essentials", "10/02/2026", 5, 2),
    ("cloud-security", "Cloud Security Fundamentals", "09/21/2026", 3, 1),
];

/// Rows of the invitation form; all but the first start hidden
const INVITE_ROWS: usize = 5;

const SELECTION: &str = "#assign-selection";

pub(super) fn routes(site: MockSite) -> MockSite {
    site.route(dashboard())
        .route(create_learning_path())
        .route(manage_learning_paths())
        .route(assessments())
        .route(page(MockRoute::render("/admin/assessments/:slug", |ctx| {
            let name = ctx
                .params
                .get("slug")
                .and_then(|slug| ASSESSMENTS.iter().find(|a| a.0 == slug))
                .map_or("Unknown assessment", |a| a.1);
            admin_page(
                ctx,
                name,
                &format!(
                    r#"<h1>{}</h1><p class="assessment-summary">Review questions, scoring and who has taken this assessment.</p><a href="{}">Back to assessments</a>"#,
                    escape(name),
                    admin::ASSESSMENTS
                ),
            )
        })))
        .route(courses())
        .route(page(MockRoute::render("/admin/courses/:slug", |ctx| {
            let name = ctx
                .params
                .get("slug")
                .and_then(|slug| ADMIN_COURSES.iter().find(|c| c.0 == slug))
                .map_or("Unknown course", |c| c.1);
            admin_page(
                ctx,
                name,
                &format!(
                    r#"<h1>Edit {}</h1><a href="{}">Back to courses</a>"#,
                    escape(name),
                    admin::COURSES
                ),
            )
        })))
        .route(manage_library())
        .route(due_dates())
        .route(skills_assessments_data())
        .route(add_users())
        .route(course_details())
}

fn page(route: MockRoute) -> MockRoute {
    with_course_search(route.protected())
}

// -----------------------------------------------------------------------------
// Dashboard
// -----------------------------------------------------------------------------

fn dashboard() -> MockRoute {
    page(
        MockRoute::render(admin::DASHBOARD, |ctx| {
            let mut rows = String::new();
            for (name, email, hours) in [
                ("Maria Lopez", "maria.lopez@stormwind.test", "14.5"),
                ("Santiago contact 1", "contact1@stormwind.test", "3.0"),
                ("Santiago contact 2", "contact2@stormwind.test", "0.5"),
            ] {
                let _ = write!(
                    rows,
                    "<tr><td>{name}</td><td>{email}</td><td>{hours}</td></tr>"
                );
            }
            let main = format!(
                r##"<h1>Dashboard</h1>
<section id="manager-team-report">
  <h2>Licenses</h2>
  <div class="card card-licenses">
    <div class="stat"><span class="stat__value">25</span><span class="stat__label">Total Licenses</span></div>
    <div class="stat"><span class="stat__value">12</span><span class="stat__label">Available Licenses</span></div>
    <div class="stat"><span class="stat__value">13</span><span class="stat__label">Students Assigned</span></div>
    <button type="button" class="btn" data-toggle="modal" data-target="#manager-export-license-modal">Receive Licenses Report</button>
  </div>
</section>
<section class="team-activity">
  <h2>Team Activity</h2>
  <div class="stat"><span class="stat__value">128</span><span class="stat__label">Total Hours Trained</span></div>
  <div class="stat"><span class="stat__value">9</span><span class="stat__label">Total Courses Completed</span></div>
  <a class="btn" href="/team/19126/resend-onboarding-email">Resend Welcome Email</a>
  <button type="button" class="btn">Receive Activity Report</button>
</section>
<section class="students-information">
  <h2>Students Information</h2>
  <input id="search-term" type="text" placeholder="Search by name or email">
  <a class="btn" href="/team/19126/invitations?group=19126">Invite Students</a>
  <table class="table"><thead><tr><th>Student</th><th>Email</th><th>Hours</th></tr></thead><tbody>{rows}</tbody></table>
  <nav class="pager"><a href="?page=1">Next</a><a href="?page=2">Last</a></nav>
</section>"##
            );
            admin_page(ctx, "Reporting", &main)
        })
        .with_timing(LoadTiming::staggered(
            Duration::from_millis(30),
            Duration::from_millis(60),
        )),
    )
}

// -----------------------------------------------------------------------------
// Learning paths
// -----------------------------------------------------------------------------

fn path_rows(names: &[String], archived: bool) -> String {
    let mut rows = String::new();
    for name in names {
        let name = escape(name);
        let actions = if archived {
            format!(r##"<a class="btn btn-unarchive" href="#" data-path="{name}">Publish</a>"##)
        } else {
            format!(
                r##"<a class="btn btn-report" href="#">Report</a><a class="btn btn-edit" href="#">Edit</a><a class="btn btn-archive" href="#" data-path="{name}">Archive</a>"##
            )
        };
        let _ = write!(rows, "<tr><td>{name}</td><td>{actions}</td></tr>");
    }
    rows
}

fn move_path(ctx: &mut ActionContext<'_>, from: &str, to: &str) -> PageKitResult<()> {
    let Some(name) = ctx.element().attribute("data-path").map(ToString::to_string) else {
        return Ok(());
    };
    let reload = ctx.url().to_string();
    if ctx.store().move_item(from, to, &name) {
        tracing::debug!(path = %name, from, to, "learning path moved");
    }
    ctx.navigate(reload);
    Ok(())
}

fn manage_learning_paths() -> MockRoute {
    page(MockRoute::render(admin::MANAGE_LEARNING_PATHS, |ctx| {
        let main = format!(
            r#"<h1>Learning Paths</h1>
<a class="btn btn-primary" href="{create}">Create Path</a>
<div id="manager-learning-path-div">
  <h2>Active Paths</h2>
  <input type="text" placeholder="Search for a Learning Path">
  <table class="table"><thead><tr><th>Name</th><th>Actions</th></tr></thead><tbody>{active}</tbody></table>
</div>
<div id="manager-learning-path-archived-div">
  <h2>Archived Paths</h2>
  <table class="table"><thead><tr><th>Name</th><th>Actions</th></tr></thead><tbody>{archived}</tbody></table>
</div>"#,
            create = admin::CREATE_LEARNING_PATH,
            active = path_rows(ctx.store.list(ACTIVE_PATHS), false),
            archived = path_rows(ctx.store.list(ARCHIVED_PATHS), true),
        );
        admin_page(ctx, "Manage Learning Paths", &main)
    }))
    .on_click(
        "a.btn-archive",
        MockAction::custom(|ctx| move_path(ctx, ACTIVE_PATHS, ARCHIVED_PATHS)),
    )
    .on_click(
        "a.btn-unarchive",
        MockAction::custom(|ctx| move_path(ctx, ARCHIVED_PATHS, ACTIVE_PATHS)),
    )
}

// -----------------------------------------------------------------------------
// Assessments
// -----------------------------------------------------------------------------

fn assessments() -> MockRoute {
    page(MockRoute::render(admin::ASSESSMENTS, |ctx| {
        let mut rows = String::new();
        for (slug, name, kind, questions) in ASSESSMENTS {
            let _ = write!(
                rows,
                r#"<tr data-fragment="assessment-{slug}" data-fragment-initial="visible"><td>{name}</td><td>{kind}</td><td>{questions}</td><td><button type="button" class="btn js-view-assessment" data-slug="{slug}">View</button></td></tr>"#,
                name = escape(name),
            );
        }
        let main = format!(
            r#"<h1>Assessments</h1>
<button type="button" class="btn btn-primary js-create-assessment">Create Assessment</button>
<div class="assessments-filter"><input type="text" placeholder="Search assessments"></div>
<table class="table assessments-table"><thead><tr><th>Name</th><th>Type</th><th>Questions</th><th></th></tr></thead><tbody>{rows}</tbody></table>
<div class="sw-dialog" role="dialog" data-fragment="new-assessment">
  <h3>New Assessment</h3>
  <label for="new-assessment-name">Name</label><input id="new-assessment-name" type="text">
  <button type="button" class="btn js-cancel-assessment">Cancel</button>
  <button type="button" class="btn btn-primary">Save</button>
</div>"#
        );
        admin_page(ctx, "Assessments", &main)
    }))
    .on_click(".js-create-assessment", MockAction::Show("new-assessment".into()))
    .on_click(".js-cancel-assessment", MockAction::Hide("new-assessment".into()))
    .on_change(
        ".assessments-filter input",
        MockAction::custom(|ctx| {
            let term = ctx.element().value.clone().unwrap_or_default().to_lowercase();
            for (slug, name, ..) in ASSESSMENTS {
                let fragment = format!("assessment-{slug}");
                if name.to_lowercase().contains(term.trim()) {
                    ctx.show(&fragment);
                } else {
                    ctx.hide(&fragment);
                }
            }
            Ok(())
        }),
    )
    .on_click(
        ".js-view-assessment",
        MockAction::custom(|ctx| {
            if let Some(slug) = ctx.element().attribute("data-slug").map(ToString::to_string) {
                ctx.navigate(format!("{}/{slug}", admin::ASSESSMENTS));
            }
            Ok(())
        }),
    )
}

// -----------------------------------------------------------------------------
// Learning path creation
// -----------------------------------------------------------------------------

fn create_learning_path() -> MockRoute {
    page(MockRoute::render(admin::CREATE_LEARNING_PATH, |ctx| {
        let main = format!(
            r##"<div class="learning-path-header">
  <a class="btn btn-secondary goback" href="{manage}">Back</a>
  <h1>Creating a new Learning Path</h1>
  <div class="learning-path-actions">
    <button type="button" id="btn-save-draft" class="btn btn-secondary">Save as Draft</button>
    <a class="btn btn-secondary goback" href="{manage}">Cancel</a>
    <a class="btn btn-primary btn-save" data-action="publish" href="#">Publish</a>
  </div>
  <a id="btn-how-does-it-work" href="#">How does it work?</a>
</div>
<form class="learning-path-form" onsubmit="return false">
  <label for="learning-path-title">Title</label><input id="learning-path-title" type="text">
  <label for="learning-path-description">Description</label><textarea id="learning-path-description"></textarea>
  <button type="button" class="multiselect dropdown-toggle">Select Groups</button>
</form>
<div class="learning-path-tabs">
  <a class="tab active" href="#">Learning Path</a>
  <a class="tab" href="#">Students (0)</a>
</div>
<div class="learning-path-courses">
  <input type="text" class="search-course-term" placeholder="Find courses to add">
  <p class="empty-state">Search for a course to start building your Learning Path.</p>
  <div class="learning-path-stats"><span>0 course(s)</span><span>0 hour(s)</span></div>
</div>"##,
            manage = admin::MANAGE_LEARNING_PATHS,
        );
        admin_page(ctx, "Create Learning Path", &main)
    }))
}

// -----------------------------------------------------------------------------
// Course and library administration
// -----------------------------------------------------------------------------

fn courses() -> MockRoute {
    page(MockRoute::render(admin::COURSES, |ctx| {
        let mut rows = String::new();
        for (slug, name, status) in ADMIN_COURSES {
            let _ = write!(
                rows,
                r#"<tr data-fragment="course-{slug}" data-fragment-initial="visible"><td>{name}</td><td>{status}</td><td><button type="button" class="btn js-edit-course" data-slug="{slug}">Edit</button><button type="button" class="btn btn-danger js-delete-course">Delete</button></td></tr>"#,
                name = escape(name),
            );
        }
        let main = format!(
            r#"<h1>Courses</h1>
<button type="button" class="btn btn-primary js-create-course">Create Course</button>
<div class="courses-filter"><input type="text" placeholder="Search courses"></div>
<table class="table courses-table"><thead><tr><th>Name</th><th>Status</th><th></th></tr></thead><tbody>{rows}</tbody></table>
<p class="alert alert-warning" data-fragment="delete-course">Deleting a course needs confirmation from StormWind support.</p>
<div class="sw-dialog" role="dialog" data-fragment="new-course">
  <h3>New Course</h3>
  <label for="new-course-name">Name</label><input id="new-course-name" type="text">
  <button type="button" class="btn js-cancel-course">Cancel</button>
  <button type="button" class="btn btn-primary">Save</button>
</div>"#
        );
        admin_page(ctx, "Courses", &main)
    }))
    .on_click(".js-create-course", MockAction::Show("new-course".into()))
    .on_click(".js-cancel-course", MockAction::Hide("new-course".into()))
    .on_click(".js-delete-course", MockAction::Show("delete-course".into()))
    .on_click(
        ".js-edit-course",
        MockAction::custom(|ctx| {
            if let Some(slug) = ctx.element().attribute("data-slug").map(ToString::to_string) {
                ctx.navigate(format!("{}/{slug}", admin::COURSES));
            }
            Ok(())
        }),
    )
    .on_change(
        ".courses-filter input",
        MockAction::custom(|ctx| {
            let term = ctx.element().value.clone().unwrap_or_default().to_lowercase();
            filter_items(
                ctx,
                "course",
                ADMIN_COURSES
                    .iter()
                    .map(|(slug, name, _)| (*slug, name.to_lowercase().contains(term.trim()))),
            );
            Ok(())
        }),
    )
}

/// Re-apply the library search and category to every row
fn filter_library(ctx: &mut ActionContext<'_>) -> PageKitResult<()> {
    let term = ctx
        .value_of(".library-filter input")
        .unwrap_or_default()
        .to_lowercase();
    let category = ctx
        .value_of(r#"select[name="category"]"#)
        .unwrap_or_default();
    filter_items(
        ctx,
        "library",
        LIBRARY.iter().map(|(slug, title, kind)| {
            let keep = title.to_lowercase().contains(term.trim())
                && (category.is_empty() || category == *kind);
            (*slug, keep)
        }),
    );
    Ok(())
}

fn manage_library() -> MockRoute {
    page(MockRoute::render(admin::MANAGE_LIBRARY, |ctx| {
        let mut options = String::new();
        for (value, label) in LIBRARY_CATEGORIES {
            let _ = write!(options, r#"<option value="{value}">{label}</option>"#);
        }
        let mut rows = String::new();
        for (slug, title, kind) in LIBRARY {
            let _ = write!(
                rows,
                r#"<tr data-fragment="library-{slug}" data-fragment-initial="visible"><td>{title}</td><td>{kind}</td></tr>"#,
                title = escape(title),
            );
        }
        let main = format!(
            r#"<h1>Manage Library</h1>
<button type="button" class="btn btn-primary js-add-content">Add Content</button>
<div class="library-filter">
  <input type="text" placeholder="Search content">
  <select name="category" aria-label="Category">{options}</select>
</div>
<table class="table library-table"><thead><tr><th>Title</th><th>Category</th></tr></thead><tbody>{rows}</tbody></table>
<form class="library-upload" onsubmit="return false">
  <input type="file" name="content" aria-label="Content file">
  <button type="button" class="btn">Upload</button>
</form>
<div class="sw-dialog" role="dialog" data-fragment="new-content">
  <h3>New Content</h3>
  <label for="new-content-title">Title</label><input id="new-content-title" type="text">
  <button type="button" class="btn js-cancel-content">Cancel</button>
  <button type="button" class="btn btn-primary">Save</button>
</div>"#
        );
        admin_page(ctx, "Manage Library", &main)
    }))
    .on_click(".js-add-content", MockAction::Show("new-content".into()))
    .on_click(".js-cancel-content", MockAction::Hide("new-content".into()))
    .on_change(".library-filter input", MockAction::custom(filter_library))
    .on_change(r#"select[name="category"]"#, MockAction::custom(filter_library))
}

// -----------------------------------------------------------------------------
// Team reports
// -----------------------------------------------------------------------------

const fn percent(completed: u32, assigned: u32) -> u32 {
    if assigned == 0 {
        0
    } else {
        completed * 100 / assigned
    }
}

fn gauge(value: &str, caption: &str) -> String {
    format!(
        r#"<div class="progress-gauge"><div class="progress-gauge__percentage-complete"><span class="font-size-lg">{value}</span><span class="font-size-sm">{caption}</span></div></div>"#
    )
}

fn due_dates() -> MockRoute {
    page(MockRoute::render("/team/:team/due-date/:company", |ctx| {
        let mut rows = String::new();
        for (slug, course, date, assigned, completed) in DUE_DATE_ROWS {
            let _ = write!(
                rows,
                r#"<tr data-fragment="due-date-{slug}" data-fragment-initial="visible"><td>{course}</td><td>{date}</td><td>{assigned}</td><td>{completed}</td><td>{pct}%</td></tr>"#,
                course = escape(course),
                pct = percent(*completed, *assigned),
            );
        }
        let main = format!(
            r#"<h1>Due Dates</h1>
<section class="due-date-summary">
  <div class="due-date-total"><span class="font-size-lg">{total}</span><span class="total-label">Total due dates</span></div>
  {completed}{in_progress}{overdue}
  <input id="manager-course-search" type="text" placeholder="Search course">
  <button type="button" id="btn-create-duedate" class="btn btn-primary">Assign Due Date</button>
</section>
<div id="manager-due-date-div">
  <h2>All Due Dates</h2>
  <input type="text" class="search-term" placeholder="Search by course or student">
  <table class="table"><thead><tr><th>Course</th><th>Due Date</th><th>Students Assigned</th><th>Students Completed</th><th>Percentage Completed</th></tr></thead><tbody>{rows}</tbody></table>
</div>
<div id="assign-due-date-modal" class="modal" data-fragment="assign-due-date">
  <div class="modal-header"><h4>Assign Due Date</h4><button type="button" class="close" aria-label="Close">&times;</button></div>
  <label for="due-date-course">Course</label><input id="due-date-course" type="text">
  <label for="due-date-day">Due date</label><input id="due-date-day" type="date">
</div>"#,
            total = DUE_DATE_ROWS.len(),
            completed = gauge("33%", "Completed"),
            in_progress = gauge("33%", "In Progress"),
            overdue = gauge("33%", "Overdue"),
        );
        admin_page(ctx, "Due Dates", &main)
    }))
    .on_click("#btn-create-duedate", MockAction::Show("assign-due-date".into()))
    .on_click(
        "#assign-due-date-modal button.close",
        MockAction::Hide("assign-due-date".into()),
    )
    .on_change(
        "#manager-due-date-div input.search-term",
        MockAction::custom(|ctx| {
            let term = ctx.element().value.clone().unwrap_or_default().to_lowercase();
            let term = term.trim();
            filter_items(
                ctx,
                "due-date",
                DUE_DATE_ROWS.iter().map(|(slug, course, ..)| {
                    let student_match = DUE_DATE_STUDENTS
                        .iter()
                        .filter(|(row, _)| row == slug)
                        .flat_map(|(_, students)| students.iter())
                        .any(|s| s.to_lowercase().contains(term));
                    (*slug, student_match || course.to_lowercase().contains(term))
                }),
            );
            Ok(())
        }),
    )
}

fn skills_assessments_data() -> MockRoute {
    page(MockRoute::render("/team/:team/skills-assessment/:company", |ctx| {
        let mut rows = String::new();
        for (slug, name, last, registered, completed) in SKILLS_DATA {
            let _ = write!(
                rows,
                r#"<tr data-fragment="skills-data-{slug}" data-fragment-initial="visible"><td>{name}</td><td>{last}</td><td>{registered}</td><td>{completed}</td></tr>"#,
                name = escape(name),
            );
        }
        let main = format!(
            r#"<h1 class="page-title">Skills Assessments Data</h1>
<a class="btn btn-outline-dark" href="{catalogue}">View Skills Assessments</a>
<section class="most-popular">
  <h3>Most Popular Skills Assessment</h3>
  <p class="most-popular__name">{popular}</p>
  <div class="average-score-description"><strong>78%</strong><span>Average Score</span></div>
  <div class="total-completed-description"><strong>6</strong><span>Total Completed</span></div>
</section>
<section class="skills-details">
  <h2>Skills Assessment Details</h2>
  <input type="text" class="search-term" aria-label="Search" placeholder="Search">
  <table class="table"><thead><tr><th>Skill Assessment</th><th>Last Engagement</th><th>Students Registered</th><th>Students Completed</th></tr></thead><tbody>{rows}</tbody></table>
</section>"#,
            catalogue = student::SKILLS_ASSESSMENTS,
            popular = escape(SKILLS_DATA[0].1),
        );
        admin_page(ctx, "Skills Assessments Data", &main)
    }))
    .on_change(
        ".skills-details input.search-term",
        MockAction::custom(|ctx| {
            let term = ctx.element().value.clone().unwrap_or_default().to_lowercase();
            filter_items(
                ctx,
                "skills-data",
                SKILLS_DATA
                    .iter()
                    .map(|(slug, name, ..)| (*slug, name.to_lowercase().contains(term.trim()))),
            );
            Ok(())
        }),
    )
}

// -----------------------------------------------------------------------------
// Invitations
// -----------------------------------------------------------------------------

fn invite_row(index: usize) -> String {
    let initial = if index == 0 {
        r#" data-fragment-initial="visible""#
    } else {
        ""
    };
    format!(
        r#"<div class="invite-row" data-fragment="invite-row-{index}"{initial}>
  <input type="text" name="first_name[{index}]" placeholder="First Name">
  <input type="text" name="last_name[{index}]" placeholder="Last Name">
  <input type="email" name="email[{index}]" placeholder="Email">
  <select name="license[{index}]" aria-label="License"><option value="pro">StormWind Pro</option><option value="none">No license</option></select>
</div>"#
    )
}

fn add_users() -> MockRoute {
    page(MockRoute::render("/setup/team/:company/invitations", |ctx| {
        let rows: String = (0..INVITE_ROWS).map(invite_row).collect();
        let main = format!(
            r##"<h1>Add Users</h1>
<p class="group-description">You are adding new users to the group named <strong>QA Team</strong>.</p>
<p class="license-summary"><strong>12</strong> licenses available</p>
<label for="license-copies">License copies:</label><input id="license-copies" type="number" value="1">
<form class="invitations" onsubmit="return false">
  {rows}
  <input type="hidden" id="invite-rows" value="1">
  <a href="#" class="js-add-row">Add row</a>
  <div class="edit-actions">
    <a id="edit-actions-cancel" class="btn btn-secondary" href="{dashboard}">Cancel</a>
    <button type="button" id="edit-actions-submit" class="btn btn-primary">Save</button>
  </div>
</form>
<div class="additional-users">
  <p>Do you need access for additional users?</p>
  <a href="/team/{group}/request-users">Request more licenses</a>
</div>"##,
            dashboard = admin::DASHBOARD,
            group = ctx.query("group").unwrap_or_default(),
        );
        admin_page(ctx, "Add Users", &main)
    }))
    .on_click(
        ".js-add-row",
        MockAction::custom(|ctx| {
            let shown: usize = ctx
                .value_of("#invite-rows")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            if shown < INVITE_ROWS {
                ctx.show(&format!("invite-row-{shown}"));
                ctx.set_value("#invite-rows", (shown + 1).to_string());
            }
            Ok(())
        }),
    )
}

// -----------------------------------------------------------------------------
// Course page and assign-course modal
// -----------------------------------------------------------------------------

fn assign_modal() -> String {
    let mut rows = String::new();
    for (i, (name, ..)) in ASSIGNABLE.iter().enumerate() {
        let _ = write!(
            rows,
            r#"<div class="student-assign-container" data-fragment="assign-student-{i}" data-fragment-initial="visible">
  <label><input type="checkbox" data-student="{name}"> {name}</label>
  <input type="date" data-student="{name}" aria-label="Due date">
</div>"#
        );
    }
    format!(
        r#"<div id="assign-course-modal" class="modal" data-fragment="assign-course-modal">
  <div class="modal-header"><h4>Assign Course</h4><button type="button" class="close" aria-label="Close">&times;</button></div>
  <input type="search" placeholder="Search students">
  <input type="hidden" id="assign-selection" value="">
  <div class="students">{rows}</div>
  <div id="discover-assign-already-exist" class="alert alert-warning" data-fragment="assign-warning">The following students already have a due date for this course: Santiago Manager</div>
  <div id="discover-add-course-message-invalid" class="alert alert-danger" data-fragment="assign-error">One or more selected students cannot be assigned this course because it is not included in the license.</div>
  <button type="button" class="btn btn-primary add-assign-course">Assign</button>
</div>
<div class="alert alert-success" data-fragment="assign-success">Course assigned.</div>"#
    )
}

fn render_course(ctx: &RenderContext<'_>) -> String {
    let Some(course) = ctx
        .params
        .get("course")
        .and_then(|slug| COURSES.iter().find(|c| c.slug == slug))
    else {
        return admin_page(ctx, "Course not found", "<h1>Course not found</h1>");
    };
    let main = format!(
        r#"<section class="course-hero">
  <h1>{title}</h1>
  <div class="course-hero__meta"><span class="level">{level}</span><span class="duration">{duration}</span></div>
  <button type="button" class="btn js-assign-course">+ Assign Course</button>
</section>
<section class="course-overview"><h2>Overview</h2><p>{overview}</p></section>
{modal}"#,
        title = escape(course.title),
        level = course.level,
        duration = course.duration,
        overview = escape(course.overview),
        modal = assign_modal(),
    );
    admin_page(ctx, course.title, &main)
}

fn selection(ctx: &ActionContext<'_>) -> Vec<String> {
    ctx.value_of(SELECTION)
        .unwrap_or_default()
        .split('|')
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn course_details() -> MockRoute {
    page(MockRoute::render("/microsoft-it/:category/:course", render_course))
        .on_click(".js-assign-course", MockAction::Show("assign-course-modal".into()))
        .on_click(
            "#assign-course-modal button.close",
            MockAction::Hide("assign-course-modal".into()),
        )
        .on_change(
            r#"#assign-course-modal input[type="search"]"#,
            MockAction::custom(|ctx| {
                let term = ctx.element().value.clone().unwrap_or_default().to_lowercase();
                for (i, (name, ..)) in ASSIGNABLE.iter().enumerate() {
                    let fragment = format!("assign-student-{i}");
                    if name.to_lowercase().contains(term.trim()) {
                        ctx.show(&fragment);
                    } else {
                        ctx.hide(&fragment);
                    }
                }
                Ok(())
            }),
        )
        .on_change(
            r#".student-assign-container input[type="checkbox"]"#,
            MockAction::custom(|ctx| {
                let Some(student) = ctx.element().attribute("data-student").map(ToString::to_string)
                else {
                    return Ok(());
                };
                let checked = ctx.element().checked.unwrap_or(false);
                let mut selected = selection(ctx);
                selected.retain(|s| *s != student);
                if checked {
                    selected.push(student);
                }
                ctx.set_value(SELECTION, selected.join("|"));
                Ok(())
            }),
        )
        .on_change(
            r#".student-assign-container input[type="date"]"#,
            MockAction::custom(|ctx| {
                let student = ctx.element().attribute("data-student").unwrap_or_default();
                let has_due_date = ASSIGNABLE.iter().any(|(name, _, due)| *name == student && *due);
                let date = ctx.element().value.clone().unwrap_or_default();
                if has_due_date && !date.is_empty() {
                    ctx.show("assign-warning");
                } else if has_due_date {
                    ctx.hide("assign-warning");
                }
                Ok(())
            }),
        )
        .on_click(
            "button.add-assign-course",
            MockAction::custom(|ctx| {
                let selected = selection(ctx);
                let unlicensed = selected.iter().any(|student| {
                    ASSIGNABLE
                        .iter()
                        .any(|(name, licensed, _)| name == student && !licensed)
                });
                if unlicensed || selected.is_empty() {
                    ctx.show("assign-error");
                } else {
                    ctx.hide("assign-error");
                    ctx.hide("assign-course-modal");
                    ctx.show("assign-success");
                }
                Ok(())
            }),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_path_rows_carry_their_actions() {
        let active = path_rows(&["A & B".to_string()], false);
        assert!(active.contains("btn-archive"));
        assert!(active.contains("btn-report"));
        assert!(active.contains(r#"data-path="A &amp; B""#));
        let archived = path_rows(&["A".to_string()], true);
        assert!(archived.contains("btn-unarchive"));
        assert!(!archived.contains("btn-archive\""));
    }

    #[test]
    fn test_only_contacts_lack_a_license() {
        let unlicensed: Vec<_> = ASSIGNABLE
            .iter()
            .filter(|(_, licensed, _)| !licensed)
            .map(|(name, ..)| *name)
            .collect();
        assert_eq!(unlicensed, ["Santiago contact 1", "Santiago contact 2"]);
    }

    #[test]
    fn test_percent_of_empty_row_is_zero() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 4), 25);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn test_only_first_invite_row_starts_visible() {
        assert!(invite_row(0).contains(r#"data-fragment-initial="visible""#));
        assert!(!invite_row(1).contains("data-fragment-initial"));
        assert!(invite_row(3).contains(r#"name="email[3]""#));
    }

    #[tokio::test]
    async fn test_library_category_hides_other_kinds() {
        use crate::admin::AdminManageLibrary;
        use pagekit::prelude::*;

        let (_browser, page) = crate::replica::signed_in_page(Role::Admin).await;
        let library = AdminManageLibrary::new(&page);
        library.goto().await.unwrap();
        library.select_category("Videos").await.unwrap();
        assert!(library.content_row("Subnetting Walkthrough").is_visible().await.unwrap());
        assert!(!library.content_row("Azure Virtual Network Lab").is_visible().await.unwrap());
        library.search_content("firewall").await.unwrap();
        assert!(!library.content_row("Subnetting Walkthrough").is_visible().await.unwrap());
        assert!(library.content_row("Firewall Rules Explained").is_visible().await.unwrap());
    }

    #[tokio::test]
    async fn test_add_row_reveals_one_row_at_a_time() {
        use crate::admin::AdminAddUsers;
        use pagekit::prelude::*;

        let (_browser, page) = crate::replica::signed_in_page(Role::Admin).await;
        let add_users = AdminAddUsers::new(&page);
        add_users.goto().await.unwrap();
        assert_eq!(add_users.invitation_rows().await.unwrap(), 1);
        add_users.click_add_row().await.unwrap();
        add_users.click_add_row().await.unwrap();
        assert_eq!(add_users.invitation_rows().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_due_dates_search_matches_students() {
        use crate::admin::AdminDueDates;
        use pagekit::prelude::*;

        let (_browser, page) = crate::replica::signed_in_page(Role::Admin).await;
        let due_dates = AdminDueDates::new(&page);
        due_dates.goto().await.unwrap();
        due_dates.search_course_or_student("contact 1").await.unwrap();
        assert!(due_dates.due_date_row("Security+").is_visible().await.unwrap());
        assert!(!due_dates.due_date_row("PL-300").is_visible().await.unwrap());
    }
}
