//! Student screens: classroom, topics and catalogues, course details and
//! the lesson player, leaderboard, webinars and the live course calendar.

use crate::replica::chrome::{escape, filter_items, student_page};
use crate::replica::{ADMIN_EMAIL, ENROLLED_COURSES};
use crate::urls::student;
use chrono::{Datelike, Local, Months, NaiveDate};
use pagekit::mock::{ActionContext, MockAction, MockRoute, MockSite, RenderContext};
use pagekit::PageKitResult;
use std::fmt::Write as _;

/// Course catalogue: (name, level, link)
const COURSES: &[(&str, &str, &str)] = &[
    (
        "PL-300: Microsoft Power BI Data Analyst",
        "Intermediate",
        "/microsoft-it/microsoft-power-platform/pl-300-microsoft-power-bi-data-analyst",
    ),
    (
        "AZ-104: Microsoft Azure Administrator",
        "Intermediate",
        "/microsoft-it/microsoft-azure/az-104-microsoft-azure-administrator",
    ),
    (
        "CompTIA A+ Core 1 (220-1101)",
        "Beginner",
        "/comptia/comptia-a/comptia-a-core-1",
    ),
    (
        "CompTIA Security+ (SY0-701)",
        "Intermediate",
        "/comptia/comptia-security/comptia-security-plus",
    ),
];

struct LearningPath {
    slug: &'static str,
    name: &'static str,
    topic: &'static str,
    size: &'static str,
    courses: u32,
    hours: u32,
}

const LEARNING_PATHS: &[LearningPath] = &[
    LearningPath {
        slug: "santiago-test-1",
        name: "Learning Path Santiago Test 1",
        topic: "Microsoft",
        size: "short",
        courses: 3,
        hours: 8,
    },
    LearningPath {
        slug: "santiago-test-2",
        name: "Learning Path Santiago Test 2",
        topic: "Microsoft",
        size: "medium",
        courses: 5,
        hours: 21,
    },
    LearningPath {
        slug: "azure-administrator",
        name: "Azure Administrator Path",
        topic: "Cloud",
        size: "long",
        courses: 9,
        hours: 48,
    },
    LearningPath {
        slug: "cybersecurity-foundations",
        name: "Cybersecurity Foundations",
        topic: "Cybersecurity",
        size: "medium",
        courses: 6,
        hours: 30,
    },
];

const TOPICS: &[&str] = &["Microsoft", "Cloud", "Cybersecurity"];

/// Path size filter: (value, label)
const PATH_SIZES: &[(&str, &str)] = &[
    ("", "All sizes"),
    ("short", "Short (under 10 hours)"),
    ("medium", "Medium (10 to 40 hours)"),
    ("long", "Long (over 40 hours)"),
];

/// Skills assessment catalogue: (slug, name, level, duration)
const SKILLS_ASSESSMENTS: &[(&str, &str, &str, &str)] = &[
    ("computer-hardware-support", "Computer Hardware Support", "Intermediate", "2 hours"),
    ("networking-essentials", "Networking Essentials", "Beginner", "1 hour"),
    ("cloud-security", "Cloud Security Fundamentals", "Advanced", "3 hours"),
    ("microsoft-365-administration", "Microsoft 365 Administration", "Intermediate", "2 hours"),
    ("python-programming", "Python Programming Basics", "Beginner", "90 minutes"),
];

/// Webinars: (title, date)
const WEBINARS: &[(&str, &str)] = &[
    ("What's new in Microsoft Copilot for IT teams", "November 4, 2026"),
    ("Passing the CompTIA Security+ exam on the first try", "November 12, 2026"),
    ("Microsoft Azure cost management in practice", "November 19, 2026"),
    ("Building a cloud career roadmap", "December 2, 2026"),
];

/// Leaderboard rows: (student, total, recorded, live, completed, registered,
/// top course)
const LEADERBOARD: &[(&str, &str, &str, &str, u32, u32, &str)] = &[
    ("Maria Lopez", "41h 10m", "33h 40m", "7h 30m", 6, 9, "AZ-104"),
    ("Santiago Manager", "36h 05m", "30h 05m", "6h 00m", 5, 7, "PL-300"),
    ("Ana Torres", "28h 45m", "28h 45m", "0h 00m", 4, 4, "Security+"),
    ("Santiago contact 1", "12h 20m", "10h 20m", "2h 00m", 1, 3, "A+ Core 1"),
    ("Santiago contact 2", "3h 15m", "3h 15m", "0h 00m", 0, 2, "PL-300"),
];

/// Topic categories: (id, name)
const COURSE_TOPICS: &[(&str, &str)] = &[
    ("170390", "Artificial Intelligence (AI)"),
    ("170391", "Cloud"),
    ("170394", "Cybersecurity"),
    ("170395", "Desktop Applications"),
    ("170396", "DevOps"),
    ("170397", "Development"),
    ("170398", "Information Technology (IT)"),
    ("170399", "Project Management"),
    ("170400", "Ranges"),
    ("170401", "Security Awareness"),
    ("170402", "Skills Assessments"),
];

/// Subcategory chips of the Cybersecurity topic: (id, label)
const CYBERSECURITY_CHIPS: &[(&str, &str)] = &[
    ("all", "All"),
    ("comptia", "CompTIA"),
    ("cyber-range", "Cyber Range"),
    ("ec-council", "EC-Council"),
    ("isc2", "ISC2"),
    ("microsoft", "Microsoft"),
    ("pm", "PM"),
    ("palo-alto", "Palo Alto"),
    ("sonicwall", "SonicWall"),
    ("webinars", "Webinars"),
];

const COURSE_FILTERS: &[&str] = &[
    "Difficulty",
    "Job Role",
    "Instructor",
    "Course Type",
    "Certification-Based",
];

struct TopicCourse {
    slug: &'static str,
    title: &'static str,
    chip: &'static str,
    level: &'static str,
    duration: &'static str,
    instructor: &'static str,
}

const CYBERSECURITY_COURSES: &[TopicCourse] = &[
    TopicCourse {
        slug: "comptia-security-plus",
        title: "CompTIA Security+ (SY0-701)",
        chip: "comptia",
        level: "Intermediate",
        duration: "24 hours",
        instructor: "Mike Chapple",
    },
    TopicCourse {
        slug: "cyber-range-fundamentals",
        title: "Cyber Range Fundamentals",
        chip: "cyber-range",
        level: "Beginner",
        duration: "3 hours",
        instructor: "Dana Whitfield",
    },
    TopicCourse {
        slug: "certified-ethical-hacker",
        title: "Certified Ethical Hacker (CEH) v12",
        chip: "ec-council",
        level: "Advanced",
        duration: "40 hours",
        instructor: "Raymond Lacoste",
    },
    TopicCourse {
        slug: "cissp",
        title: "CISSP Certification Prep",
        chip: "isc2",
        level: "Advanced",
        duration: "35 hours",
        instructor: "Mike Chapple",
    },
    TopicCourse {
        slug: "sc-900",
        title: "SC-900: Microsoft Security Fundamentals",
        chip: "microsoft",
        level: "Beginner",
        duration: "6 hours",
        instructor: "Dana Whitfield",
    },
    TopicCourse {
        slug: "palo-alto-firewall-administration",
        title: "Palo Alto Firewall Administration",
        chip: "palo-alto",
        level: "Intermediate",
        duration: "less than 1 hour",
        instructor: "Raymond Lacoste",
    },
    TopicCourse {
        slug: "palo-alto-panorama",
        title: "Palo Alto Panorama Essentials",
        chip: "palo-alto",
        level: "Advanced",
        duration: "2 hours",
        instructor: "Raymond Lacoste",
    },
    TopicCourse {
        slug: "sonicwall-network-security",
        title: "SonicWall Network Security Administrator",
        chip: "sonicwall",
        level: "Intermediate",
        duration: "8 hours",
        instructor: "Dana Whitfield",
    },
];

/// A course with its own details page and lesson player
struct DeveloperCourse {
    slug: &'static str,
    replay_id: &'static str,
    category: &'static str,
    title: &'static str,
    level: &'static str,
    duration: &'static str,
    instructor: &'static str,
    overview: &'static str,
    modules: &'static [(&'static str, &'static [&'static str])],
    supplements: &'static [&'static str],
    /// Already under way for every student, so the page offers "Resume"
    started: bool,
}

const DEVELOPER_COURSES: &[DeveloperCourse] = &[
    DeveloperCourse {
        slug: "coding-ai-copilot",
        replay_id: "106501",
        category: "AI AND CHATGPT",
        title: "Coding with AI (Copilot)",
        level: "Beginner",
        duration: "1 hour",
        instructor: "Shaun Pelling",
        overview: "Coding with AI (Copilot) introduces learners to AI assisted development with GitHub Copilot, from editor setup to shipping a small site.",
        modules: &[
            (
                "Getting Started with Copilot",
                &[
                    "Tools, Models & Copilot Setup",
                    "Vibe Coding with Bolt",
                    "Copilot Basics",
                    "Copilot Edit & Agent Modes",
                ],
            ),
            (
                "Context and Project Application",
                &[
                    "Context",
                    "Making a Next.js Site with Copilot",
                    "Instruction Files",
                    "The Importance of Git",
                ],
            ),
            (
                "Server Setup, Features, and Wrap-Up",
                &["MCP Servers", "Adding a Feature List", "Final Thoughts"],
            ),
        ],
        supplements: &[
            "Download VS Code",
            "Copilot Plans",
            "VS Code Copilot Documentation",
            "VS Code Copilot Models",
        ],
        started: false,
    },
    DeveloperCourse {
        slug: "python-foundations",
        replay_id: "106320",
        category: "Python",
        title: "Python Foundations",
        level: "Beginner",
        duration: "10 hours",
        instructor: "Edem Francois",
        overview: "Learn the core of the Python language: types, control flow, functions, modules and working with files.",
        modules: &[
            ("Getting Started", &["Installing Python", "Your First Script"]),
            ("Core Language", &["Variables and Types", "Control Flow", "Functions"]),
            ("Working with Data", &["Lists and Dictionaries", "Reading Files"]),
        ],
        supplements: &["Class Slides", "Python Foundations Code Samples"],
        started: false,
    },
    DeveloperCourse {
        slug: "microsoft-azure-net-developers",
        replay_id: "106477",
        category: "MICROSOFT .NET DEVELOPMENT",
        title: "Microsoft Azure for .NET Developers",
        level: "Intermediate",
        duration: "14 hours",
        instructor: "Tim Warner",
        overview: "Build, deploy and scale .NET applications on Microsoft Azure.",
        modules: &[
            ("Introduction", &["Course Overview", "Meet Your Instructor"]),
            ("Get Started with Microsoft Azure", &["Azure Accounts", "The Azure Portal", "Azure CLI"]),
            ("Azure Resource Manager", &["Resource Groups", "ARM Templates"]),
            ("Azure App Service", &["Web Apps", "Deployment Slots"]),
            ("Azure SQL", &["Provisioning Azure SQL", "Entity Framework Core"]),
            ("Azure Cosmos DB", &["Cosmos DB Concepts", "The .NET SDK"]),
            ("Azure Storage Accounts", &["Blob Storage", "Queues and Tables"]),
            ("Azure Service Bus", &["Queues", "Topics and Subscriptions"]),
            ("Azure Functions (Serverless Solutions)", &["Triggers and Bindings", "Durable Functions"]),
            ("Azure Virtual Machines", &["Creating a VM", "Scale Sets"]),
            ("Azure Containers", &["Container Registry", "Container Apps"]),
            ("Microsoft Azure Active Directory", &["App Registrations", "Securing an API"]),
            ("Conclusion", &["Next Steps"]),
        ],
        supplements: &["Microsoft Azure for .NET Developers GitHub"],
        started: true,
    },
];

pub(super) fn routes(site: MockSite) -> MockSite {
    site.route(my_classroom())
        .route(
            MockRoute::render(student::COURSES, render_courses)
                .protected(),
        )
        .route(topics())
        .route(topic_courses())
        .route(developer_course())
        .route(lesson_player())
        .route(learning_paths())
        .route(skills_assessments())
        .route(leaderboard())
        .route(webinars())
        .route(calendar())
        .route(info_page("/support", "Support", "Our support team answers within one business day."))
        .route(info_page("/terms-of-use", "Terms of Use", "These terms govern your use of the platform."))
        .route(info_page("/privacy-policy", "Privacy Policy", "How we collect and use your data."))
}

fn info_page(pattern: &str, title: &'static str, text: &'static str) -> MockRoute {
    MockRoute::render(pattern, move |ctx| {
        student_page(ctx, title, &format!("<h1>{title}</h1><p>{text}</p>"))
    })
}

fn first_name(ctx: &RenderContext<'_>) -> &'static str {
    if ctx.account == Some(ADMIN_EMAIL) {
        "Santiago"
    } else {
        "Maria"
    }
}

/// Show or hide the preview named by the clicked element's `data-preview`
fn toggle_preview(ctx: &mut ActionContext<'_>, prefix: &str, show: bool) -> PageKitResult<()> {
    if let Some(slug) = ctx.element().attribute("data-preview").map(ToString::to_string) {
        let fragment = format!("{prefix}-{slug}");
        if show {
            ctx.show(&fragment);
        } else {
            ctx.hide(&fragment);
        }
    }
    Ok(())
}

fn search_query(term: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("search", term.trim())
        .finish()
}

fn matches_search(name: &str, term: Option<&str>) -> bool {
    term.map_or(true, |t| name.to_lowercase().contains(&t.trim().to_lowercase()))
}

// -----------------------------------------------------------------------------
// My Classroom
// -----------------------------------------------------------------------------

fn my_classroom() -> MockRoute {
    MockRoute::render(student::MY_CLASSROOM, |ctx| {
        let enrolled = ctx.store.list(ENROLLED_COURSES);
        let mut cards = String::new();
        for (name, level, link) in COURSES {
            let action = if enrolled.iter().any(|e| e == name) {
                format!(r#"<a class="btn btn-secondary" href="{link}">Continue</a>"#)
            } else {
                format!(
                    r#"<button type="button" class="btn btn-primary js-enroll" data-course="{}">Enroll</button>"#,
                    escape(name)
                )
            };
            let _ = write!(
                cards,
                r#"<div class="course-card"><h4 class="course-card__name">{}</h4><span class="course-card__level">{level}</span>{action}</div>"#,
                escape(name)
            );
        }
        let main = format!(
            r#"<h1 class="welcome">Welcome back, {name}!</h1>
<div class="classroom-tabs" role="tablist">
  <button type="button" role="tab" class="js-tab" data-panel="courses">Courses</button>
  <button type="button" role="tab" class="js-tab" data-panel="learning-paths">Learning Paths</button>
  <button type="button" role="tab" class="js-tab" data-panel="skills">Skills Assessment</button>
</div>
<div class="tab-panel" data-fragment="panel-courses" data-fragment-initial="visible"><div class="courses-list">{cards}</div></div>
<div class="tab-panel" data-fragment="panel-learning-paths"><p>You have not started a learning path yet.</p></div>
<div class="tab-panel" data-fragment="panel-skills"><p>Take a skills assessment to find your starting point.</p></div>"#,
            name = first_name(ctx),
        );
        student_page(ctx, "My Classroom", &main)
    })
    .protected()
    .on_click(
        ".js-tab",
        MockAction::custom(|ctx| {
            let Some(panel) = ctx.element().attribute("data-panel").map(ToString::to_string) else {
                return Ok(());
            };
            filter_items(
                ctx,
                "panel",
                ["courses", "learning-paths", "skills"].map(|p| (p, p == panel)),
            );
            Ok(())
        }),
    )
    .on_click(
        ".js-enroll",
        MockAction::custom(|ctx| {
            let Some(course) = ctx.element().attribute("data-course").map(ToString::to_string) else {
                return Ok(());
            };
            let reload = ctx.url().to_string();
            let store = ctx.store();
            let mut enrolled = store.list(ENROLLED_COURSES).to_vec();
            if !enrolled.contains(&course) {
                enrolled.push(course);
                store.set_list(ENROLLED_COURSES, enrolled);
            }
            ctx.navigate(reload);
            Ok(())
        }),
    )
}

fn render_courses(ctx: &RenderContext<'_>) -> String {
    let search = ctx.query("search");
    let mut cards = String::new();
    for (name, level, link) in COURSES
        .iter()
        .filter(|(name, ..)| matches_search(name, search.as_deref()))
    {
        let _ = write!(
            cards,
            r#"<div class="catalog-card"><a href="{link}">{}</a><span>{level}</span></div>"#,
            escape(name)
        );
    }
    if cards.is_empty() {
        cards.push_str(r#"<p class="empty">No courses match your search.</p>"#);
    }
    let main = format!(
        r#"<h1>Course Catalog</h1><p>Browse on-demand and live courses.</p><div class="catalog">{cards}</div>"#
    );
    student_page(ctx, "Courses", &main)
}

// -----------------------------------------------------------------------------
// Topics and topic landing pages
// -----------------------------------------------------------------------------

fn topics() -> MockRoute {
    MockRoute::render(student::TOPICS, |ctx| {
        let mut cards = String::new();
        for (id, name) in COURSE_TOPICS {
            let _ = write!(
                cards,
                r#"<div class="topic-card"><h2 class="topic-card__title"><a href="{}/{id}">{}</a></h2></div>"#,
                student::COURSES,
                escape(name)
            );
        }
        let main = format!(
            r#"<h1>Courses</h1><p class="lead">Pick a topic to browse its courses.</p><div id="topics-container">{cards}</div>"#
        );
        student_page(ctx, "Courses", &main)
    })
    .protected()
}

/// Chip the `tag` query selects, "all" when absent or unknown
fn active_chip(tag: Option<&str>) -> &'static str {
    tag.and_then(|t| CYBERSECURITY_CHIPS.iter().find(|(id, _)| *id == t))
        .map_or("all", |(id, _)| *id)
}

fn course_preview(course: &TopicCourse) -> String {
    format!(
        r##"<div class="modal course-preview-modal" data-fragment="course-preview-{slug}">
  <div class="modal-header"><h5 id="modalLabel" class="modal-title">{title}</h5><a href="#" data-dismiss="modal" aria-label="Close" data-preview="{slug}">&times;</a></div>
  <div class="modal-body">
    <span class="dif-time">{level}</span>
    <span class="dif-time">{duration}</span>
    <span class="course-instructor">By: {instructor}</span>
    <h5>Overview</h5>
    <p>Hands-on training with labs and practice questions.</p>
    <a class="text-learn-more-preview" href="{courses}/{slug}">Learn more</a>
    <button type="button" class="btn btn-primary js-course-flag">Add to My Classroom</button>
  </div>
</div>"##,
        slug = course.slug,
        title = escape(course.title),
        level = course.level,
        duration = course.duration,
        instructor = escape(course.instructor),
        courses = student::COURSES,
    )
}

fn topic_courses() -> MockRoute {
    MockRoute::render("/courses/:topic", |ctx| {
        let topic = ctx.params.get("topic").map(String::as_str);
        let Some((_, name)) = COURSE_TOPICS.iter().find(|(id, _)| Some(*id) == topic) else {
            return student_page(ctx, "Courses", "<h1>Topic not found</h1>");
        };
        let cybersecurity = *name == "Cybersecurity";
        let active = active_chip(ctx.query("tag").as_deref());
        let mut chips = String::new();
        let offered: &[(&str, &str)] = if cybersecurity {
            CYBERSECURITY_CHIPS
        } else {
            &CYBERSECURITY_CHIPS[..1]
        };
        for (id, label) in offered {
            let class = if *id == active { " active" } else { "" };
            let _ = write!(
                chips,
                r#"<li class="topic-card__tag{class}" data-id="{id}">{label}</li>"#
            );
        }
        let mut filters = String::new();
        for filter in COURSE_FILTERS {
            let _ = write!(
                filters,
                r#"<button type="button" class="filter-toggle">{filter}</button>"#
            );
        }
        let mut cards = String::new();
        let mut previews = String::new();
        let courses: &[TopicCourse] = if cybersecurity { CYBERSECURITY_COURSES } else { &[] };
        for course in courses
            .iter()
            .filter(|c| active == "all" || c.chip == active)
        {
            let _ = write!(
                cards,
                r##"<div class="course-card"><a class="course-meta__title" href="#" data-preview="{slug}">{title}</a><span class="course-meta__level">{level}</span></div>"##,
                slug = course.slug,
                title = escape(course.title),
                level = course.level,
            );
            previews.push_str(&course_preview(course));
        }
        if cards.is_empty() {
            cards.push_str(r#"<p class="empty">No courses in this topic yet.</p>"#);
        }
        let main = format!(
            r#"<div id="main_container">
  <nav class="breadcrumb"><a href="{topics}">Courses</a><span>{name}</span></nav>
  <h1>{name}</h1>
  <input type="text" class="course-search" placeholder="What do you want to learn today?">
  <ul class="topic-card__tags">{chips}</ul>
  <div class="course-filters"><h3>Filters</h3>{filters}</div>
  <div class="course-list">{cards}</div>
</div>
{previews}"#,
            topics = student::TOPICS,
            name = escape(name),
        );
        student_page(ctx, name, &main)
    })
    .protected()
    .on_click(
        "li.topic-card__tag",
        MockAction::custom(|ctx| {
            let Some(id) = ctx.element().attribute("data-id").map(ToString::to_string) else {
                return Ok(());
            };
            let path = ctx.url().path().to_string();
            if id == "all" {
                ctx.navigate(path);
            } else {
                ctx.navigate(format!("{path}?tag={id}"));
            }
            Ok(())
        }),
    )
    .on_click(
        "a.course-meta__title",
        MockAction::custom(|ctx| toggle_preview(ctx, "course-preview", true)),
    )
    .on_click(
        r#"a[data-dismiss="modal"]"#,
        MockAction::custom(|ctx| toggle_preview(ctx, "course-preview", false)),
    )
}

// -----------------------------------------------------------------------------
// Course details and lesson player
// -----------------------------------------------------------------------------

fn developer_course_by(
    key: Option<&String>,
    field: impl Fn(&DeveloperCourse) -> &'static str,
) -> Option<&'static DeveloperCourse> {
    let key = key?;
    DEVELOPER_COURSES.iter().find(|&c| field(c) == key.as_str())
}

fn lessons_path(course: &DeveloperCourse) -> String {
    format!("/replay/{}/course-overview", course.replay_id)
}

/// Hero actions for the course's classroom state
fn course_actions(course: &DeveloperCourse, in_classroom: bool) -> String {
    let title = escape(course.title);
    let lessons = lessons_path(course);
    if course.started {
        format!(
            r#"<span class="course-progress">35% complete</span><a class="btn btn-primary" href="{lessons}">RESUME</a>"#
        )
    } else if in_classroom {
        format!(
            r#"<span class="course-progress">0% complete</span><a class="btn btn-primary" href="{lessons}">START</a><button type="button" class="btn btn-circle js-course-flag" data-course="{title}" aria-label="Remove from classroom"><i class="fa fa-check"></i></button>"#
        )
    } else {
        format!(
            r#"<button type="button" class="btn btn-primary js-add-classroom" data-course="{title}">ADD TO CLASSROOM</button>"#
        )
    }
}

fn developer_course() -> MockRoute {
    MockRoute::render("/stormwind-developer/:category/:course", |ctx| {
        let Some(course) = developer_course_by(ctx.params.get("course"), |c| c.slug) else {
            return student_page(ctx, "Course", "<h1>Course not found</h1>");
        };
        let in_classroom = ctx
            .store
            .list(ENROLLED_COURSES)
            .iter()
            .any(|c| c == course.title);
        let mut modules = String::new();
        for (module, lessons) in course.modules {
            let _ = write!(modules, "<h3>{}</h3><ul>", escape(module));
            for lesson in *lessons {
                let _ = write!(modules, "<li>{}</li>", escape(lesson));
            }
            modules.push_str("</ul>");
        }
        let mut supplements = String::new();
        for item in course.supplements {
            let _ = write!(
                supplements,
                r##"<li class="list-group-item"><a href="#">{}</a></li>"##,
                escape(item)
            );
        }
        let main = format!(
            r##"<div class="course-hero">
  <span class="letter-spacing-lg">{category}</span>
  <h1>{title}</h1>
  <div class="course-hero__meta"><span class="level">{level}</span><span class="duration">{duration}</span><span class="instructor">By: {instructor}</span></div>
  <div class="course-hero__actions">{actions}</div>
  <a href="#" class="js-course-preview-link">View preview</a>
</div>
<div class="storm-ai"><button type="button" id="stormAIButton">Storm AI Tutor</button><p class="storm-ai-text">Ask Storm AI anything about this course.</p></div>
<section class="course-overview"><h2>Overview</h2><p>{overview}</p></section>
<section class="course-modules"><h5 class="overview">Modules</h5>{modules}</section>
<aside class="course-supplements"><h6><i class="fa fa-folder-open"></i> Supplements <span class="supplements-counter">{count}</span></h6><ul class="list-group">{supplements}</ul></aside>"##,
            category = escape(course.category),
            title = escape(course.title),
            level = course.level,
            duration = course.duration,
            instructor = escape(course.instructor),
            actions = course_actions(course, in_classroom),
            overview = escape(course.overview),
            count = course.supplements.len(),
        );
        student_page(ctx, course.title, &main)
    })
    .protected()
    .on_click(
        ".js-add-classroom",
        MockAction::custom(|ctx| set_enrolled(ctx, true)),
    )
    .on_click(
        "button.js-course-flag",
        MockAction::custom(|ctx| set_enrolled(ctx, false)),
    )
}

/// Add or remove the clicked course in the classroom, then reload
fn set_enrolled(ctx: &mut ActionContext<'_>, enrolled: bool) -> PageKitResult<()> {
    let Some(course) = ctx.element().attribute("data-course").map(ToString::to_string) else {
        return Ok(());
    };
    let reload = ctx.url().to_string();
    let store = ctx.store();
    let mut courses = store.list(ENROLLED_COURSES).to_vec();
    courses.retain(|c| *c != course);
    if enrolled {
        courses.push(course);
    }
    store.set_list(ENROLLED_COURSES, courses);
    ctx.navigate(reload);
    Ok(())
}

/// "course-overview" as "Course Overview"
fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Most modules any course has
fn max_modules() -> usize {
    DEVELOPER_COURSES
        .iter()
        .map(|c| c.modules.len())
        .max()
        .unwrap_or_default()
}

fn lesson_player() -> MockRoute {
    let route = MockRoute::render("/replay/:id/:lesson", |ctx| {
        let Some(course) = developer_course_by(ctx.params.get("id"), |c| c.replay_id) else {
            return student_page(ctx, "Lesson", "<h1>Lesson not found</h1>");
        };
        let lesson = ctx
            .params
            .get("lesson")
            .map_or_else(String::new, |l| title_from_slug(l));
        let first_module = course.modules.first().map_or("", |(m, _)| *m);
        let mut toc = String::new();
        for (i, (module, lessons)) in course.modules.iter().enumerate() {
            let _ = write!(
                toc,
                r#"<div class="toc-module"><button type="button" class="section-title js-toc-module" data-module="{i}">{}</button><ul class="list-group" data-fragment="toc-lessons-{i}">"#,
                escape(module)
            );
            for (j, title) in lessons.iter().enumerate() {
                let _ = write!(
                    toc,
                    r#"<li class="list-group-item"><i class="fal fa-play-circle"></i><h4 class="lesson_title">{}</h4><span class="lesson_duration">{}m</span></li>"#,
                    escape(title),
                    4 + (i + j * 3) % 9
                );
            }
            toc.push_str("</ul></div>");
        }
        let mut supplements = String::new();
        for item in course.supplements {
            let _ = write!(
                supplements,
                r#"<li class="list-group-item"><a href="https://github.com/stormwind-studios/{}">{}</a></li>"#,
                course.slug,
                escape(item)
            );
        }
        let main = format!(
            r##"<div class="learning-object">
  <header class="learning-object__header">
    <span class="learning-object__module">{module}</span>
    <h2 id="learning-object__title">{lesson}</h2>
    <h1 class="learning-object__course">{title}</h1>
  </header>
  <div class="learning-object__table-of-contents">
    <h2><i class="fas fa-list"></i> Table of content</h2>
    <section class="learning-object_table-of-contents_sections">{toc}</section>
  </div>
  <div class="course-supplements">
    <h2><i class="fal fa-folders"></i> Supplements <span class="supplements-counter">{count}</span></h2>
    <ul class="list-group">{supplements}</ul>
    <a class="request-mentoring-button" href="#">REQUEST MENTORING</a>
  </div>
</div>"##,
            module = escape(&first_module.to_uppercase()),
            lesson = escape(&lesson),
            title = escape(course.title),
            count = course.supplements.len(),
        );
        student_page(ctx, course.title, &main)
    })
    .protected();
    (0..max_modules()).fold(route, |route, i| {
        route.on_click(
            format!(r#"button.js-toc-module[data-module="{i}"]"#),
            MockAction::Toggle(format!("toc-lessons-{i}")),
        )
    })
}

// -----------------------------------------------------------------------------
// Learning paths
// -----------------------------------------------------------------------------

fn learning_paths() -> MockRoute {
    MockRoute::render(student::LEARNING_PATHS, |ctx| {
        let mut topics = String::from(r#"<li role="option" data-topic="">All Topics</li>"#);
        for topic in TOPICS {
            let _ = write!(topics, r#"<li role="option" data-topic="{topic}">{topic}</li>"#);
        }
        let mut sizes = String::new();
        for (value, label) in PATH_SIZES {
            let _ = write!(sizes, r#"<option value="{value}">{label}</option>"#);
        }
        let mut cards = String::new();
        for path in LEARNING_PATHS {
            let _ = write!(
                cards,
                r##"<div class="learning-path-card learning-path-card--condensed" data-fragment="lp-card-{slug}" data-fragment-initial="visible">
  <button type="button" class="modal-toggle" data-preview="{slug}"><h4 class="learning-path-card__title">{name}</h4></button>
  <p class="learning-path-card__meta">{courses} courses, {hours} hours</p>
</div>
<div class="modal learning-path-preview" data-fragment="lp-preview-{slug}">
  <div class="modal-header"><h5 class="modal-title">{name}</h5><a href="#" aria-label="Close" data-dismiss="modal" data-preview="{slug}">&times;</a></div>
  <div class="modal-body">
    <span class="lp-difficulty">{courses} courses</span>
    <span class="lp-duration">{hours} hours</span>
    <a class="btn btn-primary" href="/learningpath/{slug}">See Learning Path</a>
    <a class="btn btn-link js-remove-path" href="#">Remove from classroom</a>
  </div>
</div>"##,
                slug = path.slug,
                name = escape(path.name),
                courses = path.courses,
                hours = path.hours,
            );
        }
        let main = format!(
            r#"<h1>Learning Paths</h1>
<p class="lead">Browse our catalog to find the best Learning Path for you.</p>
<div class="filters">
  <div class="filter-topic">
    <button type="button" class="js-topic-toggle" title="Topic">Topic</button>
    <ul class="dropdown-menu" data-fragment="topic-menu">{topics}</ul>
  </div>
  <select id="filter-duration" aria-label="Path size">{sizes}</select>
  <input type="text" class="search-term" placeholder="Search learning paths">
</div>
<div class="learning-path-list">{cards}</div>"#
        );
        student_page(ctx, "Learning Paths", &main)
    })
    .protected()
    .on_click(".js-topic-toggle", MockAction::Toggle("topic-menu".into()))
    .on_click(
        r#"li[role="option"]"#,
        MockAction::custom(|ctx| {
            let topic = ctx
                .element()
                .attribute("data-topic")
                .unwrap_or_default()
                .to_string();
            filter_items(
                ctx,
                "lp-card",
                LEARNING_PATHS
                    .iter()
                    .map(|p| (p.slug, topic.is_empty() || p.topic == topic)),
            );
            ctx.hide("topic-menu");
            Ok(())
        }),
    )
    .on_change(
        "#filter-duration",
        MockAction::custom(|ctx| {
            let size = ctx.element().value.clone().unwrap_or_default();
            filter_items(
                ctx,
                "lp-card",
                LEARNING_PATHS
                    .iter()
                    .map(|p| (p.slug, size.is_empty() || p.size == size)),
            );
            Ok(())
        }),
    )
    .on_change(
        "input.search-term",
        MockAction::custom(|ctx| {
            let term = ctx.element().value.clone().unwrap_or_default();
            filter_items(
                ctx,
                "lp-card",
                LEARNING_PATHS
                    .iter()
                    .map(|p| (p.slug, matches_search(p.name, Some(term.as_str())))),
            );
            Ok(())
        }),
    )
    .on_click(
        "button.modal-toggle",
        MockAction::custom(|ctx| toggle_preview(ctx, "lp-preview", true)),
    )
    .on_click(
        r#"a[data-dismiss="modal"]"#,
        MockAction::custom(|ctx| toggle_preview(ctx, "lp-preview", false)),
    )
}

// -----------------------------------------------------------------------------
// Skills assessments
// -----------------------------------------------------------------------------

const SKILLS_SEARCH: &str = r#"input[placeholder="Search for a skills assessment"]"#;

fn skills_assessments() -> MockRoute {
    MockRoute::render(student::SKILLS_ASSESSMENTS, |ctx| {
        let search = ctx.query("search");
        let mut cards = String::new();
        for (slug, name, level, duration) in SKILLS_ASSESSMENTS
            .iter()
            .filter(|(_, name, ..)| matches_search(name, search.as_deref()))
        {
            let name = escape(name);
            let _ = write!(
                cards,
                r##"<div class="course-card--condensed">
  <button type="button" class="modal-toggle" data-preview="{slug}"><h4 class="course-card__title">{name}</h4></button>
  <span class="course-card__meta">{level}, {duration}</span>
</div>
<div class="modal course-preview-modal" data-fragment="sa-preview-{slug}">
  <div class="modal-header"><h5 id="modalLabel" class="modal-title">{name}</h5><a href="#" data-dismiss="modal" aria-label="Close" data-preview="{slug}">&times;</a></div>
  <div class="modal-body">
    <span class="dif-time">{level}</span>
    <span class="dif-time">{duration}</span>
    <h5>Overview</h5>
    <p>Measure your current skills and get a personalised course plan.</p>
    <a class="text-learn-more-preview" href="/skillsassessment/{slug}">Learn more</a>
    <button type="button" class="btn btn-primary js-course-flag">Add to My Classroom</button>
  </div>
</div>"##
            );
        }
        if cards.is_empty() {
            cards.push_str(r#"<p class="empty">No skills assessments match your search.</p>"#);
        }
        let main = format!(
            r#"<h1>Skills Assessments</h1>
<p class="lead">Explore Stormwind Skills Assessments.</p>
<input type="text" placeholder="Search for a skills assessment" value="{value}">
<div class="skills-assessment-list">{cards}</div>"#,
            value = escape(search.as_deref().unwrap_or_default()),
        );
        student_page(ctx, "Skills Assessments", &main)
    })
    .protected()
    .on_press(
        SKILLS_SEARCH,
        "Enter",
        MockAction::custom(|ctx| {
            let term = ctx.element().value.clone().unwrap_or_default();
            ctx.navigate(format!("{}?{}", student::SKILLS_ASSESSMENTS, search_query(&term)));
            Ok(())
        }),
    )
    .on_click(
        "button.modal-toggle",
        MockAction::custom(|ctx| toggle_preview(ctx, "sa-preview", true)),
    )
    .on_click(
        r#"a[data-dismiss="modal"]"#,
        MockAction::custom(|ctx| toggle_preview(ctx, "sa-preview", false)),
    )
}

// -----------------------------------------------------------------------------
// Leaderboard
// -----------------------------------------------------------------------------

fn leaderboard() -> MockRoute {
    MockRoute::render(student::LEADERBOARD, |ctx| {
        let mut podium = String::new();
        for (rank, (name, total, ..)) in LEADERBOARD.iter().take(3).enumerate() {
            let _ = write!(
                podium,
                r#"<div class="highlighted-student"><span class="highlighted-student__rank">{}</span><span class="highlighted-student__name">{name}</span><span class="highlighted-student__time">{total}</span></div>"#,
                rank + 1
            );
        }
        let mut rows = String::new();
        for (rank, (name, total, recorded, live, completed, registered, top)) in
            LEADERBOARD.iter().enumerate()
        {
            let _ = write!(
                rows,
                "<tr><td>{}</td><td>{name}</td><td>{total}</td><td>{recorded}</td><td>{live}</td><td>{completed}</td><td>{registered}</td><td>{top}</td></tr>",
                rank + 1
            );
        }
        let main = format!(
            r#"<div class="leaderboard">
  <div class="leaderboard__header"><h1>Leaderboard</h1><button type="button" id="btn-export-open-modal" class="btn">Export Chart</button></div>
  <div id="leaderboard-highlights">{podium}</div>
  <table class="table leaderboard-table">
    <thead><tr><th>Rank</th><th>Student Name</th><th>Total Course Time</th><th>Time Spent (Recorded)</th><th>Time Spent (Live)</th><th>Courses Completed</th><th>Courses Registered</th><th>Top Course</th></tr></thead>
    <tbody>{rows}</tbody>
  </table>
  <nav class="pager"><a href="?page=2">Next</a><a href="?page=3">Last</a></nav>
</div>
<div class="modal export-chart-modal" data-fragment="export-chart">
  <div class="modal-header"><h5 class="modal-title">Export Chart</h5><button type="button" class="close" data-dismiss="modal" aria-label="Close">&times;</button></div>
  <div class="modal-body"><p>Download the leaderboard as a CSV file.</p><button type="button" class="btn btn-primary">Export Chart</button></div>
</div>"#
        );
        student_page(ctx, "Leaderboard", &main)
    })
    .protected()
    .on_click("#btn-export-open-modal", MockAction::Show("export-chart".into()))
    .on_click(
        r#".export-chart-modal button.close"#,
        MockAction::Hide("export-chart".into()),
    )
}

// -----------------------------------------------------------------------------
// Webinars
// -----------------------------------------------------------------------------

fn webinars() -> MockRoute {
    MockRoute::render(student::WEBINARS, |ctx| {
        let search = ctx.query("search");
        let mut cards = String::new();
        for (i, (title, date)) in WEBINARS
            .iter()
            .filter(|(title, _)| matches_search(title, search.as_deref()))
            .enumerate()
        {
            let _ = write!(
                cards,
                r#"<div class="webinar-card"><img src="/sites/default/files/webinar-{i}.jpg" alt=""><h4>{}</h4><p class="webinar-card__date">{date}</p></div>"#,
                escape(title)
            );
        }
        let main = format!(
            r#"<h1>Webinars</h1>
<p class="lead">Explore upcoming Stormwind webinars and register for free.</p>
<input type="text" name="search" placeholder="Search for a webinar" value="{value}">
<div class="webinar-list">{cards}</div>"#,
            value = escape(search.as_deref().unwrap_or_default()),
        );
        student_page(ctx, "Webinars", &main)
    })
    .protected()
    .on_press(
        r#"input[placeholder="Search for a webinar"]"#,
        "Enter",
        MockAction::custom(|ctx| {
            let term = ctx.element().value.clone().unwrap_or_default();
            ctx.navigate(format!("{}?{}", student::WEBINARS, search_query(&term)));
            Ok(())
        }),
    )
}

// -----------------------------------------------------------------------------
// Live course calendar
// -----------------------------------------------------------------------------

fn month_of(ctx: &RenderContext<'_>) -> NaiveDate {
    let today = Local::now().date_naive();
    let current = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
    ctx.query("month")
        .and_then(|m| NaiveDate::parse_from_str(&format!("{m}-01"), "%Y-%m-%d").ok())
        .unwrap_or(current)
}

fn month_grid(first: NaiveDate) -> String {
    let next = first.checked_add_months(Months::new(1)).unwrap_or(first);
    let days = next.signed_duration_since(first).num_days();
    let offset = i64::from(first.weekday().num_days_from_sunday());
    let mut html = String::from("<tbody><tr>");
    for _ in 0..offset {
        html.push_str("<td></td>");
    }
    for day in 1..=days {
        let _ = write!(html, r#"<td class="day">{day}</td>"#);
        if (offset + day) % 7 == 0 && day < days {
            html.push_str("</tr><tr>");
        }
    }
    html.push_str("</tr></tbody>");
    html
}

fn calendar() -> MockRoute {
    MockRoute::render(student::LIVE_COURSE_CALENDAR, |ctx| {
        let month = month_of(ctx);
        let step = |m: Option<NaiveDate>| m.unwrap_or(month).format("%Y-%m").to_string();
        let mut header = String::from("<thead><tr>");
        for day in ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"] {
            let _ = write!(header, "<th>{day}</th>");
        }
        header.push_str("</tr></thead>");
        let main = format!(
            r#"<div class="calendar">
  <div class="calendar__toolbar">
    <button type="button" class="js-calendar-today">Today</button>
    <button type="button" class="js-calendar-step" data-month="{prev}"><i class="fa fa-chevron-left"></i></button>
    <button type="button" class="js-calendar-step" data-month="{next}"><i class="fa fa-chevron-right"></i></button>
    <h2 class="calendar__title">{title}</h2>
  </div>
  <table class="calendar__grid">{header}{grid}</table>
</div>"#,
            prev = step(month.checked_sub_months(Months::new(1))),
            next = step(month.checked_add_months(Months::new(1))),
            title = month.format("%B %Y"),
            grid = month_grid(month),
        );
        student_page(ctx, "Live Course Calendar", &main)
    })
    .protected()
    .on_click(
        ".js-calendar-today",
        MockAction::Navigate(student::LIVE_COURSE_CALENDAR.to_string()),
    )
    .on_click(
        ".js-calendar-step",
        MockAction::custom(|ctx| {
            if let Some(month) = ctx.element().attribute("data-month").map(ToString::to_string) {
                ctx.navigate(format!("{}?month={month}", student::LIVE_COURSE_CALENDAR));
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
    fn test_search_query_encodes_spaces() {
        assert_eq!(
            search_query(" Computer Hardware Support "),
            "search=Computer+Hardware+Support"
        );
    }

    #[test]
    fn test_matches_search_ignores_case() {
        assert!(matches_search("Computer Hardware Support", Some("hardware")));
        assert!(matches_search("anything", None));
        assert!(!matches_search("Networking Essentials", Some("hardware")));
    }

    #[test]
    fn test_month_grid_has_every_day() {
        let first = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let grid = month_grid(first);
        assert_eq!(grid.matches(r#"class="day""#).count(), 28);
        // February 2026 starts on a Sunday and fills four full weeks
        assert_eq!(grid.matches("<tr>").count(), 4);
    }

    #[test]
    fn test_only_one_path_named_test_1() {
        let hits = LEARNING_PATHS
            .iter()
            .filter(|p| p.name.contains("Learning Path Santiago Test 1"))
            .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_title_from_slug() {
        assert_eq!(title_from_slug("course-overview"), "Course Overview");
        assert_eq!(title_from_slug("azure--sql"), "Azure Sql");
        assert_eq!(title_from_slug(""), "");
    }

    #[test]
    fn test_unknown_tag_falls_back_to_all() {
        assert_eq!(active_chip(None), "all");
        assert_eq!(active_chip(Some("palo-alto")), "palo-alto");
        assert_eq!(active_chip(Some("nope")), "all");
    }

    #[test]
    fn test_started_course_offers_resume_only() {
        let azure = DEVELOPER_COURSES.iter().find(|c| c.started).unwrap();
        let actions = course_actions(azure, false);
        assert!(actions.contains("RESUME"));
        assert!(actions.contains(&lessons_path(azure)));
        assert!(!actions.contains("ADD TO CLASSROOM"));
        let copilot = &DEVELOPER_COURSES[0];
        assert!(course_actions(copilot, false).contains("js-add-classroom"));
        assert!(course_actions(copilot, true).contains("js-course-flag"));
    }

    #[tokio::test]
    async fn test_palo_alto_chip_narrows_cards() {
        use crate::student::StudentCoursesList;
        use pagekit::prelude::*;

        let (_browser, page) = crate::replica::signed_in_page(Role::Student).await;
        let list = StudentCoursesList::new(&page);
        list.goto().await.unwrap();
        assert_eq!(list.course_cards_count().await.unwrap(), CYBERSECURITY_COURSES.len());
        list.click_chip("Palo Alto").await.unwrap();
        list.expect_chip_active("Palo Alto").await.unwrap();
        assert!(!list.is_chip_active("All").await.unwrap());
        assert_eq!(list.course_cards_count().await.unwrap(), 2);
        list.open_course_preview("Palo Alto Firewall Administration")
            .await
            .unwrap();
        list.expect_course_preview("Palo Alto Firewall Administration")
            .await
            .unwrap();
        list.close_course_preview().await.unwrap();
        list.preview.expect_hidden().await.unwrap();
    }

    #[tokio::test]
    async fn test_course_round_trips_through_classroom() {
        use crate::student::StudentCourseDetails;
        use pagekit::prelude::*;

        let (_browser, page) = crate::replica::signed_in_page(Role::Student).await;
        let details = StudentCourseDetails::new(&page);
        details.goto().await.unwrap();
        details.remove_if_added().await.unwrap();
        details.click_add_to_classroom().await.unwrap();
        details.wait_for_start_button().await.unwrap();
        details.expect_course_added_to_classroom().await.unwrap();
        details.click_checkmark_button().await.unwrap();
        details.wait_for_add_to_classroom_button().await.unwrap();
        assert!(!details.start_btn.is_visible().await.unwrap());
    }

    #[tokio::test]
    async fn test_module_click_reveals_its_lessons() {
        use crate::student::StudentCourseLessons;
        use pagekit::prelude::*;

        let (_browser, page) = crate::replica::signed_in_page(Role::Student).await;
        let lessons = StudentCourseLessons::new(&page);
        lessons.resume_from_course_details().await.unwrap();
        assert!(lessons.is_on_lessons_page());
        assert!(lessons.missing_modules().await.unwrap().is_empty());
        assert_eq!(lessons.visible_lessons_count().await.unwrap(), 0);
        lessons.click_module("Get Started with Microsoft Azure").await.unwrap();
        assert_eq!(lessons.visible_lessons_count().await.unwrap(), 3);
        lessons.click_module("Get Started with Microsoft Azure").await.unwrap();
        assert_eq!(lessons.visible_lessons_count().await.unwrap(), 0);
    }

    mod search_property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn search_query_decodes_to_trimmed_term(term in "[ a-zA-Z0-9+&=%#?-]{0,24}") {
                let url = url::Url::parse(&format!("https://replica.test/courses?{}", search_query(&term))).unwrap();
                let decoded = url
                    .query_pairs()
                    .find(|(k, _)| k == "search")
                    .map(|(_, v)| v.into_owned());
                prop_assert_eq!(decoded.as_deref(), Some(term.trim()));
            }

            #[test]
            fn any_slice_of_a_name_matches_it(start in 0usize..10, len in 1usize..12, upper in any::<bool>()) {
                let name = "Computer Hardware Support";
                let start = start.min(name.len() - 1);
                let end = (start + len).min(name.len());
                let slice = &name[start..end];
                let term = if upper { slice.to_uppercase() } else { slice.to_lowercase() };
                prop_assert!(matches_search(name, Some(&term)));
            }
        }
    }
}
