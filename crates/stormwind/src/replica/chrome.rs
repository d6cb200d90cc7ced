//! Shared page furniture: document shell, navigation bar, sidebar, dialogs
//! and footer, plus the site-wide behaviours that drive them.

use crate::replica::ADMIN_EMAIL;
use crate::urls::{self, admin, external, student};
use pagekit::mock::{ActionContext, MockAction, MockRoute, MockSite, RenderContext};
use std::fmt::Write as _;

/// Escape text for an HTML body or attribute
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Whole document with a title and a body
pub fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{} | Stormwind Studios</title></head><body>{body}</body></html>",
        escape(title)
    )
}

fn navbar(ctx: &RenderContext<'_>, admin_area: bool) -> String {
    let mut html = String::from(
        r#"<nav class="navbar">
  <a class="navbar-brand" href="/my_classroom"><img src="/themes/stormwind/logo.svg" alt="Stormwind Studios"></a>
  <ul class="main-menu">"#,
    );
    for (href, label) in [
        (student::MY_CLASSROOM, "My Classroom"),
        (student::TOPICS, "Courses"),
        (student::LEARNING_PATHS, "Learning Paths"),
        (student::SKILLS_ASSESSMENTS, "Skills Assessments"),
        (student::LEADERBOARD, "Leaderboard"),
    ] {
        let _ = write!(html, r#"<li><a class="nav-link" href="{href}">{label}</a></li>"#);
    }
    if admin_area || ctx.account == Some(ADMIN_EMAIL) {
        let _ = write!(
            html,
            r#"<li class="main-menu-admin-link"><a class="nav-link" href="{}">Admin</a></li>"#,
            admin::DASHBOARD
        );
    }
    html.push_str("</ul>");
    if admin_area {
        html.push_str(
            r#"<form class="course-search" onsubmit="return false"><input type="search" name="search" placeholder="Search for a course"></form>"#,
        );
    }
    let _ = write!(
        html,
        r#"<a class="js-logout" href="{}">Log out</a></nav>"#,
        urls::LOGOUT
    );
    html
}

fn sidebar() -> String {
    format!(
        r##"<aside id="sidebar">
  <a href="{webinars}">Webinars</a>
  <a href="{newsletter}" target="_blank">Newsletter</a>
  <a href="{calendar}" target="_blank">Live Course Calendar</a>
  <a href="#" class="js-live-schedule">My Live Schedule</a>
  <a href="#" class="js-contact-support">Contact Support</a>
  <a href="{ideas}" target="_blank">Send Ideas</a>
</aside>"##,
        webinars = student::WEBINARS,
        newsletter = external::NEWSLETTER,
        calendar = student::LIVE_COURSE_CALENDAR,
        ideas = external::SEND_IDEAS,
    )
}

fn admin_shortcuts() -> String {
    let mut html = String::from(r#"<div id="admin-shortcuts">"#);
    for (href, label) in [
        (admin::DASHBOARD, "Dashboard"),
        (admin::SKILLS_ASSESSMENTS_DATA, "Skills Assessments Data"),
        (admin::DUE_DATES, "Due Dates"),
        (admin::ADD_USERS, "Add Users"),
        (admin::MANAGE_LEARNING_PATHS, "Manage Learning Paths"),
    ] {
        let _ = write!(html, r#"<a href="{href}">{label}</a>"#);
    }
    html.push_str("</div>");
    html
}

fn dialogs() -> &'static str {
    r#"<div class="sw-dialog" role="dialog" data-fragment="live-schedule">
  <div class="sw-dialog__header"><button type="button" class="js-live-schedule-close" aria-label="Close">&times;</button><h4>Live Schedule</h4></div>
  <p>You have no upcoming live sessions scheduled.</p>
</div>
<div class="sw-dialog" role="dialog" data-fragment="contact-support">
  <div class="sw-dialog__header"><button type="button" class="js-contact-support-close" aria-label="Close">&times;</button><h4>Contact Support</h4></div>
  <p class="sw-dialog__subtitle">Hi, how can we help you?</p>
  <textarea id="support-message" aria-label="Hi, how can we help you?"></textarea>
  <div class="btn btn-primary js-support-request">Request</div>
  <p class="sw-dialog__notice" data-fragment="support-sent">Thanks, our team will get back to you shortly.</p>
</div>"#
}

fn footer() -> String {
    format!(
        r#"<footer id="footer">
  <div class="footer-column"><h6>Explore</h6>
    <a href="{courses}">Courses</a>
    <a href="{paths}">Learning Paths</a>
    <a href="{assessments}">Skill Assessments</a>
    <a href="{webinars}">Webinars</a>
    <a href="{calendar}" target="_blank">Live Course Calendar</a>
  </div>
  <div class="footer-column"><h6>Contact</h6>
    <a href="/support">Support</a>
    <a href="{ideas}" target="_blank">Send Ideas</a>
    <a href="{newsletter}" target="_blank">Newsletter</a>
  </div>
  <div class="footer-column"><h6>About</h6>
    <a href="/terms-of-use">Terms of Use</a>
    <a href="/privacy-policy">Privacy Policy</a>
  </div>
  <p class="copyright">&copy; 2025 Stormwind Studios</p>
</footer>"#,
        courses = student::TOPICS,
        paths = student::LEARNING_PATHS,
        assessments = student::SKILLS_ASSESSMENTS,
        webinars = student::WEBINARS,
        calendar = student::LIVE_COURSE_CALENDAR,
        ideas = external::SEND_IDEAS,
        newsletter = external::NEWSLETTER,
    )
}

/// Student layout: bar, sidebar, content, dialogs, footer
pub fn student_page(ctx: &RenderContext<'_>, title: &str, main: &str) -> String {
    let body = format!(
        r#"{nav}<div class="layout">{side}<main id="main-content">{main}</main></div>{dialogs}{footer}"#,
        nav = navbar(ctx, false),
        side = sidebar(),
        dialogs = dialogs(),
        footer = footer(),
    );
    document(title, &body)
}

/// Admin layout: bar with the admin link and course search, shortcuts,
/// content, footer
pub fn admin_page(ctx: &RenderContext<'_>, title: &str, main: &str) -> String {
    let body = format!(
        r#"{nav}{shortcuts}<main id="main-content">{main}</main>{footer}"#,
        nav = navbar(ctx, true),
        shortcuts = admin_shortcuts(),
        footer = footer(),
    );
    document(title, &body)
}

/// Show the fragment of every item `keep` accepts, hide the rest
pub fn filter_items<'a>(
    ctx: &mut ActionContext<'_>,
    prefix: &str,
    items: impl IntoIterator<Item = (&'a str, bool)>,
) {
    for (slug, keep) in items {
        let fragment = format!("{prefix}-{slug}");
        if keep {
            ctx.show(&fragment);
        } else {
            ctx.hide(&fragment);
        }
    }
}

/// Course search of the admin bar
pub fn with_course_search(route: MockRoute) -> MockRoute {
    route.on_press(
        r#"input[placeholder="Search for a course"]"#,
        "Enter",
        MockAction::custom(|ctx| {
            let term = ctx.element().value.clone().unwrap_or_default();
            let query: String = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("search", term.trim())
                .finish();
            ctx.navigate(format!("{}?{query}", student::COURSES));
            Ok(())
        }),
    )
}

/// Site-wide behaviours of the sidebar dialogs and the logout link
pub fn install(site: MockSite) -> MockSite {
    site.on_click(".js-live-schedule", MockAction::Show("live-schedule".into()))
        .on_click(".js-live-schedule-close", MockAction::Hide("live-schedule".into()))
        .on_click(".js-contact-support", MockAction::Show("contact-support".into()))
        .on_click(
            ".js-contact-support-close",
            MockAction::Hide("contact-support".into()),
        )
        .on_click(
            ".js-support-request",
            MockAction::custom(|ctx| {
                let message = ctx.value_of("#support-message").unwrap_or_default();
                if !message.trim().is_empty() {
                    ctx.show("support-sent");
                }
                Ok(())
            }),
        )
        .on_click(
            "a.js-logout",
            MockAction::custom(|ctx| {
                ctx.sign_out();
                ctx.navigate(urls::LOGIN);
                Ok(())
            }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_document_wraps_title() {
        let html = document("Leaderboard", "<p>x</p>");
        assert!(html.contains("<title>Leaderboard | Stormwind Studios</title>"));
        assert!(html.ends_with("<p>x</p></body></html>"));
    }
}
