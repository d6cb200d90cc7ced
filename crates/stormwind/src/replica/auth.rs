//! Two-step login form and logout.

use crate::replica::chrome::document;
use crate::urls;
use pagekit::mock::{MockAction, MockRoute, MockSite};
use std::time::Duration;

/// The password step shows after a short round trip
const EMAIL_LOOKUP: Duration = Duration::from_millis(20);

const LOGIN_BODY: &str = r#"<div class="login-box">
  <a class="logo" href="/"><img src="/themes/stormwind/logo.svg" alt="Stormwind Studios"></a>
  <h1>Sign in</h1>
  <form id="user-login-form" onsubmit="return false">
    <label for="email-only">Email address</label>
    <input id="email-only" name="name" type="email" autocomplete="username">
    <button type="button" id="edit-email-submit">Enter</button>
    <div class="password-step" data-fragment="password-step">
      <input id="edit-pass" name="pass" type="password" aria-label="Password">
      <button type="button" id="edit-submit">Log in</button>
    </div>
  </form>
  <div class="error-message" role="alert" data-fragment="login-error">Unrecognized username or password. <a href="/user/password">Forgot your password?</a></div>
</div>"#;

pub(super) fn routes(site: MockSite) -> MockSite {
    let login = MockRoute::html(urls::LOGIN, document("Log in", LOGIN_BODY))
        .on_click(
            "#edit-email-submit",
            MockAction::custom(|ctx| {
                let email = ctx.value_of("#email-only").unwrap_or_default();
                if ctx.has_account(&email) {
                    ctx.hide("login-error");
                    ctx.show_after("password-step", EMAIL_LOOKUP);
                } else {
                    ctx.show("login-error");
                }
                Ok(())
            }),
        )
        .on_click(
            "#edit-submit",
            MockAction::custom(|ctx| {
                let email = ctx.value_of("#email-only").unwrap_or_default();
                let password = ctx.value_of("#edit-pass").unwrap_or_default();
                match ctx.verify_credentials(&email, &password) {
                    Some(account) => {
                        let destination = ctx
                            .url()
                            .query_pairs()
                            .find(|(k, _)| k == "destination")
                            .map_or(account.landing.clone(), |(_, v)| v.into_owned());
                        ctx.sign_in(account.email);
                        ctx.navigate(destination);
                    }
                    None => ctx.show("login-error"),
                }
                Ok(())
            }),
        );
    let logout = MockRoute::render(urls::LOGOUT, |_| {
        document("Log in", r#"<p>You have been signed out. <a href="/user/login">Sign in again</a></p>"#)
    });
    site.route(login).route(logout)
}
