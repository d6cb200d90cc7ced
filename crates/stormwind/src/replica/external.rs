//! Partner pages on their own hosts: the newsletter sign-up and the
//! feedback board.

use crate::replica::chrome::document;
use crate::urls::external;
use pagekit::mock::{MockAction, MockRoute, MockSite};

const NEWSLETTER_BODY: &str = r#"<header class="partner-header"><a href="https://www.stormwind.com/">Stormwind</a></header>
<main>
  <h1>Stay in the loop</h1>
  <p>Monthly course releases, live events and certification news.</p>
  <form onsubmit="return false">
    <label for="newsletter-email">Work email</label>
    <input id="newsletter-email" type="email">
    <button type="button" class="js-subscribe">Subscribe</button>
  </form>
  <p data-fragment="subscribed">You're subscribed.</p>
</main>"#;

const FEEDBACK_BODY: &str = r#"<header class="board-header">
  <nav class="board-nav">
    <a href="/" class="active">Send Ideas</a>
    <a href="/updates">Updates</a>
    <a href="/roadmap">Roadmap</a>
  </nav>
</header>
<main class="board">
  <h1>Hi there 👋</h1>
  <h2>Share your feedback and help us shape Stormwind Studios</h2>
  <div class="board-toolbar">
    <input type="text" placeholder="Search...">
    <button type="button" class="btn btn-primary">Create a Post</button>
  </div>
  <aside class="board-categories">
    <span class="category">All Categories</span>
    <span class="category">Feature Idea</span>
    <span class="category">Bug</span>
    <span class="category">Content Idea</span>
  </aside>
  <ul class="posts">
    <li class="post"><span class="post__title">Offline mode for the mobile app</span><span class="post__category">Feature Idea</span></li>
    <li class="post"><span class="post__title">More Azure labs</span><span class="post__category">Content Idea</span></li>
  </ul>
</main>"#;

pub(super) fn routes(site: MockSite) -> MockSite {
    site.route(
        MockRoute::html("/newsletter", document("Newsletter", NEWSLETTER_BODY))
            .on_host(external::NEWSLETTER_HOST)
            .on_click(".js-subscribe", MockAction::Show("subscribed".into())),
    )
    .route(MockRoute::html("/", document("Feedback", FEEDBACK_BODY)).on_host(external::FEEDBACK_HOST))
    .route(
        MockRoute::html("/updates", document("Updates", "<h1>Updates</h1>"))
            .on_host(external::FEEDBACK_HOST),
    )
    .route(
        MockRoute::html("/roadmap", document("Roadmap", "<h1>Roadmap</h1>"))
            .on_host(external::FEEDBACK_HOST),
    )
}
