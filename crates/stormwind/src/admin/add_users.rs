//! Invitation form that adds users to the manager's group.

use crate::admin::AdminNavigation;
use crate::student::StudentFooter;
use crate::urls;
use pagekit::prelude::*;
use pagekit::{SectionCheck, TextMatch};

/// `/setup/team/:company/invitations?group=:team`
#[derive(Debug)]
pub struct AdminAddUsers {
    page: Page,
    /// Admin navigation
    pub navigation: AdminNavigation,
    /// Footer
    pub footer: StudentFooter,
    /// "Add Users" heading
    pub page_title: Locator,
    /// "You are adding new users to the group named ..."
    pub group_description_text: Locator,
    /// "... licenses available"
    pub licenses_available_text: Locator,
    /// "License copies:"
    pub license_copies_label: Locator,
    /// First invitation row: first name
    pub first_name_input: Locator,
    /// First invitation row: last name
    pub last_name_input: Locator,
    /// First invitation row: email
    pub email_input: Locator,
    /// License select of the first row
    pub license_dropdown: Locator,
    /// "Add row"
    pub add_row_link: Locator,
    /// `#edit-actions-cancel`
    pub cancel_btn: Locator,
    /// `#edit-actions-submit`
    pub save_btn: Locator,
    /// Link to request more seats
    pub request_additional_users_link: Locator,
    /// "Do you need access for additional users?"
    pub additional_users_text: Locator,
}

impl AdminAddUsers {
    /// Invitation form over `page`
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let first_row = |placeholder: &str| {
            page.get_by_placeholder(TextMatch::exact(placeholder)).first()
        };
        Self {
            page: page.clone(),
            navigation: AdminNavigation::new(page),
            footer: StudentFooter::new(page),
            page_title: page
                .get_by_role(AriaRole::Heading)
                .named(TextMatch::exact("Add Users")),
            group_description_text: page
                .get_by_text("You are adding new users to the group named"),
            licenses_available_text: page.get_by_text("licenses available"),
            license_copies_label: page.get_by_text("License copies:"),
            first_name_input: first_row("First Name"),
            last_name_input: first_row("Last Name"),
            email_input: first_row("Email"),
            license_dropdown: page
                .locator("select")
                .has(&page.locator("option"))
                .first(),
            add_row_link: page.get_by_text(TextMatch::exact("Add row")),
            cancel_btn: page.locator("#edit-actions-cancel"),
            save_btn: page.locator("#edit-actions-submit"),
            request_additional_users_link: page.locator(r#"a[href*="request-users"]"#),
            additional_users_text: page.get_by_text("Do you need access for additional users?"),
        }
    }

    /// Invitation rows currently in the form
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn invitation_rows(&self) -> PageKitResult<usize> {
        let found = self
            .page
            .get_by_placeholder(TextMatch::exact("Email"))
            .all()
            .await?;
        Ok(found.iter().filter(|e| e.visible).count())
    }

    /// Append an empty invitation row
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn click_add_row(&self) -> PageKitResult<()> {
        self.add_row_link.click().await
    }

    /// Fill the first invitation row
    ///
    /// # Errors
    ///
    /// Locator errors.
    pub async fn fill_first_row(&self, first: &str, last: &str, email: &str) -> PageKitResult<()> {
        self.first_name_input.fill(first).await?;
        self.last_name_input.fill(last).await?;
        self.email_input.fill(email).await
    }

    /// Assert the main bar
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_navigation_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_main_nav_visible().await
    }

    /// Assert the admin shortcuts
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_admin_sub_nav_visible(&self) -> PageKitResult<()> {
        self.navigation.expect_admin_sub_nav_visible().await
    }

    /// Assert the heading
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] when it is hidden.
    pub async fn expect_page_title_visible(&self) -> PageKitResult<()> {
        self.page.assert_visible(&self.page_title).await
    }

    /// Assert the group and license description
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_description_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("add users description", &self.page)
            .all_visible([
                &self.group_description_text,
                &self.licenses_available_text,
                &self.license_copies_label,
            ])
            .verify()
            .await
    }

    /// Assert the first invitation row and "Add row"
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_user_form_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("invitation form", &self.page)
            .all_visible([
                &self.first_name_input,
                &self.last_name_input,
                &self.email_input,
                &self.license_dropdown,
                &self.add_row_link,
            ])
            .verify()
            .await
    }

    /// Assert "Cancel" and "Save"
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_action_buttons_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("invitation actions", &self.page)
            .all_visible([&self.cancel_btn, &self.save_btn])
            .verify()
            .await
    }

    /// Assert the request-more-users section
    ///
    /// # Errors
    ///
    /// The first failed check, prefixed with the section name.
    pub async fn expect_additional_users_section_visible(&self) -> PageKitResult<()> {
        SectionCheck::new("additional users", &self.page)
            .all_visible([
                &self.additional_users_text,
                &self.request_additional_users_link,
            ])
            .verify()
            .await
    }

    /// Assert the whole page, top to bottom
    ///
    /// # Errors
    ///
    /// The first failed check.
    pub async fn expect_add_users_page_complete(&self) -> PageKitResult<()> {
        self.expect_navigation_visible().await?;
        self.expect_admin_sub_nav_visible().await?;
        self.expect_page_title_visible().await?;
        self.expect_description_visible().await?;
        self.expect_user_form_visible().await?;
        self.expect_action_buttons_visible().await?;
        self.expect_additional_users_section_visible().await
    }
}

impl PageObject for AdminAddUsers {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        urls::admin::ADD_USERS
    }

    fn url_marker(&self) -> &str {
        urls::admin::ADD_USERS_MARKER
    }

    fn rebind(&self, page: Page) -> Self {
        Self::new(&page)
    }
}
