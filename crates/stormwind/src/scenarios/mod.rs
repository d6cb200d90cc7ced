//! Scenario catalogue of the Stormwind suite.
//!
//! Suites follow the screens they exercise (`admin/dashboard`,
//! `student/leaderboard`, ...). The long end-to-end walkthroughs are tagged
//! `nightly` so a quick run can leave them out with a tag filter.

mod admin;
mod nightly;
mod student;

use pagekit::prelude::*;

/// Tag of the long walkthroughs
pub const NIGHTLY: &str = "nightly";

/// Every scenario, admin suites first
#[must_use]
pub fn catalogue() -> ScenarioCatalogue {
    let mut catalogue = admin::catalogue();
    catalogue.extend(student::catalogue());
    catalogue.extend(nightly::catalogue());
    catalogue
}

/// Fail the scenario with `message` unless `condition` holds
pub(crate) fn ensure(condition: bool, message: impl Into<String>) -> PageKitResult<()> {
    if condition {
        Ok(())
    } else {
        Err(PageKitError::AssertionFailed {
            message: message.into(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_catalogue_fixtures_exist() {
        let graph = fixtures::graph().unwrap();
        catalogue().validate(&graph).unwrap();
    }

    #[test]
    fn test_titles_are_unique() {
        let catalogue = catalogue();
        let mut titles: Vec<String> = catalogue.iter().map(Scenario::title).collect();
        let total = titles.len();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), total);
    }

    #[test]
    fn test_nightly_tag_selects_walkthroughs() {
        let catalogue = catalogue();
        let nightly = catalogue.select(&ScenarioFilter::all().with_tags([NIGHTLY]));
        assert!(!nightly.is_empty());
        assert!(nightly.len() < catalogue.len());
        assert!(nightly.iter().all(|s| s.tags().iter().any(|t| t == NIGHTLY)));
    }

    #[test]
    fn test_ensure() {
        assert!(ensure(true, "never").is_ok());
        let err = ensure(false, "url should contain leaderboard").unwrap_err();
        assert!(err.to_string().contains("leaderboard"));
    }
}
