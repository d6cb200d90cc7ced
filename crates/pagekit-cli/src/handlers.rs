//! The `list`, `fixtures` and `config` commands.
//!
//! Each renders to a `String` so the binary only prints.

use crate::commands::{FixturesArgs, ListArgs};
use crate::error::{CliError, CliResult};
use pagekit::prelude::*;
use pagekit::{FixtureKind, SuiteConfig};
use serde::Serialize;
use std::fmt::Write;

/// Filter from `--filter` and `--tag`
#[must_use]
pub fn scenario_filter(pattern: Option<&str>, tags: &[String]) -> ScenarioFilter {
    let filter = ScenarioFilter::all().with_tags(tags);
    match pattern {
        Some(pattern) => filter.with_pattern(pattern),
        None => filter,
    }
}

#[derive(Debug, Serialize)]
struct ListedScenario<'a> {
    title: String,
    suite: &'a str,
    tags: &'a [String],
    fixtures: &'a [String],
}

/// Catalogue listing, one title per line with its tags
///
/// # Errors
///
/// JSON serialization errors.
pub fn list(args: &ListArgs) -> CliResult<String> {
    let catalogue = stormwind::catalogue();
    let filter = scenario_filter(args.filter.as_deref(), &args.tags);
    let selected = catalogue.select(&filter);

    if args.json {
        let listed: Vec<ListedScenario<'_>> = selected
            .iter()
            .map(|s| ListedScenario {
                title: s.title(),
                suite: s.suite(),
                tags: s.tags(),
                fixtures: s.fixtures(),
            })
            .collect();
        return serde_json::to_string_pretty(&listed)
            .map_err(|e| CliError::invalid_argument(e.to_string()));
    }

    let mut out = String::new();
    for scenario in &selected {
        let _ = write!(out, "{}", scenario.title());
        if !scenario.tags().is_empty() {
            let _ = write!(out, " [@{}]", scenario.tags().join(", @"));
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "{} of {} scenario(s) in {} suite(s)",
        selected.len(),
        catalogue.len(),
        catalogue.suites().len()
    );
    Ok(out)
}

/// Fixture graph check: every fixture with its kind and resolution order
///
/// # Errors
///
/// [`CliError::PageKit`] for a cycle, an unknown dependency, or a scenario
/// requesting an unknown fixture; [`CliError::InvalidArgument`] for an
/// unknown `name`.
pub fn fixtures(args: &FixturesArgs) -> CliResult<String> {
    let graph = stormwind::fixtures::graph()?;
    stormwind::catalogue().validate(&graph)?;

    let names: Vec<String> = match &args.name {
        Some(name) if graph.contains(name) => vec![name.clone()],
        Some(name) => {
            return Err(CliError::invalid_argument(format!(
                "unknown fixture '{name}'"
            )))
        }
        None => graph.names().into_iter().map(ToString::to_string).collect(),
    };

    let mut out = String::new();
    for name in &names {
        match graph.kind(name) {
            Some(FixtureKind::External) => {
                let _ = writeln!(out, "{name} (external)");
            }
            _ => {
                let order = graph.resolution_order(name)?;
                let _ = writeln!(out, "{name}: {}", order.join(" -> "));
            }
        }
    }
    let _ = writeln!(out, "{} fixture(s), no cycles", graph.len());
    Ok(out)
}

/// Effective configuration as YAML, passwords redacted
///
/// # Errors
///
/// YAML serialization errors.
pub fn config(suite: &SuiteConfig) -> CliResult<String> {
    Ok(suite.to_redacted_yaml()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pagekit::{CredentialStore, Credentials, Role};

    mod list_tests {
        use super::*;

        #[test]
        fn test_list_prints_titles_and_count() {
            let out = list(&ListArgs::default()).unwrap();
            assert!(out.contains("admin/dashboard > should display admin dashboard correctly"));
            assert!(out.contains("[@nightly]"));
            assert!(out.lines().last().unwrap().contains("scenario(s)"));
        }

        #[test]
        fn test_list_filters_by_tag() {
            let args = ListArgs {
                tags: vec!["@nightly".to_string()],
                ..ListArgs::default()
            };
            let out = list(&args).unwrap();
            let titles: Vec<&str> = out.lines().filter(|l| l.contains(" > ")).collect();
            assert!(!titles.is_empty());
            assert!(titles.iter().all(|l| l.contains("@nightly")));
        }

        #[test]
        fn test_list_json() {
            let args = ListArgs {
                filter: Some("student/webinars".to_string()),
                json: true,
                ..ListArgs::default()
            };
            let value: serde_json::Value = serde_json::from_str(&list(&args).unwrap()).unwrap();
            let entries = value.as_array().unwrap();
            assert_eq!(entries.len(), 6);
            assert_eq!(entries[0]["suite"], "student/webinars");
        }
    }

    mod fixtures_tests {
        use super::*;

        #[test]
        fn test_fixture_orders_end_with_the_fixture() {
            let out = fixtures(&FixturesArgs {
                name: Some("adminDashboard".to_string()),
            })
            .unwrap();
            let first = out.lines().next().unwrap();
            assert!(first.starts_with("adminDashboard: "));
            assert!(first.ends_with("-> adminDashboard"));
            assert!(first.contains("adminSession"));
        }

        #[test]
        fn test_unknown_fixture_is_rejected() {
            let err = fixtures(&FixturesArgs {
                name: Some("nope".to_string()),
            })
            .unwrap_err();
            assert!(err.to_string().contains("unknown fixture"));
        }
    }

    #[test]
    fn test_config_hides_passwords() {
        let suite = SuiteConfig {
            credentials: CredentialStore::new()
                .with(Role::Admin, Credentials::new("admin@example.com", "hunter2")),
            ..SuiteConfig::default()
        };
        let yaml = config(&suite).unwrap();
        assert!(yaml.contains("admin@example.com"));
        assert!(!yaml.contains("hunter2"));
    }
}
