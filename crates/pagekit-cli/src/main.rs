//! PageKit CLI: run the Stormwind end-to-end suite
//!
//! ## Usage
//!
//! ```bash
//! pagekit test                          # Run every scenario in chromium
//! pagekit test --browser mock           # Run against the offline replica
//! pagekit test --tag nightly -j 4       # Walkthroughs on four workers
//! pagekit list --filter student/        # Show matching scenarios
//! pagekit fixtures                      # Check the fixture graph
//! pagekit config                        # Show the effective configuration
//! ```

use clap::Parser;
use pagekit::SuiteConfig;
use pagekit_cli::{
    handlers, Cli, CliConfig, CliResult, Commands, TestArgs, TestRunner, Verbosity,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = pagekit::logging::init(
        cli.log_format.into(),
        pagekit::logging::directive(cli.verbose, cli.quiet),
    );
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(cli.color.into());
    let path = config_file(cli.config.as_deref());

    match cli.command {
        Commands::Test(args) => run_tests(config, path.as_deref(), &args),
        Commands::List(args) => {
            print!("{}", handlers::list(&args)?);
            Ok(())
        }
        Commands::Fixtures(args) => {
            print!("{}", handlers::fixtures(&args)?);
            Ok(())
        }
        Commands::Config(args) => {
            let mut suite = load(path.as_deref())?;
            if args.mock {
                suite.browser = pagekit::BrowserEngine::Mock;
            }
            let suite = pagekit_cli::finish(suite)?;
            print!("{}", handlers::config(&suite)?);
            Ok(())
        }
    }
}

fn config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    pagekit_cli::config_path(explicit, &cwd)
}

fn load(path: Option<&Path>) -> CliResult<SuiteConfig> {
    pagekit_cli::load_suite_config(path, |key| std::env::var(key).ok())
}

fn run_tests(config: CliConfig, path: Option<&Path>, args: &TestArgs) -> CliResult<()> {
    let mut suite = load(path)?;
    pagekit_cli::apply_test_args(&mut suite, args);
    let suite = pagekit_cli::finish(suite)?;
    let filter = handlers::scenario_filter(args.filter.as_deref(), &args.tags);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let runner = TestRunner::new(config).with_fail_fast(args.fail_fast);
    runtime.block_on(runner.run(&suite, &filter)).map(|_| ())
}
