//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use shopcheck::{Backend, ReportFormat, Suite};
use std::path::PathBuf;

/// shopcheck: end-to-end UI checks for the Automation Exercise storefront
#[derive(Parser, Debug)]
#[command(name = "shopcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = shopcheck::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (failures and the summary only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a suite of scenarios
    Run(RunArgs),

    /// List scenarios without running them
    List(ListArgs),

    /// Remove and recreate the reports tree
    Clean,

    /// Write the JSON test-data templates
    SetupData,

    /// Print the effective settings
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Suite to run
    #[arg(long, value_enum, default_value = "smoke")]
    pub suite: SuiteArg,

    /// Browser to launch (chrome, chromium, edge)
    #[arg(long)]
    pub browser: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Site origin, overriding app.base_url
    #[arg(long)]
    pub base_url: Option<String>,

    /// Scenarios in flight at once
    #[arg(short = 'j', long, default_value = "1")]
    pub workers: usize,

    /// Marker expression, e.g. "smoke and not slow"
    #[arg(short = 'm', long)]
    pub markers: Option<String>,

    /// Substring of group::name
    #[arg(short = 'k', long)]
    pub filter: Option<String>,

    /// Extra attempts for a failed scenario
    #[arg(long, default_value = "2")]
    pub reruns: u32,

    /// Seconds to wait before a rerun
    #[arg(long, default_value = "3")]
    pub rerun_delay: u64,

    /// Report files to write
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = vec![ReportArg::Json, ReportArg::Junit, ReportArg::Html])]
    pub report: Vec<ReportArg>,

    /// What the sessions drive
    #[arg(long, value_enum, default_value = "browser")]
    pub backend: BackendArg,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Suite to list
    #[arg(long, value_enum, default_value = "all")]
    pub suite: SuiteArg,

    /// Marker expression
    #[arg(short = 'm', long)]
    pub markers: Option<String>,

    /// Substring of group::name
    #[arg(short = 'k', long)]
    pub filter: Option<String>,

    /// List the markers and their meaning instead
    #[arg(long)]
    pub show_markers: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Look up one dotted key, e.g. browser.implicit_wait
    #[arg(long)]
    pub key: Option<String>,
}

/// Suite choices
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteArg {
    /// Critical paths
    Smoke,
    /// Full regression set
    Regression,
    /// Every scenario
    All,
    /// Registration and login
    Login,
    /// Product listing and search
    Product,
    /// Shopping cart
    Cart,
    /// Contact form
    Contact,
}

impl From<SuiteArg> for Suite {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::Smoke => Self::Smoke,
            SuiteArg::Regression => Self::Regression,
            SuiteArg::All => Self::All,
            SuiteArg::Login => Self::Login,
            SuiteArg::Product => Self::Product,
            SuiteArg::Cart => Self::Cart,
            SuiteArg::Contact => Self::Contact,
        }
    }
}

/// Report file choices
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportArg {
    /// summary.txt
    Text,
    /// results.json
    Json,
    /// junit.xml
    Junit,
    /// report.html
    Html,
}

impl From<ReportArg> for ReportFormat {
    fn from(arg: ReportArg) -> Self {
        match arg {
            ReportArg::Text => Self::Text,
            ReportArg::Json => Self::Json,
            ReportArg::Junit => Self::Junit,
            ReportArg::Html => Self::Html,
        }
    }
}

/// Backend choices
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    /// Chromium over CDP
    Browser,
    /// In-memory storefront
    Mock,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Browser => Self::Browser,
            BackendArg::Mock => Self::Mock,
        }
    }
}

/// Color output argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorArg {
    /// Whether to color stderr
    #[must_use]
    pub fn enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stderr().features().colors_supported(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("shopcheck").chain(args.iter().copied())).unwrap()
    }

    mod run_args_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let cli = parse(&["run"]);
            assert_eq!(cli.config, PathBuf::from("config/config.yaml"));
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.suite, SuiteArg::Smoke);
            assert_eq!(args.workers, 1);
            assert_eq!(args.reruns, 2);
            assert_eq!(args.rerun_delay, 3);
            assert_eq!(args.backend, BackendArg::Browser);
            assert_eq!(
                args.report,
                vec![ReportArg::Json, ReportArg::Junit, ReportArg::Html]
            );
            assert!(!args.headless);
        }

        #[test]
        fn test_all_flags() {
            let cli = parse(&[
                "run",
                "--suite",
                "cart",
                "--browser",
                "chromium",
                "--headless",
                "--base-url",
                "http://localhost:8080",
                "-j",
                "4",
                "-m",
                "cart and not slow",
                "-k",
                "remove",
                "--reruns",
                "0",
                "--rerun-delay",
                "1",
                "--report",
                "text,junit",
                "--backend",
                "mock",
                "--config",
                "other.yaml",
            ]);
            assert_eq!(cli.config, PathBuf::from("other.yaml"));
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(Suite::from(args.suite), Suite::Cart);
            assert_eq!(args.browser.as_deref(), Some("chromium"));
            assert!(args.headless);
            assert_eq!(args.workers, 4);
            assert_eq!(args.markers.as_deref(), Some("cart and not slow"));
            assert_eq!(args.filter.as_deref(), Some("remove"));
            assert_eq!(args.report, vec![ReportArg::Text, ReportArg::Junit]);
            assert_eq!(Backend::from(args.backend), Backend::Mock);
        }

        #[test]
        fn test_unknown_suite_rejected() {
            let parsed = Cli::try_parse_from(["shopcheck", "run", "--suite", "nightly"]);
            assert!(parsed.is_err());
        }
    }

    mod other_command_tests {
        use super::*;

        #[test]
        fn test_list_defaults_to_all() {
            let Commands::List(args) = parse(&["list"]).command else {
                panic!("expected list");
            };
            assert_eq!(args.suite, SuiteArg::All);
            assert!(!args.show_markers);
        }

        #[test]
        fn test_plain_subcommands() {
            assert!(matches!(parse(&["clean"]).command, Commands::Clean));
            assert!(matches!(parse(&["setup-data"]).command, Commands::SetupData));
            let Commands::Config(args) = parse(&["config", "--key", "app.base_url"]).command else {
                panic!("expected config");
            };
            assert_eq!(args.key.as_deref(), Some("app.base_url"));
        }

        #[test]
        fn test_report_arg_maps() {
            assert_eq!(ReportFormat::from(ReportArg::Html), ReportFormat::Html);
            assert!(ColorArg::Always.enabled());
            assert!(!ColorArg::Never.enabled());
        }
    }
}
