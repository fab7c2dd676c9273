//! Command implementations

use crate::commands::{ConfigArgs, ListArgs, RunArgs};
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use shopcheck::{
    logging, BrowserKind, ConfigStore, DataManager, LogConfig, Marker, MarkerExpr, ReportFormat,
    RunOptions, Runner, Settings,
};
use std::path::Path;
use std::time::Duration;

/// Load settings from the config file; a missing file is an error
pub fn load_settings(path: &Path) -> CliResult<(ConfigStore, Settings)> {
    let store = ConfigStore::load(path)?;
    let settings = Settings::from_store(&store)?;
    Ok((store, settings))
}

/// Apply `run` flags over the loaded settings
pub fn apply_overrides(settings: &mut Settings, args: &RunArgs) -> CliResult<()> {
    if let Some(ref name) = args.browser {
        settings.browser.kind = name.parse::<BrowserKind>()?;
    }
    if args.headless {
        settings.browser.headless = true;
    }
    if let Some(ref url) = args.base_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CliError::invalid_argument(format!(
                "--base-url must be an http(s) URL, got {url}"
            )));
        }
        settings.base_url = url.trim_end_matches('/').to_string();
    }
    Ok(())
}

fn marker_expr(raw: Option<&str>) -> CliResult<Option<MarkerExpr>> {
    raw.map(str::parse::<MarkerExpr>)
        .transpose()
        .map_err(CliError::from)
}

/// Selection and execution options from `run` flags
pub fn run_options(args: &RunArgs) -> CliResult<RunOptions> {
    if args.workers == 0 {
        return Err(CliError::invalid_argument("--workers must be at least 1"));
    }
    let mut options = RunOptions::default()
        .with_suite(args.suite.into())
        .with_workers(args.workers)
        .with_reruns(args.reruns, Duration::from_secs(args.rerun_delay))
        .with_backend(args.backend.into());
    if let Some(expr) = marker_expr(args.markers.as_deref())? {
        options = options.with_markers(expr);
    }
    if let Some(ref filter) = args.filter {
        options = options.with_filter(filter.clone());
    }
    Ok(options)
}

/// `shopcheck run`
pub fn execute_run(
    config: &Path,
    args: &RunArgs,
    verbose: u8,
    output: &mut ProgressReporter,
) -> CliResult<()> {
    let (_, mut settings) = load_settings(config)?;
    apply_overrides(&mut settings, args)?;
    let options = run_options(args)?;

    let level = match verbose {
        0 => settings.logging.level.clone(),
        1 => "DEBUG".to_string(),
        _ => "TRACE".to_string(),
    };
    let log_config = LogConfig {
        console: verbose > 0,
        ..settings.logging.clone()
    }
    .with_level(level);
    let _log_guard = logging::init(&log_config)?;

    let selected = options.select();
    output.header(&format!(
        "shopcheck {} suite: {} scenario(s) against {}",
        options.suite,
        selected.len(),
        settings.base_url
    ));
    if selected.is_empty() {
        output.warning("no scenarios match the selection");
        return Ok(());
    }

    let reports_dir = settings.reports_dir.clone();
    let formats: Vec<ReportFormat> = args.report.iter().map(|&r| r.into()).collect();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    output.start_progress(selected.len() as u64, "running");
    let runner = Runner::new(settings, options);
    let reporter = runtime.block_on(runner.run(|result| output.case(result)))?;
    output.finish();

    for path in reporter.write_reports(&reports_dir, &formats)? {
        output.info(&format!("report: {}", path.display()));
    }
    output.summary(
        reporter.passed_count(),
        reporter.failed_count(),
        reporter.error_count(),
        reporter.skipped_count(),
        reporter.total_duration(),
    );

    let broken = reporter.failed_count() + reporter.error_count();
    if broken == 0 {
        Ok(())
    } else {
        Err(CliError::test_execution(format!("{broken} scenario(s) failed")))
    }
}

/// `shopcheck list`
pub fn execute_list(args: &ListArgs) -> CliResult<()> {
    if args.show_markers {
        for marker in Marker::ALL {
            println!("{:<14}{}", marker.as_str(), marker.description());
        }
        return Ok(());
    }
    let mut options = RunOptions::default().with_suite(args.suite.into());
    if let Some(expr) = marker_expr(args.markers.as_deref())? {
        options = options.with_markers(expr);
    }
    if let Some(ref filter) = args.filter {
        options = options.with_filter(filter.clone());
    }
    let selected = options.select();
    for scenario in &selected {
        let markers: Vec<&str> = scenario.markers.iter().map(Marker::as_str).collect();
        println!("{:<48}[{}]", scenario.id(), markers.join(", "));
    }
    println!("\n{} scenario(s)", selected.len());
    Ok(())
}

/// `shopcheck clean`
pub fn execute_clean(config: &Path, output: &ProgressReporter) -> CliResult<()> {
    let (_, settings) = load_settings(config)?;
    if settings.reports_dir.exists() {
        std::fs::remove_dir_all(&settings.reports_dir)?;
    }
    for dir in [
        settings.screenshots_dir(),
        settings.page_sources_dir(),
        settings.logs_dir(),
    ] {
        std::fs::create_dir_all(&dir)?;
    }
    output.success(&format!("cleaned {}", settings.reports_dir.display()));
    Ok(())
}

/// `shopcheck setup-data`
pub fn execute_setup_data(config: &Path, output: &ProgressReporter) -> CliResult<()> {
    let (_, settings) = load_settings(config)?;
    let data = DataManager::new(settings.data.clone());
    data.create_test_data_templates()?;
    output.success(&format!(
        "test data templates written to {}",
        data.files().data_dir().display()
    ));
    Ok(())
}

/// `shopcheck config`
pub fn execute_config(config: &Path, args: &ConfigArgs) -> CliResult<()> {
    let (store, settings) = load_settings(config)?;
    match args.key {
        Some(ref key) => match store.get(key) {
            Some(value) => println!("{key} = {value}"),
            None => return Err(CliError::config(format!("no value for {key}"))),
        },
        None => println!("{}", serde_json::to_string_pretty(&settings)?),
    }
    Ok(())
}
