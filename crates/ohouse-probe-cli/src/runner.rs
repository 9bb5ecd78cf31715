//! Suite execution, scenario listing and configuration display

use crate::commands::{ConfigArgs, ListArgs, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use ohouse_probe::{
    all_scenarios, AppConfig, AppiumFactory, Priority, RunObserver, RunOptions, Scenario,
    ScenarioRunner, SessionFactory, SuiteReport,
};
use std::fmt::Write as _;
use std::path::Path;

/// Resolved suite configuration: defaults, then the YAML file, then the environment
pub fn load_app_config(config: &CliConfig) -> CliResult<AppConfig> {
    Ok(AppConfig::load(config.config_file.as_deref())?)
}

/// Executes scenario runs
#[derive(Debug)]
pub struct SuiteRunner {
    config: CliConfig,
    app: AppConfig,
}

impl SuiteRunner {
    /// Runner for an already resolved configuration
    #[must_use]
    pub const fn new(config: CliConfig, app: AppConfig) -> Self {
        Self { config, app }
    }

    /// Run options from the CLI configuration and run arguments
    #[must_use]
    pub fn options(&self, args: &RunArgs) -> RunOptions {
        RunOptions {
            filter: args.filter.clone(),
            priority: args.priority.map(Priority::from),
            fail_fast: self.config.fail_fast,
            screenshot_dir: self.config.screenshot_dir.clone(),
            ..RunOptions::default()
        }
    }

    /// Run every matching scenario on sessions from `factory`
    pub fn run_with(
        &self,
        factory: &dyn SessionFactory,
        args: &RunArgs,
        observer: &mut dyn RunObserver,
    ) -> CliResult<SuiteReport> {
        let runner = ScenarioRunner::new(factory, &self.app).with_options(self.options(args));
        let scenarios = all_scenarios();
        if runner.select(&scenarios).is_empty() {
            return Err(CliError::invalid_argument(format!(
                "no scenario matches filter {:?} and priority {:?}",
                args.filter.as_deref().unwrap_or("*"),
                args.priority.map(|p| Priority::from(p).to_string())
            )));
        }

        tracing::info!(
            server = %self.app.appium_server_url,
            device = %self.app.device_name,
            "starting suite"
        );
        let report = runner.run(&scenarios, observer);

        if let Some(ref path) = self.config.report_path {
            write_report(&report, path)?;
            tracing::info!(path = %path.display(), "report written");
        }
        Ok(report)
    }

    /// Run against the configured Appium server and fail when any scenario failed
    pub fn run(&self, args: &RunArgs) -> CliResult<()> {
        let factory = AppiumFactory::new(self.app.clone());
        let mut reporter = ProgressReporter::new(
            self.config.color.should_color(),
            self.config.verbosity.is_quiet(),
        );
        let report = self.run_with(&factory, args, &mut reporter)?;
        if let Some(ref path) = self.config.report_path {
            reporter.info(&format!("Report: {}", path.display()));
        }
        verdict(&report)
    }
}

/// `Ok` when nothing failed
pub fn verdict(report: &SuiteReport) -> CliResult<()> {
    if report.all_passed() {
        return Ok(());
    }
    let ids: Vec<_> = report.failures().iter().map(|o| o.id.as_str()).collect();
    Err(CliError::scenario_failed(format!(
        "{} of {} scenario(s) failed: {}",
        ids.len(),
        report.total(),
        ids.join(", ")
    )))
}

fn write_report(report: &SuiteReport, path: &Path) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    report.write_json(path)?;
    Ok(())
}

/// Scenario table, one per line: id, priority, launch mode, title
#[must_use]
pub fn format_scenario_list(scenarios: &[Scenario]) -> String {
    let mut out = String::new();
    for s in scenarios {
        let launch = format!("{:?}", s.launch);
        let _ = writeln!(out, "{:<12} {:<3} {launch:<11} {}", s.id, s.priority, s.title);
    }
    out
}

/// Registered scenarios matching the list arguments, in run order
#[must_use]
pub fn list_scenarios(args: &ListArgs) -> Vec<Scenario> {
    let priority = args.priority.map(Priority::from);
    all_scenarios()
        .into_iter()
        .filter(|s| s.matches(args.filter.as_deref(), priority))
        .collect()
}

/// Print the matching scenarios to standard output
pub fn print_scenarios(args: &ListArgs) -> CliResult<()> {
    let scenarios = list_scenarios(args);
    if scenarios.is_empty() {
        return Err(CliError::invalid_argument("no scenario matches"));
    }
    print!("{}", format_scenario_list(&scenarios));
    Ok(())
}

/// YAML for `app` with the password masked
pub fn render_config(app: &AppConfig) -> CliResult<String> {
    Ok(serde_yaml_ng::to_string(&app.redacted())?)
}

/// Print the masked configuration, or write it to `--file`
pub fn show_config(app: &AppConfig, args: &ConfigArgs) -> CliResult<()> {
    let yaml = render_config(app)?;
    match args.file {
        Some(ref path) => std::fs::write(path, yaml)?,
        None => print!("{yaml}"),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::PriorityArg;
    use ohouse_probe::scenario::NoopObserver;
    use ohouse_probe::{AppLaunch, OpenedSession, OutcomeStatus, ProbeError, ProbeResult};
    use std::path::PathBuf;

    /// Appium server that refuses every session
    struct Unreachable;

    impl SessionFactory for Unreachable {
        fn open(&self, _launch: AppLaunch) -> ProbeResult<OpenedSession> {
            Err(ProbeError::device("POST /session", "connection refused"))
        }
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_options_from_args() {
            let config = CliConfig::new()
                .with_fail_fast(true)
                .with_screenshot_dir(Some(PathBuf::from("shots")));
            let runner = SuiteRunner::new(config, AppConfig::default());
            let options = runner.options(&RunArgs {
                filter: Some("LOGIN".to_string()),
                priority: Some(PriorityArg::P2),
                ..RunArgs::default()
            });
            assert_eq!(options.filter.as_deref(), Some("LOGIN"));
            assert_eq!(options.priority, Some(Priority::P2));
            assert!(options.fail_fast);
            assert_eq!(options.screenshot_dir, Some(PathBuf::from("shots")));
        }
    }

    mod run_tests {
        use super::*;

        #[test]
        fn test_unmatched_filter_is_invalid_argument() {
            let runner = SuiteRunner::new(CliConfig::new(), AppConfig::default());
            let args = RunArgs {
                filter: Some("NOPE_999".to_string()),
                ..RunArgs::default()
            };
            let err = runner
                .run_with(&Unreachable, &args, &mut NoopObserver)
                .unwrap_err();
            assert!(matches!(err, CliError::InvalidArgument { .. }));
        }

        #[test]
        fn test_failed_run_writes_report_and_fails_verdict() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("report.json");
            let config = CliConfig::new()
                .with_fail_fast(true)
                .with_report_path(Some(path.clone()));
            let runner = SuiteRunner::new(config, AppConfig::default());
            let args = RunArgs {
                filter: Some("LOGIN_00".to_string()),
                ..RunArgs::default()
            };

            let report = runner
                .run_with(&Unreachable, &args, &mut NoopObserver)
                .unwrap();
            assert_eq!(report.outcomes[0].status, OutcomeStatus::SetupFailed);
            assert!(report
                .outcomes
                .iter()
                .skip(1)
                .all(|o| o.status == OutcomeStatus::Skipped));

            let json = std::fs::read_to_string(&path).unwrap();
            assert!(json.contains("LOGIN_001"));

            let err = verdict(&report).unwrap_err();
            assert_eq!(err.exit_code(), 1);
            assert!(err.to_string().contains("LOGIN_001"));
        }
    }

    mod list_tests {
        use super::*;

        #[test]
        fn test_list_all() {
            let scenarios = list_scenarios(&ListArgs::default());
            assert_eq!(scenarios.len(), all_scenarios().len());
        }

        #[test]
        fn test_list_by_priority() {
            let scenarios = list_scenarios(&ListArgs {
                priority: Some(PriorityArg::P1),
                ..ListArgs::default()
            });
            assert!(!scenarios.is_empty());
            assert!(scenarios.iter().all(|s| s.priority == Priority::P1));
        }

        #[test]
        fn test_format_has_one_line_per_scenario() {
            let scenarios = list_scenarios(&ListArgs {
                filter: Some("login_00".to_string()),
                ..ListArgs::default()
            });
            let text = format_scenario_list(&scenarios);
            assert_eq!(text.lines().count(), scenarios.len());
            assert!(text.lines().next().unwrap().starts_with("LOGIN_001"));
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_render_masks_password() {
            let app = AppConfig {
                login_id: Some("qa@ohou.se".to_string()),
                login_password: Some("hunter2".to_string()),
                ..AppConfig::default()
            };
            let yaml = render_config(&app).unwrap();
            assert!(yaml.contains("qa@ohou.se"));
            assert!(yaml.contains("********"));
            assert!(!yaml.contains("hunter2"));
        }

        #[test]
        fn test_show_config_to_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("resolved.yaml");
            show_config(
                &AppConfig::default(),
                &ConfigArgs {
                    file: Some(path.clone()),
                },
            )
            .unwrap();
            let yaml = std::fs::read_to_string(&path).unwrap();
            assert!(yaml.contains("appium_server_url"));
        }
    }
}
