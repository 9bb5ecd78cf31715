//! ohprobe CLI entry point

use clap::Parser;
use ohouse_probe::device::SettleDelays;
use ohouse_probe::AppiumFactory;
use ohouse_probe_cli::{
    init_logging, load_app_config, network, print_scenarios, show_config, terminate, Cli,
    CliConfig, CliResult, Commands, SuiteRunner, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = build_config(&cli);
    init_logging(config.verbosity, config.log_json);

    match cli.command {
        Commands::List(args) => print_scenarios(&args),
        Commands::Config(args) => show_config(&load_app_config(&config)?, &args),
        Commands::Run(args) => {
            let config = config
                .with_fail_fast(args.fail_fast)
                .with_report_path(args.report.clone())
                .with_screenshot_dir(args.screenshots.clone());
            let app = load_app_config(&config)?;
            SuiteRunner::new(config, app).run(&args)
        }
        Commands::Network(args) => {
            let factory = AppiumFactory::new(load_app_config(&config)?);
            let line = network(&factory, SettleDelays::default(), args.action)?;
            println!("{line}");
            Ok(())
        }
        Commands::Terminate(args) => {
            let app = load_app_config(&config)?;
            let package = args.package.unwrap_or_else(|| app.app_package.clone());
            let factory = AppiumFactory::new(app);
            let line = terminate(&factory, SettleDelays::default(), &package)?;
            println!("{line}");
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_log_json(cli.log_json)
        .with_config_file(cli.config.clone())
}
