use clap::Parser;
use quality_report::cli::commands;
use quality_report::cli::{Cli, Commands};
use quality_report::logging::{LogSettings, init_logging};
use quality_report::{ErrorEnvelope, ReportError};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_settings = LogSettings::new(cli.verbose, cli.quiet, cli.log_file.as_deref());
    if let Err(err) = init_logging(&log_settings) {
        eprintln!("Failed to initialize logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, cli.json);
            ExitCode::from(err.code().exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), ReportError> {
    let overrides = cli.overrides();
    match &cli.command {
        Commands::Generate(_) => commands::generate::execute(cli.json, &overrides),
        Commands::Stats(args) => commands::stats::execute(args, cli.json, &overrides),
        Commands::Schema => commands::schema::execute(),
    }
}

/// Errors reach stderr once, through the log layer; `--json` adds the envelope on stdout.
fn report_error(err: &ReportError, json: bool) {
    error!(code = err.code().as_str(), "{err}");
    if json {
        match serde_json::to_string_pretty(&ErrorEnvelope::from(err)) {
            Ok(payload) => println!("{payload}"),
            Err(ser) => error!("cannot serialize error envelope: {ser}"),
        }
    }
}
