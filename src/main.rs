mod cli;

use clap::Parser;
use companion::core::config::{self, CliOverrides};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{self, File};
use std::process::ExitCode;

use cli::Args;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    // Prefer ~/.companion/companion.log; fall back to the working directory
    let log_path = config::config_dir()
        .filter(|dir| fs::create_dir_all(dir).is_ok())
        .map(|dir| dir.join("companion.log"))
        .unwrap_or_else(|| "companion.log".into());

    if let Ok(log_file) = File::options().create(true).append(true).open(&log_path) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();
    init_logging(args.verbose);

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let overrides = CliOverrides {
        location: args.command.location(),
    };
    let resolved = config::resolve(&file_config, &overrides);
    log::info!("Companion starting up (location={})", resolved.location);

    cli::run(args.command, resolved).await
}
