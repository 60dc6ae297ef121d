//! Document Tamper Diagnostics - CLI Interface
//! Author: kartik4091
//! Created: 2025-06-06
//!
//! Analyzes one scanned PDF or image and prints a diagnostic line per signal.

use std::path::PathBuf;
use std::process;

use clap::{Arg, ArgMatches, Command, ValueEnum};
use tamperscan::{
    init_logging, AnalysisConfig, ConsoleSink, DocumentAnalyzer, NullSink, ReportFormat,
    ReportFormatter,
};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Diagnostic lines as each stage finishes (default)
    Text,
    /// Full structured report as JSON
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    /// Error messages only
    Error,
    /// Warning and error messages (default)
    Warn,
    /// Info, warning, and error messages
    Info,
    /// Debug and all messages
    Debug,
    /// Trace and all messages (most verbose)
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn main() {
    let matches = build_cli().get_matches();

    let log_level = matches
        .get_one::<LogLevel>("verbose")
        .copied()
        .unwrap_or(LogLevel::Warn);
    init_logging(log_level.as_filter());

    if let Err(e) = run(&matches) {
        error!("❌ Analysis failed: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> tamperscan::Result<()> {
    let Some(path) = matches.get_one::<PathBuf>("filepath") else {
        return Ok(());
    };
    let format = matches
        .get_one::<OutputFormat>("format")
        .copied()
        .unwrap_or(OutputFormat::Text);

    let config = match matches.get_one::<PathBuf>("config") {
        Some(config_path) => {
            info!("📋 Loading config from {}", config_path.display());
            AnalysisConfig::from_file(config_path)?
        }
        None => AnalysisConfig::default(),
    };
    debug!(?config, "Effective configuration");

    let analyzer = DocumentAnalyzer::new(config);
    match format {
        OutputFormat::Text => {
            analyzer.analyze(path, &mut ConsoleSink)?;
        }
        OutputFormat::Json => {
            let report = analyzer.analyze(path, &mut NullSink)?;
            println!("{}", ReportFormatter::format(&report, ReportFormat::Json)?);
        }
    }
    Ok(())
}

fn build_cli() -> Command {
    Command::new("tamperscan")
        .version(env!("CARGO_PKG_VERSION"))
        .author("kartik4091")
        .about("Process an image or PDF document.")
        .long_about("Inspects a scanned PDF or image for signs of tampering: metadata \
                    consistency, account number, date and transaction amount found by OCR, \
                    and a statistical image quality score. Each finding is printed on its own \
                    line for a reviewer to weigh; no combined verdict is given.")

        .arg(Arg::new("filepath")
            .value_name("FILEPATH")
            .value_parser(clap::value_parser!(PathBuf))
            .help("the path to the document")
            .required(true))

        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .value_parser(clap::value_parser!(PathBuf))
            .help("Configuration file (JSON/YAML): known accounts, limits, thresholds"))

        .arg(Arg::new("format")
            .short('f')
            .long("format")
            .value_parser(clap::value_parser!(OutputFormat))
            .default_value("text")
            .help("Output format"))

        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .value_parser(clap::value_parser!(LogLevel))
            .default_value("warn")
            .help("Set logging verbosity (logs go to stderr)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let matches = build_cli().try_get_matches_from(["tamperscan", "scan.png"]).unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("filepath"),
            Some(&PathBuf::from("scan.png"))
        );
        assert!(matches!(matches.get_one::<OutputFormat>("format"), Some(OutputFormat::Text)));
        assert!(matches!(matches.get_one::<LogLevel>("verbose"), Some(LogLevel::Warn)));
    }

    #[test]
    fn test_cli_requires_path() {
        assert!(build_cli().try_get_matches_from(["tamperscan"]).is_err());
    }

    #[test]
    fn test_cli_json_and_config() {
        let matches = build_cli()
            .try_get_matches_from(["tamperscan", "-f", "json", "--config", "rules.yaml", "a.pdf"])
            .unwrap();
        assert!(matches!(matches.get_one::<OutputFormat>("format"), Some(OutputFormat::Json)));
        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("rules.yaml"))
        );
    }
}
