//! Lens - submit SQL to an analysis service and review the findings.

mod shell;

use clap::{Parser, Subcommand};
use lens_core::logging::{init_logging, log_dir, LogConfig};
use lens_core::{
    AnalysisClient, AnalysisCoordinator, ClientConfig, Dialect, ErrorInfo, LensError, LensState,
    WorkflowState,
};
use lens_ui::render_state;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// Exit code when the analysis failed.
const EXIT_FAILED: u8 = 1;

/// Exit code when nothing was submitted (blank query).
const EXIT_GATED: u8 = 2;

#[derive(Parser, Debug)]
#[command(version, about = "Submit SQL to an analysis service and review the findings")]
struct Cli {
    /// Base address of the analysis service (overrides LENS_API_URL).
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides LENS_TIMEOUT_SECS; default: none).
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: Option<u64>,

    /// Log filter directive (overrides LENS_LOG and RUST_LOG).
    #[arg(long, global = true, value_name = "FILTER")]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one query and print the result.
    Analyze {
        /// SQL to analyze. Read from --file or stdin when omitted.
        query: Option<String>,

        /// Read the SQL from a file.
        #[arg(short, long, value_name = "PATH", conflicts_with = "query")]
        file: Option<PathBuf>,

        /// Target dialect: postgresql, mysql, sqlite or sqlserver.
        #[arg(short, long, default_value_t = Dialect::Postgresql)]
        dialect: Dialect,

        /// Schema DDL file sent as context.
        #[arg(short, long, value_name = "PATH")]
        schema: Option<PathBuf>,
    },

    /// Start an interactive session.
    Shell {
        /// Initial dialect.
        #[arg(short, long, default_value_t = Dialect::Postgresql)]
        dialect: Dialect,
    },

    /// Check that the analysis service is reachable.
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::new(log_dir());
    if let Some(filter) = &cli.log_filter {
        log_config = log_config.with_filter(filter.clone());
    }
    let _logging_guard = init_logging(log_config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Lens");

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            let info = e.to_error_info();
            tracing::error!(error = %e, detail = ?info.technical_detail, "Command failed");
            eprint!("{}", error_report(&info, tracing::enabled!(tracing::Level::DEBUG)));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, LensError> {
    let config = client_config(cli.api_url.as_deref(), cli.timeout)?;
    let client = AnalysisClient::new(config)?;

    match cli.command {
        Command::Analyze { query, file, dialect, schema } => {
            let text = match (query, file) {
                (Some(query), _) => query,
                (None, Some(path)) => read_file(&path)?,
                (None, None) => read_stdin()?,
            };
            let schema_info = schema.as_deref().map(read_file).transpose()?;

            let state = Arc::new(LensState::new());
            state.set_text(text);
            state.set_dialect(dialect);
            state.set_schema_info(schema_info);

            analyze_once(AnalysisCoordinator::new(state, Arc::new(client))).await
        }
        Command::Shell { dialect } => {
            let state = Arc::new(LensState::new());
            state.set_dialect(dialect);
            shell::run(AnalysisCoordinator::new(state, Arc::new(client))).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => {
            let health = client.health().await?;
            println!("{} ({})", health.status, client.config().base_url);
            Ok(if health.is_healthy() { ExitCode::SUCCESS } else { ExitCode::from(EXIT_FAILED) })
        }
    }
}

/// Submit once, show the busy line while waiting, then print the result.
async fn analyze_once(coordinator: AnalysisCoordinator) -> Result<ExitCode, LensError> {
    if !coordinator.state().can_submit() {
        eprintln!("Nothing to analyze: the query is empty.");
        return Ok(ExitCode::from(EXIT_GATED));
    }

    let mut rx = coordinator.state().subscribe();
    let mut submission = coordinator.spawn_submit();

    let outcome = loop {
        tokio::select! {
            joined = &mut submission => {
                break joined
                    .map_err(|e| LensError::internal(format!("Analysis task failed: {e}")))?;
            }
            Ok(()) = rx.changed() => {
                let state = rx.borrow_and_update();
                if state.is_in_flight() {
                    eprint!("{}", render_state(&state));
                }
            }
        }
    };

    if !outcome.was_submitted() {
        return Ok(ExitCode::from(EXIT_GATED));
    }

    let final_state = coordinator.state().workflow();
    print!("{}", render_state(&final_state));
    Ok(match final_state {
        WorkflowState::Failed(_) => ExitCode::from(EXIT_FAILED),
        _ => ExitCode::SUCCESS,
    })
}

fn client_config(api_url: Option<&str>, timeout: Option<u64>) -> Result<ClientConfig, LensError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = api_url {
        config = config.with_base_url(url)?;
    }
    if let Some(secs) = timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

/// Text printed to stderr for a failed command. Technical detail is included
/// when debug logging is on.
fn error_report(info: &ErrorInfo, verbose: bool) -> String {
    let mut report = format!("{}: {}\n", info.error_type, info.message);
    if let Some(hint) = &info.hint {
        report.push_str(&format!("Hint: {hint}\n"));
    }
    if let (true, Some(detail)) = (verbose, &info.technical_detail) {
        report.push_str(&format!("Detail: {detail}\n"));
    }
    report
}

fn read_file(path: &Path) -> Result<String, LensError> {
    std::fs::read_to_string(path).map_err(|e| {
        LensError::io_with_source(format!("Failed to read {}", path.display()), e)
    })
}

fn read_stdin() -> Result<String, LensError> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| LensError::io_with_source("Failed to read query from stdin", e))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from([
            "lens",
            "--api-url",
            "http://analyzer:9000",
            "analyze",
            "-d",
            "mysql",
            "SELECT 1",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://analyzer:9000"));
        match cli.command {
            Command::Analyze { query, dialect, file, .. } => {
                assert_eq!(query.as_deref(), Some("SELECT 1"));
                assert_eq!(dialect, Dialect::Mysql);
                assert!(file.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_defaults_to_postgresql() {
        let cli = Cli::try_parse_from(["lens", "shell"]).unwrap();
        assert!(matches!(cli.command, Command::Shell { dialect: Dialect::Postgresql }));
    }

    #[test]
    fn test_cli_rejects_unknown_dialect() {
        assert!(Cli::try_parse_from(["lens", "analyze", "-d", "oracle", "SELECT 1"]).is_err());
    }

    #[test]
    fn test_cli_query_conflicts_with_file() {
        let result = Cli::try_parse_from(["lens", "analyze", "-f", "q.sql", "SELECT 1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flag_overrides_base_url() {
        let config = client_config(Some("https://example.test:8443"), Some(5)).unwrap();
        assert_eq!(config.endpoint("analyze"), "https://example.test:8443/analyze");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Cli::try_parse_from(["lens", "--timeout", "0", "health"]).is_err());

        let cli = Cli::try_parse_from(["lens", "--timeout", "30", "health"]).unwrap();
        assert_eq!(cli.timeout, Some(30));
    }

    #[test]
    fn test_error_report_detail_only_when_verbose() {
        let info = LensError::service(502, None).to_error_info();

        let quiet = error_report(&info, false);
        assert!(quiet.starts_with("Service Error: Service error (502): Analysis failed\n"));
        assert!(quiet.contains("Hint: "));
        assert!(!quiet.contains("Detail:"));

        let verbose = error_report(&info, true);
        assert!(verbose.ends_with("Detail: HTTP status: 502\n"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_file(Path::new("/definitely/not/here.sql")).unwrap_err();
        assert!(matches!(err, LensError::Io { .. }));
    }
}
