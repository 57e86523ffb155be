//! tysh: The tyshape checker CLI.
//!
//! Usage:
//!   tysh [options] [file...]
//!
//! Each file is an AST in JSON form, as written by the front-end.
//! Diagnostics are printed tsc-style to stderr.

use clap::Parser as ClapParser;
use std::path::Path;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use tyshape_compiler::{Program, ProgramError};
use tyshape_diagnostics::{Diagnostic, DiagnosticCollection};
use tyshape_options::{DiagnosticLevel, ProjectConfig};

const DEFAULT_CONFIG: &str = "tyshape.json";

const EXIT_OK: i32 = 0;
const EXIT_USAGE: i32 = 1;
const EXIT_TYPE_ERRORS: i32 = 2;
const EXIT_FATAL: i32 = 3;

#[derive(ClapParser, Debug)]
#[command(name = "tysh", version, about = "tyshape - a structural type checker")]
struct Cli {
    /// AST files to check.
    #[arg(value_name = "FILE")]
    files: Vec<String>,

    /// Path to tyshape.json.
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Compare function parameters contravariantly.
    #[arg(long)]
    strict_function_types: bool,

    /// Report type parameters that could not be inferred (off, warning, error).
    #[arg(long, value_name = "LEVEL")]
    unresolved_type_parameters: Option<DiagnosticLevel>,

    /// Print diagnostics as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Indent JSON output.
    #[arg(long, requires = "json")]
    pretty: bool,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const GRAY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    init_logging();
    let cli = Cli::parse();
    let exit_code = run_check(&cli);
    process::exit(exit_code);
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TYSHAPE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(stderr_is_terminal())
        .init();
}

fn run_check(cli: &Cli) -> i32 {
    let start = Instant::now();

    let config = match resolve_config(cli) {
        Ok(config) => config,
        Err(message) => {
            print_error(&message);
            return EXIT_USAGE;
        }
    };

    let files = if !cli.files.is_empty() {
        cli.files.clone()
    } else {
        config.as_ref().and_then(|c| c.files.clone()).unwrap_or_default()
    };
    if files.is_empty() {
        print_error("No input files found.");
        return EXIT_USAGE;
    }

    // CLI options override the config file
    let mut options = config
        .and_then(|c| c.checker_options)
        .unwrap_or_default();
    if cli.strict_function_types {
        options.strict_function_types = true;
    }
    if let Some(level) = cli.unresolved_type_parameters {
        options.unresolved_type_parameters = level;
    }
    tracing::debug!(?options, files = files.len(), "starting check");

    let mut program = Program::new(files, options);
    if let Err(e) = program.load_root_files() {
        print_error(&format!("Failed to load source files: {}", e));
        return EXIT_USAGE;
    }

    let diagnostics = match program.compile() {
        Ok(diagnostics) => diagnostics,
        Err(e @ ProgramError::Check { .. }) => {
            print_error(&e.to_string());
            return EXIT_FATAL;
        }
        Err(e) => {
            print_error(&e.to_string());
            return EXIT_USAGE;
        }
    };

    if cli.json {
        if let Err(e) = print_json(&diagnostics, cli.pretty) {
            print_error(&format!("Failed to write diagnostics: {}", e));
            return EXIT_USAGE;
        }
    } else {
        report(&diagnostics, stderr_is_terminal());
    }

    tracing::debug!(elapsed = ?start.elapsed(), "check finished");

    if diagnostics.has_errors() {
        EXIT_TYPE_ERRORS
    } else {
        EXIT_OK
    }
}

/// Use `--config` when given, else `tyshape.json` in the working directory
/// when it exists.
fn resolve_config(cli: &Cli) -> Result<Option<ProjectConfig>, String> {
    let path = match cli.config {
        Some(ref path) => path.as_str(),
        None if Path::new(DEFAULT_CONFIG).exists() => DEFAULT_CONFIG,
        None => return Ok(None),
    };
    tyshape_options::parse_config_file(Path::new(path))
        .map(Some)
        .map_err(|e| e.to_string())
}

fn print_json(diagnostics: &DiagnosticCollection, pretty: bool) -> serde_json::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(diagnostics.diagnostics())?
    } else {
        serde_json::to_string(diagnostics.diagnostics())?
    };
    println!("{}", text);
    Ok(())
}

fn report(diagnostics: &DiagnosticCollection, use_color: bool) {
    for diag in diagnostics.diagnostics() {
        print_diagnostic(diag, use_color);
        for related in &diag.related_information {
            if use_color {
                eprintln!("  {}{}{}", GRAY, related.message_text, RESET);
            } else {
                eprintln!("  {}", related.message_text);
            }
        }
    }

    let errors = diagnostics.error_count();
    let warnings = diagnostics.warning_count();
    if errors == 0 && warnings == 0 {
        return;
    }
    let summary = format!(
        "Found {} error{} and {} warning{}.",
        errors,
        plural(errors),
        warnings,
        plural(warnings)
    );
    if use_color {
        let color = if errors > 0 { RED } else { YELLOW };
        eprintln!("\n{}{}{}", color, summary, RESET);
    } else {
        eprintln!("\n{}", summary);
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn print_diagnostic(diag: &Diagnostic, use_color: bool) {
    if !use_color {
        eprintln!("{}", diag);
        return;
    }
    let color = if diag.is_error() { RED } else { YELLOW };
    if let Some(ref file) = diag.file {
        eprint!("{}{}{}", CYAN, file, RESET);
        if let Some(location) = diag.location {
            eprint!("({})", location);
        }
        eprint!(": ");
    }
    eprintln!(
        "{}{}{}{} {}TS{}{}: {}",
        BOLD, color, diag.category, RESET, CYAN, diag.code, RESET, diag.message_text
    );
}

fn print_error(msg: &str) {
    if stderr_is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn stderr_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
