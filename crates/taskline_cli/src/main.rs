//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `taskline_core` linkage with deterministic output.
//! - With a file or `--url`, print the dates extracted from it, one
//!   `date<TAB>label` line each.
//! - Start file logging when `TASKLINE_LOG_DIR` is set.

use chrono::Local;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use taskline_core::{
    import_document, import_url, init_logging, CanonicalDate, Config, ImportOutcome,
};

#[derive(Parser, Debug)]
#[command(name = "taskline", version, about = "Print the dates found in a document or web page")]
struct Cli {
    /// Document to scan (.txt, .html, .docx, .pdf; other extensions read as text)
    #[arg(value_name = "PATH", conflicts_with = "url")]
    path: Option<PathBuf>,

    /// Web page to fetch and scan instead of a file
    #[arg(long, value_name = "URL")]
    url: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env();
    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    println!("taskline_core ping={}", taskline_core::ping());
    println!("taskline_core version={}", taskline_core::core_version());

    let today = match CanonicalDate::try_from(Local::now().date_naive()) {
        Ok(today) => today,
        Err(err) => {
            eprintln!("system clock unusable: {err}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = match (cli.path, cli.url) {
        (Some(path), _) => scan_file(&path, today),
        (None, Some(url)) => import_url(&url, today).map_err(|err| err.to_string()),
        (None, None) => return ExitCode::SUCCESS,
    };

    match outcome {
        Ok(outcome) => {
            for occurrence in outcome.dates {
                println!("{}\t{}", occurrence.date, occurrence.label);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn scan_file(path: &Path, today: CanonicalDate) -> Result<ImportOutcome, String> {
    let bytes = std::fs::read(path)
        .map_err(|err| format!("cannot read `{}`: {err}", path.display()))?;
    let file_name = path.to_string_lossy();
    import_document(&file_name, &bytes, today).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn path_and_url_are_optional_and_exclusive() {
        let bare = Cli::try_parse_from(["taskline"]).unwrap();
        assert!(bare.path.is_none() && bare.url.is_none());

        let file = Cli::try_parse_from(["taskline", "syllabus.pdf"]).unwrap();
        assert_eq!(file.path, Some(PathBuf::from("syllabus.pdf")));

        let page = Cli::try_parse_from(["taskline", "--url", "https://example.edu/dates"]).unwrap();
        assert_eq!(page.url.as_deref(), Some("https://example.edu/dates"));

        assert!(Cli::try_parse_from(["taskline", "a.txt", "--url", "https://example.edu"]).is_err());
    }
}
