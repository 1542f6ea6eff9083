//! popmenu - replays scripted pointer and key input against the demo menus
//! and prints the resulting scene after every step.
//!
//! Usage: `popmenu [--config <file>] [--log-dir <dir>] [script.json]`

mod app;
mod app_menus;

use std::path::PathBuf;
use std::process::ExitCode;

use app::{DemoApp, Step};
use clap::Parser;
use popmenu_core::logging::{init_logging, LogConfig};
use popmenu_core::{MenuError, SessionConfig, Size};

/// Used when no script file is given.
const DEFAULT_SCRIPT: &str = r#"[
    { "step": "click_label", "label": "File" },
    { "step": "hover_label", "label": "Edit" },
    { "step": "key", "key": "down" },
    { "step": "key", "key": "down" },
    { "step": "key", "key": "enter" },
    { "step": "context", "x": 400, "y": 300 },
    { "step": "hover_label", "label": "Transform" },
    { "step": "click_label", "label": "Make Upper Case" },
    { "step": "focus_menubar" },
    { "step": "key", "key": "right" },
    { "step": "key", "key": "escape" }
]"#;

#[derive(Debug, Parser)]
#[command(name = "popmenu", about = "Replay scripted input against the popmenu demo menus")]
struct Args {
    /// JSON session configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write daily log files to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// JSON script of steps; a built-in script runs when omitted
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Config first: it may carry the log filter.
    let config = match args.config.as_ref().map(SessionConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("popmenu: {e}");
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            return ExitCode::FAILURE;
        }
    };

    let mut log_config = match &args.log_dir {
        Some(dir) => LogConfig::new(dir.clone()),
        None => LogConfig::console(),
    };
    if let Some(filter) = &config.log_filter {
        log_config = log_config.with_filter(filter.clone());
    }
    let _logging_guard = init_logging(log_config);

    tracing::info!("Starting popmenu");

    match run(&args, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, category = e.category(), "popmenu failed");
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: SessionConfig) -> Result<(), MenuError> {
    let script = match &args.script {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEFAULT_SCRIPT.to_string(),
    };
    let steps: Vec<Step> = serde_json::from_str(&script)?;

    let mut app = DemoApp::new(config, Size::new(1280.0, 800.0))?;
    println!("{}", app.outline());

    for (index, step) in steps.iter().enumerate() {
        app.run_step(step)?;
        println!("#{} {:?}", index + 1, step);
        println!("{}", app.outline());
    }

    let actions = app.actions();
    println!("actions: {}", if actions.is_empty() { "none".to_string() } else { actions.join(", ") });
    tracing::info!(steps = steps.len(), actions = actions.len(), "Script finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_flags_and_script() {
        let args = Args::parse_from(["popmenu", "--config", "menus.json", "--log-dir", "logs", "script.json"]);
        assert_eq!(args.config, Some(PathBuf::from("menus.json")));
        assert_eq!(args.log_dir, Some(PathBuf::from("logs")));
        assert_eq!(args.script, Some(PathBuf::from("script.json")));
    }

    #[test]
    fn test_args_default_to_builtin_script() {
        let args = Args::parse_from(["popmenu"]);
        assert!(args.config.is_none());
        assert!(args.script.is_none());
    }

    #[test]
    fn test_args_reject_flag_without_value() {
        assert!(Args::try_parse_from(["popmenu", "--config"]).is_err());
    }

    #[test]
    fn test_default_script_parses() {
        let steps: Vec<Step> = serde_json::from_str(DEFAULT_SCRIPT).unwrap();
        assert_eq!(steps.first(), Some(&Step::ClickLabel { label: "File".into() }));
    }
}
