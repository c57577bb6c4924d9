// UI layer: colored status lines, the hidden token prompt and a spinner for
// slow steps. Status goes to stdout; logs go to stderr through tracing.

use crate::error::{CliError, Result};
use crossterm::style::Stylize;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub const BANNER: &str = r"
             dBBBBP dBBBBBb  dBBBP  dBBBBb dBP dP  dBBBP dBBBBBb .dBBBBP   dBBBP
            dB'.BP      dB'            dBP                   dBP BP
           dB'.BP   dBBBP' dBBP   dBP dBP dB .BP dBBP    dBBBBK' `BBBBb  dBBP
          dB'.BP   dBP    dBP    dBP dBP  BB.BP dBP     dBP  BB     dBP dBP
         dBBBBP   dBP    dBBBBP dBP dBP   BBBP dBBBBP  dBP  dB'dBBBBP' dBBBBP

                    Create • Simulate • Evolve Agent Environments
";

pub const TOKEN_SETTINGS_URL: &str = "https://open-verse.ai/settings/tokens";

pub fn banner() {
    println!("{}", BANNER.cyan().bold());
    println!("{}", "To log in, you need an Openverse API token from:".bold());
    println!("  {}\n", TOKEN_SETTINGS_URL);
}

pub fn success(msg: &str) {
    println!("{}", format!("✓ {}", msg).green());
}

pub fn warning(msg: &str) {
    println!("{}", format!("⚠ {}", msg).yellow());
}

pub fn failure(msg: &str) {
    eprintln!("{}", format!("✗ {}", msg).red().bold());
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

/// Ask for the API token without echoing it.
pub fn prompt_token() -> Result<String> {
    // `Password` hides input in terminal.
    Password::new()
        .with_prompt("Enter your token (input hidden)")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| CliError::Prompt(e.to_string()))
}

/// Spinner shown while a network or archive step runs. It draws to stderr
/// and stays hidden when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print a JSON response body as indented `key: value` lines.
pub fn print_response(value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                match val {
                    serde_json::Value::String(s) => info(&format!("  {}: {}", key, s)),
                    other => info(&format!("  {}: {}", key, other)),
                }
            }
        }
        serde_json::Value::Null => {}
        other => info(&format!("  {}", other)),
    }
}
