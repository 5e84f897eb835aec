//! Settings commands

use super::Workspace;
use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Subcommand};
use fabrica_core::config::API_KEY_VAR;

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show the current settings
    Show,

    /// Store the Gemini API key
    ApiKey {
        /// The key
        key: String,
    },

    /// Forget the stored API key
    ClearApiKey,

    /// Turn dark mode on or off
    DarkMode {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        enabled: bool,
    },
}

/// Key with everything but the last four characters hidden
fn masked(key: &str) -> String {
    let count = key.chars().count();
    let tail: String = key.chars().skip(count.saturating_sub(4)).collect();
    format!("{}{tail}", "*".repeat(count.saturating_sub(4)))
}

pub async fn run(ws: &mut Workspace, cmd: SettingsCommand) -> Result<()> {
    match cmd {
        SettingsCommand::Show => {
            let prefs = ws.state.preferences();
            let key = match (ws.state.api_key(), ws.config.resolve_api_key(&ws.state)) {
                (Some(stored), _) => format!("{} (stored)", masked(stored)),
                (None, Some(env)) => format!("{} (from {API_KEY_VAR})", masked(env)),
                (None, None) => "not set".to_string(),
            };
            println!("Data directory: {}", ws.config.data_dir.display());
            println!("API key:        {key}");
            println!("Model:          {}", ws.config.gemini.model);
            println!("Dark mode:      {}", if prefs.dark_mode { "on" } else { "off" });
            println!("Active view:    {}", prefs.active_view);
            println!(
                "Reader:         font {} / {}",
                prefs.reader.font_size, prefs.reader.theme
            );
            if let Some(book) = prefs.selected_book.and_then(|id| ws.state.book(id)) {
                println!("Selected book:  {} ({})", book.title, book.id);
            }
        }
        SettingsCommand::ApiKey { key } => {
            if key.trim().is_empty() {
                anyhow::bail!("API key is empty");
            }
            ws.state.set_api_key(Some(&key));
            ws.save().await;
            println!("API key saved");
        }
        SettingsCommand::ClearApiKey => {
            ws.state.set_api_key(None);
            ws.save().await;
            println!("API key removed");
        }
        SettingsCommand::DarkMode { enabled } => {
            ws.state.update_preferences(|p| p.dark_mode = enabled);
            ws.save().await;
            println!("Dark mode {}", if enabled { "on" } else { "off" });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_key() {
        assert_eq!(masked("abcdefgh"), "****efgh");
        assert_eq!(masked("abc"), "abc");
    }
}
